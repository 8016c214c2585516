//! Decoded payload records handed to subscriber callbacks.

use serde::{Deserialize, Serialize};

use super::enums::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EulerAngle {
    /// Degrees, -180..=180.
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// One EEG stream frame: a block of samples plus the mode the device was
/// in when it captured them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EegData {
    pub sequence: u32,
    pub sample_rate: f32,
    pub working_mode: WorkingMode,
    pub samples: Vec<f32>,
}

/// Relative band power of the latest EEG window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EegStats {
    pub delta: f64,
    pub theta: f64,
    pub alpha: f64,
    pub low_beta: f64,
    pub high_beta: f64,
    pub gamma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuData {
    pub sequence: u32,
    pub sample_rate: f32,
    pub head: HeadRotation,
    pub body: BodyPose,
    pub acc: Vec<Point3d>,
    pub gyro: Vec<Point3d>,
    pub euler: Vec<EulerAngle>,
}

/// Raw photodiode counts for one PPG sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpgRawSample {
    pub green1: u32,
    pub green2: u32,
    pub ir: u32,
    pub red: u32,
}

/// On-device PPG algorithm output. Confidence fields are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PpgAlgoSample {
    /// Heart rate, bpm.
    pub hr: f32,
    pub hr_confidence: u8,
    /// RR interval, ms.
    pub rr: f32,
    pub rr_confidence: u8,
    pub spo2: f32,
    pub spo2_confidence: u8,
    pub hrv: f32,
    pub stress: f32,
    pub activity: PpgActivity,
    pub spo2_state: Spo2State,
    pub contact_state: PpgContactState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PpgData {
    pub sequence: u32,
    pub report_rate: f32,
    pub raw: Vec<PpgRawSample>,
    pub algo: Vec<PpgAlgoSample>,
    pub respiratory_rate: f32,
    pub respiratory_state: RespiratoryState,
    pub respiratory_curve: Vec<f32>,
}

/// Nightly sleep summary. Timestamps are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepReport {
    pub begin_time: u64,
    pub end_time: u64,
    pub fall_asleep_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysInfo {
    pub firmware_info: String,
    pub hardware_errors: Vec<HardwareError>,
    /// 0 means the device never auto-sleeps; otherwise at least 30 s.
    pub sleep_idle_secs: u32,
    /// 0..=100.
    pub vibration_intensity: u8,
}

/// Status of one sub-command echoed back in a configuration response.
/// `error` 0 means that sub-command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCommandStatus {
    pub command: u8,
    pub error: u8,
}

/// Acknowledgement for an outbound configuration command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub results: Vec<SubCommandStatus>,
}

impl ConfigResponse {
    /// A response with no per-sub-command detail.
    pub fn ok() -> Self {
        Self { success: true, results: Vec::new() }
    }
}

//! Per-device subscriber callbacks.
//!
//! One owned slot per event/data category; registering a new callback for
//! a category replaces the previous one, which is dropped and never
//! invoked again. Callbacks run synchronously on the thread driving the
//! byte feed and must not call back into the same device (such calls are
//! rejected with `Busy`).

use crate::types::*;

/// Every callback receives the device identifier first.
pub type ContactStateCallback = Box<dyn FnMut(&str, ContactState) + Send>;
pub type SignalQualityCallback = Box<dyn FnMut(&str, u8) + Send>;
pub type ErrorCallback = Box<dyn FnMut(&str, i32) + Send>;
pub type EegDataCallback = Box<dyn FnMut(&str, &EegData) + Send>;
pub type EegStatsCallback = Box<dyn FnMut(&str, &EegStats) + Send>;
pub type ImuDataCallback = Box<dyn FnMut(&str, &ImuData) + Send>;
pub type PpgDataCallback = Box<dyn FnMut(&str, &PpgData) + Send>;
pub type OrientationCallback = Box<dyn FnMut(&str, Orientation) + Send>;
pub type ConnectivityCallback = Box<dyn FnMut(&str, Connectivity) + Send>;
/// Attention/meditation/stress scalar streams.
pub type ValueCallback = Box<dyn FnMut(&str, f32) + Send>;
/// `(device_id, stage, confidence, drowsiness)`.
pub type SleepStageCallback = Box<dyn FnMut(&str, SleepStage, f32, f32) + Send>;
pub type EventCallback = Box<dyn FnMut(&str, HeadsetEvent) + Send>;
pub type SleepReportCallback = Box<dyn FnMut(&str, &SleepReport) + Send>;
pub type BlinkCallback = Box<dyn FnMut(&str) + Send>;
/// `(device_id, msg_id, response)`.
pub type ConfigResponseCallback = Box<dyn FnMut(&str, u32, &ConfigResponse) + Send>;
/// `(device_id, msg_id, info)`.
pub type SysInfoCallback = Box<dyn FnMut(&str, u32, &SysInfo) + Send>;

#[derive(Default)]
pub(crate) struct CallbackRegistry {
    pub contact_state: Option<ContactStateCallback>,
    pub signal_quality: Option<SignalQualityCallback>,
    pub error: Option<ErrorCallback>,
    pub eeg_data: Option<EegDataCallback>,
    pub eeg_stats: Option<EegStatsCallback>,
    pub imu_data: Option<ImuDataCallback>,
    pub ppg_data: Option<PpgDataCallback>,
    pub orientation: Option<OrientationCallback>,
    pub connectivity: Option<ConnectivityCallback>,
    pub attention: Option<ValueCallback>,
    pub meditation: Option<ValueCallback>,
    pub stress: Option<ValueCallback>,
    pub sleep_stage: Option<SleepStageCallback>,
    pub event: Option<EventCallback>,
    pub sleep_report: Option<SleepReportCallback>,
    pub blink: Option<BlinkCallback>,
    pub afe_config_resp: Option<ConfigResponseCallback>,
    pub imu_config_resp: Option<ConfigResponseCallback>,
    pub ppg_config_resp: Option<ConfigResponseCallback>,
    pub sys_config_resp: Option<ConfigResponseCallback>,
    pub sys_info: Option<SysInfoCallback>,
}

//! The multiplexed message vocabulary: one sum type over every payload
//! kind the device and host exchange, with symmetric payload codecs.
//!
//! Tag ranges: `0x10..=0x1F` sensor/telemetry streams, `0x20..=0x2F`
//! state-affecting notifications, `0x30..=0x3F` command responses,
//! `0x40..=0x4F` outbound commands. Tags outside the known set decode to
//! [`CodecError::UnknownMessageType`], which the dispatcher skips without
//! failing the stream.

pub(crate) mod codec;
mod decode;
pub mod encode;

use crate::error::{CodecError, CoreError};
use crate::framing;
use crate::types::*;

/// Wire tags for every known message type.
pub mod tags {
    pub const EEG_DATA: u8 = 0x10;
    pub const EEG_STATS: u8 = 0x11;
    pub const IMU_DATA: u8 = 0x12;
    pub const PPG_DATA: u8 = 0x13;
    pub const ATTENTION: u8 = 0x14;
    pub const MEDITATION: u8 = 0x15;
    pub const STRESS: u8 = 0x16;
    pub const SLEEP_STAGE: u8 = 0x17;
    pub const SLEEP_REPORT: u8 = 0x18;
    pub const EVENT: u8 = 0x19;
    pub const BLINK: u8 = 0x1A;

    pub const CONTACT_STATE: u8 = 0x20;
    pub const SIGNAL_QUALITY: u8 = 0x21;
    pub const ORIENTATION: u8 = 0x22;
    pub const CONNECTIVITY: u8 = 0x23;
    pub const DEVICE_ERROR: u8 = 0x24;

    pub const AFE_CONFIG_RESP: u8 = 0x30;
    pub const IMU_CONFIG_RESP: u8 = 0x31;
    pub const PPG_CONFIG_RESP: u8 = 0x32;
    pub const SYS_CONFIG_RESP: u8 = 0x33;
    pub const SYS_INFO: u8 = 0x34;

    pub const AFE_CONFIG: u8 = 0x40;
    pub const IMU_CONFIG: u8 = 0x41;
    pub const PPG_CONFIG: u8 = 0x42;
    pub const SYS_COMMAND: u8 = 0x43;
    pub const SET_DEVICE_NAME: u8 = 0x44;
    pub const PAIR: u8 = 0x45;
    pub const SET_SLEEP_IDLE_TIME: u8 = 0x46;
    pub const SET_SLEEP_MODE: u8 = 0x47;
}

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Sensor / telemetry streams.
    EegData(EegData),
    EegStats(EegStats),
    ImuData(ImuData),
    PpgData(PpgData),
    Attention(f32),
    Meditation(f32),
    Stress(f32),
    SleepStage {
        stage: SleepStage,
        confidence: f32,
        drowsiness: f32,
    },
    SleepReport(SleepReport),
    /// Raw event code; codes this build does not know about are dropped at
    /// dispatch, not here, to keep the codec symmetric.
    Event(u8),
    Blink,

    // State-affecting notifications.
    ContactState(ContactState),
    SignalQuality(u8),
    Orientation(Orientation),
    Connectivity(Connectivity),
    DeviceError(i32),

    // Command responses.
    AfeConfigResp(ConfigResponse),
    ImuConfigResp(ConfigResponse),
    PpgConfigResp(ConfigResponse),
    SysConfigResp(ConfigResponse),
    SysInfo(SysInfo),

    // Outbound commands.
    AfeConfig {
        sample_rate: EegSampleRate,
    },
    ImuConfig {
        sample_rate: ImuSampleRate,
        mode: ImuMode,
    },
    PpgConfig {
        report_rate: PpgReportRate,
        mode: PpgMode,
        raw_reg: u8,
        raw_value: u8,
    },
    SysCommand(ConfigCmd),
    SetDeviceName(String),
    Pair {
        first: bool,
        pair_info: String,
    },
    SetSleepIdleTime(u32),
    SetSleepMode(bool),
}

impl Message {
    /// The wire tag this message is carried under.
    pub fn tag(&self) -> u8 {
        match self {
            Message::EegData(_) => tags::EEG_DATA,
            Message::EegStats(_) => tags::EEG_STATS,
            Message::ImuData(_) => tags::IMU_DATA,
            Message::PpgData(_) => tags::PPG_DATA,
            Message::Attention(_) => tags::ATTENTION,
            Message::Meditation(_) => tags::MEDITATION,
            Message::Stress(_) => tags::STRESS,
            Message::SleepStage { .. } => tags::SLEEP_STAGE,
            Message::SleepReport(_) => tags::SLEEP_REPORT,
            Message::Event(_) => tags::EVENT,
            Message::Blink => tags::BLINK,
            Message::ContactState(_) => tags::CONTACT_STATE,
            Message::SignalQuality(_) => tags::SIGNAL_QUALITY,
            Message::Orientation(_) => tags::ORIENTATION,
            Message::Connectivity(_) => tags::CONNECTIVITY,
            Message::DeviceError(_) => tags::DEVICE_ERROR,
            Message::AfeConfigResp(_) => tags::AFE_CONFIG_RESP,
            Message::ImuConfigResp(_) => tags::IMU_CONFIG_RESP,
            Message::PpgConfigResp(_) => tags::PPG_CONFIG_RESP,
            Message::SysConfigResp(_) => tags::SYS_CONFIG_RESP,
            Message::SysInfo(_) => tags::SYS_INFO,
            Message::AfeConfig { .. } => tags::AFE_CONFIG,
            Message::ImuConfig { .. } => tags::IMU_CONFIG,
            Message::PpgConfig { .. } => tags::PPG_CONFIG,
            Message::SysCommand(_) => tags::SYS_COMMAND,
            Message::SetDeviceName(_) => tags::SET_DEVICE_NAME,
            Message::Pair { .. } => tags::PAIR,
            Message::SetSleepIdleTime(_) => tags::SET_SLEEP_IDLE_TIME,
            Message::SetSleepMode(_) => tags::SET_SLEEP_MODE,
        }
    }

    /// Decodes a payload under the given tag.
    ///
    /// Trailing bytes are tolerated (newer firmware appends fields);
    /// truncation fails with [`CodecError::UnexpectedEof`].
    pub fn decode(tag: u8, payload: &[u8]) -> Result<Self, CodecError> {
        decode::decode_payload(tag, payload)
    }

    /// Encodes this message into a complete frame carrying `msg_id`.
    pub fn to_frame(&self, msg_id: u32) -> Result<Vec<u8>, CoreError> {
        framing::encode_frame(self.tag(), msg_id, &self.encode_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(msg: Message) {
        let payload = msg.encode_payload();
        let decoded = Message::decode(msg.tag(), &payload).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn eeg_data_round_trips() {
        round_trip(Message::EegData(EegData {
            sequence: 42,
            sample_rate: 256.0,
            working_mode: WorkingMode::Sleep,
            samples: vec![1.25, -3.0, 0.0],
        }));
    }

    #[test]
    fn imu_data_round_trips() {
        round_trip(Message::ImuData(ImuData {
            sequence: 9,
            sample_rate: 100.0,
            head: HeadRotation::Left,
            body: BodyPose::Seated,
            acc: vec![Point3d { x: 0.1, y: -0.2, z: 9.8 }],
            gyro: vec![],
            euler: vec![EulerAngle { yaw: 10.0, pitch: -5.0, roll: 0.5 }],
        }));
    }

    #[test]
    fn ppg_data_round_trips() {
        round_trip(Message::PpgData(PpgData {
            sequence: 3,
            report_rate: 25.0,
            raw: vec![PpgRawSample { green1: 1, green2: 2, ir: 3, red: 4 }],
            algo: vec![PpgAlgoSample {
                hr: 62.0,
                hr_confidence: 95,
                rr: 850.0,
                rr_confidence: 80,
                spo2: 98.5,
                spo2_confidence: 90,
                hrv: 55.0,
                stress: 20.0,
                activity: PpgActivity::Rest,
                spo2_state: Spo2State::Success,
                contact_state: PpgContactState::OnSkin,
            }],
            respiratory_rate: 14.0,
            respiratory_state: RespiratoryState::In,
            respiratory_curve: vec![0.5, 0.7],
        }));
    }

    #[test]
    fn notifications_round_trip() {
        round_trip(Message::ContactState(ContactState::All));
        round_trip(Message::SignalQuality(87));
        round_trip(Message::Orientation(Orientation::Downward));
        round_trip(Message::Connectivity(Connectivity::Connected));
        round_trip(Message::DeviceError(crate::error::code::EEG_INIT));
    }

    #[test]
    fn telemetry_scalars_round_trip() {
        round_trip(Message::Attention(71.5));
        round_trip(Message::SleepStage {
            stage: SleepStage::Rem,
            confidence: 0.9,
            drowsiness: 0.3,
        });
        round_trip(Message::SleepReport(SleepReport {
            begin_time: 1_700_000_000,
            end_time: 1_700_028_800,
            fall_asleep_time: 1_700_001_200,
        }));
        round_trip(Message::Event(u8::from(HeadsetEvent::WakeUp)));
        round_trip(Message::Blink);
        round_trip(Message::EegStats(EegStats {
            delta: 0.4,
            theta: 0.2,
            alpha: 0.15,
            low_beta: 0.1,
            high_beta: 0.1,
            gamma: 0.05,
        }));
    }

    #[test]
    fn responses_round_trip() {
        round_trip(Message::AfeConfigResp(ConfigResponse {
            success: false,
            results: vec![SubCommandStatus { command: 2, error: 1 }],
        }));
        round_trip(Message::SysInfo(SysInfo {
            firmware_info: "fw 2.1.0".into(),
            hardware_errors: vec![HardwareError::Imu],
            sleep_idle_secs: 300,
            vibration_intensity: 40,
        }));
    }

    #[test]
    fn commands_round_trip() {
        round_trip(Message::AfeConfig { sample_rate: EegSampleRate::Hz256 });
        round_trip(Message::ImuConfig {
            sample_rate: ImuSampleRate::Hz100,
            mode: ImuMode::AccGyro,
        });
        round_trip(Message::PpgConfig {
            report_rate: PpgReportRate::Hz25,
            mode: PpgMode::Algo,
            raw_reg: 0x12,
            raw_value: 0x34,
        });
        round_trip(Message::SysCommand(ConfigCmd::Start));
        round_trip(Message::SetDeviceName("sleeper-7".into()));
        round_trip(Message::Pair { first: true, pair_info: "token".into() });
        round_trip(Message::SetSleepIdleTime(120));
        round_trip(Message::SetSleepMode(true));
    }

    #[test]
    fn unknown_tag_is_distinct_error() {
        assert!(matches!(
            Message::decode(0xEE, &[]),
            Err(CodecError::UnknownMessageType(0xEE))
        ));
    }

    #[test]
    fn truncated_payload_fails() {
        let payload = Message::SleepReport(SleepReport {
            begin_time: 1,
            end_time: 2,
            fall_asleep_time: 3,
        })
        .encode_payload();
        assert!(matches!(
            Message::decode(tags::SLEEP_REPORT, &payload[..10]),
            Err(CodecError::UnexpectedEof)
        ));
    }
}

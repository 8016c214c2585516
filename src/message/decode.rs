//! Per-tag payload decoding into typed records.

use super::codec::{Reader, enum_value};
use super::{Message, tags};
use crate::error::CodecError;
use crate::types::*;

// Cap on declared element counts, so a hostile count can't force a huge
// preallocation before the EOF check catches it.
const PREALLOC_CAP: usize = 1024;

pub(super) fn decode_payload(tag: u8, payload: &[u8]) -> Result<Message, CodecError> {
    let mut r = Reader::new(payload);
    let msg = match tag {
        tags::EEG_DATA => Message::EegData(read_eeg_data(&mut r)?),
        tags::EEG_STATS => Message::EegStats(EegStats {
            delta: r.read_f64()?,
            theta: r.read_f64()?,
            alpha: r.read_f64()?,
            low_beta: r.read_f64()?,
            high_beta: r.read_f64()?,
            gamma: r.read_f64()?,
        }),
        tags::IMU_DATA => Message::ImuData(read_imu_data(&mut r)?),
        tags::PPG_DATA => Message::PpgData(read_ppg_data(&mut r)?),
        tags::ATTENTION => Message::Attention(r.read_f32()?),
        tags::MEDITATION => Message::Meditation(r.read_f32()?),
        tags::STRESS => Message::Stress(r.read_f32()?),
        tags::SLEEP_STAGE => {
            let raw = r.read_i8()?;
            Message::SleepStage {
                stage: enum_value("sleep_stage", raw, SleepStage::from_wire(raw))?,
                confidence: r.read_f32()?,
                drowsiness: r.read_f32()?,
            }
        }
        tags::SLEEP_REPORT => Message::SleepReport(SleepReport {
            begin_time: r.read_u64()?,
            end_time: r.read_u64()?,
            fall_asleep_time: r.read_u64()?,
        }),
        tags::EVENT => Message::Event(r.read_u8()?),
        tags::BLINK => Message::Blink,
        tags::CONTACT_STATE => {
            let raw = r.read_u8()?;
            Message::ContactState(enum_value("contact_state", raw, ContactState::from_wire(raw))?)
        }
        tags::SIGNAL_QUALITY => Message::SignalQuality(r.read_u8()?),
        tags::ORIENTATION => {
            let raw = r.read_u8()?;
            Message::Orientation(enum_value("orientation", raw, Orientation::from_wire(raw))?)
        }
        tags::CONNECTIVITY => {
            let raw = r.read_u8()?;
            Message::Connectivity(enum_value("connectivity", raw, Connectivity::from_wire(raw))?)
        }
        tags::DEVICE_ERROR => Message::DeviceError(r.read_i32()?),
        tags::AFE_CONFIG_RESP => Message::AfeConfigResp(read_config_resp(&mut r)?),
        tags::IMU_CONFIG_RESP => Message::ImuConfigResp(read_config_resp(&mut r)?),
        tags::PPG_CONFIG_RESP => Message::PpgConfigResp(read_config_resp(&mut r)?),
        tags::SYS_CONFIG_RESP => Message::SysConfigResp(read_config_resp(&mut r)?),
        tags::SYS_INFO => Message::SysInfo(read_sys_info(&mut r)?),
        tags::AFE_CONFIG => {
            let raw = r.read_u8()?;
            Message::AfeConfig {
                sample_rate: enum_value("eeg_sample_rate", raw, EegSampleRate::from_wire(raw))?,
            }
        }
        tags::IMU_CONFIG => {
            let rate = r.read_u8()?;
            let mode = r.read_u8()?;
            Message::ImuConfig {
                sample_rate: enum_value("imu_sample_rate", rate, ImuSampleRate::from_wire(rate))?,
                mode: enum_value("imu_mode", mode, ImuMode::from_wire(mode))?,
            }
        }
        tags::PPG_CONFIG => {
            let rate = r.read_u8()?;
            let mode = r.read_u8()?;
            Message::PpgConfig {
                report_rate: enum_value("ppg_report_rate", rate, PpgReportRate::from_wire(rate))?,
                mode: enum_value("ppg_mode", mode, PpgMode::from_wire(mode))?,
                raw_reg: r.read_u8()?,
                raw_value: r.read_u8()?,
            }
        }
        tags::SYS_COMMAND => {
            let raw = r.read_u8()?;
            Message::SysCommand(enum_value("config_cmd", raw, ConfigCmd::from_wire(raw))?)
        }
        tags::SET_DEVICE_NAME => Message::SetDeviceName(r.read_str()?),
        tags::PAIR => Message::Pair {
            first: r.read_u8()? != 0,
            pair_info: r.read_str()?,
        },
        tags::SET_SLEEP_IDLE_TIME => Message::SetSleepIdleTime(r.read_u32()?),
        tags::SET_SLEEP_MODE => Message::SetSleepMode(r.read_u8()? != 0),
        unknown => return Err(CodecError::UnknownMessageType(unknown)),
    };
    Ok(msg)
}

fn read_eeg_data(r: &mut Reader) -> Result<EegData, CodecError> {
    let sequence = r.read_u32()?;
    let sample_rate = r.read_f32()?;
    let raw_mode = r.read_u8()?;
    let working_mode = enum_value("working_mode", raw_mode, WorkingMode::from_wire(raw_mode))?;
    let n = r.read_u16()? as usize;
    let mut samples = Vec::with_capacity(n.min(PREALLOC_CAP));
    for _ in 0..n {
        samples.push(r.read_f32()?);
    }
    Ok(EegData { sequence, sample_rate, working_mode, samples })
}

fn read_point3d_block(r: &mut Reader) -> Result<Vec<Point3d>, CodecError> {
    let n = r.read_u16()? as usize;
    let mut points = Vec::with_capacity(n.min(PREALLOC_CAP));
    for _ in 0..n {
        points.push(Point3d {
            x: r.read_f32()?,
            y: r.read_f32()?,
            z: r.read_f32()?,
        });
    }
    Ok(points)
}

fn read_imu_data(r: &mut Reader) -> Result<ImuData, CodecError> {
    let sequence = r.read_u32()?;
    let sample_rate = r.read_f32()?;
    let raw_head = r.read_u8()?;
    let raw_body = r.read_u8()?;
    let head = enum_value("head_rotation", raw_head, HeadRotation::from_wire(raw_head))?;
    let body = enum_value("body_pose", raw_body, BodyPose::from_wire(raw_body))?;
    let acc = read_point3d_block(r)?;
    let gyro = read_point3d_block(r)?;
    let n = r.read_u16()? as usize;
    let mut euler = Vec::with_capacity(n.min(PREALLOC_CAP));
    for _ in 0..n {
        euler.push(EulerAngle {
            yaw: r.read_f32()?,
            pitch: r.read_f32()?,
            roll: r.read_f32()?,
        });
    }
    Ok(ImuData { sequence, sample_rate, head, body, acc, gyro, euler })
}

fn read_ppg_data(r: &mut Reader) -> Result<PpgData, CodecError> {
    let sequence = r.read_u32()?;
    let report_rate = r.read_f32()?;

    let n_raw = r.read_u16()? as usize;
    let mut raw = Vec::with_capacity(n_raw.min(PREALLOC_CAP));
    for _ in 0..n_raw {
        raw.push(PpgRawSample {
            green1: r.read_u32()?,
            green2: r.read_u32()?,
            ir: r.read_u32()?,
            red: r.read_u32()?,
        });
    }

    let n_algo = r.read_u16()? as usize;
    let mut algo = Vec::with_capacity(n_algo.min(PREALLOC_CAP));
    for _ in 0..n_algo {
        let hr = r.read_f32()?;
        let hr_confidence = r.read_u8()?;
        let rr = r.read_f32()?;
        let rr_confidence = r.read_u8()?;
        let spo2 = r.read_f32()?;
        let spo2_confidence = r.read_u8()?;
        let hrv = r.read_f32()?;
        let stress = r.read_f32()?;
        let raw_activity = r.read_u8()?;
        let raw_spo2_state = r.read_u8()?;
        let raw_contact = r.read_u8()?;
        algo.push(PpgAlgoSample {
            hr,
            hr_confidence,
            rr,
            rr_confidence,
            spo2,
            spo2_confidence,
            hrv,
            stress,
            activity: enum_value("ppg_activity", raw_activity, PpgActivity::from_wire(raw_activity))?,
            spo2_state: enum_value("spo2_state", raw_spo2_state, Spo2State::from_wire(raw_spo2_state))?,
            contact_state: enum_value(
                "ppg_contact_state",
                raw_contact,
                PpgContactState::from_wire(raw_contact),
            )?,
        });
    }

    let respiratory_rate = r.read_f32()?;
    let raw_state = r.read_u8()?;
    let respiratory_state =
        enum_value("respiratory_state", raw_state, RespiratoryState::from_wire(raw_state))?;
    let n_curve = r.read_u16()? as usize;
    let mut respiratory_curve = Vec::with_capacity(n_curve.min(PREALLOC_CAP));
    for _ in 0..n_curve {
        respiratory_curve.push(r.read_f32()?);
    }

    Ok(PpgData {
        sequence,
        report_rate,
        raw,
        algo,
        respiratory_rate,
        respiratory_state,
        respiratory_curve,
    })
}

fn read_config_resp(r: &mut Reader) -> Result<ConfigResponse, CodecError> {
    let success = r.read_u8()? != 0;
    let n = r.read_u8()? as usize;
    let mut results = Vec::with_capacity(n);
    for _ in 0..n {
        results.push(SubCommandStatus {
            command: r.read_u8()?,
            error: r.read_u8()?,
        });
    }
    Ok(ConfigResponse { success, results })
}

fn read_sys_info(r: &mut Reader) -> Result<SysInfo, CodecError> {
    let firmware_info = r.read_str()?;
    let n = r.read_u8()? as usize;
    let mut hardware_errors = Vec::with_capacity(n);
    for _ in 0..n {
        let raw = r.read_u8()?;
        hardware_errors.push(enum_value("hardware_error", raw, HardwareError::from_wire(raw))?);
    }
    Ok(SysInfo {
        firmware_info,
        hardware_errors,
        sleep_idle_secs: r.read_u32()?,
        vibration_intensity: r.read_u8()?,
    })
}

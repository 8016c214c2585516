//! Payload encoding and the outbound command packers.
//!
//! The packers validate their typed parameters and return a complete
//! encoded frame. They have no side effects: registering the pending
//! command for response correlation is a separate step
//! ([`crate::Device::register_pending`]) performed once the buffer is
//! actually handed to the transport, so a caller may encode and discard
//! without polluting pending state.

use super::codec::Writer;
use super::{Message, tags};
use crate::error::{CoreError, Result};
use crate::types::*;

/// Longest accepted device name, bytes. BLE advertising leaves little room
/// for more.
pub const MAX_DEVICE_NAME_LEN: usize = 30;
pub const MAX_PAIR_INFO_LEN: usize = 128;
/// Idle timeout bounds: 0 disables auto-sleep, anything else is clamped by
/// firmware to `[30, 86400]` so we reject values outside that up front.
pub const MIN_SLEEP_IDLE_SECS: u32 = 30;
pub const MAX_SLEEP_IDLE_SECS: u32 = 86_400;

impl Message {
    /// Serializes this message's payload (without frame header/CRC).
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut w = Writer::new();
        match self {
            Message::EegData(d) => {
                w.write_u32(d.sequence);
                w.write_f32(d.sample_rate);
                w.write_u8(d.working_mode.into());
                w.write_u16(d.samples.len() as u16);
                for &s in &d.samples {
                    w.write_f32(s);
                }
            }
            Message::EegStats(s) => {
                w.write_f64(s.delta);
                w.write_f64(s.theta);
                w.write_f64(s.alpha);
                w.write_f64(s.low_beta);
                w.write_f64(s.high_beta);
                w.write_f64(s.gamma);
            }
            Message::ImuData(d) => {
                w.write_u32(d.sequence);
                w.write_f32(d.sample_rate);
                w.write_u8(d.head.into());
                w.write_u8(d.body.into());
                write_point3d_block(&mut w, &d.acc);
                write_point3d_block(&mut w, &d.gyro);
                w.write_u16(d.euler.len() as u16);
                for e in &d.euler {
                    w.write_f32(e.yaw);
                    w.write_f32(e.pitch);
                    w.write_f32(e.roll);
                }
            }
            Message::PpgData(d) => {
                w.write_u32(d.sequence);
                w.write_f32(d.report_rate);
                w.write_u16(d.raw.len() as u16);
                for s in &d.raw {
                    w.write_u32(s.green1);
                    w.write_u32(s.green2);
                    w.write_u32(s.ir);
                    w.write_u32(s.red);
                }
                w.write_u16(d.algo.len() as u16);
                for s in &d.algo {
                    w.write_f32(s.hr);
                    w.write_u8(s.hr_confidence);
                    w.write_f32(s.rr);
                    w.write_u8(s.rr_confidence);
                    w.write_f32(s.spo2);
                    w.write_u8(s.spo2_confidence);
                    w.write_f32(s.hrv);
                    w.write_f32(s.stress);
                    w.write_u8(s.activity.into());
                    w.write_u8(s.spo2_state.into());
                    w.write_u8(s.contact_state.into());
                }
                w.write_f32(d.respiratory_rate);
                w.write_u8(d.respiratory_state.into());
                w.write_u16(d.respiratory_curve.len() as u16);
                for &v in &d.respiratory_curve {
                    w.write_f32(v);
                }
            }
            Message::Attention(v) | Message::Meditation(v) | Message::Stress(v) => {
                w.write_f32(*v);
            }
            Message::SleepStage { stage, confidence, drowsiness } => {
                w.write_i8((*stage).into());
                w.write_f32(*confidence);
                w.write_f32(*drowsiness);
            }
            Message::SleepReport(rep) => {
                w.write_u64(rep.begin_time);
                w.write_u64(rep.end_time);
                w.write_u64(rep.fall_asleep_time);
            }
            Message::Event(code) => w.write_u8(*code),
            Message::Blink => {}
            Message::ContactState(s) => w.write_u8((*s).into()),
            Message::SignalQuality(q) => w.write_u8(*q),
            Message::Orientation(o) => w.write_u8((*o).into()),
            Message::Connectivity(c) => w.write_u8((*c).into()),
            Message::DeviceError(code) => w.write_i32(*code),
            Message::AfeConfigResp(resp)
            | Message::ImuConfigResp(resp)
            | Message::PpgConfigResp(resp)
            | Message::SysConfigResp(resp) => {
                w.write_u8(resp.success as u8);
                w.write_u8(resp.results.len() as u8);
                for s in &resp.results {
                    w.write_u8(s.command);
                    w.write_u8(s.error);
                }
            }
            Message::SysInfo(info) => {
                w.write_str(&info.firmware_info);
                w.write_u8(info.hardware_errors.len() as u8);
                for &e in &info.hardware_errors {
                    w.write_u8(e.into());
                }
                w.write_u32(info.sleep_idle_secs);
                w.write_u8(info.vibration_intensity);
            }
            Message::AfeConfig { sample_rate } => w.write_u8((*sample_rate).into()),
            Message::ImuConfig { sample_rate, mode } => {
                w.write_u8((*sample_rate).into());
                w.write_u8((*mode).into());
            }
            Message::PpgConfig { report_rate, mode, raw_reg, raw_value } => {
                w.write_u8((*report_rate).into());
                w.write_u8((*mode).into());
                w.write_u8(*raw_reg);
                w.write_u8(*raw_value);
            }
            Message::SysCommand(cmd) => w.write_u8((*cmd).into()),
            Message::SetDeviceName(name) => w.write_str(name),
            Message::Pair { first, pair_info } => {
                w.write_u8(*first as u8);
                w.write_str(pair_info);
            }
            Message::SetSleepIdleTime(secs) => w.write_u32(*secs),
            Message::SetSleepMode(enabled) => w.write_u8(*enabled as u8),
        }
        w.into_inner()
    }
}

fn write_point3d_block(w: &mut Writer, points: &[Point3d]) {
    w.write_u16(points.len() as u16);
    for p in points {
        w.write_f32(p.x);
        w.write_f32(p.y);
        w.write_f32(p.z);
    }
}

/// AFE (EEG front-end) configuration command.
pub fn afe_config(msg_id: u32, sample_rate: EegSampleRate) -> Result<Vec<u8>> {
    if sample_rate == EegSampleRate::None {
        return Err(CoreError::InvalidParameter("EEG sample rate must not be the None placeholder"));
    }
    Message::AfeConfig { sample_rate }.to_frame(msg_id)
}

/// IMU configuration command.
pub fn imu_config(msg_id: u32, sample_rate: ImuSampleRate, mode: ImuMode) -> Result<Vec<u8>> {
    if sample_rate == ImuSampleRate::None {
        return Err(CoreError::InvalidParameter("IMU sample rate must not be the None placeholder"));
    }
    if mode == ImuMode::None && sample_rate != ImuSampleRate::Off {
        return Err(CoreError::InvalidParameter("IMU mode required when the stream is enabled"));
    }
    Message::ImuConfig { sample_rate, mode }.to_frame(msg_id)
}

/// PPG configuration command. `raw_reg`/`raw_value` configure the optical
/// front-end register pair and pass through unvalidated.
pub fn ppg_config(
    msg_id: u32,
    report_rate: PpgReportRate,
    mode: PpgMode,
    raw_reg: u8,
    raw_value: u8,
) -> Result<Vec<u8>> {
    if report_rate == PpgReportRate::None {
        return Err(CoreError::InvalidParameter("PPG report rate must not be the None placeholder"));
    }
    if mode == PpgMode::None && report_rate != PpgReportRate::Off {
        return Err(CoreError::InvalidParameter("PPG mode required when the stream is enabled"));
    }
    Message::PpgConfig { report_rate, mode, raw_reg, raw_value }.to_frame(msg_id)
}

/// System command (start/stop/reset/shutdown/…).
pub fn sys_cmd(msg_id: u32, cmd: ConfigCmd) -> Result<Vec<u8>> {
    Message::SysCommand(cmd).to_frame(msg_id)
}

/// Device rename command. The name must be 1..=[`MAX_DEVICE_NAME_LEN`]
/// bytes; an oversized name fails rather than silently truncating.
pub fn device_name(msg_id: u32, name: &str) -> Result<Vec<u8>> {
    if name.is_empty() {
        return Err(CoreError::InvalidParameter("device name must not be empty"));
    }
    if name.len() > MAX_DEVICE_NAME_LEN {
        return Err(CoreError::InvalidParameter("device name exceeds maximum length"));
    }
    Message::SetDeviceName(name.to_owned()).to_frame(msg_id)
}

/// Pairing command. `first` distinguishes initial pairing from validating
/// stored pair info right after connection.
pub fn pair(msg_id: u32, first: bool, pair_info: &str) -> Result<Vec<u8>> {
    if pair_info.len() > MAX_PAIR_INFO_LEN {
        return Err(CoreError::InvalidParameter("pair info exceeds maximum length"));
    }
    Message::Pair { first, pair_info: pair_info.to_owned() }.to_frame(msg_id)
}

/// Auto-sleep idle timeout. 0 disables; otherwise 30..=86400 seconds.
pub fn sleep_idle_time(msg_id: u32, secs: u32) -> Result<Vec<u8>> {
    if secs != 0 && !(MIN_SLEEP_IDLE_SECS..=MAX_SLEEP_IDLE_SECS).contains(&secs) {
        return Err(CoreError::InvalidParameter("sleep idle time out of range"));
    }
    Message::SetSleepIdleTime(secs).to_frame(msg_id)
}

/// Working-mode switch between normal and sleep tracking.
pub fn sleep_mode(msg_id: u32, enabled: bool) -> Result<Vec<u8>> {
    Message::SetSleepMode(enabled).to_frame(msg_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_rates_are_invalid() {
        assert!(matches!(
            afe_config(1, EegSampleRate::None),
            Err(CoreError::InvalidParameter(_))
        ));
        assert!(afe_config(1, EegSampleRate::Off).is_ok());
        assert!(matches!(
            imu_config(1, ImuSampleRate::Hz100, ImuMode::None),
            Err(CoreError::InvalidParameter(_))
        ));
        assert!(imu_config(1, ImuSampleRate::Off, ImuMode::None).is_ok());
    }

    #[test]
    fn oversized_name_fails_instead_of_truncating() {
        let long = "x".repeat(MAX_DEVICE_NAME_LEN + 1);
        assert!(matches!(device_name(1, &long), Err(CoreError::InvalidParameter(_))));
        assert!(device_name(1, "band").is_ok());
        assert!(matches!(device_name(1, ""), Err(CoreError::InvalidParameter(_))));
    }

    #[test]
    fn idle_time_bounds() {
        assert!(sleep_idle_time(1, 0).is_ok());
        assert!(sleep_idle_time(1, 30).is_ok());
        assert!(matches!(sleep_idle_time(1, 29), Err(CoreError::InvalidParameter(_))));
        assert!(matches!(
            sleep_idle_time(1, MAX_SLEEP_IDLE_SECS + 1),
            Err(CoreError::InvalidParameter(_))
        ));
    }

    #[test]
    fn packers_emit_decodable_frames() {
        use crate::framing::FrameDecoder;
        let buf = afe_config(77, EegSampleRate::Hz256).unwrap();
        let mut decoder = FrameDecoder::new();
        decoder.extend(&buf);
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.msg_id, 77);
        let msg = Message::decode(frame.msg_type, &frame.payload).unwrap();
        assert_eq!(msg, Message::AfeConfig { sample_rate: EegSampleRate::Hz256 });
    }
}

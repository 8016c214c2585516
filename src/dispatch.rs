//! Routes each decoded frame to its state update, subscriber callback, or
//! the command-response correlator.
//!
//! Three routes:
//! 1. sensor/telemetry streams — decode and invoke the registered callback
//!    for the category, or silently discard when none is registered;
//! 2. state-affecting notifications — write the device-state record first,
//!    then invoke the callback, so an observer inside the callback already
//!    sees the new value through the getters;
//! 3. command responses — resolve the pending-command table and deliver to
//!    the per-subsystem response slot; unmatched IDs are discarded without
//!    error (stale, duplicate, or meant for another device).
//!
//! Unknown message types and per-frame payload decode failures drop that
//! one frame and leave the rest of the stream untouched.

use log::{debug, trace, warn};

use crate::device::{CommandCategory, DeviceInner, DeviceState};
use crate::error::CodecError;
use crate::framing::Frame;
use crate::message::Message;
use crate::msg_id;
use crate::types::*;

pub(crate) fn dispatch_frame(id: &str, state: &DeviceState, inner: &mut DeviceInner, frame: &Frame) {
    let msg = match Message::decode(frame.msg_type, &frame.payload) {
        Ok(msg) => msg,
        Err(CodecError::UnknownMessageType(tag)) => {
            debug!("{id}: skipping unknown message type 0x{tag:02x} ({}B)", frame.payload.len());
            return;
        }
        Err(e) => {
            warn!("{id}: dropping frame type=0x{:02x}: {e}", frame.msg_type);
            return;
        }
    };

    match msg {
        // Route 1: sensor / telemetry streams.
        Message::EegData(data) => {
            // Working mode rides along in every EEG frame.
            state.set_working_mode(data.working_mode);
            if let Some(cb) = inner.callbacks.eeg_data.as_mut() {
                cb(id, &data);
            }
        }
        Message::EegStats(stats) => {
            if let Some(cb) = inner.callbacks.eeg_stats.as_mut() {
                cb(id, &stats);
            }
        }
        Message::ImuData(data) => {
            if let Some(cb) = inner.callbacks.imu_data.as_mut() {
                cb(id, &data);
            }
        }
        Message::PpgData(data) => {
            if let Some(cb) = inner.callbacks.ppg_data.as_mut() {
                cb(id, &data);
            }
        }
        Message::Attention(value) => {
            if let Some(cb) = inner.callbacks.attention.as_mut() {
                cb(id, value);
            }
        }
        Message::Meditation(value) => {
            if let Some(cb) = inner.callbacks.meditation.as_mut() {
                cb(id, value);
            }
        }
        Message::Stress(value) => {
            if let Some(cb) = inner.callbacks.stress.as_mut() {
                cb(id, value);
            }
        }
        Message::SleepStage { stage, confidence, drowsiness } => {
            if let Some(cb) = inner.callbacks.sleep_stage.as_mut() {
                cb(id, stage, confidence, drowsiness);
            }
        }
        Message::SleepReport(report) => {
            if let Some(cb) = inner.callbacks.sleep_report.as_mut() {
                cb(id, &report);
            }
        }
        Message::Event(code) => match HeadsetEvent::from_wire(code) {
            Some(event) => {
                if let Some(cb) = inner.callbacks.event.as_mut() {
                    cb(id, event);
                }
            }
            None => debug!("{id}: skipping unknown event code {code}"),
        },
        Message::Blink => {
            if let Some(cb) = inner.callbacks.blink.as_mut() {
                cb(id);
            }
        }

        // Route 2: state-affecting notifications. State first, then
        // callback.
        Message::ContactState(contact) => {
            state.set_contact(contact);
            if let Some(cb) = inner.callbacks.contact_state.as_mut() {
                cb(id, contact);
            }
        }
        Message::SignalQuality(quality) => {
            if let Some(cb) = inner.callbacks.signal_quality.as_mut() {
                cb(id, quality);
            }
        }
        Message::Orientation(orientation) => {
            state.set_orientation(orientation);
            if let Some(cb) = inner.callbacks.orientation.as_mut() {
                cb(id, orientation);
            }
        }
        Message::Connectivity(connectivity) => {
            state.set_connectivity(connectivity);
            if let Some(cb) = inner.callbacks.connectivity.as_mut() {
                cb(id, connectivity);
            }
        }
        Message::DeviceError(error_code) => {
            if let Some(cb) = inner.callbacks.error.as_mut() {
                cb(id, error_code);
            }
        }

        // Route 3: command responses.
        Message::AfeConfigResp(resp) => {
            resolve_response(id, inner, frame.msg_id, CommandCategory::Afe, &resp)
        }
        Message::ImuConfigResp(resp) => {
            resolve_response(id, inner, frame.msg_id, CommandCategory::Imu, &resp)
        }
        Message::PpgConfigResp(resp) => {
            resolve_response(id, inner, frame.msg_id, CommandCategory::Ppg, &resp)
        }
        Message::SysConfigResp(resp) => {
            resolve_response(id, inner, frame.msg_id, CommandCategory::System, &resp)
        }
        // The system-info report does not consume the pending entry; the
        // matching config ack does. It just carries the echoed ID through.
        Message::SysInfo(info) => {
            if let Some(cb) = inner.callbacks.sys_info.as_mut() {
                cb(id, frame.msg_id, &info);
            }
        }

        // Host-to-device command tags have no business on the inbound
        // stream; keep alignment and move on.
        cmd @ (Message::AfeConfig { .. }
        | Message::ImuConfig { .. }
        | Message::PpgConfig { .. }
        | Message::SysCommand(_)
        | Message::SetDeviceName(_)
        | Message::Pair { .. }
        | Message::SetSleepIdleTime(_)
        | Message::SetSleepMode(_)) => {
            debug!("{id}: ignoring command tag 0x{:02x} on inbound stream", cmd.tag());
        }
    }
}

fn resolve_response(
    id: &str,
    inner: &mut DeviceInner,
    msg_id: u32,
    category: CommandCategory,
    resp: &ConfigResponse,
) {
    let Some(pending) = inner.pending.remove(&msg_id) else {
        trace!("{id}: unmatched response msg_id={msg_id}, discarding");
        return;
    };
    msg_id::release(msg_id);
    if pending.category != category {
        debug!(
            "{id}: response category {category:?} differs from pending {:?} for msg_id={msg_id}",
            pending.category
        );
    }
    let slot = match category {
        CommandCategory::Afe => &mut inner.callbacks.afe_config_resp,
        CommandCategory::Imu => &mut inner.callbacks.imu_config_resp,
        CommandCategory::Ppg => &mut inner.callbacks.ppg_config_resp,
        CommandCategory::System => &mut inner.callbacks.sys_config_resp,
    };
    if let Some(cb) = slot.as_mut() {
        cb(id, msg_id, resp);
    }
}

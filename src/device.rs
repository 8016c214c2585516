//! The per-device handle: reassembly buffer, derived state, callback
//! registry and pending-command table.
//!
//! A [`Device`] is a process-lifetime singleton per device identifier (see
//! [`crate::registry`]). Its entry points are synchronous and run to
//! completion; a device must not be driven concurrently or reentrantly —
//! such calls are detected and rejected with [`CoreError::Busy`] instead
//! of deadlocking. Distinct devices are fully independent.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

use log::debug;

use crate::callbacks::*;
use crate::dispatch;
use crate::error::{CoreError, Result};
use crate::framing::FrameDecoder;
use crate::message::encode;
use crate::msg_id;
use crate::types::*;

/// Which subsystem an outbound command configures; selects the response
/// callback slot its acknowledgement is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandCategory {
    Afe,
    Imu,
    Ppg,
    /// System commands, pairing, naming, idle time and sleep mode all
    /// acknowledge through the system response slot.
    System,
}

/// An encoded outbound command, ready to hand to the transport.
#[derive(Debug, Clone)]
pub struct EncodedCommand {
    pub msg_id: u32,
    pub bytes: Vec<u8>,
}

pub(crate) struct PendingCommand {
    pub category: CommandCategory,
}

/// Derived device state, written only by the dispatcher. Atomics so the
/// getters stay callable from anywhere, including inside callbacks fired
/// by the same feed call.
pub(crate) struct DeviceState {
    contact: AtomicU8,
    connectivity: AtomicU8,
    orientation: AtomicU8,
    working_mode: AtomicU8,
}

impl DeviceState {
    fn new() -> Self {
        Self {
            contact: AtomicU8::new(ContactState::Unknown.into()),
            connectivity: AtomicU8::new(Connectivity::Disconnected.into()),
            orientation: AtomicU8::new(Orientation::Unknown.into()),
            working_mode: AtomicU8::new(WorkingMode::Normal.into()),
        }
    }

    pub(crate) fn set_contact(&self, state: ContactState) {
        self.contact.store(state.into(), Ordering::SeqCst);
    }

    pub(crate) fn set_connectivity(&self, connectivity: Connectivity) {
        self.connectivity.store(connectivity.into(), Ordering::SeqCst);
    }

    pub(crate) fn set_orientation(&self, orientation: Orientation) {
        self.orientation.store(orientation.into(), Ordering::SeqCst);
    }

    pub(crate) fn set_working_mode(&self, mode: WorkingMode) {
        self.working_mode.store(mode.into(), Ordering::SeqCst);
    }

    fn reset(&self) {
        self.set_contact(ContactState::Unknown);
        self.set_connectivity(Connectivity::Disconnected);
        self.set_orientation(Orientation::Unknown);
        self.set_working_mode(WorkingMode::Normal);
    }
}

pub(crate) struct DeviceInner {
    pub(crate) decoder: FrameDecoder,
    pub(crate) callbacks: CallbackRegistry,
    pub(crate) pending: HashMap<u32, PendingCommand>,
}

impl DeviceInner {
    pub(crate) fn insert_pending(&mut self, msg_id: u32, category: CommandCategory) {
        msg_id::reserve(msg_id);
        self.pending.insert(msg_id, PendingCommand { category });
    }
}

/// Handle for one physical headset.
pub struct Device {
    id: String,
    state: DeviceState,
    inner: Mutex<DeviceInner>,
}

impl Device {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            state: DeviceState::new(),
            inner: Mutex::new(DeviceInner {
                decoder: FrameDecoder::new(),
                callbacks: CallbackRegistry::default(),
                pending: HashMap::new(),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, DeviceInner>> {
        // try_lock doubles as the reentrancy detector: a callback calling
        // back into the same device trips it on the calling thread.
        self.inner.try_lock().map_err(|_| CoreError::Busy)
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut DeviceInner) -> R) -> Result<R> {
        let mut inner = self.lock()?;
        Ok(f(&mut inner))
    }

    /// Feeds newly received transport bytes for this device.
    ///
    /// Every complete frame now buffered is decoded and dispatched, in
    /// arrival order, before the call returns. Returns the number of bytes
    /// still buffered awaiting more data (0 when fully drained). The input
    /// slice is copied, never retained. A zero-length input is a no-op
    /// returning the current remainder.
    ///
    /// On framing corruption the buffer is resynced to the next plausible
    /// frame start and [`CoreError::FramingCorruption`] is returned;
    /// frames extracted before the corrupt region have already been
    /// dispatched, and later feeds resume from the resynced position.
    pub fn feed(&self, data: &[u8]) -> Result<usize> {
        let mut inner = self.lock()?;
        if data.is_empty() {
            return Ok(inner.decoder.buffered());
        }
        inner.decoder.extend(data);
        loop {
            match inner.decoder.next_frame() {
                Ok(Some(frame)) => {
                    dispatch::dispatch_frame(&self.id, &self.state, &mut inner, &frame)
                }
                Ok(None) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(inner.decoder.buffered())
    }

    /// Transport-level disconnect hook.
    ///
    /// Cancels every pending command for this device without invoking its
    /// response callback, discards the reassembly buffer, resets derived
    /// state, then fires the connectivity callback with `Disconnected`.
    /// Registered callbacks survive disconnect.
    pub fn disconnected(&self) -> Result<()> {
        let mut inner = self.lock()?;
        let cancelled = inner.pending.len();
        for &id in inner.pending.keys() {
            msg_id::release(id);
        }
        inner.pending.clear();
        inner.decoder.clear();
        self.state.reset();
        if cancelled > 0 {
            debug!("{}: cancelled {cancelled} pending command(s) on disconnect", self.id);
        }
        if let Some(cb) = inner.callbacks.connectivity.as_mut() {
            cb(&self.id, Connectivity::Disconnected);
        }
        Ok(())
    }

    // ---- State getters (lock-free, callable from callbacks) ----

    pub fn contact_state(&self) -> ContactState {
        ContactState::from_wire(self.state.contact.load(Ordering::SeqCst))
            .unwrap_or(ContactState::Unknown)
    }

    pub fn connectivity(&self) -> Connectivity {
        Connectivity::from_wire(self.state.connectivity.load(Ordering::SeqCst))
            .unwrap_or(Connectivity::Disconnected)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_wire(self.state.orientation.load(Ordering::SeqCst))
            .unwrap_or(Orientation::Unknown)
    }

    pub fn working_mode(&self) -> WorkingMode {
        WorkingMode::from_wire(self.state.working_mode.load(Ordering::SeqCst))
            .unwrap_or(WorkingMode::Normal)
    }

    /// Number of commands awaiting a response.
    pub fn pending_commands(&self) -> Result<usize> {
        self.with_inner(|inner| inner.pending.len())
    }

    /// Registers an already-encoded command for response correlation. Call
    /// once the buffer from one of the pure `message::encode` packers has
    /// actually been handed to the transport; the `config_*` convenience
    /// operations below do this for you.
    pub fn register_pending(&self, msg_id: u32, category: CommandCategory) -> Result<()> {
        self.with_inner(|inner| inner.insert_pending(msg_id, category))
    }

    // ---- Callback registration (replace-on-conflict) ----

    pub fn set_contact_state_callback(&self, cb: ContactStateCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.contact_state = Some(cb))
    }

    pub fn set_signal_quality_callback(&self, cb: SignalQualityCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.signal_quality = Some(cb))
    }

    pub fn set_error_callback(&self, cb: ErrorCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.error = Some(cb))
    }

    pub fn set_eeg_data_callback(&self, cb: EegDataCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.eeg_data = Some(cb))
    }

    pub fn set_eeg_stats_callback(&self, cb: EegStatsCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.eeg_stats = Some(cb))
    }

    pub fn set_imu_data_callback(&self, cb: ImuDataCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.imu_data = Some(cb))
    }

    pub fn set_ppg_data_callback(&self, cb: PpgDataCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.ppg_data = Some(cb))
    }

    pub fn set_orientation_callback(&self, cb: OrientationCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.orientation = Some(cb))
    }

    pub fn set_connectivity_callback(&self, cb: ConnectivityCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.connectivity = Some(cb))
    }

    pub fn set_attention_callback(&self, cb: ValueCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.attention = Some(cb))
    }

    pub fn set_meditation_callback(&self, cb: ValueCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.meditation = Some(cb))
    }

    pub fn set_stress_callback(&self, cb: ValueCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.stress = Some(cb))
    }

    pub fn set_sleep_stage_callback(&self, cb: SleepStageCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.sleep_stage = Some(cb))
    }

    pub fn set_event_callback(&self, cb: EventCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.event = Some(cb))
    }

    pub fn set_sleep_report_callback(&self, cb: SleepReportCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.sleep_report = Some(cb))
    }

    pub fn set_blink_callback(&self, cb: BlinkCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.blink = Some(cb))
    }

    pub fn set_afe_config_resp_callback(&self, cb: ConfigResponseCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.afe_config_resp = Some(cb))
    }

    pub fn set_imu_config_resp_callback(&self, cb: ConfigResponseCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.imu_config_resp = Some(cb))
    }

    pub fn set_ppg_config_resp_callback(&self, cb: ConfigResponseCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.ppg_config_resp = Some(cb))
    }

    pub fn set_sys_config_resp_callback(&self, cb: ConfigResponseCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.sys_config_resp = Some(cb))
    }

    pub fn set_sys_info_callback(&self, cb: SysInfoCallback) -> Result<()> {
        self.with_inner(|i| i.callbacks.sys_info = Some(cb))
    }

    // ---- Convenience command operations ----
    //
    // Each generates a fresh message ID, encodes the command, installs the
    // response callback for its category and registers the pending entry,
    // then returns the encoded buffer for the caller to transmit.

    pub fn config_afe(
        &self,
        sample_rate: EegSampleRate,
        cb: ConfigResponseCallback,
    ) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::afe_config(msg_id, sample_rate)?;
        inner.callbacks.afe_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::Afe);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn config_imu(
        &self,
        sample_rate: ImuSampleRate,
        mode: ImuMode,
        cb: ConfigResponseCallback,
    ) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::imu_config(msg_id, sample_rate, mode)?;
        inner.callbacks.imu_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::Imu);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn config_ppg(
        &self,
        report_rate: PpgReportRate,
        mode: PpgMode,
        raw_reg: u8,
        raw_value: u8,
        cb: ConfigResponseCallback,
    ) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::ppg_config(msg_id, report_rate, mode, raw_reg, raw_value)?;
        inner.callbacks.ppg_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::Ppg);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn sys_cmd(&self, cmd: ConfigCmd, cb: ConfigResponseCallback) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::sys_cmd(msg_id, cmd)?;
        inner.callbacks.sys_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn pair(
        &self,
        first: bool,
        pair_info: &str,
        cb: ConfigResponseCallback,
    ) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::pair(msg_id, first, pair_info)?;
        inner.callbacks.sys_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn set_device_name(&self, name: &str, cb: ConfigResponseCallback) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::device_name(msg_id, name)?;
        inner.callbacks.sys_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn set_sleep_idle_time(&self, secs: u32, cb: ConfigResponseCallback) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::sleep_idle_time(msg_id, secs)?;
        inner.callbacks.sys_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }

    pub fn set_sleep_mode(&self, enabled: bool, cb: ConfigResponseCallback) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::sleep_mode(msg_id, enabled)?;
        inner.callbacks.sys_config_resp = Some(cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }

    /// Queries the system monitor: the ack arrives through `resp_cb`, the
    /// report itself through `info_cb` carrying the echoed message ID.
    pub fn request_sys_info(
        &self,
        resp_cb: ConfigResponseCallback,
        info_cb: SysInfoCallback,
    ) -> Result<EncodedCommand> {
        let mut inner = self.lock()?;
        let msg_id = msg_id::next_msg_id();
        let bytes = encode::sys_cmd(msg_id, ConfigCmd::GetSystemMonitor)?;
        inner.callbacks.sys_config_resp = Some(resp_cb);
        inner.callbacks.sys_info = Some(info_cb);
        inner.insert_pending(msg_id, CommandCategory::System);
        Ok(EncodedCommand { msg_id, bytes })
    }
}

//! Communication core for a wearable EEG/IMU/PPG headset.
//!
//! Turns the raw byte stream arriving from an unreliable, fragment-prone
//! transport (BLE) into typed, validated protocol messages: reassembles
//! frames split across transport packets, routes decoded sensor and event
//! messages to per-device subscriber callbacks, and correlates outbound
//! configuration commands with their asynchronous responses.
//!
//! The core is purely reactive: no internal threads, no blocking. Feed it
//! bytes with [`Device::feed`] from your transport's receive path, hand
//! the buffers returned by the `config_*` operations to your transport's
//! send path, and call [`Device::disconnected`] when the link drops.
//! Entry points for one device must not be invoked concurrently or from
//! within that device's own callbacks; such calls return
//! [`CoreError::Busy`]. Distinct devices are independent.
//!
//! ```no_run
//! use neuroband::types::EegSampleRate;
//!
//! let device = neuroband::obtain("C8:3A:11:22:33:44");
//! device
//!     .set_eeg_data_callback(Box::new(|id, data| {
//!         println!("{id}: {} EEG samples @ {} Hz", data.samples.len(), data.sample_rate);
//!     }))
//!     .unwrap();
//!
//! let cmd = device
//!     .config_afe(
//!         EegSampleRate::Hz256,
//!         Box::new(|id, msg_id, resp| {
//!             println!("{id}: config {msg_id} success={}", resp.success);
//!         }),
//!     )
//!     .unwrap();
//! // transport.write(&cmd.bytes);
//! // ... for every received chunk:
//! // device.feed(&chunk)?;
//! ```

pub mod callbacks;
pub mod device;
pub mod error;
pub mod framing;
pub mod message;
pub mod msg_id;
pub mod registry;
pub mod types;

mod dispatch;

pub use device::{CommandCategory, Device, EncodedCommand};
pub use error::{CodecError, CoreError, Result, error_message};
pub use framing::{Frame, FrameDecoder};
pub use message::Message;
pub use msg_id::next_msg_id;
pub use registry::{get, obtain};

/// Version string of this crate.
pub fn sdk_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

use thiserror::Error;

/// Errors returned by the public device API.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
    #[error("unknown device: {0}")]
    InvalidDevice(String),
    #[error("framing corruption: dropped {dropped} bytes while resyncing")]
    FramingCorruption { dropped: usize },
    #[error("device is busy (concurrent or reentrant call)")]
    Busy,
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while decoding a frame payload.
///
/// These never cross the feed boundary: a payload that fails to decode
/// drops that one frame and the stream continues at the next frame.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of payload")]
    UnexpectedEof,
    #[error("invalid value {value} for {field}")]
    InvalidValue { field: &'static str, value: i64 },
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    #[error("unknown message type 0x{0:02x}")]
    UnknownMessageType(u8),
}

/// Device-reported error codes, as carried by error notification frames.
pub mod code {
    pub const NONE: i32 = 0;
    pub const UNKNOWN: i32 = -1;
    pub const INVALID_PARAMS: i32 = -2;
    pub const INVALID_DATA: i32 = -3;
    pub const SYSTEM_BUSY: i32 = -11;
    pub const BLE_DEVICE_UNREACHABLE: i32 = -128;
    pub const BLE_DISABLED: i32 = -129;
    pub const BLE_UNAVAILABLE: i32 = -130;
    pub const BLE_DATA_WRITE_FAILURE: i32 = -131;
    pub const DEVICE_NOT_CONNECTED: i32 = -160;
    pub const DEVICE_UUID_UNAVAILABLE: i32 = -196;
    pub const EEG_INIT: i32 = -1002;
    pub const IMU_INIT: i32 = -1003;
    pub const PPG_INIT: i32 = -1004;
    pub const BATTERY_VOLTAGE: i32 = -1005;
    pub const BATTERY_TEMPERATURE: i32 = -1006;
    pub const HARDWARE_VERSION: i32 = -1007;
    pub const FLASH_INIT: i32 = -1008;
    pub const BLE_INIT: i32 = -1009;
}

/// Human-readable text for a device-reported error code.
pub fn error_message(error_code: i32) -> &'static str {
    match error_code {
        code::NONE => "no error",
        code::UNKNOWN => "unknown error",
        code::INVALID_PARAMS => "invalid parameters",
        code::INVALID_DATA => "invalid data",
        code::SYSTEM_BUSY => "system is busy",
        code::BLE_DEVICE_UNREACHABLE => "BLE device unreachable",
        code::BLE_DISABLED => "bluetooth is disabled",
        code::BLE_UNAVAILABLE => "bluetooth is unavailable",
        code::BLE_DATA_WRITE_FAILURE => "BLE data write failure",
        code::DEVICE_NOT_CONNECTED => "device is not connected",
        code::DEVICE_UUID_UNAVAILABLE => "device UUID unavailable",
        code::EEG_INIT => "EEG subsystem failed to initialize",
        code::IMU_INIT => "IMU subsystem failed to initialize",
        code::PPG_INIT => "PPG subsystem failed to initialize",
        code::BATTERY_VOLTAGE => "abnormal battery voltage",
        code::BATTERY_TEMPERATURE => "abnormal battery temperature",
        code::HARDWARE_VERSION => "hardware version mismatch",
        code::FLASH_INIT => "flash storage failed to initialize",
        code::BLE_INIT => "BLE subsystem failed to initialize",
        _ => "unrecognized error code",
    }
}

//! Device-recognized enumerations, mirroring the headset firmware's
//! vocabulary. Every enum carries its wire representation; `from_wire`
//! returns `None` for values this build does not know about, which callers
//! treat as forward-compatible (skip, don't fail the stream).

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident : $repr:ty { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr($repr)]
        pub enum $name {
            $($variant = $value,)+
        }

        impl $name {
            pub fn from_wire(value: $repr) -> Option<Self> {
                $(if value == $value { return Some(Self::$variant); })+
                None
            }
        }

        impl From<$name> for $repr {
            fn from(v: $name) -> $repr {
                v as $repr
            }
        }
    };
}

wire_enum! {
    /// Sensor-to-skin contact classification for the whole headset.
    ContactState: u8 {
        Unknown = 0,
        Off = 1,
        Eeg = 2,
        All = 3,
    }
}

wire_enum! {
    /// PPG optical sensor contact classification.
    PpgContactState: u8 {
        Unknown = 0,
        OffSkin = 1,
        OnSomeObject = 2,
        OnSkin = 3,
    }
}

wire_enum! {
    WorkingMode: u8 {
        Normal = 0,
        Sleep = 1,
    }
}

wire_enum! {
    Orientation: u8 {
        Unknown = 0,
        Upward = 1,
        Downward = 2,
    }
}

wire_enum! {
    Connectivity: u8 {
        Connecting = 0,
        Connected = 1,
        Disconnecting = 2,
        Disconnected = 3,
    }
}

wire_enum! {
    SleepStage: i8 {
        Unknown = -1,
        Awake = 0,
        Rem = 1,
        Light = 2,
        Deep = 3,
    }
}

wire_enum! {
    /// Discrete events reported by the on-device algorithms.
    HeadsetEvent: u8 {
        FallAsleep = 1,
        WakeUp = 2,
        Blink = 3,
    }
}

wire_enum! {
    /// EEG analog front-end sample rate. `None` is a placeholder, never a
    /// valid configuration value; `Off` disables the stream.
    EegSampleRate: u8 {
        None = 0,
        Off = 1,
        Hz128 = 2,
        Hz256 = 3,
    }
}

wire_enum! {
    ImuSampleRate: u8 {
        None = 0,
        Off = 1,
        Hz25 = 2,
        Hz50 = 3,
        Hz100 = 4,
        Hz200 = 5,
        Hz400 = 6,
        Hz800 = 7,
    }
}

wire_enum! {
    ImuMode: u8 {
        None = 0,
        Acc = 1,
        Gyro = 2,
        AccGyro = 3,
        Euler = 4,
    }
}

wire_enum! {
    PpgReportRate: u8 {
        None = 0,
        Off = 1,
        Hz1 = 2,
        Hz5 = 3,
        Hz25 = 4,
        Hz50 = 5,
        Hz100 = 6,
    }
}

wire_enum! {
    PpgMode: u8 {
        None = 0,
        RawData = 1,
        Algo = 2,
        Spo2 = 3,
        Hr = 4,
        Hrv = 5,
    }
}

wire_enum! {
    /// System command sub-codes carried by a system command frame.
    ConfigCmd: u8 {
        Pair = 1,
        ValidatePairInfo = 2,
        Start = 3,
        Stop = 4,
        ShutDown = 5,
        EnterOta = 6,
        Reset = 7,
        SetDeviceName = 8,
        SetSleepIdleTime = 9,
        GetSystemMonitor = 10,
    }
}

wire_enum! {
    HeadRotation: u8 {
        Invalid = 0,
        Left = 1,
        Right = 2,
        FaceUp = 3,
        FaceDown = 4,
    }
}

wire_enum! {
    BodyPose: u8 {
        Invalid = 0,
        OnBack = 1,
        Seated = 2,
        LeanForward = 3,
        OnStomach = 4,
    }
}

wire_enum! {
    PpgActivity: u8 {
        Rest = 0,
        Other = 1,
        Walk = 2,
        Run = 3,
        Bike = 4,
    }
}

wire_enum! {
    Spo2State: u8 {
        AdjustingLed = 0,
        Computing = 1,
        Success = 2,
        Timeout = 3,
    }
}

wire_enum! {
    RespiratoryState: u8 {
        Rest = 0,
        In = 1,
        Out = 2,
    }
}

wire_enum! {
    /// Hardware fault codes listed in a system info report.
    HardwareError: u8 {
        None = 0,
        Unknown = 1,
        Eeg = 2,
        Imu = 3,
        Mag = 4,
        BatteryVoltage = 5,
    }
}

//! Command catalog for the GMC protocol.
//!
//! Each command is an ASCII mnemonic, optionally followed by raw payload
//! bytes, and declares the shape of the reply the device sends back.

use bytes::Bytes;

use crate::protocol::frame;
use crate::protocol::response::{NumericFormat, ResponseShape};

/// Binary command mnemonics understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    // Telemetry
    /// Firmware model and version string.
    GetVer,
    /// Counts per minute.
    GetCpm,
    /// Counts per second.
    GetCps,
    /// Counts per minute, low-dose tube.
    GetCpml,
    /// Counts per minute, high-dose tube.
    GetCpmh,
    /// Counts per second, low-dose tube.
    GetCpsl,
    /// Counts per second, high-dose tube.
    GetCpsh,
    /// Battery voltage.
    GetVolt,
    /// Serial number (7 raw bytes).
    GetSerial,
    /// Gyroscope x/y/z.
    GetGyro,
    /// Temperature (undocumented encoding).
    GetTemp,

    // Configuration
    /// Read the configuration record.
    GetCfg,
    /// Erase the configuration record.
    ECfg,
    /// Write one configuration byte (`address:u16 BE`, `value:u8`).
    WCfg,
    /// Apply the written configuration.
    CfgUpdate,

    // Clock
    /// Read date and time (six raw bytes).
    GetDateTime,
    /// Set date and time (six raw bytes).
    SetDateTime,
    /// Set the year (offset from 2000).
    SetDateYy,
    /// Set the month.
    SetDateMm,
    /// Set the day of month.
    SetDateDd,
    /// Set the hour.
    SetTimeHh,
    /// Set the minute.
    SetTimeMm,
    /// Set the second.
    SetTimeSs,

    // Toggles
    /// Alarm on.
    AlarmOn,
    /// Alarm off.
    AlarmOff,
    /// Speaker on.
    SpeakerOn,
    /// Speaker off.
    SpeakerOff,
    /// Wi-Fi on.
    WifiOn,
    /// Wi-Fi off.
    WifiOff,

    // Wi-Fi credentials
    /// Set the network name.
    SetSsid,
    /// Set the network password.
    SetWifiPassword,

    // Maintenance
    /// Restore factory settings.
    FactoryReset,
    /// Power on.
    PowerOn,
    /// Power off.
    PowerOff,
    /// Reboot.
    Reboot,
}

impl Mnemonic {
    /// Wire bytes of the mnemonic.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::GetVer => b"GETVER",
            Self::GetCpm => b"GETCPM",
            Self::GetCps => b"GETCPS",
            Self::GetCpml => b"GETCPML",
            Self::GetCpmh => b"GETCPMH",
            Self::GetCpsl => b"GETCPSL",
            Self::GetCpsh => b"GETCPSH",
            Self::GetVolt => b"GETVOLT",
            Self::GetSerial => b"GETSERIAL",
            Self::GetGyro => b"GETGYRO",
            Self::GetTemp => b"GETTEMP",
            Self::GetCfg => b"GETCFG",
            Self::ECfg => b"ECFG",
            Self::WCfg => b"WCFG",
            Self::CfgUpdate => b"CFGUPDATE",
            Self::GetDateTime => b"GETDATETIME",
            Self::SetDateTime => b"SETDATETIME",
            Self::SetDateYy => b"SETDATEYY",
            Self::SetDateMm => b"SETDATEMM",
            Self::SetDateDd => b"SETDATEDD",
            Self::SetTimeHh => b"SETTIMEHH",
            Self::SetTimeMm => b"SETTIMEMM",
            Self::SetTimeSs => b"SETTIMESS",
            Self::AlarmOn => b"ALARM1",
            Self::AlarmOff => b"ALARM0",
            Self::SpeakerOn => b"SPEAKER1",
            Self::SpeakerOff => b"SPEAKER0",
            Self::WifiOn => b"WiFiON",
            Self::WifiOff => b"WiFiOFF",
            Self::SetSsid => b"SETSSID",
            Self::SetWifiPassword => b"SETWIFIPW",
            Self::FactoryReset => b"FACTORYRESET",
            Self::PowerOn => b"POWERON",
            Self::PowerOff => b"POWEROFF",
            Self::Reboot => b"REBOOT",
        }
    }

    /// Shape of the reply the device sends for this command.
    #[must_use]
    pub const fn reply(self) -> ResponseShape {
        match self {
            Self::GetVer => ResponseShape::Ascii,
            Self::GetCpm
            | Self::GetCps
            | Self::GetCpml
            | Self::GetCpmh
            | Self::GetCpsl
            | Self::GetCpsh => ResponseShape::Numeric(NumericFormat::U32),
            Self::GetVolt => ResponseShape::Voltage,
            Self::GetGyro => ResponseShape::Numeric(NumericFormat::GYRO),
            Self::GetSerial | Self::GetTemp | Self::GetCfg | Self::GetDateTime => {
                ResponseShape::Bytes
            }
            Self::ECfg
            | Self::WCfg
            | Self::CfgUpdate
            | Self::SetDateTime
            | Self::SetDateYy
            | Self::SetDateMm
            | Self::SetDateDd
            | Self::SetTimeHh
            | Self::SetTimeMm
            | Self::SetTimeSs
            | Self::AlarmOn
            | Self::AlarmOff
            | Self::SpeakerOn
            | Self::SpeakerOff
            | Self::WifiOn
            | Self::WifiOff
            | Self::SetSsid
            | Self::SetWifiPassword
            | Self::FactoryReset => ResponseShape::Ack,
            // The device may cut the link before answering.
            Self::PowerOn | Self::PowerOff | Self::Reboot => ResponseShape::Optional,
        }
    }

    /// Mnemonic as text, for logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        std::str::from_utf8(self.as_bytes()).unwrap_or("?")
    }
}

/// An immutable command: mnemonic plus optional payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    mnemonic: Mnemonic,
    payload: Bytes,
}

impl Command {
    /// Creates a command without payload.
    #[must_use]
    pub const fn new(mnemonic: Mnemonic) -> Self {
        Self {
            mnemonic,
            payload: Bytes::new(),
        }
    }

    /// Creates a command carrying `payload` after the mnemonic.
    #[must_use]
    pub fn with_payload(mnemonic: Mnemonic, payload: impl Into<Bytes>) -> Self {
        Self {
            mnemonic,
            payload: payload.into(),
        }
    }

    /// Patch write of one configuration byte.
    #[must_use]
    pub fn write_config_byte(address: u16, value: u8) -> Self {
        let [hi, lo] = address.to_be_bytes();
        Self::with_payload(Mnemonic::WCfg, vec![hi, lo, value])
    }

    /// Returns the mnemonic.
    #[must_use]
    pub const fn mnemonic(&self) -> Mnemonic {
        self.mnemonic
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Frames the command for the wire.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        frame::encode(self.mnemonic.as_bytes(), &self.payload)
    }
}

impl From<Mnemonic> for Command {
    fn from(mnemonic: Mnemonic) -> Self {
        Self::new(mnemonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonic_bytes() {
        assert_eq!(Mnemonic::GetVer.as_bytes(), b"GETVER");
        assert_eq!(Mnemonic::WifiOn.as_bytes(), b"WiFiON");
        assert_eq!(Mnemonic::SetWifiPassword.as_bytes(), b"SETWIFIPW");
        assert_eq!(Mnemonic::SetTimeSs.name(), "SETTIMESS");
    }

    #[test]
    fn test_catalog_shapes() {
        assert_eq!(Mnemonic::AlarmOn.reply(), ResponseShape::Ack);
        assert_eq!(Mnemonic::Reboot.reply(), ResponseShape::Optional);
        assert_eq!(Mnemonic::GetTemp.reply(), ResponseShape::Bytes);
        assert_eq!(
            Mnemonic::GetCpsh.reply(),
            ResponseShape::Numeric(NumericFormat::U32)
        );
    }

    #[test]
    fn test_write_config_byte_frame() {
        let cmd = Command::write_config_byte(0x0102, 0x7F);
        assert_eq!(&cmd.encode()[..], b"<WCFG\x01\x02\x7F>>");
    }

    #[test]
    fn test_command_from_mnemonic() {
        let cmd: Command = Mnemonic::GetCpm.into();
        assert!(cmd.payload().is_empty());
        assert_eq!(&cmd.encode()[..], b"<GETCPM>>");
    }
}

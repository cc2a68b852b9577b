//! Wi-Fi module types.

use crate::error::{Error, Result};

/// Access-point encryption method reported by `AT+CWLAP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EncryptionMethod {
    /// No encryption.
    Open = 0,
    /// WEP.
    Wep = 1,
    /// WPA-PSK.
    WpaPsk = 2,
    /// WPA2-PSK.
    Wpa2Psk = 3,
    /// Mixed WPA/WPA2-PSK.
    WpaWpa2Psk = 4,
    /// WPA2-Enterprise.
    Wpa2Enterprise = 5,
    /// WPA3-PSK.
    Wpa3Psk = 6,
    /// Mixed WPA2/WPA3-PSK.
    Wpa2Wpa3Psk = 7,
    /// WAPI-PSK.
    WapiPsk = 8,
}

impl EncryptionMethod {
    /// Parses the numeric code as sent by the module.
    pub fn from_code(code: i64) -> Result<Self> {
        Ok(match code {
            0 => Self::Open,
            1 => Self::Wep,
            2 => Self::WpaPsk,
            3 => Self::Wpa2Psk,
            4 => Self::WpaWpa2Psk,
            5 => Self::Wpa2Enterprise,
            6 => Self::Wpa3Psk,
            7 => Self::Wpa2Wpa3Psk,
            8 => Self::WapiPsk,
            _ => return Err(Error::UnknownEncryptionMethod { code }),
        })
    }
}

impl From<EncryptionMethod> for u8 {
    fn from(method: EncryptionMethod) -> Self {
        method as Self
    }
}

/// One network from an access-point scan.
///
/// Fields after the network name are kept as the text the module sent;
/// firmware revisions differ in how many trailing fields they report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPoint {
    /// Encryption method.
    pub encryption: EncryptionMethod,
    /// Network name.
    pub ssid: String,
    /// Signal strength in dBm.
    pub rssi: Option<String>,
    /// Hardware address of the access point.
    pub mac: Option<String>,
    /// Radio channel.
    pub channel: Option<String>,
    /// Frequency offset.
    pub freq_offset: Option<String>,
    /// Frequency calibration value.
    pub freqcal_val: Option<String>,
    /// Pairwise cipher.
    pub pairwise_cipher: Option<String>,
    /// Group cipher.
    pub group_cipher: Option<String>,
    /// 802.11 b/g/n mode bits.
    pub bgn: Option<String>,
    /// WPS flag.
    pub wps: Option<String>,
}

impl AccessPoint {
    /// Signal strength as a number.
    #[must_use]
    pub fn rssi_dbm(&self) -> Option<i32> {
        self.rssi.as_deref().and_then(|s| s.parse().ok())
    }

    /// Channel as a number.
    #[must_use]
    pub fn channel_number(&self) -> Option<u8> {
        self.channel.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Current association reported by `AT+CWJAP?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiStatus {
    /// Network name.
    pub ssid: String,
    /// Hardware address of the access point.
    pub bssid: Option<String>,
    /// Radio channel.
    pub channel: Option<String>,
    /// Signal strength in dBm.
    pub rssi: Option<String>,
    /// PCI authentication flag.
    pub pci_en: Option<String>,
    /// Reconnect interval.
    pub reconn_interval: Option<String>,
    /// Listen interval.
    pub listen_interval: Option<String>,
    /// Scan mode.
    pub scan_mode: Option<String>,
    /// Protected management frames.
    pub pmf: Option<String>,
}

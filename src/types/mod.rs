//! Data types for GMC readings and Wi-Fi records.

pub mod device;
pub mod wifi;

pub use device::{Counter, DeviceDateTime, Gyro};
pub use wifi::{AccessPoint, EncryptionMethod, WifiStatus};

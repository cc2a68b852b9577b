//! Device readings and clock types.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Error, Result};
use crate::protocol::Mnemonic;

/// First year representable on the device clock.
pub const EPOCH_YEAR: i32 = 2000;

/// Counter readings that can be polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Counts per minute.
    Cpm,
    /// Counts per second.
    Cps,
    /// Counts per minute, low-dose tube.
    CpmLow,
    /// Counts per minute, high-dose tube.
    CpmHigh,
    /// Counts per second, low-dose tube.
    CpsLow,
    /// Counts per second, high-dose tube.
    CpsHigh,
}

impl Counter {
    /// Command that reads this counter.
    #[must_use]
    pub const fn mnemonic(self) -> Mnemonic {
        match self {
            Self::Cpm => Mnemonic::GetCpm,
            Self::Cps => Mnemonic::GetCps,
            Self::CpmLow => Mnemonic::GetCpml,
            Self::CpmHigh => Mnemonic::GetCpmh,
            Self::CpsLow => Mnemonic::GetCpsl,
            Self::CpsHigh => Mnemonic::GetCpsh,
        }
    }
}

/// Gyroscope reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gyro {
    /// X axis.
    pub x: u16,
    /// Y axis.
    pub y: u16,
    /// Z axis.
    pub z: u16,
}

/// Device clock value.
///
/// On the wire each component is one raw byte holding the number itself
/// (not BCD, not ASCII); the year byte is an offset from 2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceDateTime {
    /// Year offset from 2000.
    pub year: u8,
    /// Month (1-12).
    pub month: u8,
    /// Day of month.
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute.
    pub minute: u8,
    /// Second.
    pub second: u8,
}

impl DeviceDateTime {
    /// Wire length.
    pub const LEN: usize = 6;

    /// Parses the first six bytes of a `GETDATETIME` reply.
    ///
    /// Some firmware appends the acknowledgement byte; it is ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let Some(&[year, month, day, hour, minute, second]) = data.first_chunk::<6>() else {
            return Err(Error::LengthMismatch {
                expected: Self::LEN,
                actual: data.len(),
            });
        };
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Wire encoding as sent with `SETDATETIME`.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }

    /// Full calendar year.
    #[must_use]
    pub fn full_year(self) -> i32 {
        EPOCH_YEAR + i32::from(self.year)
    }

    /// Converts to a calendar value, rejecting impossible dates.
    pub fn to_naive(self) -> Result<NaiveDateTime> {
        NaiveDate::from_ymd_opt(
            self.full_year(),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or_else(|| Error::InvalidDateTime {
            reason: format!("device clock holds {self:?}"),
        })
    }
}

impl TryFrom<NaiveDateTime> for DeviceDateTime {
    type Error = Error;

    fn try_from(value: NaiveDateTime) -> Result<Self> {
        let year = u8::try_from(value.year() - EPOCH_YEAR).map_err(|_| Error::InvalidDateTime {
            reason: format!("year {} outside 2000..=2255", value.year()),
        })?;
        // The remaining components are bounded by chrono and fit in a byte.
        Ok(Self {
            year,
            month: value.month() as u8,
            day: value.day() as u8,
            hour: value.hour() as u8,
            minute: value.minute() as u8,
            second: value.second() as u8,
        })
    }
}

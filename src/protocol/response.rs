//! Reply decoding.
//!
//! Every command declares the shape of its reply. The raw bytes are
//! interpreted against that shape and anything that does not fit is an
//! error rather than a best-effort value.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::protocol::frame::ACK;

/// One slot of a fixed-width numeric reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Big-endian unsigned integer of 1 to 4 bytes.
    Int(usize),
    /// Bytes that are present on the wire but carry nothing.
    Pad(usize),
}

impl Slot {
    const fn width(self) -> usize {
        match self {
            Self::Int(w) | Self::Pad(w) => w,
        }
    }
}

/// Declared layout of a fixed-width numeric reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFormat(pub &'static [Slot]);

impl NumericFormat {
    /// One big-endian u32.
    pub const U32: Self = Self(&[Slot::Int(4)]);

    /// One byte.
    pub const U8: Self = Self(&[Slot::Int(1)]);

    /// Three big-endian u16 followed by one unused byte.
    pub const GYRO: Self = Self(&[Slot::Int(2), Slot::Int(2), Slot::Int(2), Slot::Pad(1)]);

    /// Total number of bytes the reply must contain.
    #[must_use]
    pub const fn width(&self) -> usize {
        let mut total = 0;
        let mut i = 0;
        while i < self.0.len() {
            total += self.0[i].width();
            i += 1;
        }
        total
    }

    /// Number of integer values the format yields.
    #[must_use]
    pub fn values(&self) -> usize {
        self.0.iter().filter(|s| matches!(s, Slot::Int(_))).count()
    }
}

/// Expected shape of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Anything, including nothing (the device may drop the link first).
    Optional,
    /// Opaque bytes; at least one must arrive.
    Bytes,
    /// 7-bit ASCII text.
    Ascii,
    /// Fixed-width big-endian integers.
    Numeric(NumericFormat),
    /// ASCII decimal terminated by a sentinel byte.
    Voltage,
    /// The single acknowledgement byte.
    Ack,
}

impl ResponseShape {
    /// Returns true if an empty reply is acceptable.
    #[must_use]
    pub const fn allows_silence(&self) -> bool {
        matches!(self, Self::Optional)
    }
}

/// A decoded reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Whatever came back from a command whose reply is not enforced.
    Raw(Bytes),
    /// Opaque bytes.
    Bytes(Bytes),
    /// ASCII text.
    Text(String),
    /// Single-value numeric reply.
    Scalar(u32),
    /// Multi-value numeric reply.
    Tuple(Vec<u32>),
    /// Battery voltage in volts.
    Voltage(f32),
    /// Command accepted.
    Ack,
}

impl Reply {
    fn unexpected(&self, wanted: &str) -> Error {
        Error::Protocol {
            message: format!("expected {wanted} reply, decoded {self:?}"),
        }
    }

    /// Returns the bytes of a `Bytes` or `Raw` reply.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Self::Bytes(b) | Self::Raw(b) => Ok(b),
            other => Err(other.unexpected("byte")),
        }
    }

    /// Returns the text of a `Text` reply.
    pub fn into_text(self) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s),
            other => Err(other.unexpected("text")),
        }
    }

    /// Returns the value of a `Scalar` reply.
    pub fn into_scalar(self) -> Result<u32> {
        match self {
            Self::Scalar(v) => Ok(v),
            other => Err(other.unexpected("scalar")),
        }
    }

    /// Returns the values of a `Tuple` reply.
    pub fn into_tuple(self) -> Result<Vec<u32>> {
        match self {
            Self::Tuple(v) => Ok(v),
            other => Err(other.unexpected("tuple")),
        }
    }

    /// Returns the voltage of a `Voltage` reply.
    pub fn into_voltage(self) -> Result<f32> {
        match self {
            Self::Voltage(v) => Ok(v),
            other => Err(other.unexpected("voltage")),
        }
    }
}

/// Decodes `data` according to `shape`.
///
/// Callers are expected to have rejected an empty reply for shapes that
/// require content; here an empty buffer is simply malformed.
pub fn decode(shape: ResponseShape, data: Bytes) -> Result<Reply> {
    match shape {
        ResponseShape::Optional => Ok(Reply::Raw(data)),
        ResponseShape::Bytes => Ok(Reply::Bytes(data)),
        ResponseShape::Ascii => decode_ascii(&data, true).map(Reply::Text),
        ResponseShape::Numeric(format) => {
            let mut values = decode_numeric(&data, format)?;
            if values.len() == 1 {
                Ok(Reply::Scalar(values.remove(0)))
            } else {
                Ok(Reply::Tuple(values))
            }
        }
        ResponseShape::Voltage => decode_voltage(&data).map(Reply::Voltage),
        ResponseShape::Ack => {
            expect_ack(data)?;
            Ok(Reply::Ack)
        }
    }
}

/// Decodes 7-bit ASCII.
///
/// In strict mode a byte >= 0x80 is an [`Error::Encoding`]; otherwise it
/// becomes U+FFFD.
pub fn decode_ascii(data: &[u8], strict: bool) -> Result<String> {
    if let Some(position) = data.iter().position(|b| !b.is_ascii()).filter(|_| strict) {
        return Err(Error::Encoding {
            position,
            byte: data[position],
        });
    }
    Ok(data
        .iter()
        .map(|&b| {
            if b.is_ascii() {
                char::from(b)
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect())
}

/// Unpacks big-endian integers according to `format`.
pub fn decode_numeric(data: &[u8], format: NumericFormat) -> Result<Vec<u32>> {
    if data.len() != format.width() {
        return Err(Error::LengthMismatch {
            expected: format.width(),
            actual: data.len(),
        });
    }

    let mut values = Vec::with_capacity(format.values());
    let mut offset = 0;
    for slot in format.0 {
        if let Slot::Int(width) = *slot {
            values.push(be_uint(&data[offset..offset + width]));
        }
        offset += slot.width();
    }
    Ok(values)
}

/// Reads an unsigned big-endian integer of up to four bytes.
#[must_use]
pub fn be_uint(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Parses the `GETVOLT` reply.
///
/// The reply is ASCII digits followed by one sentinel byte, optionally
/// NUL-terminated. Everything from the first NUL is dropped, then the last
/// byte.
pub fn decode_voltage(data: &[u8]) -> Result<f32> {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let digits = data[..end]
        .split_last()
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let text = decode_ascii(digits, true)?;
    text.trim().parse::<f32>().map_err(|e| Error::Protocol {
        message: format!("invalid voltage reply {text:?}: {e}"),
    })
}

/// Requires `data` to be exactly the acknowledgement byte.
pub fn expect_ack(data: Bytes) -> Result<()> {
    expect_literal(&[ACK], data)
}

/// Requires `data` to equal `expected` byte for byte.
pub fn expect_literal(expected: &'static [u8], data: Bytes) -> Result<()> {
    if data[..] == *expected {
        Ok(())
    } else {
        Err(Error::ProtocolMismatch {
            expected: Bytes::from_static(expected),
            actual: data,
        })
    }
}

//! Device configuration record.
//!
//! The counter keeps its settings in a fixed-size block of flash that is
//! read whole with `GETCFG` and written back one byte at a time. A
//! [`Config`] is a plain value: it is decoded fresh on each read and
//! changed only by producing a new value with [`Config::with`].
//!
//! ```
//! use gmc::config::{Config, GMC_256};
//!
//! let config = Config::blank(&GMC_256)
//!     .with("alarm_cpm_value", 100u32)?
//!     .with("ssid", "HomeNet")?;
//! let record = config.encode()?;
//! assert_eq!(record.len(), 256);
//! # Ok::<(), gmc::ConfigError>(())
//! ```

pub mod codec;
pub mod layout;

use bytes::Bytes;

pub use layout::{FieldKind, FieldSpec, GMC_256, GMC_512, Layout};

use crate::error::ConfigError;

/// Value of one configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Unsigned integer.
    UInt(u32),
    /// ASCII text without padding.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Filler; carries no value.
    Reserved,
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::UInt(v)
    }
}

impl From<u16> for FieldValue {
    fn from(v: u16) -> Self {
        Self::UInt(u32::from(v))
    }
}

impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        Self::UInt(u32::from(v))
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::UInt(u32::from(v))
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

/// A configuration value bound to its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    layout: &'static Layout,
    values: Vec<FieldValue>,
}

impl Config {
    pub(crate) fn from_parts(layout: &'static Layout, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(layout.fields.len(), values.len());
        Self { layout, values }
    }

    /// All integers zero, all text empty, all byte fields zeroed.
    #[must_use]
    pub fn blank(layout: &'static Layout) -> Self {
        let values = layout
            .fields
            .iter()
            .map(|f| match f.kind {
                FieldKind::UInt(_) => FieldValue::UInt(0),
                FieldKind::Text(_) => FieldValue::Text(String::new()),
                FieldKind::Bytes(w) => FieldValue::Bytes(vec![0; w]),
                FieldKind::Reserved { .. } => FieldValue::Reserved,
            })
            .collect();
        Self::from_parts(layout, values)
    }

    /// Decodes a record read from the device.
    pub fn decode(layout: &'static Layout, data: &[u8]) -> Result<Self, ConfigError> {
        codec::decode(layout, data)
    }

    /// Encodes this value into a record.
    pub fn encode(&self) -> Result<Bytes, ConfigError> {
        codec::encode(self)
    }

    /// Layout this value belongs to.
    #[must_use]
    pub const fn layout(&self) -> &'static Layout {
        self.layout
    }

    pub(crate) fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Value of the field called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let (index, _) = self.layout.field(name)?;
        self.values.get(index)
    }

    /// Integer value of the field called `name`.
    #[must_use]
    pub fn uint(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            FieldValue::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value of the field called `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Byte value of the field called `name`.
    #[must_use]
    pub fn bytes(&self, name: &str) -> Option<&[u8]> {
        match self.get(name)? {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns a copy with one field replaced.
    ///
    /// Widths are checked when the value is encoded.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self, ConfigError> {
        let (index, spec) = self
            .layout
            .field(name)
            .ok_or_else(|| ConfigError::UnknownField(name.to_owned()))?;
        let value = value.into();

        let matches = matches!(
            (spec.kind, &value),
            (FieldKind::UInt(_), FieldValue::UInt(_))
                | (FieldKind::Text(_), FieldValue::Text(_))
                | (FieldKind::Bytes(_), FieldValue::Bytes(_))
        );
        if !matches {
            return Err(ConfigError::KindMismatch {
                field: spec.name,
                expected: spec.kind.label(),
            });
        }

        self.values[index] = value;
        Ok(self)
    }

    /// Named values in record order, skipping reserved filler.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.layout
            .fields
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !matches!(v, FieldValue::Reserved))
            .map(|(f, v)| (f.name, v))
    }
}

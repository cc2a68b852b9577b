//! Generic record walk shared by every layout.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::layout::{FieldKind, Layout};
use crate::config::{Config, FieldValue};
use crate::error::ConfigError;
use crate::protocol::response::be_uint;

/// Decodes a configuration record.
///
/// # Errors
///
/// Fails if `data` is not exactly `layout.size()` bytes or a text field
/// holds non-ASCII bytes.
pub fn decode(layout: &'static Layout, data: &[u8]) -> Result<Config, ConfigError> {
    if data.len() != layout.size() {
        return Err(ConfigError::LengthMismatch {
            layout: layout.name,
            expected: layout.size(),
            actual: data.len(),
        });
    }

    let mut values = Vec::with_capacity(layout.fields.len());
    let mut cursor = 0;
    for field in layout.fields {
        let width = field.kind.width();
        let raw = &data[cursor..cursor + width];
        cursor += width;

        let value = match field.kind {
            FieldKind::UInt(_) => FieldValue::UInt(be_uint(raw)),
            FieldKind::Text(_) => {
                let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
                let text = &raw[..end];
                if !text.is_ascii() {
                    return Err(ConfigError::NonAscii { field: field.name });
                }
                FieldValue::Text(text.iter().map(|&b| char::from(b)).collect())
            }
            FieldKind::Bytes(_) => FieldValue::Bytes(raw.to_vec()),
            FieldKind::Reserved { .. } => FieldValue::Reserved,
        };
        values.push(value);
    }
    debug_assert_eq!(cursor, layout.size());

    Ok(Config::from_parts(layout, values))
}

/// Encodes a configuration value into its record.
///
/// # Errors
///
/// Fails with [`ConfigError::FieldOverflow`] if a value does not fit its
/// field; nothing is returned in that case.
pub fn encode(config: &Config) -> Result<Bytes, ConfigError> {
    let layout = config.layout();
    let mut buf = BytesMut::with_capacity(layout.size());

    for (field, value) in layout.fields.iter().zip(config.values()) {
        match (field.kind, value) {
            (FieldKind::UInt(width), FieldValue::UInt(v)) => {
                let needed = (32 - v.leading_zeros()).div_ceil(8) as usize;
                if needed > width {
                    return Err(ConfigError::FieldOverflow {
                        field: field.name,
                        width,
                        len: needed,
                    });
                }
                buf.put_slice(&v.to_be_bytes()[4 - width..]);
            }
            (FieldKind::Text(width), FieldValue::Text(s)) => {
                if !s.is_ascii() {
                    return Err(ConfigError::NonAscii { field: field.name });
                }
                if s.len() > width {
                    return Err(ConfigError::FieldOverflow {
                        field: field.name,
                        width,
                        len: s.len(),
                    });
                }
                buf.put_slice(s.as_bytes());
                buf.put_bytes(0, width - s.len());
            }
            (FieldKind::Bytes(width), FieldValue::Bytes(b)) => {
                if b.len() > width {
                    return Err(ConfigError::FieldOverflow {
                        field: field.name,
                        width,
                        len: b.len(),
                    });
                }
                buf.put_slice(b);
                buf.put_bytes(0, width - b.len());
            }
            (FieldKind::Reserved { width, fill }, _) => buf.put_bytes(fill, width),
            (kind, _) => {
                return Err(ConfigError::KindMismatch {
                    field: field.name,
                    expected: kind.label(),
                });
            }
        }
    }
    debug_assert_eq!(buf.len(), layout.size());

    Ok(buf.freeze())
}

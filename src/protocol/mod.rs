//! Protocol definitions for GMC communication.
//!
//! This module contains the low-level protocol types including:
//! - Command framing and idle-terminated reads
//! - The command catalog
//! - Reply decoding
//! - The AT text sub-protocol of the Wi-Fi module

pub mod at;
pub mod command;
pub mod frame;
pub mod response;

pub use command::{Command, Mnemonic};
pub use frame::{ACK, encode as encode_frame, encode_at, read_until_idle};
pub use response::{NumericFormat, Reply, ResponseShape, Slot};

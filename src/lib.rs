//! # gmc
//!
//! A Rust client library for GQ GMC Geiger counters (GMC-300/320/500/600).
//!
//! This library speaks the counters' serial command protocol over USB/Serial.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Typed command catalog with declared reply shapes
//! - Table-driven codec for the configuration record, with byte-patch write-back
//! - Wi-Fi management through the AT sub-protocol
//!
//! ## Quick Start
//!
//! ```no_run
//! use gmc::Gmc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gmc::Error> {
//!     let client = Gmc::serial("/dev/ttyUSB0");
//!     let version = client.connect().await?;
//!     println!("Connected to: {version}");
//!
//!     let cpm = client.commands().get_cpm().await?;
//!     println!("CPM: {cpm}");
//!
//!     client
//!         .update_config(|config| config.with("alarm_cpm_value", 100u32))
//!         .await?;
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Framing, command catalog, reply decoding, AT parsing
//! - [`config`] - Configuration record layouts and codec
//! - [`types`] - Readings, clock values and Wi-Fi records
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`commands`] - Command handler for device operations
//! - [`client`] - High-level [`Gmc`] client

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::Gmc;
pub use commands::{CommandHandler, DEFAULT_IDLE_TIMEOUT, DEFAULT_TEXT_WAIT};
pub use config::{Config, FieldValue, GMC_256, GMC_512, Layout};
pub use error::{ConfigError, Error, Result};
pub use protocol::{Command, Mnemonic, Reply, ResponseShape};
pub use transport::{SerialTransport, Transport, serial::SerialConfig};
pub use types::{AccessPoint, Counter, DeviceDateTime, EncryptionMethod, Gyro, WifiStatus};

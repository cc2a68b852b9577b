//! Transport layer for GMC communication.
//!
//! The protocol only needs a duplex byte channel that can write a buffer
//! and hand back whatever bytes arrived before a timeout. USB/Serial is the
//! only real implementation.

#[cfg(test)]
pub(crate) mod mock;
pub mod serial;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;

/// Trait for transport implementations.
pub trait Transport: Send {
    /// Connects to the device.
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Disconnects from the device.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Writes data to the device, returning the number of bytes written.
    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<usize>> + Send + '_>>;

    /// Waits up to `timeout` for incoming bytes.
    ///
    /// Returns the bytes of a single read, or an empty buffer when nothing
    /// arrived in time.
    fn read_available(
        &mut self,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

pub use serial::SerialTransport;

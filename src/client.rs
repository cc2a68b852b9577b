//! Main [`Gmc`] client implementation.
//!
//! This module provides the high-level [`Gmc`] client that owns the
//! transport and layers calendar handling, read-modify-write of the
//! configuration and periodic polling on top of [`CommandHandler`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::Stream;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::commands::CommandHandler;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::transport::{SerialTransport, Transport, serial::SerialConfig};
use crate::types::{Counter, DeviceDateTime};

/// Client for communicating with a GMC device.
pub struct Gmc<T> {
    transport: Arc<Mutex<T>>,
    commands: CommandHandler<T>,
}

impl Gmc<SerialTransport> {
    /// Creates a new client for a serial port.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a new client with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl<T: Transport> Gmc<T> {
    /// Creates a new client with the given transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        let transport = Arc::new(Mutex::new(transport));
        let commands = CommandHandler::new(Arc::clone(&transport));
        Self {
            transport,
            commands,
        }
    }

    /// Opens the transport and returns the firmware version string.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be opened or the device
    /// does not answer `GETVER`.
    pub async fn connect(&self) -> Result<String> {
        {
            let mut transport = self.transport.lock().await;
            transport.connect().await?;
        }

        let version = self.commands.get_version().await?;
        tracing::info!("connected to {}", version);
        Ok(version)
    }

    /// Disconnects from the device.
    pub async fn disconnect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport.disconnect().await
    }

    /// Returns true if connected.
    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected()
    }

    /// Returns the command handler for direct command access.
    #[must_use]
    pub const fn commands(&self) -> &CommandHandler<T> {
        &self.commands
    }

    /// Returns the command handler for changing timeouts or layout.
    pub const fn commands_mut(&mut self) -> &mut CommandHandler<T> {
        &mut self.commands
    }

    // ==================== Clock ====================

    /// Gets the device clock as a calendar value.
    pub async fn get_datetime(&self) -> Result<NaiveDateTime> {
        self.commands.get_datetime().await?.to_naive()
    }

    /// Sets the device clock.
    pub async fn set_datetime(&self, value: NaiveDateTime) -> Result<()> {
        self.commands
            .set_datetime(DeviceDateTime::try_from(value)?)
            .await
    }

    /// Sets the device clock to the host's local time.
    pub async fn sync_time(&self) -> Result<()> {
        self.set_datetime(chrono::Local::now().naive_local()).await
    }

    // ==================== Configuration ====================

    /// Reads the configuration, applies `update`, writes it back and
    /// reloads it on the device.
    ///
    /// Returns the configuration now held by the device.
    pub async fn update_config<F>(&self, update: F) -> Result<Config>
    where
        F: FnOnce(Config) -> std::result::Result<Config, ConfigError>,
    {
        let current = self.commands.get_config().await?;
        let updated = update(current)?;
        let written = self.commands.write_config(&updated).await?;
        tracing::debug!("patched {} config bytes", written);
        self.commands.reload_config().await?;
        Ok(updated)
    }

    // ==================== Polling ====================

    /// Polls a counter every `period`.
    ///
    /// The first reading is taken immediately. Each poll is an ordinary
    /// command and queues behind any other command in flight. The stream
    /// never ends on its own; drop it to stop polling.
    pub fn watch(&self, counter: Counter, period: Duration) -> impl Stream<Item = Result<u32>> + '_ {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        futures::stream::unfold(ticker, move |mut ticker| async move {
            ticker.tick().await;
            let reading = self.commands.get_counter(counter).await;
            Some((reading, ticker))
        })
    }
}

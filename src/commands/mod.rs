//! Command handlers for GMC operations.
//!
//! Every operation is one write followed by one idle-terminated read on
//! the shared transport. Replies carry no request identifier, so the
//! transport lock is held for the whole transaction; multi-step writes
//! hold it for the whole sequence.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use tokio::sync::Mutex;

use crate::config::{Config, GMC_256, Layout};
use crate::error::{ConfigError, Error, Result};
use crate::protocol::response::{self, Reply};
use crate::protocol::{Command, Mnemonic, at, frame};
use crate::transport::Transport;
use crate::types::{AccessPoint, Counter, DeviceDateTime, Gyro, WifiStatus};

/// Default idle window ending a binary reply.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default wait before collecting an AT reply; scans take seconds.
pub const DEFAULT_TEXT_WAIT: Duration = Duration::from_secs(5);

/// Command handler for GMC operations.
pub struct CommandHandler<T> {
    transport: Arc<Mutex<T>>,
    idle_timeout: Duration,
    text_wait: Duration,
    layout: &'static Layout,
}

impl<T: Transport> CommandHandler<T> {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(transport: Arc<Mutex<T>>) -> Self {
        Self {
            transport,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            text_wait: DEFAULT_TEXT_WAIT,
            layout: &GMC_256,
        }
    }

    /// Sets the idle window that ends a binary reply.
    pub fn set_idle_timeout(&mut self, timeout: Duration) {
        self.idle_timeout = timeout;
    }

    /// Sets the default wait for AT replies.
    pub fn set_text_wait(&mut self, wait: Duration) {
        self.text_wait = wait;
    }

    /// Sets the configuration memory map of the connected device.
    pub fn set_layout(&mut self, layout: &'static Layout) {
        self.layout = layout;
    }

    /// Returns the configuration memory map in use.
    #[must_use]
    pub const fn layout(&self) -> &'static Layout {
        self.layout
    }

    fn timeout_error(&self) -> Error {
        Error::ChannelTimeout {
            timeout_ms: u64::try_from(self.idle_timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Sends a raw command and returns the reply bytes.
    ///
    /// With `expected`, the reply must equal it byte for byte.
    pub async fn send_command(
        &self,
        mnemonic: &[u8],
        payload: &[u8],
        expected: Option<&'static [u8]>,
    ) -> Result<Bytes> {
        let packet = frame::encode(mnemonic, payload);
        let data = {
            let mut transport = self.transport.lock().await;
            frame::transact(&mut *transport, packet, self.idle_timeout).await?
        };

        match expected {
            Some(_) if data.is_empty() => Err(self.timeout_error()),
            Some(literal) => {
                response::expect_literal(literal, data.clone())?;
                Ok(data)
            }
            None => Ok(data),
        }
    }

    /// Sends a catalog command and decodes the reply by its declared shape.
    pub async fn request(&self, command: impl Into<Command>) -> Result<Reply> {
        let command = command.into();
        let mut transport = self.transport.lock().await;
        self.request_on(&mut *transport, &command).await
    }

    /// Runs one transaction on an already locked transport.
    async fn request_on(&self, transport: &mut T, command: &Command) -> Result<Reply> {
        let mnemonic = command.mnemonic();
        tracing::debug!("sending {}", mnemonic.name());

        let shape = mnemonic.reply();
        let data = frame::transact(transport, command.encode(), self.idle_timeout).await?;
        if data.is_empty() && !shape.allows_silence() {
            return Err(self.timeout_error());
        }
        response::decode(shape, data)
    }

    /// Runs acknowledged commands in order, stopping at the first failure.
    async fn run_steps(&self, transport: &mut T, steps: &[Command]) -> Result<()> {
        for (completed, step) in steps.iter().enumerate() {
            if let Err(e) = self.request_on(transport, step).await {
                return Err(Error::Incomplete {
                    completed,
                    total: steps.len(),
                    source: Box::new(e),
                });
            }
        }
        Ok(())
    }

    // ==================== Telemetry ====================

    /// Gets the firmware model and version string.
    pub async fn get_version(&self) -> Result<String> {
        self.request(Mnemonic::GetVer).await?.into_text()
    }

    /// Reads one of the counters.
    pub async fn get_counter(&self, counter: Counter) -> Result<u32> {
        self.request(counter.mnemonic()).await?.into_scalar()
    }

    /// Gets counts per minute.
    pub async fn get_cpm(&self) -> Result<u32> {
        self.get_counter(Counter::Cpm).await
    }

    /// Gets counts per second.
    pub async fn get_cps(&self) -> Result<u32> {
        self.get_counter(Counter::Cps).await
    }

    /// Gets the battery voltage in volts.
    pub async fn get_battery_voltage(&self) -> Result<f32> {
        self.request(Mnemonic::GetVolt).await?.into_voltage()
    }

    /// Gets the serial number as lowercase hex.
    pub async fn get_serial(&self) -> Result<String> {
        let raw = self.request(Mnemonic::GetSerial).await?.into_bytes()?;
        Ok(hex::encode(raw))
    }

    /// Gets the gyroscope reading.
    pub async fn get_gyro(&self) -> Result<Gyro> {
        let values = self.request(Mnemonic::GetGyro).await?.into_tuple()?;
        match values[..] {
            // Each slot is two bytes wide.
            [x, y, z] => Ok(Gyro {
                x: x as u16,
                y: y as u16,
                z: z as u16,
            }),
            _ => Err(Error::Protocol {
                message: format!("gyro reply has {} values", values.len()),
            }),
        }
    }

    /// Gets the temperature reply.
    ///
    /// The encoding is undocumented, so the bytes are returned untouched.
    pub async fn get_temperature(&self) -> Result<Bytes> {
        self.request(Mnemonic::GetTemp).await?.into_bytes()
    }

    // ==================== Configuration ====================

    /// Reads the raw configuration record.
    pub async fn get_config_raw(&self) -> Result<Bytes> {
        self.request(Mnemonic::GetCfg).await?.into_bytes()
    }

    /// Reads and decodes the configuration record.
    ///
    /// Right after [`erase_config`](Self::erase_config) the record is all
    /// 0xFF, text fields included, so decoding fails with
    /// [`ConfigError::NonAscii`] until a valid record is written. Use
    /// [`get_config_raw`](Self::get_config_raw) to read it regardless.
    pub async fn get_config(&self) -> Result<Config> {
        let raw = self.get_config_raw().await?;
        Ok(Config::decode(self.layout, &raw)?)
    }

    /// Erases the configuration record.
    pub async fn erase_config(&self) -> Result<()> {
        self.request(Mnemonic::ECfg).await.map(drop)
    }

    /// Makes the device apply the written configuration.
    pub async fn reload_config(&self) -> Result<()> {
        self.request(Mnemonic::CfgUpdate).await.map(drop)
    }

    /// Writes a configuration value to the device.
    ///
    /// The value is encoded in full and sent one byte per command in
    /// ascending address order. This is not atomic: a failure leaves the
    /// device holding a mix of old and new bytes and is reported as
    /// [`Error::Incomplete`]. Call [`reload_config`](Self::reload_config)
    /// afterwards for the device to use the new record.
    ///
    /// Returns the number of bytes written.
    pub async fn write_config(&self, config: &Config) -> Result<usize> {
        let record = config.encode()?;
        self.write_config_raw(&record).await
    }

    /// Writes a raw record, one acknowledged byte at a time.
    ///
    /// The record must be exactly the size of the configured layout;
    /// otherwise nothing is sent.
    pub async fn write_config_raw(&self, record: &[u8]) -> Result<usize> {
        let total = record.len();
        if total != self.layout.size() {
            return Err(ConfigError::LengthMismatch {
                layout: self.layout.name,
                expected: self.layout.size(),
                actual: total,
            }
            .into());
        }
        let mut transport = self.transport.lock().await;
        tracing::debug!("writing {} config bytes", total);

        for (address, &value) in (0u16..).zip(record) {
            let command = Command::write_config_byte(address, value);
            if let Err(e) = self.request_on(&mut *transport, &command).await {
                tracing::warn!("config write stopped at address {}: {}", address, e);
                return Err(Error::Incomplete {
                    completed: usize::from(address),
                    total,
                    source: Box::new(e),
                });
            }
            if address % 64 == 63 {
                tracing::debug!("wrote {}/{} config bytes", address + 1, total);
            }
        }

        Ok(total)
    }

    // ==================== Clock ====================

    /// Reads the device clock.
    pub async fn get_datetime(&self) -> Result<DeviceDateTime> {
        let raw = self.request(Mnemonic::GetDateTime).await?.into_bytes()?;
        DeviceDateTime::from_bytes(&raw)
    }

    /// Sets the full clock in one command.
    pub async fn set_datetime(&self, value: DeviceDateTime) -> Result<()> {
        let command = Command::with_payload(Mnemonic::SetDateTime, value.to_bytes().to_vec());
        self.request(command).await.map(drop)
    }

    /// Sets the date: year, then month, then day.
    pub async fn set_date(&self, date: NaiveDate) -> Result<()> {
        let dt = DeviceDateTime::try_from(NaiveDateTime::new(date, NaiveTime::default()))?;
        let steps = [
            Command::with_payload(Mnemonic::SetDateYy, vec![dt.year]),
            Command::with_payload(Mnemonic::SetDateMm, vec![dt.month]),
            Command::with_payload(Mnemonic::SetDateDd, vec![dt.day]),
        ];
        let mut transport = self.transport.lock().await;
        self.run_steps(&mut *transport, &steps).await
    }

    /// Sets the time: second, then minute, then hour.
    pub async fn set_time(&self, time: NaiveTime) -> Result<()> {
        let steps = [
            Command::with_payload(Mnemonic::SetTimeSs, vec![time.second() as u8]),
            Command::with_payload(Mnemonic::SetTimeMm, vec![time.minute() as u8]),
            Command::with_payload(Mnemonic::SetTimeHh, vec![time.hour() as u8]),
        ];
        let mut transport = self.transport.lock().await;
        self.run_steps(&mut *transport, &steps).await
    }

    // ==================== Toggles ====================

    /// Turns the alarm on or off.
    pub async fn set_alarm(&self, on: bool) -> Result<()> {
        let mnemonic = if on {
            Mnemonic::AlarmOn
        } else {
            Mnemonic::AlarmOff
        };
        self.request(mnemonic).await.map(drop)
    }

    /// Turns the speaker on or off.
    pub async fn set_speaker(&self, on: bool) -> Result<()> {
        let mnemonic = if on {
            Mnemonic::SpeakerOn
        } else {
            Mnemonic::SpeakerOff
        };
        self.request(mnemonic).await.map(drop)
    }

    /// Turns the Wi-Fi module on or off.
    pub async fn set_wifi(&self, on: bool) -> Result<()> {
        let mnemonic = if on {
            Mnemonic::WifiOn
        } else {
            Mnemonic::WifiOff
        };
        self.request(mnemonic).await.map(drop)
    }

    /// Sets the Wi-Fi network name.
    pub async fn set_ssid(&self, ssid: &str) -> Result<()> {
        let payload = ascii_payload(ssid)?;
        self.request(Command::with_payload(Mnemonic::SetSsid, payload))
            .await
            .map(drop)
    }

    /// Sets the Wi-Fi password.
    pub async fn set_wifi_password(&self, password: &str) -> Result<()> {
        let payload = ascii_payload(password)?;
        self.request(Command::with_payload(Mnemonic::SetWifiPassword, payload))
            .await
            .map(drop)
    }

    // ==================== Maintenance ====================

    /// Restores factory settings.
    pub async fn factory_reset(&self) -> Result<()> {
        self.request(Mnemonic::FactoryReset).await.map(drop)
    }

    /// Powers the device on. Returns whatever the device sent back.
    pub async fn power_on(&self) -> Result<Bytes> {
        self.request(Mnemonic::PowerOn).await?.into_bytes()
    }

    /// Powers the device off. Returns whatever the device sent back.
    pub async fn power_off(&self) -> Result<Bytes> {
        self.request(Mnemonic::PowerOff).await?.into_bytes()
    }

    /// Reboots the device. Returns whatever the device sent back.
    pub async fn reboot(&self) -> Result<Bytes> {
        self.request(Mnemonic::Reboot).await?.into_bytes()
    }

    // ==================== Wi-Fi module (AT) ====================

    /// Sends an AT command and returns the reply lines.
    ///
    /// The command text must be ASCII; anything else is rejected with
    /// [`Error::Encoding`] before it reaches the wire.
    ///
    /// Waits `wait` (or the handler default) before collecting the reply,
    /// since the module answers slowly. Line 0 is the command echo.
    pub async fn send_text_command(
        &self,
        command: &str,
        wait: Option<Duration>,
    ) -> Result<Vec<String>> {
        let wait = wait.unwrap_or(self.text_wait);
        ascii_payload(command)?;
        tracing::debug!("sending AT+{}", command);

        let data = {
            let mut transport = self.transport.lock().await;
            transport.send(frame::encode_at(command)).await?;
            tokio::time::sleep(wait).await;
            frame::read_until_idle(&mut *transport, self.idle_timeout).await?
        };

        if data.is_empty() {
            return Err(Error::ChannelTimeout {
                timeout_ms: u64::try_from((wait + self.idle_timeout).as_millis())
                    .unwrap_or(u64::MAX),
            });
        }
        let text = response::decode_ascii(&data, true)?;
        Ok(at::split_lines(&text))
    }

    /// Scans for access points.
    pub async fn list_wifi_networks(&self) -> Result<Vec<AccessPoint>> {
        let lines = self.send_text_command("CWLAP", None).await?;
        at::parse_access_points(&lines)
    }

    /// Gets the current association, if any.
    pub async fn get_wifi_status(&self) -> Result<Option<WifiStatus>> {
        let lines = self.send_text_command("CWJAP?", None).await?;
        Ok(at::parse_wifi_status(&lines))
    }

    /// Leaves the current network.
    pub async fn disconnect_wifi(&self) -> Result<Vec<String>> {
        self.send_text_command("CWQAP", None).await
    }

    /// Enables or disables joining the stored network at power-up.
    pub async fn set_wifi_auto_connect(&self, enable: bool) -> Result<Vec<String>> {
        let command = if enable { "CWAUTOCONN=1" } else { "CWAUTOCONN=0" };
        self.send_text_command(command, None).await
    }

    /// Gets the station MAC address of the Wi-Fi module.
    pub async fn get_mac_address(&self) -> Result<String> {
        let lines = self.send_text_command("CIPSTAMAC?", None).await?;
        at::parse_mac_address(&lines)
    }
}

/// Checks that a credential is plain ASCII before it goes on the wire.
fn ascii_payload(value: &str) -> Result<Vec<u8>> {
    match value.bytes().position(|b| !b.is_ascii()) {
        Some(position) => Err(Error::Encoding {
            position,
            byte: value.as_bytes()[position],
        }),
        None => Ok(value.as_bytes().to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::GMC_512;
    use crate::protocol::frame::ACK;
    use crate::transport::mock::{MockTransport, init_tracing};

    fn handler(transport: MockTransport) -> (CommandHandler<MockTransport>, Arc<Mutex<MockTransport>>) {
        let transport = Arc::new(Mutex::new(transport));
        (CommandHandler::new(Arc::clone(&transport)), transport)
    }

    async fn writes(transport: &Arc<Mutex<MockTransport>>) -> Vec<Bytes> {
        transport.lock().await.written().to_vec()
    }

    /// Strips `<` and `>>` from a written frame.
    fn body(frame: &[u8]) -> &[u8] {
        &frame[1..frame.len() - 2]
    }

    #[tokio::test]
    async fn test_get_version_frames_command() {
        let (commands, transport) = handler(MockTransport::replying(b"1.23"));
        assert_eq!(commands.get_version().await.unwrap(), "1.23");
        assert_eq!(writes(&transport).await, vec![Bytes::from_static(b"<GETVER>>")]);
    }

    #[tokio::test]
    async fn test_send_command_expected_literal() {
        let (commands, _) = handler(MockTransport::replying(&[ACK]));
        let reply = commands
            .send_command(b"ALARM1", &[], Some(&[ACK]))
            .await
            .unwrap();
        assert_eq!(&reply[..], &[ACK]);

        let (commands, _) = handler(MockTransport::replying(b"\x01"));
        let err = commands
            .send_command(b"ALARM1", &[], Some(&[ACK]))
            .await
            .unwrap_err();
        match err {
            Error::ProtocolMismatch { expected, actual } => {
                assert_eq!(&expected[..], &[ACK]);
                assert_eq!(&actual[..], b"\x01");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_silence_is_timeout() {
        let (commands, _) = handler(MockTransport::replying(b""));
        assert!(matches!(
            commands.get_cpm().await,
            Err(Error::ChannelTimeout { timeout_ms: 500 })
        ));
        assert!(matches!(
            commands.send_command(b"ECFG", &[], Some(&[ACK])).await,
            Err(Error::ChannelTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_counters() {
        let (commands, transport) = handler(MockTransport::new(|frame| match body(frame) {
            b"GETCPM" => vec![0x00, 0x00, 0x00, 0x2A],
            b"GETCPSH" => vec![0x00, 0x01, 0x00, 0x00],
            _ => vec![],
        }));
        assert_eq!(commands.get_cpm().await.unwrap(), 42);
        assert_eq!(commands.get_counter(Counter::CpsHigh).await.unwrap(), 65_536);
        assert_eq!(writes(&transport).await.len(), 2);
    }

    #[tokio::test]
    async fn test_counter_short_reply() {
        let (commands, _) = handler(MockTransport::replying(&[0x00, 0x2A]));
        assert!(matches!(
            commands.get_cps().await,
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_telemetry_decodes() {
        let (commands, _) = handler(MockTransport::new(|frame| match body(frame) {
            b"GETVOLT" => b"4.2v".to_vec(),
            b"GETSERIAL" => vec![0xF4, 0x88, 0x00, 0x12, 0x34, 0x56, 0x78],
            b"GETGYRO" => vec![0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0xAA],
            b"GETTEMP" => vec![0x17, 0x05, 0x00, 0xAA],
            _ => vec![],
        }));
        assert!((commands.get_battery_voltage().await.unwrap() - 4.2).abs() < f32::EPSILON);
        assert_eq!(commands.get_serial().await.unwrap(), "f4880012345678");
        assert_eq!(
            commands.get_gyro().await.unwrap(),
            Gyro { x: 1, y: 2, z: 3 }
        );
        assert_eq!(
            &commands.get_temperature().await.unwrap()[..],
            &[0x17, 0x05, 0x00, 0xAA]
        );
    }

    #[tokio::test]
    async fn test_alarm_mismatch_stops() {
        let (commands, transport) = handler(MockTransport::replying(&[0x55]));
        let err = commands.set_alarm(true).await.unwrap_err();
        assert!(matches!(err, Error::ProtocolMismatch { .. }));
        assert_eq!(writes(&transport).await, vec![Bytes::from_static(b"<ALARM1>>")]);
    }

    #[tokio::test]
    async fn test_toggles_use_catalog_mnemonics() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands.set_alarm(false).await.unwrap();
        commands.set_speaker(true).await.unwrap();
        commands.set_wifi(true).await.unwrap();
        commands.set_wifi(false).await.unwrap();
        commands.factory_reset().await.unwrap();
        assert_eq!(
            writes(&transport).await,
            vec![
                Bytes::from_static(b"<ALARM0>>"),
                Bytes::from_static(b"<SPEAKER1>>"),
                Bytes::from_static(b"<WiFiON>>"),
                Bytes::from_static(b"<WiFiOFF>>"),
                Bytes::from_static(b"<FACTORYRESET>>"),
            ]
        );
    }

    #[tokio::test]
    async fn test_power_commands_tolerate_silence() {
        let (commands, transport) = handler(MockTransport::replying(b""));
        assert!(commands.power_off().await.unwrap().is_empty());
        assert!(commands.reboot().await.unwrap().is_empty());
        assert!(commands.power_on().await.unwrap().is_empty());
        assert_eq!(writes(&transport).await.len(), 3);
    }

    #[tokio::test]
    async fn test_wifi_credentials() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands.set_ssid("HomeNet").await.unwrap();
        commands.set_wifi_password("hunter2").await.unwrap();
        assert_eq!(
            writes(&transport).await,
            vec![
                Bytes::from_static(b"<SETSSIDHomeNet>>"),
                Bytes::from_static(b"<SETWIFIPWhunter2>>"),
            ]
        );

        let err = commands.set_ssid("Café").await.unwrap_err();
        assert!(matches!(err, Error::Encoding { position: 3, .. }));
        assert_eq!(writes(&transport).await.len(), 2);
    }

    #[tokio::test]
    async fn test_write_config_patch_order() {
        init_tracing();
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        let config = Config::blank(&GMC_256)
            .with("alarm_cpm_value", 0x0102u32)
            .unwrap()
            .with("ssid", "Lab")
            .unwrap();
        let record = config.encode().unwrap();

        assert_eq!(commands.write_config(&config).await.unwrap(), 256);

        let written = writes(&transport).await;
        assert_eq!(written.len(), 256);
        for (address, frame) in written.iter().enumerate() {
            let mut expected = b"<WCFG".to_vec();
            expected.extend_from_slice(&(address as u16).to_be_bytes());
            expected.push(record[address]);
            expected.extend_from_slice(b">>");
            assert_eq!(&frame[..], &expected[..], "address {address}");
        }
    }

    #[tokio::test]
    async fn test_write_config_stops_at_first_failure() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let (commands, transport) = handler(MockTransport::new(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) == 10 {
                vec![0x00]
            } else {
                vec![ACK]
            }
        }));

        let err = commands
            .write_config(&Config::blank(&GMC_256))
            .await
            .unwrap_err();
        match err {
            Error::Incomplete {
                completed,
                total,
                source,
            } => {
                assert_eq!(completed, 10);
                assert_eq!(total, 256);
                assert!(matches!(*source, Error::ProtocolMismatch { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(writes(&transport).await.len(), 11);
    }

    #[tokio::test]
    async fn test_write_config_overflow_sends_nothing() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        let config = Config::blank(&GMC_256)
            .with("password", "p".repeat(17))
            .unwrap();
        let err = commands.write_config(&config).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(writes(&transport).await.is_empty());
    }

    #[tokio::test]
    async fn test_write_config_raw_rejects_wrong_size() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        for len in [255, 257, 65_537] {
            let err = commands.write_config_raw(&vec![0u8; len]).await.unwrap_err();
            assert!(matches!(
                err,
                Error::Config(ConfigError::LengthMismatch {
                    expected: 256,
                    actual,
                    ..
                }) if actual == len
            ));
        }
        assert!(writes(&transport).await.is_empty());
    }

    #[tokio::test]
    async fn test_write_config_raw_follows_layout() {
        let (mut commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands.set_layout(&GMC_512);
        assert_eq!(commands.write_config_raw(&[0u8; 512]).await.unwrap(), 512);
        let written = writes(&transport).await;
        assert_eq!(&written[511][..], b"<WCFG\x01\xff\x00>>");
    }

    #[tokio::test]
    async fn test_get_config_uses_layout() {
        let record = Config::blank(&GMC_512)
            .with("counter_id", "GMC-600")
            .unwrap()
            .encode()
            .unwrap();
        let reply = record.to_vec();
        let (mut commands, _) = handler(MockTransport::new(move |_| reply.clone()));

        assert!(matches!(
            commands.get_config().await,
            Err(Error::Config(_))
        ));

        commands.set_layout(&GMC_512);
        let config = commands.get_config().await.unwrap();
        assert_eq!(config.text("counter_id"), Some("GMC-600"));
    }

    #[tokio::test]
    async fn test_erase_and_reload() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands.erase_config().await.unwrap();
        commands.reload_config().await.unwrap();
        assert_eq!(
            writes(&transport).await,
            vec![
                Bytes::from_static(b"<ECFG>>"),
                Bytes::from_static(b"<CFGUPDATE>>"),
            ]
        );
    }

    #[tokio::test]
    async fn test_datetime_get_and_set() {
        let (commands, transport) = handler(MockTransport::new(|frame| {
            if body(frame).starts_with(b"GETDATETIME") {
                vec![24, 6, 1, 12, 30, 5, ACK]
            } else {
                vec![ACK]
            }
        }));
        let dt = commands.get_datetime().await.unwrap();
        assert_eq!(dt.to_bytes(), [24, 6, 1, 12, 30, 5]);

        commands.set_datetime(dt).await.unwrap();
        assert_eq!(
            &writes(&transport).await[1][..],
            b"<SETDATETIME\x18\x06\x01\x0c\x1e\x05>>"
        );
    }

    #[tokio::test]
    async fn test_set_date_order() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands
            .set_date(NaiveDate::from_ymd_opt(2025, 11, 30).unwrap())
            .await
            .unwrap();
        assert_eq!(
            writes(&transport).await,
            vec![
                Bytes::from_static(b"<SETDATEYY\x19>>"),
                Bytes::from_static(b"<SETDATEMM\x0b>>"),
                Bytes::from_static(b"<SETDATEDD\x1e>>"),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_time_order() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        commands
            .set_time(NaiveTime::from_hms_opt(21, 7, 42).unwrap())
            .await
            .unwrap();
        assert_eq!(
            writes(&transport).await,
            vec![
                Bytes::from_static(b"<SETTIMESS\x2a>>"),
                Bytes::from_static(b"<SETTIMEMM\x07>>"),
                Bytes::from_static(b"<SETTIMEHH\x15>>"),
            ]
        );
    }

    #[tokio::test]
    async fn test_set_time_reports_completed_steps() {
        let (commands, transport) = handler(MockTransport::new(|frame| {
            if body(frame).starts_with(b"SETTIMEMM") {
                vec![]
            } else {
                vec![ACK]
            }
        }));
        let err = commands
            .set_time(NaiveTime::from_hms_opt(1, 2, 3).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Incomplete {
                completed: 1,
                total: 3,
                ..
            }
        ));
        assert_eq!(writes(&transport).await.len(), 2);
    }

    #[tokio::test]
    async fn test_set_date_out_of_range() {
        let (commands, transport) = handler(MockTransport::replying(&[ACK]));
        let err = commands
            .set_date(NaiveDate::from_ymd_opt(2300, 1, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDateTime { .. }));
        assert!(writes(&transport).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_command_waits_then_splits() {
        let (commands, transport) = handler(MockTransport::replying(
            b"AT+CWQAP\r\n\r\nOK\r\n",
        ));
        let started = tokio::time::Instant::now();
        let lines = commands.disconnect_wifi().await.unwrap();
        assert!(started.elapsed() >= DEFAULT_TEXT_WAIT);
        assert_eq!(lines, vec!["AT+CWQAP", "", "OK", ""]);
        assert_eq!(writes(&transport).await, vec![Bytes::from_static(b"<AT+CWQAP>>")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_wifi_networks() {
        let (commands, _) = handler(MockTransport::replying(concat!(
            "AT+CWLAP\r\n",
            "+CWLAP:(3,\"Net1\",-45,\"aa:bb:cc:dd:ee:ff\",6,-1,-1,4,4,7,0)\r\n",
            "\r\nOK\r\n"
        ).as_bytes()));
        let networks = commands.list_wifi_networks().await.unwrap();
        assert_eq!(networks.len(), 1);
        assert_eq!(networks[0].ssid, "Net1");
        assert_eq!(networks[0].encryption, crate::types::EncryptionMethod::Wpa2Psk);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wifi_status_and_mac() {
        let (mut commands, transport) = handler(MockTransport::new(|frame| match body(frame) {
            b"AT+CWJAP?" => b"AT+CWJAP?\r\n+CWJAP:\"Lab\",\"aa:bb:cc:dd:ee:ff\",1,-60,0,1,3,0,1\r\n".to_vec(),
            b"AT+CIPSTAMAC?" => b"AT+CIPSTAMAC?\r\n+CIPSTAMAC:\"18:fe:34:00:00:01\"\r\n".to_vec(),
            _ => b"AT\r\nOK\r\n".to_vec(),
        }));
        commands.set_text_wait(Duration::from_secs(1));

        let status = commands.get_wifi_status().await.unwrap().unwrap();
        assert_eq!(status.ssid, "Lab");
        assert_eq!(commands.get_mac_address().await.unwrap(), "18:fe:34:00:00:01");
        commands.set_wifi_auto_connect(false).await.unwrap();
        assert_eq!(
            &writes(&transport).await[2][..],
            b"<AT+CWAUTOCONN=0>>"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_command_rejects_non_ascii() {
        let (commands, transport) = handler(MockTransport::replying(b"OK\r\n"));
        let err = commands
            .send_text_command("CWJAP=\"Caf\u{e9}\"", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Encoding {
                position: 10,
                byte: 0xC3
            }
        ));
        assert!(writes(&transport).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_command_silence() {
        let (commands, _) = handler(MockTransport::replying(b""));
        assert!(matches!(
            commands.send_text_command("CWJAP?", Some(Duration::from_secs(1))).await,
            Err(Error::ChannelTimeout { timeout_ms: 1500 })
        ));
    }
}

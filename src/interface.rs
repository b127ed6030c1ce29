use std::io;
use std::thread;
use std::time::{Duration, Instant};

use memchr::memmem;
use tracing::{debug, trace, warn};

use crate::configuration::{Configuration, extract_fragments};
use crate::error::{Error, Result};
use crate::settings::Trigger;
use crate::transport::{
    DEFAULT_READ_TIMEOUT, LineSettings, SerialOptions, SerialTransport, Transport, not_connected,
};
use crate::{POSTAMBLE, READ_TRIGGER, REPORT_ALL_SETTINGS, RESUME_SCANNING, SUSPEND_SCANNING};

/// time the device gets to report its full configuration
pub const DEFAULT_CONFIG_TIMEOUT: Duration = Duration::from_secs(2);

/// interval between two checks of the receive buffer while reading the configuration
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// how a configuration read decided the device was done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCompletion {
    /// the receive buffer was non-empty and did not grow between two polls
    Quiescent,
    /// the overall timeout elapsed first
    TimedOut,
}

/// wait until the device stops sending
///
/// The receive buffer is polled every `poll_interval`. Reading is complete as
/// soon as the buffer holds data and did not grow since the previous poll, or
/// once `timeout` has elapsed. This is a heuristic: a device pausing for longer
/// than one poll interval is cut short, and a timeout is not an error.
pub fn wait_for_quiescence<T: Transport + ?Sized>(
    transport: &mut T,
    poll_interval: Duration,
    timeout: Duration,
) -> io::Result<ReadCompletion> {
    let start_ts = Instant::now();
    let mut previous_size = 0;
    loop {
        thread::sleep(poll_interval);
        let size = transport.bytes_available()?;
        trace!("{} bytes waiting after {:?}", size, start_ts.elapsed());
        if size > 0 && size == previous_size {
            return Ok(ReadCompletion::Quiescent);
        }
        if start_ts.elapsed() >= timeout {
            return Ok(ReadCompletion::TimedOut);
        }
        previous_size = size;
    }
}

enum State<T> {
    Disconnected,
    Connected(T),
    Closed,
}

/// Session with a Microscan barcode reader.
///
/// The session owns the transport and a copy of the configuration most
/// recently read from (or set for) the device. Once closed, a session cannot
/// be connected again.
pub struct BarcodeReader<T: Transport = SerialTransport> {
    /// serial port to communicate over
    port_name: String,
    /// line parameters used for connecting when the caller passes none
    options: SerialOptions,
    /// timeout for a blocking line read, default is 1s
    read_timeout: Duration,
    /// time the device gets to report its configuration, default is 2s
    config_timeout: Duration,
    poll_interval: Duration,
    state: State<T>,
    config: Option<Configuration>,
}

impl BarcodeReader<SerialTransport> {
    /// create a session for a serial port, using the factory line settings
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     println!("{}", reader.read_barcode()?);
    ///     reader.close()?;
    ///     Ok(())
    /// }
    /// ```
    pub fn new(port_name: &str) -> Self {
        Self::with_options(port_name, SerialOptions::default())
    }

    /// open the serial port and read the device configuration
    ///
    /// Line parameters are taken from `overrides` first, then from the options
    /// the session was created with, then from the device factory defaults
    /// (9600 baud, even parity, 7 data bits, 1 stop bit).
    pub fn connect(&mut self, overrides: SerialOptions) -> Result<Configuration> {
        self.connect_with(overrides, SerialTransport::open)
    }
}

impl<T: Transport> BarcodeReader<T> {
    /// create a session whose line parameters default to `options`
    pub fn with_options(port_name: &str, options: SerialOptions) -> Self {
        BarcodeReader {
            port_name: port_name.to_string(),
            options,
            read_timeout: DEFAULT_READ_TIMEOUT,
            config_timeout: DEFAULT_CONFIG_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: State::Disconnected,
            config: None,
        }
    }

    /// connect through a caller supplied transport constructor
    ///
    /// `open` receives the port name and the resolved line settings. Errors
    /// from `open` are returned unmodified.
    pub fn connect_with<F>(&mut self, overrides: SerialOptions, open: F) -> Result<Configuration>
    where
        F: FnOnce(&str, &LineSettings) -> io::Result<T>,
    {
        match self.state {
            State::Disconnected => {}
            State::Connected(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "session is already connected",
                )
                .into());
            }
            State::Closed => {
                return Err(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "session was closed, create a new one to reconnect",
                )
                .into());
            }
        }
        let line = overrides.or(self.options).resolve(self.read_timeout);
        debug!("connecting to {} with {:?}", self.port_name, line);
        let transport = open(&self.port_name, &line)?;
        self.state = State::Connected(transport);
        self.read_config()
    }

    /// read the full configuration from the device
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     let config = reader.read_config()?;
    ///     println!("{}", String::from_utf8_lossy(&config.to_wire(b"\n")?));
    ///     Ok(())
    /// }
    /// ```
    pub fn read_config(&mut self) -> Result<Configuration> {
        self.read_config_with_timeout(self.config_timeout)
    }

    /// read the full configuration, waiting at most `timeout` for the device
    ///
    /// Scanning is suspended while the device reports its settings. When the
    /// timeout elapses the settings received so far are used and every other
    /// setting keeps its default. The cached configuration is replaced and a
    /// copy of it is returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    ///
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     let config = reader.read_config_with_timeout(Duration::from_secs(5))?;
    ///     println!("{:?}", config.trigger);
    ///     Ok(())
    /// }
    /// ```
    pub fn read_config_with_timeout(&mut self, timeout: Duration) -> Result<Configuration> {
        let poll_interval = self.poll_interval;
        let transport = self.transport()?;
        send(transport, SUSPEND_SCANNING)?;
        transport.flush()?;
        // symbols decoded before the suspend would count as part of the report
        transport.discard_input()?;
        send(transport, REPORT_ALL_SETTINGS)?;
        if wait_for_quiescence(transport, poll_interval, timeout)? == ReadCompletion::TimedOut {
            warn!(
                "device did not finish reporting its configuration within {:?}",
                timeout
            );
        }
        let raw = transport.read_available()?;
        debug!(
            "READ FROM SERIAL {} bytes: {}",
            raw.len(),
            String::from_utf8_lossy(&raw)
        );
        let fragments = extract_fragments(&raw);
        debug!("{} setting(s) reported by the device", fragments.len());
        let decoded = Configuration::from_wire_batch(&fragments, true);
        send(transport, RESUME_SCANNING)?;
        let configuration = decoded?;
        self.config = Some(configuration.clone());
        Ok(configuration)
    }

    /// write the cached configuration to the device
    ///
    /// The device is not read back afterwards.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::settings::ScanSpeed;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     let mut config = reader.config().unwrap_or_default();
    ///     config.scan_speed = Some(ScanSpeed { speed: 500 });
    ///     reader.set_config(config);
    ///     reader.write_config()?;
    ///     Ok(())
    /// }
    /// ```
    pub fn write_config(&mut self) -> Result<()> {
        let blob = self
            .config
            .as_ref()
            .ok_or(Error::NoConfigurationLoaded)?
            .to_wire(b"")?;
        let transport = self.transport()?;
        send(transport, SUSPEND_SCANNING)?;
        send(transport, &blob)?;
        send(transport, RESUME_SCANNING)?;
        Ok(())
    }

    /// read one symbol from the device
    ///
    /// In the serial trigger modes a trigger is sent and the reply line is
    /// awaited: the start character (K229) if one is configured, otherwise the
    /// serial trigger character (K201) wrapped in angle brackets, otherwise
    /// `*`. In every other mode the symbols are expected to be waiting in the
    /// receive buffer already and the last complete one is returned.
    ///
    /// Bytes outside of ASCII are dropped. An empty string means no symbol
    /// arrived within the read timeout.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     match reader.read_barcode()? {
    ///         barcode if barcode.is_empty() => println!("no barcode could be identified"),
    ///         barcode => println!("{}", barcode),
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn read_barcode(&mut self) -> Result<String> {
        let trigger_mode = self
            .config
            .as_ref()
            .and_then(|config| config.trigger.as_ref())
            .map(|trigger| trigger.mode)
            .unwrap_or(Trigger::default().mode);
        let read_timeout = self.read_timeout;

        let line = if trigger_mode.is_serial() {
            let trigger = self.serial_trigger();
            let transport = self.transport()?;
            transport.discard_input()?;
            send(transport, &trigger)?;
            read_line(transport, read_timeout)?
        } else {
            let transport = self.transport()?;
            let buffered = transport.read_available()?;
            debug!("READ FROM SERIAL {} bytes: {:02X?}", buffered.len(), buffered);
            let segments: Vec<&[u8]> = split_on_postamble(&buffered);
            if segments.len() >= 2 {
                segments[segments.len() - 2].to_vec()
            } else {
                trace!("no complete symbol buffered, waiting for the next line");
                let mut line = buffered;
                line.extend(read_line(transport, read_timeout)?);
                line
            }
        };

        let text: String = line
            .iter()
            .filter(|byte| byte.is_ascii())
            .map(|&byte| byte as char)
            .collect();
        Ok(text.trim().to_string())
    }

    /// read the next line the device sends, waiting at most the read timeout
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let read_timeout = self.read_timeout;
        Ok(read_line(self.transport()?, read_timeout)?)
    }

    /// write raw bytes to the device
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        send(self.transport()?, bytes)?;
        Ok(())
    }

    /// release the transport, any later read or write fails
    ///
    /// Closing a closed session does nothing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use anyhow::Result;
    /// use microscan::BarcodeReader;
    /// use microscan::transport::SerialOptions;
    ///
    /// fn main() -> Result<()> {
    ///     let mut reader = BarcodeReader::new("/dev/ttyUSB0");
    ///     reader.connect(SerialOptions::default())?;
    ///     reader.close()?;
    ///     assert!(reader.write(b"<K?>").is_err());
    ///     Ok(())
    /// }
    /// ```
    pub fn close(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(mut transport) => {
                debug!("closing {}", self.port_name);
                transport.close()?;
            }
            State::Disconnected | State::Closed => {}
        }
        Ok(())
    }

    /// copy of the cached configuration
    pub fn config(&self) -> Option<Configuration> {
        self.config.clone()
    }

    /// replace the cached configuration, e.g. ahead of [`BarcodeReader::write_config`]
    pub fn set_config(&mut self, config: Configuration) {
        self.config = Some(config);
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    pub fn set_config_timeout(&mut self, config_timeout: Duration) {
        self.config_timeout = config_timeout;
    }

    pub fn set_poll_interval(&mut self, poll_interval: Duration) {
        self.poll_interval = poll_interval;
    }

    fn transport(&mut self) -> io::Result<&mut T> {
        match &mut self.state {
            State::Connected(transport) => Ok(transport),
            State::Disconnected | State::Closed => Err(not_connected()),
        }
    }

    /// trigger bytes for the serial trigger modes
    fn serial_trigger(&self) -> Vec<u8> {
        let config = self.config.as_ref();
        if let Some(start) = config
            .and_then(|config| config.start_trigger_character.as_ref())
            .and_then(|start| start.character)
        {
            return vec![start];
        }
        if let Some(character) = config
            .and_then(|config| config.serial_trigger.as_ref())
            .and_then(|serial| serial.character.as_ref())
        {
            let mut trigger = Vec::with_capacity(character.len() + 2);
            trigger.push(b'<');
            trigger.extend_from_slice(character);
            trigger.push(b'>');
            return trigger;
        }
        READ_TRIGGER.to_vec()
    }
}

fn send<T: Transport + ?Sized>(transport: &mut T, bytes: &[u8]) -> io::Result<()> {
    debug!("WRITE TO SERIAL {} bytes: {}", bytes.len(), String::from_utf8_lossy(bytes));
    transport.write_all(bytes)
}

fn read_line<T: Transport + ?Sized>(transport: &mut T, timeout: Duration) -> io::Result<Vec<u8>> {
    trace!("reading next line");
    let line = transport.read_line(timeout)?;
    debug!("READ FROM SERIAL {} bytes: {:02X?}", line.len(), line);
    Ok(line)
}

fn split_on_postamble(buffer: &[u8]) -> Vec<&[u8]> {
    let mut segments = Vec::new();
    let mut start = 0;
    for end in memmem::find_iter(buffer, POSTAMBLE) {
        segments.push(&buffer[start..end]);
        start = end + POSTAMBLE.len();
    }
    segments.push(&buffer[start..]);
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{
        Color, DataBits, HostPortConnection, Parity, SerialTrigger, StartTriggerCharacter,
        TriggerMode,
    };
    use crate::transport::MockTransport;

    const FULL_REPORT: &[&[u8]] = &[
        b"<K100,4,1,0,0><K140,0>",
        b"<K141,1,^M>\r\n<K200,0,244>",
        b"<K451,1><K452,1,2,0,1>",
    ];

    fn connected(mock: &MockTransport) -> Result<BarcodeReader<MockTransport>> {
        let mut reader = BarcodeReader::with_options("MOCK0", SerialOptions::default());
        reader.set_poll_interval(Duration::from_millis(1));
        reader.set_config_timeout(Duration::from_millis(50));
        let transport = mock.clone();
        reader.connect_with(SerialOptions::default(), move |_, _| Ok(transport))?;
        Ok(reader)
    }

    #[test]
    fn test_split_on_postamble() {
        let expected: [&[u8]; 3] = [b"A", b"B", b""];
        assert_eq!(split_on_postamble(b"A\r\nB\r\n"), expected);
        let expected: [&[u8]; 1] = [b"partial"];
        assert_eq!(split_on_postamble(b"partial"), expected);
    }

    #[test]
    fn test_quiescence_after_chunked_reply() -> Result<()> {
        let mut mock = MockTransport::new();
        mock.reply_in_chunks(REPORT_ALL_SETTINGS, FULL_REPORT);
        mock.write_all(REPORT_ALL_SETTINGS)?;
        let completion =
            wait_for_quiescence(&mut mock, Duration::ZERO, Duration::from_secs(5))?;
        assert_eq!(completion, ReadCompletion::Quiescent);
        assert_eq!(mock.read_available()?, FULL_REPORT.concat());
        Ok(())
    }

    #[test]
    fn test_quiescence_times_out_without_data() -> Result<()> {
        let mut mock = MockTransport::new();
        let started = Instant::now();
        let completion = wait_for_quiescence(
            &mut mock,
            Duration::from_millis(1),
            Duration::from_millis(20),
        )?;
        assert_eq!(completion, ReadCompletion::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(20));
        Ok(())
    }

    #[test]
    fn test_connect_reads_configuration() -> Result<()> {
        let mock = MockTransport::new();
        mock.reply_in_chunks(REPORT_ALL_SETTINGS, FULL_REPORT);
        let reader = connected(&mock)?;
        assert!(reader.is_connected());

        let config = reader.config().expect("configuration is cached");
        let host = config.host_port_connection.expect("host port is set");
        assert_eq!(host.parity, Parity::Even);
        assert_eq!(
            config.preamble.and_then(|preamble| preamble.characters),
            Some(b"^M".to_vec())
        );
        assert_eq!(config.scan_speed.map(|speed| speed.speed), Some(350));

        assert_eq!(
            mock.written(),
            vec![
                SUSPEND_SCANNING.to_vec(),
                REPORT_ALL_SETTINGS.to_vec(),
                RESUME_SCANNING.to_vec()
            ]
        );
        Ok(())
    }

    #[test]
    fn test_connect_passes_resolved_line_settings() -> Result<()> {
        let mock = MockTransport::new();
        mock.reply_to(REPORT_ALL_SETTINGS, b"<K100,4,1,0,0>");
        let session = SerialOptions {
            baud_rate: Some(19200),
            parity: Some(Parity::Odd),
            ..Default::default()
        };
        let mut reader = BarcodeReader::with_options("MOCK0", session);
        reader.set_poll_interval(Duration::from_millis(1));
        let transport = mock.clone();
        let mut seen = None;
        reader.connect_with(
            SerialOptions {
                baud_rate: Some(38400),
                ..Default::default()
            },
            |port, line| {
                seen = Some((port.to_string(), *line));
                Ok(transport)
            },
        )?;
        let (port, line) = seen.expect("transport was opened");
        assert_eq!(port, "MOCK0");
        assert_eq!(line.baud_rate, 38400);
        assert_eq!(line.parity, Parity::Odd);
        assert_eq!(line.read_timeout, DEFAULT_READ_TIMEOUT);
        Ok(())
    }

    #[test]
    fn test_open_failure_surfaces_unmodified() {
        let mut reader: BarcodeReader<MockTransport> =
            BarcodeReader::with_options("MOCK0", SerialOptions::default());
        let result = reader.connect_with(SerialOptions::default(), |_, _| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such port"))
        });
        match result {
            Err(Error::Transport(err)) => assert_eq!(err.kind(), io::ErrorKind::NotFound),
            other => panic!("expected transport error, got {:?}", other),
        }
        assert!(!reader.is_connected());
    }

    #[test]
    fn test_read_config_timeout_keeps_partial_configuration() -> Result<()> {
        // a device that keeps sending for far longer than the timeout
        let mut chunks: Vec<&[u8]> = Vec::new();
        chunks.push(b"<K100,6,1,0,1>");
        chunks.extend(std::iter::repeat_n(&b"<K144,5>"[..], 500));
        chunks.push(b"<K451,1>");
        let mock = MockTransport::new();
        mock.reply_in_chunks(REPORT_ALL_SETTINGS, &chunks);

        let mut reader = BarcodeReader::with_options("MOCK0", SerialOptions::default());
        reader.set_poll_interval(Duration::from_millis(5));
        reader.set_config_timeout(Duration::from_millis(30));
        let transport = mock.clone();
        let config = reader.connect_with(SerialOptions::default(), move |_, _| Ok(transport))?;

        let host = config.host_port_connection.expect("host port is set");
        assert_eq!(host.baud_rate, 38400);
        assert_eq!(host.data_bits, DataBits::Eight);
        assert_eq!(
            config.background_color.map(|background| background.color),
            Some(Color::White)
        );
        assert_eq!(mock.written().last(), Some(&RESUME_SCANNING.to_vec()));
        Ok(())
    }

    #[test]
    fn test_malformed_report_still_resumes_scanning() {
        let mock = MockTransport::new();
        mock.reply_to(REPORT_ALL_SETTINGS, b"<K100,4,0>");
        let result = connected(&mock);
        assert!(matches!(
            result,
            Err(Error::MalformedConfigString { code: "K100", .. })
        ));
        assert_eq!(mock.written().last(), Some(&RESUME_SCANNING.to_vec()));
    }

    #[test]
    fn test_read_config_ignores_buffered_symbols() -> Result<()> {
        let mock = MockTransport::new();
        let mut reader = connected(&mock)?;
        reader.set_config_timeout(Duration::from_secs(5));

        // the report starts two polls after the request
        mock.reply_in_chunks(REPORT_ALL_SETTINGS, &[b"", b"", b"<K451,1>"]);
        mock.push_inbound(b"12345\r\n");
        let config = reader.read_config()?;

        assert_eq!(
            config.background_color.map(|background| background.color),
            Some(Color::Black)
        );
        Ok(())
    }

    #[test]
    fn test_write_config_requires_configuration() -> Result<()> {
        let mock = MockTransport::new();
        let mut reader: BarcodeReader<MockTransport> =
            BarcodeReader::with_options("MOCK0", SerialOptions::default());
        assert!(matches!(
            reader.write_config(),
            Err(Error::NoConfigurationLoaded)
        ));

        let mut reader = connected(&mock)?;
        let mut config = reader.config().expect("defaults are cached");
        config.host_port_connection = Some(HostPortConnection {
            baud_rate: 9600,
            parity: Parity::Even,
            ..Default::default()
        });
        reader.set_config(config.clone());
        reader.write_config()?;

        let written = mock.written();
        let tail = &written[written.len() - 3..];
        assert_eq!(tail[0], SUSPEND_SCANNING.to_vec());
        assert_eq!(tail[1], config.to_wire(b"")?);
        assert!(tail[1].starts_with(b"<K100,4,1,0,0><K140,0>"));
        assert_eq!(tail[2], RESUME_SCANNING.to_vec());
        Ok(())
    }

    #[test]
    fn test_config_returns_a_copy() -> Result<()> {
        let mock = MockTransport::new();
        let reader = connected(&mock)?;
        let mut copy = reader.config().expect("defaults are cached");
        copy.trigger = None;
        assert!(reader.config().and_then(|config| config.trigger).is_some());
        Ok(())
    }

    #[test]
    fn test_read_barcode_continuous_takes_last_complete_symbol() -> Result<()> {
        let mock = MockTransport::new();
        let mut reader = connected(&mock)?;
        mock.push_inbound(b"OLD\r\n12345\xFF\r\n");
        assert_eq!(reader.read_barcode()?, "12345");

        mock.push_inbound(b"ABC");
        assert_eq!(reader.read_barcode()?, "ABC");
        Ok(())
    }

    #[test]
    fn test_read_barcode_serial_trigger() -> Result<()> {
        let mock = MockTransport::new();
        mock.reply_to(REPORT_ALL_SETTINGS, b"<K200,4,244><K201,!>");
        mock.reply_to(b"<!>", b"  9780201633610\r\n");
        let mut reader = connected(&mock)?;

        mock.push_inbound(b"STALE\r\n");
        assert_eq!(reader.read_barcode()?, "9780201633610");
        assert_eq!(mock.written().last(), Some(&b"<!>".to_vec()));

        let mut config = reader.config().expect("configuration is cached");
        config.start_trigger_character = Some(StartTriggerCharacter {
            character: Some(0x02),
        });
        reader.set_config(config.clone());
        mock.reply_to(&[0x02], b"XYZ\r\n");
        assert_eq!(reader.read_barcode()?, "XYZ");

        config.start_trigger_character = None;
        config.serial_trigger = Some(SerialTrigger { character: None });
        reader.set_config(config);
        reader.read_barcode()?;
        assert_eq!(mock.written().last(), Some(&READ_TRIGGER.to_vec()));

        let trigger = reader.config().and_then(|config| config.trigger);
        assert_eq!(trigger.map(|trigger| trigger.mode), Some(TriggerMode::SerialData));
        Ok(())
    }

    #[test]
    fn test_closed_session_fails() -> Result<()> {
        let mock = MockTransport::new();
        let mut reader = connected(&mock)?;
        reader.close()?;
        assert!(mock.is_closed());
        reader.close()?;

        for result in [
            reader.write(b"<K?>").map(|_| ()),
            reader.read_barcode().map(|_| ()),
            reader.read_config().map(|_| ()),
            reader.write_config().map(|_| ()),
        ] {
            match result {
                Err(Error::Transport(err)) => assert_eq!(err.kind(), io::ErrorKind::NotConnected),
                other => panic!("expected not connected, got {:?}", other),
            }
        }

        let reconnect = reader.connect_with(SerialOptions::default(), |_, _| Ok(mock.clone()));
        assert!(matches!(reconnect, Err(Error::Transport(_))));
        Ok(())
    }

    #[test]
    fn test_never_connected_session_fails() {
        let mut reader: BarcodeReader<MockTransport> =
            BarcodeReader::with_options("MOCK0", SerialOptions::default());
        assert!(reader.write(b"*").is_err());
        assert!(reader.read_line().is_err());
        assert!(reader.close().is_ok());
    }
}

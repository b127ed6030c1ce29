//! Byte stream boundary between the reader session and the serial line.

use std::io;
use std::time::Duration;

use crate::settings::{DataBits, HostPortConnection, Parity, StopBits};

pub mod mock;
pub mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// time a single blocking read may take unless a caller asks otherwise
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Half-duplex byte stream to a barcode reader.
///
/// Every operation on a closed transport fails with
/// [`io::ErrorKind::NotConnected`].
pub trait Transport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// number of received bytes waiting to be read
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// every received byte waiting to be read, returns immediately
    fn read_available(&mut self) -> io::Result<Vec<u8>>;

    /// read up to and including the next line feed
    ///
    /// Blocks for at most `timeout` and returns whatever was received by then,
    /// which may be a partial line or nothing at all.
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>>;

    /// drop every received byte not read yet
    fn discard_input(&mut self) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()>;
}

pub(crate) fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "serial port is not open")
}

/// Serial line parameters, each one optional.
///
/// Unset values are taken from a fallback with [`SerialOptions::or`] and
/// finally from the factory defaults of the device by
/// [`SerialOptions::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerialOptions {
    pub baud_rate: Option<u32>,
    pub parity: Option<Parity>,
    pub data_bits: Option<DataBits>,
    pub stop_bits: Option<StopBits>,
}

impl SerialOptions {
    /// fill every unset value from `fallback`
    pub fn or(self, fallback: SerialOptions) -> SerialOptions {
        SerialOptions {
            baud_rate: self.baud_rate.or(fallback.baud_rate),
            parity: self.parity.or(fallback.parity),
            data_bits: self.data_bits.or(fallback.data_bits),
            stop_bits: self.stop_bits.or(fallback.stop_bits),
        }
    }

    /// fill every unset value from the factory defaults
    pub fn resolve(self, read_timeout: Duration) -> LineSettings {
        let defaults = LineSettings::default();
        LineSettings {
            baud_rate: self.baud_rate.unwrap_or(defaults.baud_rate),
            parity: self.parity.unwrap_or(defaults.parity),
            data_bits: self.data_bits.unwrap_or(defaults.data_bits),
            stop_bits: self.stop_bits.unwrap_or(defaults.stop_bits),
            read_timeout,
        }
    }
}

impl From<&HostPortConnection> for SerialOptions {
    fn from(host: &HostPortConnection) -> Self {
        SerialOptions {
            baud_rate: Some(host.baud_rate),
            parity: Some(host.parity),
            data_bits: Some(host.data_bits),
            stop_bits: Some(host.stop_bits),
        }
    }
}

/// Resolved parameters used to open a serial line. Flow control is always off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub parity: Parity,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub read_timeout: Duration,
}

impl Default for LineSettings {
    /// 9600 baud, even parity, 7 data bits, 1 stop bit (MS3 manual page 3-1)
    fn default() -> Self {
        LineSettings {
            baud_rate: 9600,
            parity: Parity::Even,
            data_bits: DataBits::Seven,
            stop_bits: StopBits::One,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

use std::io;
use std::time::{Duration, Instant};

use serial2::{CharSize, FlowControl, SerialPort, Settings};
use tracing::trace;

use super::{LineSettings, Transport, not_connected};
use crate::settings::{DataBits, Parity, StopBits};

/// longest time a single drain of the receive buffer may take
const DRAIN_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial line transport backed by [`serial2`].
///
/// Received bytes are moved into an internal buffer when their count is
/// queried, so [`Transport::bytes_available`] reflects everything the device
/// sent so far.
pub struct SerialTransport {
    port: Option<SerialPort>,
    pending: Vec<u8>,
}

impl SerialTransport {
    /// open the serial port with the given line parameters and no flow control
    pub fn open(port_name: &str, line: &LineSettings) -> io::Result<Self> {
        let mut port = SerialPort::open(port_name, |mut settings: Settings| {
            settings.set_raw();
            settings.set_baud_rate(line.baud_rate)?;
            settings.set_char_size(match line.data_bits {
                DataBits::Seven => CharSize::Bits7,
                DataBits::Eight => CharSize::Bits8,
            });
            settings.set_stop_bits(match line.stop_bits {
                StopBits::One => serial2::StopBits::One,
                StopBits::Two => serial2::StopBits::Two,
            });
            settings.set_parity(match line.parity {
                Parity::None => serial2::Parity::None,
                Parity::Even => serial2::Parity::Even,
                Parity::Odd => serial2::Parity::Odd,
            });
            settings.set_flow_control(FlowControl::None);
            Ok(settings)
        })?;
        port.discard_buffers()?;
        port.set_read_timeout(line.read_timeout)?;
        trace!("opened {} with {:?}", port_name, line);
        Ok(SerialTransport {
            port: Some(port),
            pending: Vec::with_capacity(1024),
        })
    }

    fn port(&mut self) -> io::Result<&mut SerialPort> {
        self.port.as_mut().ok_or_else(not_connected)
    }

    /// move everything the device sent so far into the pending buffer
    fn drain(&mut self) -> io::Result<()> {
        let port = self.port.as_mut().ok_or_else(not_connected)?;
        drain_into(&mut self.pending, DRAIN_TIMEOUT, |buffer, timeout| {
            port.set_read_timeout(timeout)?;
            port.read(buffer)
        })
    }
}

/// append reads to `pending` until the source pauses or `budget` is spent
///
/// A device that never pauses still returns after `budget`, so callers
/// polling the buffer keep their own deadline.
fn drain_into<F>(pending: &mut Vec<u8>, budget: Duration, mut read: F) -> io::Result<()>
where
    F: FnMut(&mut [u8], Duration) -> io::Result<usize>,
{
    let deadline = Instant::now() + budget;
    let mut buffer = [0u8; 256];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            trace!("drain budget spent with {} bytes pending", pending.len());
            return Ok(());
        }
        match read(&mut buffer, remaining) {
            Ok(0) => return Ok(()),
            Ok(read_bytes) => pending.extend_from_slice(&buffer[..read_bytes]),
            Err(err) if err.kind() == io::ErrorKind::TimedOut => return Ok(()),
            Err(err) => return Err(err),
        }
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.port()?.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port()?.flush()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        self.drain()?;
        Ok(self.pending.len())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        self.drain()?;
        Ok(std::mem::take(&mut self.pending))
    }

    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let start_ts = Instant::now();
        let mut buffer = [0u8; 64];
        loop {
            if let Some(end) = memchr::memchr(b'\n', &self.pending) {
                trace!("EOL detected, line len {}", end + 1);
                return Ok(self.pending.drain(..=end).collect());
            }
            let remaining = timeout.saturating_sub(start_ts.elapsed());
            if remaining.is_zero() {
                trace!("timeout reached, returning {} bytes", self.pending.len());
                return Ok(std::mem::take(&mut self.pending));
            }
            let port = self.port.as_mut().ok_or_else(not_connected)?;
            port.set_read_timeout(remaining)?;
            match port.read(&mut buffer) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "no data was read from the device",
                    ));
                }
                Ok(read_bytes) => self.pending.extend_from_slice(&buffer[..read_bytes]),
                Err(err) if err.kind() == io::ErrorKind::TimedOut => {}
                Err(err) => return Err(err),
            }
        }
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.pending.clear();
        self.port()?.discard_input_buffer()
    }

    fn close(&mut self) -> io::Result<()> {
        if self.port.take().is_some() {
            trace!("serial port closed");
        }
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_drain_stops_at_budget_on_continuous_data() -> io::Result<()> {
        let mut pending = Vec::new();
        let started = Instant::now();
        drain_into(&mut pending, Duration::from_millis(20), |buffer, _| {
            thread::sleep(Duration::from_millis(1));
            buffer[..4].copy_from_slice(b"ABC\n");
            Ok(4)
        })?;
        assert!(started.elapsed() < Duration::from_millis(500));
        assert!(!pending.is_empty());
        assert!(pending.starts_with(b"ABC\n"));
        Ok(())
    }

    #[test]
    fn test_drain_stops_on_pause() -> io::Result<()> {
        let mut pending = b"<K100".to_vec();
        let mut chunks = vec![&b",4,1,0,0>"[..]].into_iter();
        drain_into(&mut pending, Duration::from_secs(5), |buffer, _| match chunks.next() {
            Some(chunk) => {
                buffer[..chunk.len()].copy_from_slice(chunk);
                Ok(chunk.len())
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
        })?;
        assert_eq!(pending, b"<K100,4,1,0,0>".to_vec());
        Ok(())
    }

    #[test]
    fn test_drain_propagates_read_errors() {
        let mut pending = Vec::new();
        let result = drain_into(&mut pending, Duration::from_secs(5), |_, _| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        });
        assert_eq!(result.map_err(|err| err.kind()), Err(io::ErrorKind::BrokenPipe));
    }
}

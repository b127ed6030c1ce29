//! Simulated barcode reader for tests.
//!
//! [`MockTransport`] answers scripted commands and releases each reply one
//! chunk per poll of [`Transport::bytes_available`], so tests control exactly
//! how fast the receive buffer grows.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Transport, not_connected};

#[derive(Debug, Default)]
struct MockState {
    /// bytes received and not read yet
    inbound: Vec<u8>,
    /// reply chunks the device has not sent yet
    staged: VecDeque<Vec<u8>>,
    /// scripted replies keyed by the command that triggers them
    replies: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    /// every write, in order
    written: Vec<Vec<u8>>,
    closed: bool,
}

/// Scripted in-memory transport.
///
/// Clones share their state, so a test keeps one handle for scripting and
/// inspection while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// answer every write of `command` with `reply`, sent as one chunk
    pub fn reply_to(&self, command: &[u8], reply: &[u8]) {
        self.reply_in_chunks(command, &[reply]);
    }

    /// answer every write of `command` with `chunks`, one chunk per poll
    pub fn reply_in_chunks(&self, command: &[u8], chunks: &[&[u8]]) {
        let chunks = chunks.iter().map(|chunk| chunk.to_vec()).collect();
        self.state.lock().replies.push((command.to_vec(), chunks));
    }

    /// bytes the device sent without being asked, e.g. symbols in continuous mode
    pub fn push_inbound(&self, bytes: &[u8]) {
        self.state.lock().inbound.extend_from_slice(bytes);
    }

    /// every write so far, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl MockState {
    fn ensure_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(not_connected());
        }
        Ok(())
    }

    fn release_all(&mut self) {
        while let Some(chunk) = self.staged.pop_front() {
            self.inbound.extend(chunk);
        }
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.written.push(bytes.to_vec());
        let reply = state
            .replies
            .iter()
            .find(|(command, _)| command.as_slice() == bytes)
            .map(|(_, chunks)| chunks.clone());
        if let Some(chunks) = reply {
            state.staged.extend(chunks);
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.lock().ensure_open()
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        if let Some(chunk) = state.staged.pop_front() {
            state.inbound.extend(chunk);
        }
        Ok(state.inbound.len())
    }

    fn read_available(&mut self) -> io::Result<Vec<u8>> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        Ok(std::mem::take(&mut state.inbound))
    }

    fn read_line(&mut self, _timeout: Duration) -> io::Result<Vec<u8>> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.release_all();
        match memchr::memchr(b'\n', &state.inbound) {
            Some(end) => Ok(state.inbound.drain(..=end).collect()),
            None => Ok(std::mem::take(&mut state.inbound)),
        }
    }

    fn discard_input(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.inbound.clear();
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_is_released_one_chunk_per_poll() -> io::Result<()> {
        let mut transport = MockTransport::new();
        transport.reply_in_chunks(b"<K?>", &[b"<K100,4,1,0,0>", b"<K140,0>"]);

        assert_eq!(transport.bytes_available()?, 0);
        transport.write_all(b"<K?>")?;
        assert_eq!(transport.bytes_available()?, 14);
        assert_eq!(transport.bytes_available()?, 22);
        assert_eq!(transport.bytes_available()?, 22);
        assert_eq!(transport.read_available()?, b"<K100,4,1,0,0><K140,0>".to_vec());
        assert_eq!(transport.read_available()?, Vec::<u8>::new());
        Ok(())
    }

    #[test]
    fn test_read_line_splits_on_line_feed() -> io::Result<()> {
        let mut transport = MockTransport::new();
        transport.push_inbound(b"first\r\nsecond");
        assert_eq!(transport.read_line(Duration::ZERO)?, b"first\r\n".to_vec());
        assert_eq!(transport.read_line(Duration::ZERO)?, b"second".to_vec());
        Ok(())
    }

    #[test]
    fn test_closed_transport_fails() {
        let mut transport = MockTransport::new();
        let observer = transport.clone();
        assert!(transport.close().is_ok());
        assert!(observer.is_closed());
        let err = transport.write_all(b"<H>").expect_err("write after close");
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(transport.read_available().is_err());
        assert!(observer.written().is_empty());
    }
}

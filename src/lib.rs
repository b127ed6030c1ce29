//! Driver for Microscan MS3 barcode readers.
//!
//! The reader is configured through `<Kxxx,p1,p2,...>` text fragments sent
//! over a serial line. [`settings`] holds one typed value per setting family,
//! [`Configuration`] aggregates them and [`BarcodeReader`] talks to the device.

pub mod codec;
pub mod configuration;
pub mod error;
pub mod interface;
pub mod settings;
pub mod transport;

pub use configuration::{AnySetting, Configuration};
pub use error::{Error, Result};
pub use interface::BarcodeReader;

/// ask the device to report every setting
pub const REPORT_ALL_SETTINGS: &[u8] = b"<K?>";

/// stop decoding symbols, sent before exchanging configuration
pub const SUSPEND_SCANNING: &[u8] = b"<I>";

/// resume decoding symbols
pub const RESUME_SCANNING: &[u8] = b"<H>";

/// serial trigger used when the device has no trigger character configured
pub const READ_TRIGGER: &[u8] = b"*";

/// terminates every symbol the device outputs
pub const POSTAMBLE: &[u8] = b"\r\n";

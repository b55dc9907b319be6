//! Transport layer for event logger communication.
//!
//! This module provides the abstraction for the serial link to the device.
//! Currently only USB/Serial is implemented.

pub mod serial;

use std::future::Future;
use std::pin::Pin;
use std::time::SystemTime;

use bytes::Bytes;

use crate::error::Result;

/// Trait for transport implementations.
pub trait Transport: Send {
    /// Connects to the device.
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Disconnects from the device.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Sends raw data to the device.
    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Reads whatever bytes are currently available, waiting at most the
    /// configured read timeout. An empty buffer means no data this tick.
    fn read_available(&mut self) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;

    /// Reads one newline-terminated line, waiting at most the configured
    /// read timeout. A partial line present when the timeout expires is
    /// still delivered; `None` means nothing arrived or the bytes did not
    /// decode as UTF-8.
    fn read_line(&mut self)
    -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>>;

    /// Discards any bytes waiting in the OS input buffer.
    fn flush_input(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Toggles the DTR control line (assert then deassert) as an out-of-band
    /// "t=0" marker and returns the wall-clock instant of the toggle.
    fn sync(&mut self) -> Pin<Box<dyn Future<Output = Result<SystemTime>> + Send + '_>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

pub use serial::SerialTransport;

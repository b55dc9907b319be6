//! # eventlogger
//!
//! A Rust host-side driver for Hardware Event Logger devices.
//!
//! The device streams timestamped ADC samples and discrete event markers as
//! newline-delimited text over a serial link. This library reconstructs
//! typed records from that chunked byte stream, issues the device's text
//! commands, and builds convenience operations (sampling windows, averaging,
//! simulated clicks, firmware queries) on top.
//!
//! ## Features
//!
//! - Async/await based API using Tokio, single-task and poll-driven
//! - Chunk-boundary-invariant line framing with partial-line carry-over
//! - Pure, independently testable record parser
//! - Comprehensive error handling
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use eventlogger::EventLogger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), eventlogger::Error> {
//!     let mut logger = EventLogger::serial("/dev/ttyUSB0");
//!     logger.connect().await?;
//!
//!     if let Some(version) = logger.query_firmware_version().await? {
//!         println!("Connected to: {version}");
//!     }
//!
//!     // Mark t=0 on the device clock and stream for a second
//!     logger.sync().await?;
//!     logger.set_adc_reporting(true).await?;
//!     let mean = logger.average(Duration::from_secs(1)).await?;
//!     println!("Average ADC value: {mean:.1}");
//!
//!     logger.disconnect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Wire-level types (records, line framing, commands)
//! - [`transport`] - Transport implementations (currently USB/Serial)
//! - [`client`] - High-level [`EventLogger`] session

pub mod client;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use client::{EventLogger, FIRMWARE_ID, MAX_CLICK_DURATION_MS, SampleWindow};
pub use error::{Error, Result};
pub use protocol::{
    ADC_BIT_WIDTH, Command, EventKind, LineFramer, MAX_ADC_VALUE, Record, parse_record,
};
pub use transport::{SerialTransport, Transport, serial::list_ports};

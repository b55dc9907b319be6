//! Protocol definitions for event logger communication.
//!
//! This module contains the wire-level pieces:
//! - Record parsing (`timestamp:type` lines)
//! - Line framing over the chunked byte stream
//! - Host-to-device command tokens

pub mod command;
pub mod framer;
pub mod record;

pub use command::Command;
pub use framer::LineFramer;
pub use record::{ADC_BIT_WIDTH, EventKind, MAX_ADC_VALUE, Record, parse_record};

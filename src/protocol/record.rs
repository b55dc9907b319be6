//! Record parsing for the event logger wire format.
//!
//! The device emits one record per line, newline-terminated UTF-8 text:
//! ```text
//! <integer_microseconds>:<TYPE>
//! ```
//! where `<TYPE>` is either one of the four discrete event markers
//! (`M1`, `M2`, `PD`, `SW`) or a base-10 integer (an ADC sample magnitude).

/// ADC bit width of the logger hardware.
pub const ADC_BIT_WIDTH: u32 = 10;

/// Maximum ADC value, derived from the bit width. Sample values are
/// nominally in `[0, MAX_ADC_VALUE)`.
pub const MAX_ADC_VALUE: i32 = 1 << ADC_BIT_WIDTH;

/// Device tick unit: the timestamp field counts microseconds.
const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Discrete event markers the device can report instead of an ADC sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Mouse button 1 (`M1`).
    Mouse1,
    /// Mouse button 2 (`M2`).
    Mouse2,
    /// Photodiode threshold crossing (`PD`).
    Photodiode,
    /// Switch closure (`SW`).
    Switch,
}

impl EventKind {
    /// Parses an event kind from its wire token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "M1" => Some(Self::Mouse1),
            "M2" => Some(Self::Mouse2),
            "PD" => Some(Self::Photodiode),
            "SW" => Some(Self::Switch),
            _ => None,
        }
    }

    /// Returns the wire token for this event kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mouse1 => "M1",
            Self::Mouse2 => "M2",
            Self::Photodiode => "PD",
            Self::Switch => "SW",
        }
    }
}

/// A parsed record from the device stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record {
    /// An ADC sample. The value is not range-checked here; sampling
    /// operations apply the `[0, MAX_ADC_VALUE)` policy themselves.
    Sample {
        /// Device timestamp in seconds.
        timestamp: f64,
        /// Raw sample magnitude.
        value: i32,
    },
    /// A discrete event marker.
    Event {
        /// Device timestamp in seconds.
        timestamp: f64,
        /// Which marker fired.
        kind: EventKind,
    },
}

impl Record {
    /// Returns the device timestamp in seconds.
    #[must_use]
    pub const fn timestamp(&self) -> f64 {
        match self {
            Self::Sample { timestamp, .. } | Self::Event { timestamp, .. } => *timestamp,
        }
    }

    /// Returns true if this record is a discrete event marker.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(self, Self::Event { .. })
    }
}

/// Parses one line of device output into a [`Record`].
///
/// Returns `None` for anything that does not follow the `timestamp:type`
/// shape. Malformed lines are routine during stream resynchronization, so
/// rejection is ordinary control flow rather than an error.
#[must_use]
pub fn parse_record(line: &str) -> Option<Record> {
    let line = line.trim();
    let (ticks, token) = line.split_once(':')?;

    // Integer microsecond tick counter, parsed as a float for robustness
    // against incidental formatting.
    let micros: f64 = ticks.trim().parse().ok()?;
    if !micros.is_finite() {
        return None;
    }
    let timestamp = micros / MICROS_PER_SECOND;

    let token = token.trim();
    if let Some(kind) = EventKind::from_token(token) {
        return Some(Record::Event { timestamp, kind });
    }

    let value: i32 = token.parse().ok()?;
    Some(Record::Sample { timestamp, value })
}

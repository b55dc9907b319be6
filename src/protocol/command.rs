//! Host-to-device command tokens.
//!
//! Commands are short newline-terminated text tokens written to the serial
//! port. The device acknowledges nothing; only `Info` produces a reply.

use bytes::Bytes;

/// Commands accepted by the event logger firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Enable ADC value reporting over USB (`aon`).
    AdcOn,
    /// Disable ADC value reporting, reducing USB traffic (`aoff`).
    AdcOff,
    /// Engage the autoclick output (`con`).
    AutoclickOn,
    /// Release the autoclick output (`coff`).
    AutoclickOff,
    /// Request device info including the firmware revision (`i`).
    Info,
}

impl Command {
    /// Returns the wire token for this command.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::AdcOn => "aon",
            Self::AdcOff => "aoff",
            Self::AutoclickOn => "con",
            Self::AutoclickOff => "coff",
            Self::Info => "i",
        }
    }

    /// Encodes this command as a newline-terminated message.
    #[must_use]
    pub fn encode(self) -> Bytes {
        Bytes::from(format!("{}\n", self.token()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tokens() {
        assert_eq!(Command::AdcOn.token(), "aon");
        assert_eq!(Command::AdcOff.token(), "aoff");
        assert_eq!(Command::AutoclickOn.token(), "con");
        assert_eq!(Command::AutoclickOff.token(), "coff");
        assert_eq!(Command::Info.token(), "i");
    }

    #[test]
    fn test_command_encode_appends_newline() {
        assert_eq!(Command::AdcOn.encode(), Bytes::from_static(b"aon\n"));
        assert_eq!(Command::Info.encode(), Bytes::from_static(b"i\n"));
    }
}

use core::fmt::Write;

use heapless::{String, Vec};
use thiserror::Error;

use crate::tables::Waveform;

/// Size of the receive buffer, terminator slot included. Payloads of this length or longer are
/// dropped before any parsing.
pub const MAX_COMMAND_LEN: usize = 20;

/// A parsed `<selector>F<frequency>` command. The frequency is unchecked until
/// [`Command::validate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub waveform: Waveform,
    pub frequency_hz: u32,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("command of {0} bytes does not fit the 20 byte buffer")]
    TooLong(usize),
    #[error("command does not match <selector>F<frequency>")]
    Malformed,
    #[error("unknown wave selector {}{}", .0[0] as char, .0[1] as char)]
    UnknownSelector([u8; 2]),
    #[error("frequency {0} Hz is out of range")]
    FrequencyOutOfRange(u32),
}

impl Command {
    /// Parses raw bytes as delivered by the transport.
    ///
    /// Anything after a NUL is ignored, as is surrounding ASCII whitespace (terminals send `\r\n`).
    pub fn parse(bytes: &[u8]) -> Result<Self, CommandError> {
        if bytes.is_empty() {
            return Err(CommandError::Empty);
        }

        // one slot stays free for the terminator the C transport expects
        if bytes.len() >= MAX_COMMAND_LEN {
            return Err(CommandError::TooLong(bytes.len()));
        }
        let buf: Vec<u8, MAX_COMMAND_LEN> =
            Vec::from_slice(bytes).map_err(|_| CommandError::TooLong(bytes.len()))?;

        let text = match buf.iter().position(|&b| b == 0) {
            Some(nul) => &buf[..nul],
            None => &buf[..],
        };
        let text = text.trim_ascii();

        let (selector, rest) = match text {
            [a, b, b'F', rest @ ..] if !a.is_ascii_whitespace() && !b.is_ascii_whitespace() => ([*a, *b], rest),
            _ => return Err(CommandError::Malformed),
        };

        let frequency_hz = parse_decimal(rest)?;
        let waveform = Waveform::from_selector(selector).ok_or(CommandError::UnknownSelector(selector))?;

        Ok(Command { waveform, frequency_hz })
    }

    /// Accepts `1..=max_frequency_hz`, returning the frequency narrowed for storage.
    pub fn validate(&self, max_frequency_hz: u16) -> Result<u16, CommandError> {
        match self.frequency_hz {
            f if f == 0 || f > max_frequency_hz as u32 => Err(CommandError::FrequencyOutOfRange(f)),
            f => Ok(f as u16),
        }
    }

    /// Wire form of the command, e.g. `W3F100`.
    pub fn encode(&self) -> String<MAX_COMMAND_LEN> {
        let mut out = String::new();
        // "Wn" + "F" + at most ten digits always fits
        let _ = write!(out, "{}F{}", self.waveform.selector(), self.frequency_hz);
        out
    }
}

fn parse_decimal(digits: &[u8]) -> Result<u32, CommandError> {
    if digits.is_empty() {
        return Err(CommandError::Malformed);
    }

    let mut value: u32 = 0;
    let mut overflowed = false;
    for &d in digits {
        if !d.is_ascii_digit() {
            return Err(CommandError::Malformed);
        }
        match value.checked_mul(10).and_then(|v| v.checked_add((d - b'0') as u32)) {
            Some(v) => value = v,
            None => overflowed = true,
        }
    }

    if overflowed {
        return Err(CommandError::FrequencyOutOfRange(u32::MAX));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Command, CommandError> {
        Command::parse(s.as_bytes())
    }

    #[test]
    fn parses_each_selector() {
        assert_eq!(parse("W1F440"), Ok(Command { waveform: Waveform::Sine, frequency_hz: 440 }));
        assert_eq!(parse("W2F1"), Ok(Command { waveform: Waveform::Triangle, frequency_hz: 1 }));
        assert_eq!(parse("W3F10000"), Ok(Command { waveform: Waveform::Square, frequency_hz: 10_000 }));
    }

    #[test]
    fn tolerates_line_endings_and_padding() {
        let expected = Ok(Command { waveform: Waveform::Sine, frequency_hz: 440 });
        assert_eq!(parse("W1F440\r\n"), expected);
        assert_eq!(parse("  W1F440"), expected);
        assert_eq!(parse("W1F0440"), expected);
        assert_eq!(Command::parse(b"W1F440\0garbage"), expected);
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(parse("XYZ"), Err(CommandError::Malformed));
        assert_eq!(parse("W1"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F"), Err(CommandError::Malformed));
        assert_eq!(parse("W1X440"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F+440"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F-5"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F44a"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F4 40"), Err(CommandError::Malformed));
        assert_eq!(parse("W 1F440"), Err(CommandError::Malformed));
        assert_eq!(Command::parse(b"\0W1F440"), Err(CommandError::Malformed));
    }

    #[test]
    fn frequency_must_follow_f_directly() {
        assert_eq!(parse("W1F 440"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F\t440"), Err(CommandError::Malformed));
        assert_eq!(parse("W1F 440\r\n"), Err(CommandError::Malformed));
    }

    #[test]
    fn unknown_selector_is_reported() {
        assert_eq!(parse("W9F50"), Err(CommandError::UnknownSelector(*b"W9")));
        assert_eq!(parse("w1F50"), Err(CommandError::UnknownSelector(*b"w1")));
    }

    #[test]
    fn length_guard() {
        assert_eq!(Command::parse(b""), Err(CommandError::Empty));

        // 19 bytes is the longest payload that fits
        let longest = b"W1F0000000000000440";
        assert_eq!(longest.len(), MAX_COMMAND_LEN - 1);
        assert_eq!(Command::parse(longest), Ok(Command { waveform: Waveform::Sine, frequency_hz: 440 }));

        let too_long = b"W1F00000000000000440";
        assert_eq!(too_long.len(), MAX_COMMAND_LEN);
        assert_eq!(Command::parse(too_long), Err(CommandError::TooLong(MAX_COMMAND_LEN)));
        assert_eq!(Command::parse(&[b'7'; 64]), Err(CommandError::TooLong(64)));
    }

    #[test]
    fn huge_frequency_does_not_wrap() {
        assert_eq!(parse("W1F99999999999"), Err(CommandError::FrequencyOutOfRange(u32::MAX)));
        assert_eq!(parse("W1F4294967296"), Err(CommandError::FrequencyOutOfRange(u32::MAX)));
        assert_eq!(parse("W1F4294967295").map(|c| c.frequency_hz), Ok(u32::MAX));
    }

    #[test]
    fn validation_range() {
        let cmd = |f| Command { waveform: Waveform::Sine, frequency_hz: f };
        assert_eq!(cmd(0).validate(10_000), Err(CommandError::FrequencyOutOfRange(0)));
        assert_eq!(cmd(1).validate(10_000), Ok(1));
        assert_eq!(cmd(10_000).validate(10_000), Ok(10_000));
        assert_eq!(cmd(10_001).validate(10_000), Err(CommandError::FrequencyOutOfRange(10_001)));
        assert_eq!(cmd(20_000).validate(10_000), Err(CommandError::FrequencyOutOfRange(20_000)));
    }

    #[test]
    fn encodes_wire_form() {
        let cmd = Command { waveform: Waveform::Square, frequency_hz: 100 };
        assert_eq!(cmd.encode().as_str(), "W3F100");
        assert_eq!(Command::parse(cmd.encode().as_bytes()), Ok(cmd));
    }
}

//! Self-healing JSON decoding for search responses.
//!
//! The search endpoint occasionally emits bodies with stray control
//! characters, invalid escapes or non-UTF-8 bytes. Each failed parse locates the
//! offending byte, replaces it with a space and tries again, up to a ceiling.

use serde_json::{Value, error::Category};
use tracing::debug;

use crate::gdelt::errors::DecodeError;

pub const DEFAULT_MAX_TRIES: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Repaired {
    pub value: Value,
    /// Byte offsets replaced with a space, in repair order.
    pub repaired_offsets: Vec<usize>,
}

pub fn decode(bytes: &[u8], max_tries: usize) -> Result<Value, DecodeError> {
    decode_with_repairs(bytes, max_tries).map(|repaired| repaired.value)
}

pub fn decode_with_repairs(bytes: &[u8], max_tries: usize) -> Result<Repaired, DecodeError> {
    let mut buffer = bytes.to_vec();
    let mut repaired_offsets = Vec::new();

    loop {
        let offset = match parse(&buffer) {
            Ok(value) => {
                return Ok(Repaired {
                    value,
                    repaired_offsets,
                });
            }
            Err(offset) => offset?,
        };

        if repaired_offsets.len() >= max_tries {
            return Err(DecodeError::Exhausted { max_tries });
        }

        debug!(
            offset,
            attempt = repaired_offsets.len() + 1,
            "Replacing undecodable byte"
        );
        buffer[offset] = b' ';
        repaired_offsets.push(offset);
    }
}

/// Parses the buffer, or reports the byte offset to repair.
fn parse(buffer: &[u8]) -> Result<Value, Result<usize, DecodeError>> {
    let text = std::str::from_utf8(buffer).map_err(|e| Ok(e.valid_up_to()))?;
    serde_json::from_str(text).map_err(|e| locate(text, &e))
}

fn locate(text: &str, err: &serde_json::Error) -> Result<usize, DecodeError> {
    let irrecoverable = || DecodeError::Irrecoverable {
        reason: err.to_string(),
    };

    if err.classify() == Category::Eof || err.line() == 0 {
        return Err(irrecoverable());
    }

    let bytes = text.as_bytes();
    let line_start = if err.line() == 1 {
        0
    } else {
        bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(err.line() - 2)
            .map(|(idx, _)| idx + 1)
            .ok_or_else(irrecoverable)?
    };

    // Column 0 points just past a consumed newline.
    let offset = match err.column() {
        0 => line_start.checked_sub(1).ok_or_else(irrecoverable)?,
        column => line_start + column - 1,
    };

    if offset >= bytes.len() {
        return Err(irrecoverable());
    }

    // Escape errors are reported after the escaped character; the backslash is
    // the byte that has to go. A space at the offset means blanking it again
    // cannot make progress, which also points at a broken escape.
    if is_escape_error(err) || bytes[offset] == b' ' {
        return bytes[..=offset]
            .iter()
            .rposition(|b| *b == b'\\')
            .ok_or_else(irrecoverable);
    }

    Ok(offset)
}

fn is_escape_error(err: &serde_json::Error) -> bool {
    const ESCAPE_ERRORS: [&str; 4] = [
        "invalid escape",
        "lone leading surrogate in hex escape",
        "unexpected end of hex escape",
        "invalid unicode code point",
    ];
    let message = err.to_string();
    ESCAPE_ERRORS.iter().any(|prefix| message.starts_with(prefix))
}

//! Bit-exact text codec for single-precision values.
//!
//! Every float crossing the file boundary is carried as the eight hex digits
//! of its IEEE-754 bit pattern. Values are reinterpreted with
//! [`f32::from_bits`]/[`f32::to_bits`]; nothing is routed through `f64`, so
//! NaN payloads, signed zeros and subnormals survive unchanged.

use crate::error::{GoldenError, Result};

/// Literal line terminating one observation sequence or one output block.
///
/// Compared as text only; it is never decoded as a float.
pub const SENTINEL: &str = "FFFFFFFF";

/// Literal line closing a batch file.
pub const TERMINATOR: &str = "0";

/// What to do when a hex token cannot be decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HexPolicy {
    /// Report the malformed token as an error.
    #[default]
    Strict,
    /// Substitute `0.0`, log a warning and keep going.
    ///
    /// Mirrors the permissive behaviour of older reference scripts. A run
    /// using this policy can succeed while comparing against corrupted
    /// model values, so it is opt-in only.
    Lenient,
}

impl HexPolicy {
    /// Decode `text`, applying this policy to failures.
    pub fn decode(self, text: &str) -> Result<f32> {
        match (self, decode_hex_float(text)) {
            (_, Ok(v)) => Ok(v),
            (HexPolicy::Strict, Err(err)) => Err(err),
            (HexPolicy::Lenient, Err(err)) => {
                tracing::warn!(token = text, error = %err, "substituting 0.0 for malformed hex token");
                Ok(0.0)
            }
        }
    }
}

/// Interpret `text` as an unsigned 32-bit hex integer and reinterpret its
/// bits as an `f32`.
///
/// Surrounding whitespace is ignored. An optional `0x`/`0X` prefix is
/// accepted; a sign is not.
pub fn decode_hex_float(text: &str) -> Result<f32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(GoldenError::MalformedHex {
            token: text.to_string(),
            source: None,
        });
    }
    let bits = u32::from_str_radix(digits, 16).map_err(|e| GoldenError::MalformedHex {
        token: text.to_string(),
        source: Some(e),
    })?;
    Ok(f32::from_bits(bits))
}

/// Render the bit pattern of `value` as eight uppercase hex digits.
#[inline]
pub fn encode_hex_float(value: f32) -> String {
    format!("{:08X}", value.to_bits())
}

/// Render an integer in plain decimal.
#[inline]
pub fn encode_int(value: usize) -> String {
    value.to_string()
}

//! Textual frame input.
//!
//! Frames arrive from fixture files and the command line as hex text. Bytes
//! may be written as separate tokens (`55 81 00`, `0x55,0x81,0x00`) or as one
//! run of digits (`558100`); both forms may be mixed on a line.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("no hex bytes found")]
    Empty,
    #[error("invalid hex token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },
}

impl HexError {
    pub fn kind(&self) -> &'static str {
        "invalid_hex"
    }
}

/// Parse hex text into frame bytes.
///
/// # Examples
/// ```
/// use comchip_core::parse_hex_frame;
///
/// assert_eq!(parse_hex_frame("55 81 0x00,96FE").unwrap(), vec![0x55, 0x81, 0x00, 0x96, 0xFE]);
/// assert!(parse_hex_frame("5").is_err());
/// ```
pub fn parse_hex_frame(text: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = Vec::new();
    let tokens = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty());
    for token in tokens {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        let decoded = hex::decode(digits).map_err(|err| HexError::InvalidToken {
            token: token.to_string(),
            reason: err.to_string(),
        })?;
        if decoded.is_empty() {
            return Err(HexError::InvalidToken {
                token: token.to_string(),
                reason: "missing digits after prefix".to_string(),
            });
        }
        bytes.extend(decoded);
    }
    if bytes.is_empty() {
        return Err(HexError::Empty);
    }
    Ok(bytes)
}

/// Render bytes as space separated uppercase hex (`55 81 00`).
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

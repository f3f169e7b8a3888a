use thiserror::Error;

/// Structural check that rejected a frame.
///
/// # Examples
/// ```
/// use comchip_core::FrameError;
///
/// let err = FrameError::BadSync { received: 0xAA };
/// assert!(err.to_string().contains("invalid sync byte"));
/// assert_eq!(err.kind(), "bad_sync");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("invalid frame length: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid sync byte: expected 0x55, got 0x{received:02X}")]
    BadSync { received: u8 },
    #[error("invalid command id: expected 0x{expected:02X}, got 0x{received:02X}")]
    BadCommandId { expected: u8, received: u8 },
    #[error("checksum mismatch: calculated 0x{calculated:02X}, received 0x{received:02X}")]
    ChecksumMismatch { calculated: u8, received: u8 },
}

impl FrameError {
    /// Stable identifier used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FrameError::LengthMismatch { .. } => "length_mismatch",
            FrameError::BadSync { .. } => "bad_sync",
            FrameError::BadCommandId { .. } => "bad_command_id",
            FrameError::ChecksumMismatch { .. } => "checksum_mismatch",
        }
    }
}

/// Reasons a [`FrameLayout`](super::layout::FrameLayout) cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("unsupported frame length {frame_len}: must be within {min}..={max}")]
    FrameLength {
        frame_len: usize,
        min: usize,
        max: usize,
    },
    #[error("checksum span {start}..{end} must start at or after {min_start} and end at {expected_end}")]
    ChecksumSpan {
        start: usize,
        end: usize,
        min_start: usize,
        expected_end: usize,
    },
    #[error("secondary status offset {offset} must fall within {min}..{max}")]
    SecondaryOffset {
        offset: usize,
        min: usize,
        max: usize,
    },
    #[error("status mask '{name}' must not be zero")]
    EmptyMask { name: &'static str },
    #[error("status masks '{first}' and '{second}' overlap")]
    OverlappingMasks {
        first: &'static str,
        second: &'static str,
    },
    #[error("invalid layout JSON: {0}")]
    Json(String),
}

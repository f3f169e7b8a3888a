use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

pub const SYNC_SENTINEL: u8 = 0x55;
pub const STATUS_RESPONSE_CID: u8 = 0x81;

pub const SYNC_OFFSET: usize = 0;
pub const COMMAND_ID_OFFSET: usize = 1;
pub const STATUS_OFFSET: usize = 2;
pub const VOLTAGE_RANGE: Range<usize> = 3..5;

pub const MIN_FRAME_LEN: usize = VOLTAGE_RANGE.end + 1;
pub const MAX_FRAME_LEN: usize = 255;

pub const COMPACT_FRAME_LEN: usize = 6;
pub const EXTENDED_FRAME_LEN: usize = 7;
pub const EXTENDED_SECONDARY_OFFSET: usize = 5;

pub const BIT_ERROR: u8 = 1 << 7;
pub const BIT_UNDER_VOLTAGE: u8 = 1 << 6;
pub const BIT_NOT_SUPPORTED: u8 = 1 << 5;
pub const BIT_DISCHARGE_INHIBIT: u8 = 1 << 0;

/// Bit masks applied to the status byte. A set bit means the condition in
/// the field name holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBits {
    pub error: u8,
    pub under_voltage: u8,
    pub not_supported: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_inhibit: Option<u8>,
}

/// Wire layout of one protocol variant.
///
/// Sync, command id, status and voltage offsets are fixed; the checksum is
/// always the last byte. Everything that differs between firmware revisions
/// lives here and is passed to the decoder explicitly.
///
/// # Examples
/// ```
/// use comchip_core::Variant;
///
/// let layout = Variant::Compact.layout();
/// assert_eq!(layout.frame_len, 6);
/// assert_eq!(layout.checksum_offset(), 5);
/// assert!(layout.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameLayout {
    pub frame_len: usize,
    /// Response code the command id byte must carry, if checked at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_command_id: Option<u8>,
    pub status: StatusBits,
    /// Bytes covered by the checksum (the command id seeds it separately).
    pub checksum_span: Range<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_status_offset: Option<usize>,
}

impl FrameLayout {
    pub fn checksum_offset(&self) -> usize {
        self.frame_len.saturating_sub(1)
    }

    /// Parse a user layout from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layout: FrameLayout =
            serde_json::from_str(json).map_err(|err| LayoutError::Json(err.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&self.frame_len) {
            return Err(LayoutError::FrameLength {
                frame_len: self.frame_len,
                min: MIN_FRAME_LEN,
                max: MAX_FRAME_LEN,
            });
        }

        let checksum_offset = self.checksum_offset();
        let span = &self.checksum_span;
        if span.start < STATUS_OFFSET || span.start > span.end || span.end != checksum_offset {
            return Err(LayoutError::ChecksumSpan {
                start: span.start,
                end: span.end,
                min_start: STATUS_OFFSET,
                expected_end: checksum_offset,
            });
        }

        if let Some(offset) = self.secondary_status_offset {
            if offset < VOLTAGE_RANGE.end || offset >= checksum_offset {
                return Err(LayoutError::SecondaryOffset {
                    offset,
                    min: VOLTAGE_RANGE.end,
                    max: checksum_offset,
                });
            }
        }

        self.validate_masks()
    }

    fn validate_masks(&self) -> Result<(), LayoutError> {
        let mut masks = vec![
            ("error", self.status.error),
            ("under_voltage", self.status.under_voltage),
            ("not_supported", self.status.not_supported),
        ];
        if let Some(mask) = self.status.discharge_inhibit {
            masks.push(("discharge_inhibit", mask));
        }

        for (index, &(name, mask)) in masks.iter().enumerate() {
            if mask == 0 {
                return Err(LayoutError::EmptyMask { name });
            }
            if let Some(&(other, _)) = masks[index + 1..]
                .iter()
                .find(|(_, other_mask)| other_mask & mask != 0)
            {
                return Err(LayoutError::OverlappingMasks {
                    first: name,
                    second: other,
                });
            }
        }
        Ok(())
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Variant::default().layout()
    }
}

/// Named protocol variants found in deployed firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// 6-byte frame, any command id, discharge flag in status bit 0.
    Compact,
    /// 7-byte status response (CID 0x81) with a trailing secondary status byte.
    #[default]
    Extended,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Compact, Variant::Extended];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Compact => "compact",
            Variant::Extended => "extended",
        }
    }

    pub fn layout(self) -> FrameLayout {
        match self {
            Variant::Compact => FrameLayout {
                frame_len: COMPACT_FRAME_LEN,
                expected_command_id: None,
                status: StatusBits {
                    error: BIT_ERROR,
                    under_voltage: BIT_UNDER_VOLTAGE,
                    not_supported: BIT_NOT_SUPPORTED,
                    discharge_inhibit: Some(BIT_DISCHARGE_INHIBIT),
                },
                checksum_span: STATUS_OFFSET..COMPACT_FRAME_LEN - 1,
                secondary_status_offset: None,
            },
            Variant::Extended => FrameLayout {
                frame_len: EXTENDED_FRAME_LEN,
                expected_command_id: Some(STATUS_RESPONSE_CID),
                status: StatusBits {
                    error: BIT_ERROR,
                    under_voltage: BIT_UNDER_VOLTAGE,
                    not_supported: BIT_NOT_SUPPORTED,
                    discharge_inhibit: None,
                },
                checksum_span: STATUS_OFFSET..EXTENDED_FRAME_LEN - 1,
                secondary_status_offset: Some(EXTENDED_SECONDARY_OFFSET),
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown variant '{value}' (expected compact or extended)"))
    }
}

use serde::{Deserialize, Serialize};

use super::error::FrameError;
use super::layout::{self, FrameLayout, Variant};
use super::reader::FrameReader;
use crate::checksum::verify_checksum;

/// Battery status carried by a validated frame.
///
/// `voltage` is the raw big-endian field in millivolts; converting to volts
/// is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedStatus {
    pub command_id: u8,
    pub voltage: u16,
    pub has_error: bool,
    pub under_voltage: bool,
    pub supported: bool,
    /// Present only for layouts that carry a discharge bit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_allowed: Option<bool>,
    /// Raw secondary status byte, for layouts that carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_status: Option<u8>,
}

impl DecodedStatus {
    pub fn voltage_ok(&self) -> bool {
        !self.under_voltage
    }
}

/// Validate `frame` against `layout` and decode its status fields.
///
/// Checks run in order: length, sync byte, command id (when the layout pins
/// one), checksum. The first failing check is returned and no field is read.
///
/// # Examples
/// ```
/// use comchip_core::{FrameError, Variant, decode};
///
/// let layout = Variant::Compact.layout();
/// let status = decode(&[0x55, 0x81, 0x00, 0x96, 0xFE, 0xE8], &layout)?;
/// assert_eq!(status.voltage, 38654);
/// assert!(status.supported && !status.has_error);
///
/// let err = decode(&[0x55, 0x81, 0x00, 0x96, 0xFE], &layout).unwrap_err();
/// assert!(matches!(err, FrameError::LengthMismatch { expected: 6, actual: 5 }));
/// # Ok::<(), FrameError>(())
/// ```
pub fn decode(frame: &[u8], layout: &FrameLayout) -> Result<DecodedStatus, FrameError> {
    let result = decode_checked(frame, layout);
    match &result {
        Ok(status) => log::trace!("frame {:02X?} decoded: {:?}", frame, status),
        Err(err) => log::debug!("frame {:02X?} rejected: {}", frame, err),
    }
    result
}

impl Variant {
    /// Decode `frame` with this variant's preset layout.
    pub fn decode(self, frame: &[u8]) -> Result<DecodedStatus, FrameError> {
        decode(frame, &self.layout())
    }
}

fn decode_checked(frame: &[u8], layout: &FrameLayout) -> Result<DecodedStatus, FrameError> {
    let reader = FrameReader::new(frame);
    reader.require_len(layout.frame_len)?;

    let sync = reader.read_u8(layout::SYNC_OFFSET)?;
    if sync != layout::SYNC_SENTINEL {
        return Err(FrameError::BadSync { received: sync });
    }

    let command_id = reader.read_u8(layout::COMMAND_ID_OFFSET)?;
    if let Some(expected) = layout.expected_command_id {
        if command_id != expected {
            return Err(FrameError::BadCommandId {
                expected,
                received: command_id,
            });
        }
    }

    let covered = reader.read_slice(layout.checksum_span.clone())?;
    let received = reader.read_u8(layout.checksum_offset())?;
    verify_checksum(command_id, covered, received)?;

    let status = reader.read_u8(layout::STATUS_OFFSET)?;
    let voltage = reader.read_u16_be(layout::VOLTAGE_RANGE.start)?;
    let bits = &layout.status;
    let secondary_status = layout
        .secondary_status_offset
        .map(|offset| reader.read_u8(offset))
        .transpose()?;

    Ok(DecodedStatus {
        command_id,
        voltage,
        has_error: status & bits.error != 0,
        under_voltage: status & bits.under_voltage != 0,
        supported: status & bits.not_supported == 0,
        discharge_allowed: bits.discharge_inhibit.map(|mask| status & mask == 0),
        secondary_status,
    })
}

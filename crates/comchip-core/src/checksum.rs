//! COMChip checksum engine.
//!
//! The checksum is seeded with the command id and accumulates the data span
//! in a 16-bit register. Whenever the register reaches 256 it is reduced by
//! 255 (not 256), so a carry out of bit 7 is folded back in as `+1`. The
//! result is the bitwise complement of the low byte. Device firmware computes
//! it this way; ordinary modulo-256 arithmetic produces different values.

use crate::frame::error::FrameError;

const FOLD_THRESHOLD: u16 = 256;
const FOLD_AMOUNT: u16 = 255;

/// Compute the checksum of `data`, seeded with `seed` (the command id).
///
/// # Examples
/// ```
/// use comchip_core::compute_checksum;
///
/// assert_eq!(compute_checksum(0x81, &[0x00, 0x96, 0xFE]), 0xE8);
/// assert_eq!(compute_checksum(0x00, &[]), 0xFF);
/// ```
pub fn compute_checksum(seed: u8, data: &[u8]) -> u8 {
    let mut acc = u16::from(seed);
    for &byte in data {
        acc += u16::from(byte);
        if acc >= FOLD_THRESHOLD {
            acc -= FOLD_AMOUNT;
        }
    }
    // acc stays below 256 after each fold.
    !(acc as u8)
}

/// Compare the checksum of `data` against the `received` trailer byte.
pub fn verify_checksum(seed: u8, data: &[u8], received: u8) -> Result<(), FrameError> {
    let calculated = compute_checksum(seed, data);
    if calculated != received {
        return Err(FrameError::ChecksumMismatch {
            calculated,
            received,
        });
    }
    Ok(())
}

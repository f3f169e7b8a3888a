use std::ops::Range;

use super::error::FrameError;

/// Bounds-checked access to a received frame.
///
/// Every read reports a [`FrameError::LengthMismatch`] instead of panicking,
/// so a layout that slipped past validation still cannot index out of range.
/// For a read past the end of the frame, `expected` is the shortest frame
/// length that would hold every byte the read asked for. It is always larger
/// than `actual`, and it saturates at `usize::MAX`.
pub struct FrameReader<'a> {
    frame: &'a [u8],
}

impl<'a> FrameReader<'a> {
    pub fn new(frame: &'a [u8]) -> Self {
        Self { frame }
    }

    pub fn require_len(&self, expected: usize) -> Result<(), FrameError> {
        if self.frame.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: self.frame.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, FrameError> {
        let [byte] = self.read_array::<1>(offset)?;
        Ok(byte)
    }

    pub fn read_u16_be(&self, offset: usize) -> Result<u16, FrameError> {
        self.read_array(offset).map(u16::from_be_bytes)
    }

    /// Read the bytes in `range`. A range whose end lies before its start is
    /// read as empty.
    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], FrameError> {
        let len = range.end.saturating_sub(range.start);
        self.read_at(range.start, len)
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], FrameError> {
        let bytes = self.read_at(offset, N)?;
        bytes.try_into().map_err(|_| self.past_end(offset, N))
    }

    fn read_at(&self, offset: usize, len: usize) -> Result<&'a [u8], FrameError> {
        let end = offset
            .checked_add(len)
            .ok_or_else(|| self.past_end(offset, len))?;
        self.frame
            .get(offset..end)
            .ok_or_else(|| self.past_end(offset, len))
    }

    fn past_end(&self, offset: usize, len: usize) -> FrameError {
        FrameError::LengthMismatch {
            expected: offset.saturating_add(len),
            actual: self.frame.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FrameReader;
    use crate::frame::error::FrameError;

    #[test]
    fn require_len_is_exact() {
        let reader = FrameReader::new(&[0x55, 0x81, 0x00]);
        assert!(reader.require_len(3).is_ok());
        assert_eq!(
            reader.require_len(6).unwrap_err(),
            FrameError::LengthMismatch {
                expected: 6,
                actual: 3,
            }
        );
        assert!(reader.require_len(2).is_err());
    }

    #[test]
    fn reads_big_endian_words() {
        let reader = FrameReader::new(&[0x55, 0x81, 0x00, 0x96, 0xFE]);
        assert_eq!(reader.read_u16_be(3).unwrap(), 0x96FE);
    }

    #[test]
    fn out_of_range_reads_are_errors() {
        let reader = FrameReader::new(&[0x55, 0x81]);
        assert!(reader.read_u8(2).is_err());
        assert!(reader.read_slice(1..4).is_err());
        assert!(reader.read_u16_be(1).is_err());
    }

    #[test]
    fn past_end_reports_the_frame_length_needed() {
        let reader = FrameReader::new(&[0x55, 0x81]);
        let short = |expected| FrameError::LengthMismatch {
            expected,
            actual: 2,
        };

        assert_eq!(reader.read_u8(2).unwrap_err(), short(3));
        assert_eq!(reader.read_u16_be(1).unwrap_err(), short(3));
        assert_eq!(reader.read_slice(1..4).unwrap_err(), short(4));
        assert_eq!(reader.read_slice(4..2).unwrap_err(), short(4));
        assert_eq!(reader.read_u8(usize::MAX).unwrap_err(), short(usize::MAX));
        assert_eq!(reader.read_u16_be(usize::MAX).unwrap_err(), short(usize::MAX));
    }

    #[test]
    fn inverted_range_reads_as_empty() {
        let reader = FrameReader::new(&[0x55, 0x81, 0x00]);
        assert_eq!(reader.read_slice(2..1).unwrap(), &[] as &[u8]);
    }
}

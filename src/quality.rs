//! Phred+33 quality scores and the Illumina 8-bin quantization table
//!
//! A quality span is the raw ASCII text of a record's quality string. Each byte
//! encodes a score in `[0, 63]` as `score + 33`. The [`QualityTable`] maps raw
//! scores to a representative score and is applied byte-for-byte to a span,
//! either rewriting it ([`QualityTable::quantize_span`]) or checking that it is
//! already a fixed point of the table ([`QualityTable::verify_span`]).

use crate::error::{QualityError, Result};

/// ASCII offset of the Phred+33 encoding
pub const PHRED_OFFSET: u8 = 33;

/// Highest raw score representable by a [`QualityTable`]
pub const MAX_SCORE: u8 = 63;

/// Number of entries in a [`QualityTable`]
pub const TABLE_SIZE: usize = MAX_SCORE as usize + 1;

/// The Illumina 8-bin table, raw score -> representative score
pub const IL8B: [u8; TABLE_SIZE] = [
    0, 1, 6, 6, 6, 6, 6, 6, 6, 6, 15, 15, 15, 15, 15, 15, //
    15, 15, 15, 15, 22, 22, 22, 22, 22, 27, 27, 27, 27, 27, 33, 33, //
    33, 33, 33, 37, 37, 37, 37, 37, 40, 40, 40, 40, 40, 40, 40, 40, //
    40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, 40, //
];

/// Decodes one Phred+33 byte to its raw score
///
/// # Arguments
///
/// * `byte` - The encoded quality byte
/// * `position` - Offset of the byte within its span, reported on failure
pub fn decode(byte: u8, position: usize) -> Result<u8> {
    match byte.checked_sub(PHRED_OFFSET) {
        Some(score) if score <= MAX_SCORE => Ok(score),
        _ => Err(QualityError::InvalidQualityByte { byte, position }.into()),
    }
}

/// Encodes a raw score back to its Phred+33 byte
#[inline]
#[must_use]
pub fn encode(score: u8) -> u8 {
    score + PHRED_OFFSET
}

/// The first position in a span that is not a fixed point of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    /// 0-based offset within the span
    pub position: usize,
    /// The byte found at that offset
    pub found: u8,
    /// The byte the table maps it to
    pub expected: u8,
}

/// A fixed mapping from raw score to representative score
///
/// The table is plain data: it is built once and handed to whichever
/// transform needs it, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityTable {
    bins: [u8; TABLE_SIZE],
}
impl Default for QualityTable {
    fn default() -> Self {
        Self::illumina_8bin()
    }
}
impl QualityTable {
    /// The Illumina 8-bin (IL8B) table
    #[must_use]
    pub const fn illumina_8bin() -> Self {
        Self { bins: IL8B }
    }

    /// Representative score for a raw score
    #[inline]
    #[must_use]
    pub fn bin(&self, score: u8) -> u8 {
        self.bins[score as usize]
    }

    /// Quantizes a single Phred+33 byte
    pub fn quantize_byte(&self, byte: u8, position: usize) -> Result<u8> {
        decode(byte, position).map(|score| encode(self.bin(score)))
    }

    /// Rewrites every byte of the span in place
    ///
    /// Bytes already rewritten stay rewritten if the call fails part way; the
    /// caller is expected to abandon the record in that case.
    pub fn quantize_span(&self, span: &mut [u8]) -> Result<()> {
        for (position, byte) in span.iter_mut().enumerate() {
            *byte = self.quantize_byte(*byte, position)?;
        }
        Ok(())
    }

    /// Checks that every byte of the span is a fixed point of the table
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The span conforms to the table
    /// * `Ok(Some(mismatch))` - The first non-conforming byte; later bytes are not inspected
    /// * `Err(Error)` - A byte outside the Phred+33 range was found first
    pub fn verify_span(&self, span: &[u8]) -> Result<Option<Mismatch>> {
        for (position, &found) in span.iter().enumerate() {
            let expected = self.quantize_byte(found, position)?;
            if found != expected {
                return Ok(Some(Mismatch {
                    position,
                    found,
                    expected,
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::{prop_assert_eq, proptest};

    #[test]
    fn test_table_is_step_function() {
        let table = QualityTable::illumina_8bin();
        for score in 1..=MAX_SCORE {
            assert!(table.bin(score) >= table.bin(score - 1));
        }
        assert_eq!(table.bin(0), 0);
        assert_eq!(table.bin(1), 1);
        assert_eq!(table.bin(9), 6);
        assert_eq!(table.bin(10), 15);
        assert_eq!(table.bin(24), 22);
        assert_eq!(table.bin(25), 27);
        assert_eq!(table.bin(34), 33);
        assert_eq!(table.bin(39), 37);
        assert_eq!(table.bin(40), 40);
        assert_eq!(table.bin(63), 40);
    }

    #[test]
    fn test_representatives() {
        let table = QualityTable::default();
        let mut reps: Vec<u8> = (0..=MAX_SCORE).map(|s| table.bin(s)).collect();
        reps.dedup();
        assert_eq!(reps, vec![0, 1, 6, 15, 22, 27, 33, 37, 40]);
    }

    #[test]
    fn test_quantize_span() -> Result<()> {
        let table = QualityTable::default();
        // '+' = 10, '5' = 20, '?' = 30, 'I' = 40, '#' = 2
        let mut span = b"+5?I#".to_vec();
        table.quantize_span(&mut span)?;
        assert_eq!(span, vec![15 + 33, 22 + 33, 33 + 33, 40 + 33, 6 + 33]);
        Ok(())
    }

    #[test]
    fn test_quantize_at_forty_is_unchanged() -> Result<()> {
        let table = QualityTable::default();
        let mut span = b"IIIIII".to_vec();
        table.quantize_span(&mut span)?;
        assert_eq!(span, b"IIIIII");
        Ok(())
    }

    #[test]
    fn test_quantize_rejects_out_of_range() {
        let table = QualityTable::default();
        let mut span = b"II II".to_vec();
        let err = table.quantize_span(&mut span).unwrap_err();
        assert!(matches!(
            err,
            Error::Quality(QualityError::InvalidQualityByte {
                byte: b' ',
                position: 2
            })
        ));

        let mut span = vec![b'I', 97];
        assert!(table.quantize_span(&mut span).is_err());
    }

    #[test]
    fn test_verify_span() -> Result<()> {
        let table = QualityTable::default();
        assert_eq!(table.verify_span(b"I'0")?, None);
        assert_eq!(table.verify_span(b"")?, None);

        let mismatch = table.verify_span(b"II5I")?.unwrap();
        assert_eq!(mismatch.position, 2);
        assert_eq!(mismatch.found, b'5');
        assert_eq!(mismatch.expected, 22 + 33);
        Ok(())
    }

    proptest! {
        #[test]
        fn quantize_is_idempotent(byte in 33u8..=96) {
            let table = QualityTable::illumina_8bin();
            let once = table.quantize_byte(byte, 0).unwrap();
            let twice = table.quantize_byte(once, 0).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn quantized_spans_verify(span in proptest::collection::vec(33u8..=96, 0..200)) {
            let table = QualityTable::illumina_8bin();
            let mut span = span;
            table.quantize_span(&mut span).unwrap();
            prop_assert_eq!(table.verify_span(&span).unwrap(), None);
        }
    }
}

//! P-Block lossy quantization of quality scores
//!
//! Implements the greedy procedure of Canovas et al. (2014), *Lossy compression
//! of quality scores in genomic data*, Bioinformatics 30(15):2130-6.
//!
//! A quality array is cut into maximal runs, left to right, such that the
//! spread `max - min` of each run never exceeds `two_p`. Every position in a
//! run is then replaced by the run's midpoint `(min + max) / 2`.

use crate::error::Result;
use crate::quality;

/// A maximal run `[start, end)` produced by a single greedy pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PBlockRun {
    pub start: usize,
    pub end: usize,
    pub min: u8,
    pub max: u8,
}
impl PBlockRun {
    fn open(start: usize, value: u8) -> Self {
        Self {
            start,
            end: start + 1,
            min: value,
            max: value,
        }
    }

    /// Attempts to grow the run by one value without exceeding the spread
    fn extend(&mut self, value: u8, two_p: u32) -> bool {
        if (self.min..=self.max).contains(&value) {
            // already representable
        } else if value > self.max && u32::from(value - self.min) <= two_p {
            self.max = value;
        } else if value < self.min && u32::from(self.max - value) <= two_p {
            self.min = value;
        } else {
            return false;
        }
        self.end += 1;
        true
    }

    /// The value assigned to every position of the run
    #[must_use]
    pub fn representative(&self) -> u8 {
        // both bounds fit in u8, so their floor average does too
        ((u16::from(self.min) + u16::from(self.max)) / 2) as u8
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Partitions `values` into P-Block runs
///
/// The runs cover `[0, values.len())` exactly, in order. An empty array has no runs.
#[must_use]
pub fn runs(values: &[u8], two_p: u32) -> Vec<PBlockRun> {
    let mut runs = Vec::new();
    let Some((&first, rest)) = values.split_first() else {
        return runs;
    };
    let mut current = PBlockRun::open(0, first);
    for (offset, &value) in rest.iter().enumerate() {
        if !current.extend(value, two_p) {
            runs.push(current);
            current = PBlockRun::open(offset + 1, value);
        }
    }
    runs.push(current);
    runs
}

/// Replaces every value by the representative of its run, in place
///
/// Returns the number of runs. Empty input is left untouched.
pub fn apply(values: &mut [u8], two_p: u32) -> usize {
    let runs = runs(values, two_p);
    for run in &runs {
        values[run.start..run.end].fill(run.representative());
    }
    runs.len()
}

/// The P-Block engine bound to a spread threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PBlock {
    two_p: u32,
}
impl PBlock {
    /// Creates an engine with threshold `two_p` (twice the precision `p`)
    #[must_use]
    pub fn new(two_p: u32) -> Self {
        Self { two_p }
    }

    #[must_use]
    pub fn two_p(&self) -> u32 {
        self.two_p
    }

    /// Compresses a Phred+33 quality span in place
    ///
    /// Every byte is decoded first, so a byte outside `[33, 96]` fails the call
    /// before anything is written.
    pub fn compress_span(&self, span: &mut [u8]) -> Result<usize> {
        for (position, byte) in span.iter_mut().enumerate() {
            *byte = quality::decode(*byte, position)?;
        }
        let n_runs = apply(span, self.two_p);
        for byte in span.iter_mut() {
            *byte = quality::encode(*byte);
        }
        Ok(n_runs)
    }
}

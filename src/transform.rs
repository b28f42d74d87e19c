//! Per-record quality transforms
//!
//! A [`Transform`] is chosen once, when a tool starts, and is then applied to
//! every record the walker yields. Each variant decides what (if anything) is
//! written for a record.

use std::fmt;
use std::io::Write;

use tracing::debug;

use crate::error::{MalformedRecordError, Result};
use crate::io::BoxedRead;
use crate::pblock::PBlock;
use crate::quality::{Mismatch, QualityTable};
use crate::walker::{content_len, LineReader, Record};

/// A stream of replacement quality lines, one per record with a quality span
pub struct QualitySource {
    reader: LineReader<BoxedRead>,
    line: Vec<u8>,
}
impl QualitySource {
    pub fn new(reader: BoxedRead) -> Self {
        Self::from_line_reader(LineReader::new(reader))
    }

    pub fn from_line_reader(reader: LineReader<BoxedRead>) -> Self {
        Self {
            reader,
            line: Vec::new(),
        }
    }

    pub(crate) fn set_max_line_len(&mut self, max_line_len: usize) {
        self.reader.set_max_line_len(max_line_len);
    }

    /// The next replacement, without its terminator
    fn next_line(&mut self, record: usize) -> Result<&[u8]> {
        self.line.clear();
        if !self.reader.read_line(&mut self.line)? {
            return Err(MalformedRecordError::QualityStreamExhausted(record).into());
        }
        Ok(&self.line[..content_len(&self.line)])
    }

    /// Whether at least one more replacement line is waiting in the stream
    ///
    /// Consumes that line if present.
    pub fn has_remaining(&mut self) -> Result<bool> {
        self.line.clear();
        self.reader.read_line(&mut self.line)
    }
}

/// Outcome of a conformance check over a whole input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every quality byte is a fixed point of the table
    Conformant,
    /// The first offending byte; nothing after it was inspected
    NonConformant {
        /// 1-based record number
        record: usize,
        mismatch: Mismatch,
    },
}
impl Verdict {
    #[must_use]
    pub fn is_conformant(&self) -> bool {
        matches!(self, Self::Conformant)
    }

    /// The one-line report printed by the `check` tool
    #[must_use]
    pub fn report(&self, input: &str) -> String {
        match self {
            Self::Conformant => {
                format!("IL8B:YES - File {input} has been quantized with Illumina 8bin")
            }
            Self::NonConformant { .. } => {
                format!("IL8B:NO - File {input} is NOT quantized with Illumina 8bin")
            }
        }
    }
}

/// What the pipeline should do after a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Stop reading; the verdict is final
    Halt(Verdict),
}

/// The transform applied to each located quality span
pub enum Transform {
    /// Rewrite each span through the table and pass the record through
    Quantize(QualityTable),
    /// Check each span against the table, stopping at the first mismatch; writes nothing
    Verify(QualityTable),
    /// Rewrite each span with P-Block and pass the record through
    Compress(PBlock),
    /// Write only the span bytes, one line per record with a span
    Extract,
    /// Substitute a line from a second stream for each span and pass the record through
    MergeInject(QualitySource),
}
impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantize(table) => f.debug_tuple("Quantize").field(table).finish(),
            Self::Verify(table) => f.debug_tuple("Verify").field(table).finish(),
            Self::Compress(engine) => f.debug_tuple("Compress").field(engine).finish(),
            Self::Extract => f.write_str("Extract"),
            Self::MergeInject(_) => f.write_str("MergeInject"),
        }
    }
}
impl Transform {
    /// Short name used in log output
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quantize(_) => "quantize",
            Self::Verify(_) => "verify",
            Self::Compress(_) => "compress",
            Self::Extract => "extract",
            Self::MergeInject(_) => "merge",
        }
    }

    /// The merge stream, for transforms that read one
    pub fn quality_source(&mut self) -> Option<&mut QualitySource> {
        match self {
            Self::MergeInject(source) => Some(source),
            _ => None,
        }
    }

    /// Whether a finished run of this transform yields a [`Verdict`]
    #[must_use]
    pub fn is_check(&self) -> bool {
        matches!(self, Self::Verify(_))
    }

    /// Applies the transform to one record and writes its output, if any
    pub fn apply<W: Write>(&mut self, record: &mut Record, out: &mut W) -> Result<Step> {
        match self {
            Self::Quantize(table) => {
                if let Some(qual) = record.qual_mut() {
                    table.quantize_span(qual)?;
                }
                out.write_all(record.data())?;
            }
            Self::Verify(table) => {
                if let Some(qual) = record.qual() {
                    if let Some(mismatch) = table.verify_span(qual)? {
                        debug!(
                            record = record.number(),
                            position = mismatch.position,
                            found = mismatch.found,
                            expected = mismatch.expected,
                            "quality byte is not a table representative"
                        );
                        return Ok(Step::Halt(Verdict::NonConformant {
                            record: record.number(),
                            mismatch,
                        }));
                    }
                }
            }
            Self::Compress(engine) => {
                if let Some(qual) = record.qual_mut() {
                    engine.compress_span(qual)?;
                }
                out.write_all(record.data())?;
            }
            Self::Extract => {
                if let Some(qual) = record.qual() {
                    out.write_all(qual)?;
                    out.write_all(b"\n")?;
                }
            }
            Self::MergeInject(source) => {
                if record.span().is_some() {
                    let line = source.next_line(record.number())?;
                    record.replace_qual(line);
                }
                out.write_all(record.data())?;
            }
        }
        Ok(Step::Continue)
    }
}

//! The read/transform/write loop
//!
//! A [`Pipeline`] owns one record walker, one [`Transform`] and one output
//! sink. Records are processed strictly in input order and written as soon as
//! they are transformed.
//!
//! # Example
//!
//! ```rust
//! use qscores::{PipelineBuilder, QualityTable, SeqFormat, Transform};
//!
//! let input = b"@r1\nACGT\n+\n+5?I\n";
//! let mut output = Vec::new();
//! let summary = PipelineBuilder::new(Transform::Quantize(QualityTable::illumina_8bin()))
//!     .format(SeqFormat::Fastq)
//!     .build(&input[..], &mut output)
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(summary.records, 1);
//! assert_eq!(output, b"@r1\nACGT\n+\n07BI\n");
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::io::{BoxedRead, BoxedWrite, InputSource, SeqFormat};
use crate::transform::{Step, Transform, Verdict};
use crate::walker::{LineReader, RecordWalker, DEFAULT_MAX_LINE_LEN};

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records read (header lines count as records)
    pub records: usize,
    /// Records that carried a quality span
    pub spans: usize,
    /// Present for conformance checks only
    pub verdict: Option<Verdict>,
    /// A merge stream still had lines after the last record
    pub unmerged_qualities: bool,
}

/// Builder for [`Pipeline`]
///
/// | Setting | Default |
/// |---------|---------|
/// | `format(f)` | derived from the input source, or SAM for raw readers |
/// | `max_line_len(n)` | [`DEFAULT_MAX_LINE_LEN`] (also applied to a merge stream) |
#[derive(Debug)]
pub struct PipelineBuilder {
    transform: Transform,
    format: Option<SeqFormat>,
    max_line_len: usize,
}
impl PipelineBuilder {
    #[must_use]
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            format: None,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Forces the record layout instead of deriving it from the input path
    #[must_use]
    pub fn format(mut self, format: SeqFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the maximum accepted line length, terminator included
    #[must_use]
    pub fn max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Builds a pipeline over an already opened reader and writer
    pub fn build<R: BufRead, W: Write>(mut self, input: R, output: W) -> Pipeline<R, W> {
        if let Transform::MergeInject(source) = &mut self.transform {
            source.set_max_line_len(self.max_line_len);
        }
        let format = self.format.unwrap_or_default();
        let reader = LineReader::with_max_line_len(input, self.max_line_len);
        Pipeline {
            walker: RecordWalker::from_line_reader(reader, format),
            transform: self.transform,
            writer: output,
        }
    }

    /// Builds a pipeline over a reader already opened from `source`
    ///
    /// The format is taken from the source unless one was set explicitly.
    pub fn build_for<R: BufRead, W: Write>(
        self,
        source: &InputSource,
        input: R,
        output: W,
    ) -> Pipeline<R, W> {
        let format = self.format.unwrap_or_else(|| source.format());
        debug!(input = %source.display_name(), ?format, "opened input");
        self.format(format).build(input, output)
    }

    /// Opens `source` and `output` (stdout when `None`) and builds a pipeline over them
    pub fn open<P: AsRef<Path>>(
        self,
        source: &InputSource,
        output: Option<P>,
    ) -> Result<Pipeline<BoxedRead, BoxedWrite>> {
        let input = source.open()?;
        let output = crate::io::open_output(output)?;
        Ok(self.build_for(source, input, output))
    }
}

/// A walker, a transform and a sink
pub struct Pipeline<R: BufRead, W: Write> {
    walker: RecordWalker<R>,
    transform: Transform,
    writer: W,
}
impl<R: BufRead, W: Write> Pipeline<R, W> {
    #[must_use]
    pub fn format(&self) -> SeqFormat {
        self.walker.format()
    }

    /// Processes the whole input, or up to the first decisive verdict
    ///
    /// The writer is flushed before returning successfully. On error the
    /// pipeline is dropped with whatever was already written.
    pub fn run(mut self) -> Result<Summary> {
        debug!(
            transform = self.transform.name(),
            format = ?self.walker.format(),
            "starting pipeline"
        );
        let mut summary = Summary::default();
        while let Some(record) = self.walker.next_record()? {
            summary.records += 1;
            if record.span().is_some() {
                summary.spans += 1;
            }
            if let Step::Halt(verdict) = self.transform.apply(record, &mut self.writer)? {
                summary.verdict = Some(verdict);
                break;
            }
        }
        if self.transform.is_check() && summary.verdict.is_none() {
            summary.verdict = Some(Verdict::Conformant);
        }
        if let Some(source) = self.transform.quality_source() {
            if source.has_remaining()? {
                warn!(
                    records = summary.records,
                    spans = summary.spans,
                    "quality stream has more lines than the input has quality strings; extra lines ignored"
                );
                summary.unmerged_qualities = true;
            }
        }
        self.writer.flush()?;
        info!(
            transform = self.transform.name(),
            records = summary.records,
            spans = summary.spans,
            "finished"
        );
        Ok(summary)
    }
}

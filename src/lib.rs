//! # qscores
//!
//! Transforms over the per-base quality scores of FASTQ and SAM files.
//!
//! The crate locates the quality string of every record (the fourth line of a
//! FASTQ entry, the 11th field of a SAM alignment line) and applies one of a
//! small set of [`Transform`]s to it:
//!
//! | Transform | Effect | Tool |
//! |-----------|--------|------|
//! | `Quantize` | Illumina 8-bin quantization | `il8b convert` |
//! | `Verify` | Checks a file is already 8-bin quantized | `il8b check` |
//! | `Compress` | P-Block lossy quantization | `pblock` |
//! | `Extract` | Writes the quality strings only, one per line | `qsxtract` |
//! | `MergeInject` | Puts extracted (and possibly modified) quality strings back | `mergeq` |
//!
//! Everything else in a record is passed through byte for byte.

pub mod cli;
pub mod error;
pub mod io;
pub mod logging;
pub mod pblock;
pub mod pipeline;
pub mod quality;
pub mod transform;
pub mod walker;

pub use error::{CommandError, Error, MalformedRecordError, QualityError, Result};
pub use io::{InputSource, SeqFormat};
pub use pblock::{PBlock, PBlockRun};
pub use pipeline::{Pipeline, PipelineBuilder, Summary};
pub use quality::{QualityTable, PHRED_OFFSET};
pub use transform::{QualitySource, Transform, Verdict};
pub use walker::{Record, RecordKind, RecordWalker, DEFAULT_MAX_LINE_LEN};

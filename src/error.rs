use std::path::PathBuf;

/// Custom Result type for quality-score operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the qscores library, encompassing all possible error cases
/// that can occur while walking records and transforming their quality scores.
///
/// Every variant is fatal to the current invocation: nothing here is retried.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An input or output path could not be opened
    ///
    /// The message always carries the failing path and the platform's description
    /// of the underlying failure.
    #[error("Unable to open {role} file: {} - [{source}]", .path.display())]
    IoOpen {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors related to the record layout of the input streams
    #[error("Malformed record: {0}")]
    Malformed(#[from] MalformedRecordError),

    /// Errors related to the contents of a located quality span
    #[error("Invalid quality scores: {0}")]
    Quality(#[from] QualityError),

    /// Errors related to command-line invocation
    #[error("{0}")]
    Command(#[from] CommandError),

    /// Standard I/O errors raised mid-stream
    #[error("Error with IO: {0}")]
    Io(#[from] std::io::Error),
}
impl Error {
    /// Builds an [`Error::IoOpen`] for an input path
    pub fn open_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoOpen {
            role: "input",
            path: path.into(),
            source,
        }
    }

    /// Builds an [`Error::IoOpen`] for an output path
    pub fn open_output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoOpen {
            role: "output",
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while splitting an input stream into records
#[derive(thiserror::Error, Debug)]
pub enum MalformedRecordError {
    /// The stream ended before all four lines of a FASTQ record could be read
    ///
    /// # Fields
    /// * `record` - 1-based index of the truncated record
    /// * `lines` - number of lines of the record that were read
    #[error("Failed to read fastq entry {record}: stream ended after {lines} of 4 lines")]
    TruncatedFastq { record: usize, lines: usize },

    /// The secondary quality stream ran out before the primary record stream
    ///
    /// # Arguments
    /// * `usize` - 1-based index of the primary record that had no quality line
    #[error("Failed to read quality score entry for record {0}: secondary stream exhausted")]
    QualityStreamExhausted(usize),

    /// A line exceeded the configured maximum length
    ///
    /// # Fields
    /// * `line` - 1-based line number in its stream
    /// * `limit` - the configured maximum in bytes, terminator included
    #[error("Line {line} exceeds the maximum line length of {limit} bytes")]
    LineTooLong { line: usize, limit: usize },
}

/// Errors in the bytes of a located quality span
#[derive(thiserror::Error, Debug)]
pub enum QualityError {
    /// A byte outside the Phred+33 range [33, 96]
    ///
    /// # Fields
    /// * `byte` - the offending byte
    /// * `position` - 0-based offset within the quality span
    #[error("Byte {byte} at position {position} is outside the Phred+33 range [33, 96]")]
    InvalidQualityByte { byte: u8, position: usize },
}

/// Errors in how a tool was invoked
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// Unrecognized subcommand
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Unrecognized or misplaced option
    #[error("Invalid command option: {0}")]
    InvalidOption(String),

    /// Insufficient or inconsistent arguments
    #[error("Usage: {0}")]
    Usage(String),
}

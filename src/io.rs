//! Input and output handles
//!
//! Handles are returned as owned boxes; dropping them releases the underlying
//! file on every exit path, including early returns on error.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::error::{CommandError, Error, Result};

pub type BoxedRead = Box<dyn io::BufRead + Send>;
pub type BoxedWrite = Box<dyn Write + Send>;

/// Sentinel path meaning "read standard input"
pub const STDIN_SENTINEL: &str = "-";

/// Suffix selecting FASTQ parsing (case-sensitive)
pub const FASTQ_SUFFIX: &str = ".fastq";

/// Layout of a sequencing file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeqFormat {
    /// Four lines per record, the fourth holding the quality string
    Fastq,
    /// One line per record, the 11th whitespace-delimited field holding the quality string
    #[default]
    Sam,
}
impl FromStr for SeqFormat {
    type Err = CommandError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fastq" | "FASTQ" | "fq" => Ok(Self::Fastq),
            "sam" | "SAM" => Ok(Self::Sam),
            _ => Err(CommandError::InvalidOption(format!("unknown format {s}"))),
        }
    }
}
impl SeqFormat {
    /// Selects the format from a file name: `.fastq` means FASTQ, anything else SAM
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(FASTQ_SUFFIX) {
            Self::Fastq
        } else {
            Self::Sam
        }
    }
}

/// Where the primary record stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Read from stdin
    Stdin,
    /// Read from a single file
    Path(PathBuf),
}
impl InputSource {
    /// Interprets a command-line argument, honouring the `-` sentinel
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN_SENTINEL {
            Self::Stdin
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// The record layout implied by this source
    ///
    /// Standard input is always read as FASTQ.
    #[must_use]
    pub fn format(&self) -> SeqFormat {
        match self {
            Self::Stdin => SeqFormat::Fastq,
            Self::Path(path) => SeqFormat::from_path(&path.to_string_lossy()),
        }
    }

    /// Human-readable name used in diagnostics
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Stdin => STDIN_SENTINEL.to_string(),
            Self::Path(path) => path.display().to_string(),
        }
    }

    /// Opens the source for buffered reading
    pub fn open(&self) -> Result<BoxedRead> {
        match self {
            Self::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Self::Path(path) => open_input(path),
        }
    }
}

/// Opens a file for buffered reading
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<BoxedRead> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::open_input(path, e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Opens the output sink: the given file (created or truncated) or stdout
pub fn open_output<P: AsRef<Path>>(path: Option<P>) -> Result<BoxedWrite> {
    match path {
        Some(path) => {
            let path = path.as_ref();
            let file = File::create(path).map_err(|e| Error::open_output(path, e))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(SeqFormat::from_path("reads.fastq"), SeqFormat::Fastq);
        assert_eq!(SeqFormat::from_path("dir.fastq/reads.sam"), SeqFormat::Sam);
        assert_eq!(SeqFormat::from_path("reads.FASTQ"), SeqFormat::Sam);
        assert_eq!(SeqFormat::from_path("reads.fq"), SeqFormat::Sam);
        assert_eq!(SeqFormat::from_path("reads.fastq.gz"), SeqFormat::Sam);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("fastq".parse::<SeqFormat>().ok(), Some(SeqFormat::Fastq));
        assert_eq!("SAM".parse::<SeqFormat>().ok(), Some(SeqFormat::Sam));
        assert!(matches!(
            "bam".parse::<SeqFormat>(),
            Err(CommandError::InvalidOption(msg)) if msg.contains("bam")
        ));
    }

    #[test]
    fn test_stdin_sentinel_forces_fastq() {
        let source = InputSource::from_arg("-");
        assert_eq!(source, InputSource::Stdin);
        assert_eq!(source.format(), SeqFormat::Fastq);
        assert_eq!(source.display_name(), "-");

        let source = InputSource::from_arg("aln.sam");
        assert_eq!(source.format(), SeqFormat::Sam);
        assert_eq!(source.display_name(), "aln.sam");
    }

    #[test]
    fn test_open_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.fastq");
        let err = InputSource::Path(path.clone()).open().err().unwrap();
        assert!(matches!(err, Error::IoOpen { role: "input", .. }));
        assert!(format!("{}", err).contains(&path.display().to_string()));
    }

    #[test]
    fn test_open_output_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/out.sam");
        let err = open_output(Some(&path)).err().unwrap();
        assert!(matches!(err, Error::IoOpen { role: "output", .. }));
    }
}

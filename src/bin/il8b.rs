//! il8b - Illumina 8-bin quantization of FASTQ or SAM quality scores
//!
//! `convert` rewrites every quality string through the 8-bin table.
//! `check` reports whether a file has already been quantized, stopping at the
//! first quality byte that is not a bin representative.

use std::{path::PathBuf, str::FromStr};

use anyhow::Result;
use clap::Parser;
use qscores::{
    cli::PipelineArgs, CommandError, InputSource, PipelineBuilder, QualityTable, Transform,
};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Convert,
    Check,
}
impl FromStr for Mode {
    type Err = CommandError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "convert" => Ok(Self::Convert),
            "check" => Ok(Self::Check),
            _ => Err(CommandError::InvalidCommand(s.to_string())),
        }
    }
}

#[derive(Parser)]
#[clap(about = "Quantize quality scores with Illumina 8-bin, or check that a file already is")]
struct Args {
    /// What to do [convert, check]
    #[clap(required = true)]
    mode: Mode,

    /// Input FASTQ (`.fastq`) or SAM (anything else) file
    #[clap(required = true)]
    input: PathBuf,

    /// Output file path for `convert` [default: stdout]; ignored by `check`
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    pipeline: PipelineArgs,
}

fn main() -> Result<()> {
    qscores::logging::init();
    let args: Args = qscores::cli::parse()?;

    let source = InputSource::Path(args.input.clone());
    let table = QualityTable::illumina_8bin();
    match args.mode {
        Mode::Convert => {
            args.pipeline
                .configure(PipelineBuilder::new(Transform::Quantize(table)))
                .open(&source, args.output.as_deref())?
                .run()?;
        }
        Mode::Check => {
            if let Some(output) = &args.output {
                warn!(output = %output.display(), "check writes its verdict to stdout; ignoring -o");
            }
            let summary = args
                .pipeline
                .configure(PipelineBuilder::new(Transform::Verify(table)))
                .open(&source, None::<PathBuf>)?
                .run()?;
            if let Some(verdict) = summary.verdict {
                debug!(?verdict, records = summary.records, "check complete");
                println!("{}", verdict.report(&source.display_name()));
            }
        }
    }
    Ok(())
}

//! qsxtract - extract quality strings from FASTQ or SAM files, one per line
//!
//! The output pairs with `mergeq`: extract, transform externally, merge back.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use qscores::{cli::PipelineArgs, InputSource, PipelineBuilder, Transform};

#[derive(Parser)]
#[clap(about = "Extract quality scores from a FASTQ or SAM file")]
struct Args {
    /// Input FASTQ (`.fastq`) or SAM file, or `-` to read FASTQ from stdin
    #[clap(required = true)]
    input: String,

    /// Output file path [default: stdout]
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    #[clap(flatten)]
    pipeline: PipelineArgs,
}

fn main() -> Result<()> {
    qscores::logging::init();
    let args: Args = qscores::cli::parse()?;

    args.pipeline
        .configure(PipelineBuilder::new(Transform::Extract))
        .open(&InputSource::from_arg(&args.input), args.output.as_deref())?
        .run()?;
    Ok(())
}

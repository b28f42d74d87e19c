//! mergeq - merge quality strings read from stdin back into a FASTQ or SAM file
//!
//! Each record of the input that carries a quality string consumes one line of
//! stdin. The merged file is written to stdout.

use std::{
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::Result;
use clap::Parser;
use qscores::{cli::PipelineArgs, InputSource, PipelineBuilder, QualitySource, Transform};

#[derive(Parser)]
#[clap(about = "Merge quality scores (one per line on stdin) into a FASTQ or SAM file")]
struct Args {
    /// Input FASTQ (`.fastq`) or SAM (anything else) file
    #[clap(required = true)]
    input: PathBuf,

    #[clap(flatten)]
    pipeline: PipelineArgs,
}

fn main() -> Result<()> {
    qscores::logging::init();
    let args: Args = qscores::cli::parse()?;

    let qualities = QualitySource::new(Box::new(BufReader::new(io::stdin())));
    args.pipeline
        .configure(PipelineBuilder::new(Transform::MergeInject(qualities)))
        .open(&InputSource::Path(args.input), None::<PathBuf>)?
        .run()?;
    Ok(())
}

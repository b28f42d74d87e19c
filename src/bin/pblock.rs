//! pblock - P-Block lossy quantization of FASTQ or SAM quality scores
//!
//! Canovas et al., Lossy compression of quality scores in genomic data.
//! Bioinformatics 2014; 30(15):2130-6. doi:10.1093/bioinformatics/btu183

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use qscores::{cli::PipelineArgs, InputSource, PBlock, PipelineBuilder, Transform};

#[derive(Parser)]
#[clap(about = "Apply P-Block quantization to quality scores, writing to stdout")]
struct Args {
    /// Input FASTQ (`.fastq`) or SAM (anything else) file
    #[clap(required = true)]
    input: PathBuf,

    /// Maximum spread (max - min) of quality values within one block
    #[clap(required = true)]
    two_p: u32,

    #[clap(flatten)]
    pipeline: PipelineArgs,
}

fn main() -> Result<()> {
    qscores::logging::init();
    let args: Args = qscores::cli::parse()?;

    args.pipeline
        .configure(PipelineBuilder::new(Transform::Compress(PBlock::new(args.two_p))))
        .open(&InputSource::Path(args.input), None::<PathBuf>)?
        .run()?;
    Ok(())
}

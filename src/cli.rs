//! Argument handling shared by the command-line tools

use clap::{
    error::{ContextKind, ErrorKind},
    Args, Parser,
};

use crate::error::{CommandError, Result};
use crate::io::SeqFormat;
use crate::pipeline::PipelineBuilder;
use crate::walker::DEFAULT_MAX_LINE_LEN;

/// Options every tool accepts
#[derive(Args, Debug, Clone, Copy)]
pub struct PipelineArgs {
    /// Record layout [fastq, sam] (default: `.fastq` suffix means FASTQ, anything else SAM)
    #[clap(long)]
    pub format: Option<SeqFormat>,

    /// Maximum accepted line length in bytes, newline included
    #[clap(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    pub max_line_len: usize,
}
impl PipelineArgs {
    /// Applies these options to a builder
    #[must_use]
    pub fn configure(&self, builder: PipelineBuilder) -> PipelineBuilder {
        let builder = builder.max_line_len(self.max_line_len);
        match self.format {
            Some(format) => builder.format(format),
            None => builder,
        }
    }
}

/// Parses the process arguments
///
/// Unknown options and missing arguments become [`CommandError`]s. Help,
/// version and every other parse failure are handled by clap, which exits.
pub fn parse<P: Parser>() -> Result<P> {
    resolve(P::try_parse())
}

fn resolve<P>(parsed: std::result::Result<P, clap::Error>) -> Result<P> {
    match parsed {
        Ok(args) => Ok(args),
        Err(err) => match err.kind() {
            ErrorKind::UnknownArgument => {
                let arg = err
                    .get(ContextKind::InvalidArg)
                    .map_or_else(|| err.to_string(), ToString::to_string);
                Err(CommandError::InvalidOption(arg).into())
            }
            ErrorKind::MissingRequiredArgument => {
                Err(CommandError::Usage(err.render().to_string()).into())
            }
            _ => err.exit(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Parser, Debug)]
    struct Tool {
        input: String,
        #[clap(flatten)]
        pipeline: PipelineArgs,
    }

    fn parse_from(args: &[&str]) -> Result<Tool> {
        resolve(Tool::try_parse_from(args.iter().copied()))
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let tool = parse_from(&["tool", "aln.sam"])?;
        assert_eq!(tool.input, "aln.sam");
        assert_eq!(tool.pipeline.format, None);
        assert_eq!(tool.pipeline.max_line_len, DEFAULT_MAX_LINE_LEN);
        Ok(())
    }

    #[test]
    fn test_format_flag() -> Result<()> {
        let tool = parse_from(&["tool", "reads.txt", "--format", "fastq", "--max-line-len", "128"])?;
        assert_eq!(tool.pipeline.format, Some(SeqFormat::Fastq));
        let pipeline = tool
            .pipeline
            .configure(PipelineBuilder::new(crate::Transform::Extract))
            .build(&b"@r\nAC\n+\nII\n"[..], std::io::sink());
        assert_eq!(pipeline.format(), SeqFormat::Fastq);
        Ok(())
    }

    #[test]
    fn test_unknown_option() {
        let err = parse_from(&["tool", "aln.sam", "--bogus"]).unwrap_err();
        assert!(
            matches!(&err, Error::Command(CommandError::InvalidOption(arg)) if arg.contains("--bogus")),
            "{err:?}"
        );
    }

    #[test]
    fn test_missing_argument() {
        let err = parse_from(&["tool"]).unwrap_err();
        assert!(matches!(err, Error::Command(CommandError::Usage(_))));
    }
}

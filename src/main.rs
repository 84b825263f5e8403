use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use splitfile::{Budget, SplitJob};
use std::path::PathBuf;

/// Split a newline-delimited file into bounded chunks
#[derive(Parser)]
#[command(name = "splitfile", version)]
struct Args {
    /// Input file to split
    input: PathBuf,

    /// Directory the chunks are written to
    output_dir: PathBuf,

    /// Maximum size of each chunk, in the chosen unit
    #[arg(long, default_value_t = 100.0)]
    size: f64,

    /// Unit of the size value
    #[arg(long, value_enum, default_value = "mb")]
    unit: SizeUnit,

    /// Repeat the first input line at the top of every chunk
    #[arg(long)]
    header: bool,

    /// Keep consecutive lines sharing the same leading token in one chunk
    #[arg(long)]
    group_by_prefix: bool,

    /// Digits used to zero-pad the chunk ordinal (1-10)
    #[arg(long, default_value_t = 4)]
    zero_fill: usize,

    /// Character between the input stem and the chunk ordinal
    #[arg(long, default_value_t = '_')]
    delimiter: char,

    /// Name of the audit manifest written next to the chunks
    #[arg(long, default_value = "manifest")]
    manifest_name: String,

    /// First chunk ordinal, for resuming numbering across runs
    #[arg(long, default_value_t = 1)]
    start_ordinal: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum SizeUnit {
    Kb,
    Mb,
    Gb,
    Lines,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let budget = match args.unit {
        SizeUnit::Kb => Budget::kilobytes(args.size),
        SizeUnit::Mb => Budget::megabytes(args.size),
        SizeUnit::Gb => Budget::gigabytes(args.size),
        SizeUnit::Lines => {
            if args.size.fract() != 0.0 || args.size < 1.0 {
                bail!("line count must be a whole number of at least 1");
            }
            Budget::Lines(args.size as u64)
        }
    };

    let job = SplitJob::builder(&args.input, &args.output_dir)
        .budget(budget)
        .include_header(args.header)
        .group_by_prefix(args.group_by_prefix)
        .zero_fill(args.zero_fill)
        .delimiter(args.delimiter)
        .manifest_name(args.manifest_name.as_str())
        .start_ordinal(args.start_ordinal)
        .build()
        .context("invalid split configuration")?;

    let mut total_bytes = 0u64;
    let outcome = job
        .run(&mut |_, size| total_bytes += size)
        .with_context(|| format!("failed to split {:?}", args.input))?;

    let chunks = outcome.chunks();
    let noun = if chunks == 1 { "chunk" } else { "chunks" };
    if outcome.is_cancelled() {
        println!("{chunks} {noun} generated ({total_bytes} bytes, cancelled)");
    } else {
        println!("{chunks} {noun} generated ({total_bytes} bytes)");
    }
    Ok(())
}

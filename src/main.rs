use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use multialign_extract::{
    BatchConfig, FailurePolicy, QueryMode, RegionBatchDriver, RegionReader, ScanConfig,
    SingleQuery, SingleQueryDriver, Source, DEFAULT_BUFFER_SIZE,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "multialign-extract",
    version,
    about = "Extract subsequences from gap-padded multiple sequence alignments"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract every region of a region list from the reference and each source file.
    Regions {
        /// Gap-padded reference sequence.
        #[arg(long = "aligned-reference", value_name = "FILE")]
        aligned_reference: PathBuf,
        /// Tab-separated region list (chrom, start, end, name, score, strand).
        #[arg(long = "extracted-co-ordinates", alias = "regions", value_name = "FILE")]
        regions: PathBuf,
        /// Co-aligned sequence files sharing the reference's columns.
        #[arg(value_name = "SOURCE")]
        sources: Vec<PathBuf>,
        /// Directory receiving one <name>.fa file per region.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Also write a record for the reference itself.
        #[arg(long)]
        include_reference: bool,
        /// Skip failing regions instead of aborting the batch.
        #[arg(long)]
        skip_failed: bool,
        /// Do not require sources to match the reference's length.
        ///
        /// FIFOs and other non-regular files are never length-checked.
        #[arg(long)]
        no_length_check: bool,
        /// Gap character.
        #[arg(long, default_value_t = '-')]
        gap: char,
        /// Bytes read per block.
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,
    },
    /// Extract one subsequence from one aligned file.
    Query {
        /// Aligned input file.
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
        /// Ungapped offset with --reference, raw file offset otherwise.
        #[arg(long, allow_hyphen_values = true)]
        offset: i64,
        /// Number of characters to extract.
        #[arg(long, allow_hyphen_values = true)]
        length: i64,
        /// Treat the input as the reference: resolve the offset and strip gaps.
        #[arg(long)]
        reference: bool,
        /// Gap character.
        #[arg(long, default_value_t = '-')]
        gap: char,
        /// Bytes read per block.
        #[arg(long, default_value_t = DEFAULT_BUFFER_SIZE)]
        buffer_size: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Regions {
            aligned_reference,
            regions,
            sources,
            output_dir,
            include_reference,
            skip_failed,
            no_length_check,
            gap,
            buffer_size,
        } => {
            let policy = if skip_failed {
                FailurePolicy::SkipAndReport
            } else {
                FailurePolicy::FailFast
            };
            let config = BatchConfig::default()
                .with_scan(scan_config(gap, buffer_size)?)
                .with_output_dir(output_dir)
                .with_failure_policy(policy)
                .with_reference_record(include_reference)
                .with_length_check(!no_length_check);
            run_regions(aligned_reference, regions, sources, config)?
        }
        Commands::Query {
            input,
            offset,
            length,
            reference,
            gap,
            buffer_size,
        } => {
            let mode = if reference {
                QueryMode::Reference
            } else {
                QueryMode::Raw
            };
            let query = SingleQuery::from_signed(offset, length, mode)?;
            run_query(input, query, scan_config(gap, buffer_size)?)?
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn scan_config(gap: char, buffer_size: usize) -> Result<ScanConfig> {
    if !gap.is_ascii() {
        bail!("gap character must be a single ASCII character, got '{}'", gap);
    }
    Ok(ScanConfig::default()
        .with_gap(gap as u8)
        .with_buffer_size(buffer_size)?)
}

fn run_regions(
    reference: PathBuf,
    regions_path: PathBuf,
    sources: Vec<PathBuf>,
    config: BatchConfig,
) -> Result<()> {
    let reader = BufReader::new(File::open(&regions_path).with_context(|| {
        format!("failed to open region list {}", regions_path.display())
    })?);
    let regions = RegionReader::new(reader)
        .read_all()
        .with_context(|| format!("failed to read region list {}", regions_path.display()))?;

    let sources = sources.into_iter().map(Source::from_path).collect();
    let driver = RegionBatchDriver::new(&reference, sources, config);
    let report = driver
        .run(&regions)
        .with_context(|| format!("extraction against {} failed", reference.display()))?;

    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.name, skipped.reason);
    }
    for short in &report.short_records {
        eprintln!(
            "truncated {} from {}: {} of {} characters",
            short.region, short.source, short.emitted, short.requested
        );
    }
    if !report.skipped.is_empty() {
        bail!("{} of {} regions failed", report.skipped.len(), regions.len());
    }
    Ok(())
}

fn run_query(input: PathBuf, query: SingleQuery, config: ScanConfig) -> Result<()> {
    let stdout = io::stdout();
    let mut sink = BufWriter::new(stdout.lock());
    let outcome = SingleQueryDriver::new(config)
        .run_path(&input, &query, &mut sink)
        .with_context(|| format!("query against {} failed", input.display()))?;
    sink.flush()?;

    if let Some(raw_offset) = outcome.raw_offset {
        eprintln!("Found the requested substring at file offset {}", raw_offset);
    }
    info!(
        emitted = outcome.extraction.emitted,
        requested = outcome.extraction.requested,
        "query finished"
    );
    Ok(())
}

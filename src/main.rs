//! regfetch: region-ordered, duplicate-free record fetching
//!
//! Usage: regfetch <COMMAND> [OPTIONS]

use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process;

use regfetch::error::RegionError;
use regfetch::fetch::{fetch_iterator, FetchMode, StartField};
use regfetch::genome::Genome;
use regfetch::io::{check_writable, create_possible_gzip};
use regfetch::logging::{init_logging, level_from_verbosity};
use regfetch::output::RecordWriter;
use regfetch::regions::{build_regions, RegionSelection};
use regfetch::source::MemorySource;
use regfetch::utils::str_count;

#[derive(Parser)]
#[command(name = "regfetch")]
#[command(version)]
#[command(about = "Fetch records from indexed genomic files by region, without duplicates", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Read and write region strings as 0-based half-open (chr1:0-100)
    /// instead of 1-based inclusive (chr1:1-100)
    #[arg(long, global = true)]
    zero_based: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Region selection shared by subcommands.
#[derive(Args)]
struct RegionArgs {
    /// Genome file (chrom<TAB>length, .fai works)
    #[arg(short, long)]
    genome: PathBuf,

    /// Region(s): chrom:start-end or a chromosome name
    #[arg(short, long = "regions", num_args = 1..)]
    regions: Option<Vec<String>>,

    /// Region file: chrom<TAB>start<TAB>end[<TAB>name], 0-based. Ignored if --regions is given
    #[arg(short = 'R', long)]
    regions_file: Option<PathBuf>,
}

impl RegionArgs {
    fn selection(&self) -> RegionSelection {
        if self.regions.as_ref().is_some_and(|r| !r.is_empty()) && self.regions_file.is_some() {
            log::warn!("Both --regions and --regions-file given, using --regions");
        }
        RegionSelection::from_args(self.regions.clone(), self.regions_file.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the region set as BED
    Regions {
        #[command(flatten)]
        region_args: RegionArgs,

        /// Keep regions in input order
        #[arg(long)]
        no_sort: bool,
    },

    /// Fetch records of a tab-delimited file (chrom, start, end, ...) by region
    Fetch {
        /// Input file (.gz allowed, - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        region_args: RegionArgs,

        /// Output file (.gz compresses, - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Do not remove records repeated by overlapping regions
        #[arg(long)]
        keep_duplicates: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    init_logging(level_from_verbosity(cli.verbose, cli.quiet));

    // Must be set before any region string is parsed
    if cli.zero_based {
        regfetch::config::set_zero_based_regions(true);
    }

    let result = match cli.command {
        Commands::Regions {
            region_args,
            no_sort,
        } => run_regions(region_args, no_sort),

        Commands::Fetch {
            input,
            region_args,
            output,
            keep_duplicates,
        } => run_fetch(input, region_args, output, keep_duplicates),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_regions(region_args: RegionArgs, no_sort: bool) -> Result<(), RegionError> {
    let genome = Genome::from_file(&region_args.genome)?;
    let regions = build_regions(&region_args.selection(), &genome, !no_sort)?;

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());
    for region in &regions {
        writer.write_region(region, &genome)?;
    }
    writer.flush()?;

    log::info!("Wrote {}", str_count(regions.len(), "region"));
    Ok(())
}

fn run_fetch(
    input: PathBuf,
    region_args: RegionArgs,
    output: PathBuf,
    keep_duplicates: bool,
) -> Result<(), RegionError> {
    if output.as_os_str() != "-" && !check_writable(&output) {
        return Err(RegionError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("Cannot write to {}", output.display()),
        )));
    }

    let genome = Genome::from_file(&region_args.genome)?;
    let selection = region_args.selection();
    let mode = if keep_duplicates {
        FetchMode::Concatenate
    } else {
        FetchMode::Deduplicate
    };

    log::info!("Loading {}", input.display());
    let source = MemorySource::from_text_file(&input)?;
    log::debug!("Loaded {}", str_count(source.len(), "record"));

    let mut records = fetch_iterator(&source, &selection, &genome, mode, StartField)?;
    let mut writer = RecordWriter::new(create_possible_gzip(&output)?);
    for record in records.by_ref() {
        writer.write_text(&record?)?;
    }
    let lines = writer.lines();
    writer.into_inner()?.finish()?;

    match records.stats() {
        Some(stats) => log::info!(
            "Wrote {} from {} ({} duplicates removed)",
            str_count(lines, "record"),
            str_count(stats.regions_fetched, "region"),
            stats.records_suppressed
        ),
        None => log::info!("Wrote {}", str_count(lines, "record")),
    }
    Ok(())
}

//! bedmean: per-sample averaging of position-level measurements over BED
//! regions.
//!
//! Usage: bedmean -i matrix.tsv -r regions.bed [-o out.tsv] [OPTIONS]

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use bedmean::bed::BedError;
use bedmean::commands::RegionMeanCommand;

#[derive(Parser)]
#[command(name = "bedmean")]
#[command(version)]
#[command(
    about = "bedmean - per-sample averages of position-level measurements over BED regions",
    long_about = None
)]
struct Cli {
    /// Measurement matrix (TSV with header: chromosome, position, samples...)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Region BED file (chrom, start, end, optional name)
    #[arg(short = 'r', long)]
    regions: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Treat regions as 1-based inclusive instead of 0-based half-open BED
    #[arg(long = "one-based")]
    one_based: bool,

    /// Force inclusive matching (start <= pos <= end) regardless of mode
    #[arg(long)]
    inclusive: bool,

    /// Validate matrix stream order while processing (fails fast if violated)
    #[arg(long = "check-sorted")]
    check_sorted: bool,

    /// Print run statistics to stderr
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BedError> {
    let cmd = RegionMeanCommand {
        one_based: cli.one_based,
        inclusive: cli.inclusive,
        check_sorted: cli.check_sorted,
    };

    let result = match cli.output {
        Some(path) => {
            let mut file = File::create(&path)?;
            cmd.run(&cli.input, &cli.regions, &mut file)?
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            let result = cmd.run(&cli.input, &cli.regions, &mut handle)?;
            handle.flush()?;
            result
        }
    };

    if cli.stats {
        eprintln!("Region mean stats: {}", result);
    }

    Ok(())
}

use std::path::PathBuf;

use clap::Parser;

const AFTER_HELP: &str = "\
Requirements:
  All inputs must be a multiple of 512 bytes.
  All inputs must be the same size.
  Data is analysed on 512-byte boundaries only.

Suspect data (logged for review):
  Sectors ending in a long run of one repeated byte
  Sectors that differ between the captures

Selection:
  All-zero and all-0xFF sectors are copied as-is.
  A plausible sector wins when more than half of the captures agree.
  With two captures, a plausible sector wins over a suspect one.
  Identical suspect data in every capture is accepted.
  Anything else is filled with repeated 0xDE 0xAD bytes.

The anomaly log defaults to OUTFILE with .log appended.";

#[derive(Parser, Debug)]
#[command(
    name = "imgmerge",
    about = "Merge repeated disk-image captures by per-sector majority vote",
    version,
    after_help = AFTER_HELP,
)]
pub struct Cli {
    /// The file to create with merged data
    pub output: PathBuf,

    /// Captures to merge (two or more, equal length)
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,

    /// Anomaly log path [default: OUTFILE.log]
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// TOML file with merge settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress the progress line
    #[arg(short, long)]
    pub quiet: bool,

    /// Log debug-level detail to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Completion report format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

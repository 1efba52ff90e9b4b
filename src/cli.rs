use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::pipeline::rank::DEFAULT_TOP_N;

/// Rank a product catalog by perceptual closeness to a hair color.
#[derive(Parser, Debug)]
#[command(name = "hairmatch", version, about)]
pub struct Args {
    /// Hair color to match, as #RRGGBB or #RGB
    #[arg(
        required_unless_present_any = ["estimate", "status"],
        conflicts_with = "estimate"
    )]
    pub color: Option<String>,

    /// Read the estimator's JSON reply ({"tone", "hair_hex"}) from a file, or `-` for stdin
    #[arg(short, long, value_name = "PATH")]
    pub estimate: Option<PathBuf>,

    /// Catalog JSON: an array of products, or {"products": [...]} / {"items": [...]}
    #[arg(short, long, env = "HAIRMATCH_CATALOG", default_value = "catalog.json")]
    pub catalog: PathBuf,

    /// Number of matches to return
    #[arg(short = 'n', long = "top", env = "TOP_N", default_value_t = DEFAULT_TOP_N, value_parser = parse_top_n)]
    pub top: usize,

    /// Only rank products of this category (case-insensitive)
    #[arg(long)]
    pub category: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print colored swatches of the target and each match
    #[arg(long)]
    pub preview: bool,

    /// Print catalog status and exit
    #[arg(long)]
    pub status: bool,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_top_n(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(err) => Err(err.to_string()),
    }
}

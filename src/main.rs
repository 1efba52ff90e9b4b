use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use hairmatch::catalog::CatalogIndex;
use hairmatch::cli::{Args, OutputFormat};
use hairmatch::color::Color;
use hairmatch::pipeline::estimate::HairEstimate;
use hairmatch::pipeline::rank::{rank, MatchResult};
use hairmatch::report::{render_preview, render_text, CatalogStatus, MatchReport};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_filter())
        .parse_default_env()
        .init();

    let catalog = CatalogIndex::load(&args.catalog).unwrap_or_else(|err| {
        warn!("{err:#}; continuing with an empty catalog");
        CatalogIndex::default()
    });
    info!("loaded {} catalog entries from {}", catalog.len(), args.catalog.display());

    if args.status {
        println!("{}", CatalogStatus::new(catalog.len(), args.top).to_json()?);
        return Ok(());
    }
    if catalog.is_empty() {
        warn!("catalog is empty, there is nothing to match against");
    }

    let estimate = match (&args.color, &args.estimate) {
        (Some(hex), _) => HairEstimate::from_hex(hex.as_str()),
        (None, Some(path)) => HairEstimate::read(path)?,
        (None, None) => HairEstimate::default(),
    };

    let target = estimate.hair_hex.as_deref().and_then(|hex| match Color::from_hex(hex) {
        Ok(color) => Some(color),
        Err(err) => {
            warn!("could not interpret hair color {hex:?}: {err}");
            None
        }
    });
    if estimate.hair_hex.is_none() {
        warn!("estimate carries no hair color");
    }

    let results = match_catalog(&catalog, &args, estimate.hair_hex.as_deref());
    if target.is_some() && results.is_empty() {
        warn!("no catalog entry has a usable color");
    }

    match args.format {
        OutputFormat::Json => {
            if args.preview {
                warn!("--preview is ignored with --format json");
            }
            println!("{}", MatchReport::new(&estimate, &results).to_json()?);
        }
        OutputFormat::Text => {
            print!("{}", render_text(&estimate, &results));
            if args.preview {
                print!("{}", render_preview(target, &results));
            }
        }
    }

    Ok(())
}

fn match_catalog(catalog: &CatalogIndex, args: &Args, hair_hex: Option<&str>) -> Vec<MatchResult> {
    let Some(hex) = hair_hex else {
        return Vec::new();
    };
    match args.category.as_deref() {
        Some(category) => rank(hex, catalog.in_category(category), args.top),
        None => rank(hex, catalog, args.top),
    }
}

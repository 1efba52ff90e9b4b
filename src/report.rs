use anyhow::{Context, Result};
use crossterm::style::{Color as TermColor, Stylize};
use serde::Serialize;

use crate::color::Color;
use crate::pipeline::estimate::{HairEstimate, HairTone};
use crate::pipeline::rank::MatchResult;

/// How many results are promoted to cards.
pub const TOP_CARDS: usize = 3;

const SWATCH: &str = "      ";

/// Condensed view of a match for the "top matches" strip.
#[derive(Debug, Serialize)]
pub struct MatchCard<'a> {
    pub rank: usize,
    pub title: &'a str,
    #[serde(rename = "match")]
    pub match_percent: u8,
    pub url: &'a str,
    pub sku: &'a str,
}

/// The JSON body handed back to whatever front end asked for the match.
#[derive(Debug, Serialize)]
pub struct MatchReport<'a> {
    pub ok: bool,
    pub tone: Option<HairTone>,
    pub hair_hex: Option<&'a str>,
    pub top_matches: Vec<MatchCard<'a>>,
    pub recommendations: &'a [MatchResult],
}

impl<'a> MatchReport<'a> {
    pub fn new(estimate: &'a HairEstimate, results: &'a [MatchResult]) -> Self {
        let top_matches = results
            .iter()
            .take(TOP_CARDS)
            .enumerate()
            .map(|(i, r)| MatchCard {
                rank: i + 1,
                title: &r.name,
                match_percent: r.match_percent,
                url: &r.url,
                sku: &r.sku,
            })
            .collect();
        Self {
            ok: true,
            tone: estimate.tone,
            hair_hex: estimate.hair_hex.as_deref(),
            top_matches,
            recommendations: results,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize match report")
    }
}

/// Catalog health, mirroring what a status endpoint would return.
#[derive(Debug, Serialize)]
pub struct CatalogStatus {
    pub status: &'static str,
    pub catalog_loaded: usize,
    pub top_n: usize,
}

impl CatalogStatus {
    pub fn new(catalog_loaded: usize, top_n: usize) -> Self {
        Self {
            status: "ok",
            catalog_loaded,
            top_n,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize catalog status")
    }
}

/// Plain text listing, one match per line.
pub fn render_text(estimate: &HairEstimate, results: &[MatchResult]) -> String {
    let mut out = String::new();
    if let Some(tone) = estimate.tone {
        out.push_str(&format!("tone: {}\n", tone.label()));
    }
    out.push_str(&format!(
        "hair color: {}\n",
        estimate.hair_hex.as_deref().unwrap_or("(unknown)")
    ));

    if results.is_empty() {
        out.push_str("no matches\n");
        return out;
    }

    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {} [{}]  ΔE {:.2}  {}%",
            i + 1,
            r.name,
            r.sku,
            r.delta_e,
            r.match_percent
        ));
        if !r.url.is_empty() {
            out.push_str(&format!("  {}", r.url));
        }
        out.push('\n');
    }
    out
}

/// Colored swatches of the target and each match, for terminals.
pub fn render_preview(target: Option<Color>, results: &[MatchResult]) -> String {
    let mut out = String::new();
    if let Some(color) = target {
        out.push_str(&format!("{}  target {}\n", swatch(color), color));
    }
    for r in results {
        let color = Color::from_lab(r.lab);
        out.push_str(&format!(
            "{}  {} {}%  {}\n",
            swatch(color),
            color,
            r.match_percent,
            r.name
        ));
    }
    out
}

fn swatch(color: Color) -> String {
    let bg = TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    };
    SWATCH.on(bg).to_string()
}

use log::debug;
use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::color::{hex_to_lab, Lab};
use crate::pipeline::distance::delta_e76;

pub const DEFAULT_TOP_N: usize = 5;

/// Confidence floor and ceiling shown to users. 100% is never claimed.
pub const MIN_MATCH_PERCENT: u8 = 35;
pub const MAX_MATCH_PERCENT: u8 = 99;

/// One ranked catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub sku: String,
    pub name: String,
    pub url: String,
    /// ΔE76 to the target, rounded to two decimals.
    #[serde(rename = "deltaE")]
    pub delta_e: f64,
    pub match_percent: u8,
    /// The entry's resolved color, kept for previews.
    #[serde(skip)]
    pub lab: Lab,
}

/// Rank `entries` by closeness to `target_hex` and keep the best `top_n`.
///
/// An unparseable target yields an empty list, as does a catalog with no
/// resolvable colors; callers that need to tell the two apart should convert
/// the target themselves and use [`rank_lab`].
pub fn rank<'a, I>(target_hex: &str, entries: I, top_n: usize) -> Vec<MatchResult>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    match hex_to_lab(target_hex) {
        Some(target) => rank_lab(target, entries, top_n),
        None => {
            debug!("target color {target_hex:?} is not a hex color, nothing to rank");
            Vec::new()
        }
    }
}

/// Rank `entries` against an already converted target color.
///
/// Entries without a resolvable color are skipped. Ties keep catalog order.
pub fn rank_lab<'a, I>(target: Lab, entries: I, top_n: usize) -> Vec<MatchResult>
where
    I: IntoIterator<Item = &'a CatalogEntry>,
{
    let mut results: Vec<MatchResult> = entries
        .into_iter()
        .filter_map(|entry| {
            let lab = entry.color()?;
            let delta_e = delta_e76(target, lab);
            Some(MatchResult {
                sku: entry.sku.clone(),
                name: entry.name.clone(),
                url: entry.url.clone(),
                delta_e: round2(delta_e),
                match_percent: match_percent(delta_e),
                lab,
            })
        })
        .collect();

    // sort_by is stable, which is what keeps ties in catalog order
    results.sort_by(|a, b| a.delta_e.total_cmp(&b.delta_e));
    results.truncate(top_n);
    results
}

/// Map a distance to a display confidence: `round(100 - ΔE)` clamped to
/// [35, 99]. Non-finite distances get the floor.
pub fn match_percent(delta_e: f64) -> u8 {
    let percent = (100.0 - delta_e).round();
    if percent.is_nan() {
        return MIN_MATCH_PERCENT;
    }
    percent.clamp(f64::from(MIN_MATCH_PERCENT), f64::from(MAX_MATCH_PERCENT)) as u8
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

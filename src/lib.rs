//! Match a hair color against a product catalog.
//!
//! A target hex color is converted to CIELAB, compared against every catalog
//! entry with ΔE76, and the closest entries are returned with a bounded
//! confidence score. See [`pipeline::rank::rank`] for the entry point.

pub mod catalog;
pub mod cli;
pub mod color;
pub mod pipeline;
pub mod report;

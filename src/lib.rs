//! Severity analysis of bicycle collisions in the City of Regina, 2010-2019.
//!
//! Loads the city's collision export once, derives calendar fields and a
//! normalized hour of day, forward-fills missing cells, and produces the
//! report tables: injuries and fatalities by year, collision counts by
//! severity per time bucket, counts by contextual factor per time bucket,
//! and per-street accident frequencies.

pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

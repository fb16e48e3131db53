//! Weekly chart generation.
//!
//! A chart is a ranked, capped leaderboard of songs or albums for one
//! calendar week, built from the scrobble history: period calculation →
//! play-event aggregation → ranking → atomic replace in the chart store.

mod aggregate;
mod builder;
mod display;
mod error;
mod generator;
mod models;
mod period;
mod traits;

pub use aggregate::aggregate;
pub use builder::{build, ChartBuild};
pub use display::{enrich_chart, ChartEntryView};
pub use error::ChartError;
pub use generator::{ChartGenerator, ChartLimits};
pub use models::{BuildWarning, Chart, ChartEntry, ChartType, PlayEvent, StoredChart};
pub use period::Period;
pub use traits::{ChartStore, PlayEventSource};

//! Collaborator interfaces consumed by the chart generator.

use super::models::{Chart, ChartEntry, ChartType, PlayEvent, StoredChart};
use anyhow::Result;
use chrono::NaiveDate;

/// Source of play events. Backed by the scrobble history in production and
/// by an in-memory vector in tests.
pub trait PlayEventSource: Send + Sync {
    /// All events of the given kind with a timestamp in `[start, end)`.
    fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        target_kind: ChartType,
    ) -> Result<Vec<PlayEvent>>;

    /// The dates of the oldest and newest recorded events, or `None` when
    /// there is no play history at all. Drives backfill enumeration.
    fn event_date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>>;
}

/// Chart persistence.
pub trait ChartStore: Send + Sync {
    /// Atomic upsert-and-replace of the chart for (chart_type, period_key).
    /// All-or-nothing: on failure the previously stored chart, if any,
    /// must remain intact, and a concurrent read must see either the old
    /// or the new chart in full, never a mix.
    fn replace_chart(&self, chart: &Chart, entries: &[ChartEntry]) -> Result<()>;

    /// Read one chart with its entries in position order.
    fn get_chart(&self, chart_type: ChartType, period_key: &str) -> Result<Option<StoredChart>>;

    /// The most recent stored chart of the given kind, by period key order.
    fn latest_chart(&self, chart_type: ChartType) -> Result<Option<StoredChart>>;

    /// All period keys with a stored chart of the given kind, sorted.
    fn period_keys(&self, chart_type: ChartType) -> Result<Vec<String>>;
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Chart kind. Doubles as the play-event target kind: a chart of one kind
/// only ever counts events of the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Song,
    Album,
}

impl ChartType {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "song" => ChartType::Song,
            "album" => ChartType::Album,
            _ => ChartType::Song, // Default fallback
        }
    }

    /// Convert to database string representation
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ChartType::Song => "song",
            ChartType::Album => "album",
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// One timestamped play of a song or album. Immutable, append-only input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub target_kind: ChartType,
    pub target_id: i64,
    pub timestamp: DateTime<Utc>,
}

/// Chart header for one (chart_type, period_key). The period interval is
/// half-open: start inclusive, end exclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub chart_type: ChartType,
    pub period_key: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_at: DateTime<Utc>,
}

/// One ranked row of a chart. Positions are 1-based and dense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub position: u32,
    pub target_id: i64,
    pub play_count: u64,
}

/// A chart as read back from storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredChart {
    pub chart: Chart,
    pub entries: Vec<ChartEntry>,
}

/// Non-fatal condition recorded during a chart build.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum BuildWarning {
    /// A play-event target with no matching catalog entity; excluded from
    /// the chart (orphaned play history).
    OrphanedTarget { target_id: i64, play_count: u64 },
}

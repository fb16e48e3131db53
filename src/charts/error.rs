use super::models::ChartType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Charts are only generated for weeks that have fully ended.
    #[error("cannot generate chart for week {period_key}: the week ends on {period_end}")]
    PeriodNotComplete {
        period_key: String,
        period_end: chrono::NaiveDate,
    },

    #[error("invalid period key '{0}', expected YYYY-Www")]
    InvalidPeriodKey(String),

    /// The atomic replace did not complete; the previously stored chart,
    /// if any, is still intact.
    #[error("failed to replace {chart_type} chart for {period_key}: {cause}")]
    ReplaceFailed {
        chart_type: ChartType,
        period_key: String,
        cause: anyhow::Error,
    },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

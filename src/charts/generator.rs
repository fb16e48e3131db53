//! Chart generation orchestration.
//!
//! One generation run covers one (chart type, period) pair: fetch events,
//! aggregate, rank, then atomically replace the stored chart. Runs for
//! different chart types or periods are independent.

use super::aggregate::aggregate;
use super::builder::{build, ChartBuild};
use super::error::ChartError;
use super::models::ChartType;
use super::period::Period;
use super::traits::{ChartStore, PlayEventSource};
use crate::catalog_store::CatalogStore;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum entry counts per chart kind.
#[derive(Clone, Copy, Debug)]
pub struct ChartLimits {
    pub songs: usize,
    pub albums: usize,
}

impl Default for ChartLimits {
    fn default() -> Self {
        ChartLimits {
            songs: 20,
            albums: 10,
        }
    }
}

impl ChartLimits {
    fn for_type(&self, chart_type: ChartType) -> usize {
        match chart_type {
            ChartType::Song => self.songs,
            ChartType::Album => self.albums,
        }
    }
}

pub struct ChartGenerator {
    catalog: Arc<dyn CatalogStore>,
    events: Arc<dyn PlayEventSource>,
    charts: Arc<dyn ChartStore>,
    limits: ChartLimits,
}

impl ChartGenerator {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        events: Arc<dyn PlayEventSource>,
        charts: Arc<dyn ChartStore>,
        limits: ChartLimits,
    ) -> Self {
        ChartGenerator {
            catalog,
            events,
            charts,
            limits,
        }
    }

    /// Generate and persist one chart. Replaces any previously stored chart
    /// for the same (chart type, period key).
    pub fn generate(
        &self,
        chart_type: ChartType,
        period: &Period,
    ) -> Result<ChartBuild, ChartError> {
        let events = self
            .events
            .events_in_range(period.start, period.end, chart_type)?;
        let counts = aggregate(&events, period, chart_type);
        debug!(
            "Aggregated {} events into {} targets for {} chart {}",
            events.len(),
            counts.len(),
            chart_type,
            period.key
        );

        let result = build(
            period,
            chart_type,
            &counts,
            self.catalog.as_ref(),
            self.limits.for_type(chart_type),
        )?;

        self.charts
            .replace_chart(&result.chart, &result.entries)
            .map_err(|cause| ChartError::ReplaceFailed {
                chart_type,
                period_key: period.key.clone(),
                cause,
            })?;

        info!(
            "Generated {} chart {}: {} entries, {} warnings",
            chart_type,
            period.key,
            result.entries.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    /// Generate the song and album charts for one week. Refuses weeks that
    /// have not fully ended yet.
    pub fn generate_week(
        &self,
        period: &Period,
        today: NaiveDate,
    ) -> Result<Vec<ChartBuild>, ChartError> {
        if !period.is_complete(today) {
            return Err(ChartError::PeriodNotComplete {
                period_key: period.key.clone(),
                period_end: period.end,
            });
        }
        Ok(vec![
            self.generate(ChartType::Song, period)?,
            self.generate(ChartType::Album, period)?,
        ])
    }

    /// Generate charts for every completed week that has play events but is
    /// missing a stored chart, oldest first. Returns the period keys that
    /// were generated.
    pub fn backfill(&self, today: NaiveDate) -> Result<Vec<String>, ChartError> {
        let Some((first_date, last_date)) = self.events.event_date_range()? else {
            info!("No play history, nothing to backfill");
            return Ok(Vec::new());
        };

        let existing_song: HashSet<String> =
            self.charts.period_keys(ChartType::Song)?.into_iter().collect();
        let existing_album: HashSet<String> =
            self.charts.period_keys(ChartType::Album)?.into_iter().collect();

        let mut generated = Vec::new();
        let mut period = Period::containing(first_date);
        while period.start <= last_date && period.is_complete(today) {
            let need_song = !existing_song.contains(&period.key);
            let need_album = !existing_album.contains(&period.key);
            if need_song || need_album {
                let has_events = !self
                    .events
                    .events_in_range(period.start, period.end, ChartType::Song)?
                    .is_empty()
                    || !self
                        .events
                        .events_in_range(period.start, period.end, ChartType::Album)?
                        .is_empty();
                if has_events {
                    if need_song {
                        self.generate(ChartType::Song, &period)?;
                    }
                    if need_album {
                        self.generate(ChartType::Album, &period)?;
                    }
                    generated.push(period.key.clone());
                }
            }
            period = period.next();
        }

        info!("Backfill generated charts for {} weeks", generated.len());
        Ok(generated)
    }
}

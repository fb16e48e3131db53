//! Chart building: ranking, capping and position assignment.

use super::error::ChartError;
use super::models::{BuildWarning, Chart, ChartEntry, ChartType};
use super::period::Period;
use crate::catalog_store::CatalogStore;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::warn;

/// The outcome of one chart build, before persistence.
#[derive(Debug)]
pub struct ChartBuild {
    pub chart: Chart,
    pub entries: Vec<ChartEntry>,
    pub warnings: Vec<BuildWarning>,
}

/// Rank aggregated counts into a capped, densely positioned entry list.
///
/// Ordering is play count descending with target id ascending as the
/// tie-break, so equal inputs always produce identical output. Targets
/// missing from the catalog are dropped with a warning and do not consume a
/// position or a cap slot. Empty counts produce a chart with zero entries.
pub fn build(
    period: &Period,
    chart_type: ChartType,
    counts: &BTreeMap<i64, u64>,
    catalog: &dyn CatalogStore,
    max_entries: usize,
) -> Result<ChartBuild, ChartError> {
    let mut ranked: Vec<(i64, u64)> = counts.iter().map(|(&id, &count)| (id, count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    for (target_id, play_count) in ranked {
        if entries.len() == max_entries {
            break;
        }
        let exists = match chart_type {
            ChartType::Song => catalog.song_exists(target_id)?,
            ChartType::Album => catalog.album_exists(target_id)?,
        };
        if !exists {
            warn!(
                "Dropping orphaned {} {} ({} plays) from chart {}",
                chart_type, target_id, play_count, period.key
            );
            warnings.push(BuildWarning::OrphanedTarget {
                target_id,
                play_count,
            });
            continue;
        }
        entries.push(ChartEntry {
            position: entries.len() as u32 + 1,
            target_id,
            play_count,
        });
    }

    Ok(ChartBuild {
        chart: Chart {
            chart_type,
            period_key: period.key.clone(),
            period_start: period.start,
            period_end: period.end,
            generated_at: Utc::now(),
        },
        entries,
        warnings,
    })
}

//! Play-event aggregation.

use super::models::{ChartType, PlayEvent};
use super::period::Period;
use std::collections::BTreeMap;

/// Count plays per target within the period window.
///
/// Events outside `[period.start, period.end)` and events of another target
/// kind are ignored. The fold is commutative, so the result is identical
/// for any ordering of the input. Target ids are not validated here; the
/// chart builder drops the ones that no longer exist in the catalog.
pub fn aggregate(
    events: &[PlayEvent],
    period: &Period,
    target_kind: ChartType,
) -> BTreeMap<i64, u64> {
    let mut counts = BTreeMap::new();
    for event in events {
        if event.target_kind != target_kind || !period.contains(event.timestamp) {
            continue;
        }
        *counts.entry(event.target_id).or_insert(0) += 1;
    }
    counts
}

//! In-memory listening store for tests and tools.

use crate::charts::{Chart, ChartEntry, ChartStore, ChartType, PlayEvent, PlayEventSource, StoredChart};
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    // (song_id, album_id, timestamp), append-only like the scrobbles table
    scrobbles: Vec<(i64, Option<i64>, DateTime<Utc>)>,
    charts: HashMap<(ChartType, String), StoredChart>,
}

/// A listening store backed by in-memory collections. Same event-derivation
/// rules as the SQLite store: every scrobble yields a song event, and an
/// album event when the album id is present.
#[derive(Default)]
pub struct MemoryListeningStore {
    inner: Mutex<Inner>,
}

impl MemoryListeningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one scrobble.
    pub fn record(
        &self,
        song_id: i64,
        album_id: Option<i64>,
        scrobbled_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        inner.scrobbles.push((song_id, album_id, scrobbled_at));
        Ok(())
    }
}

impl PlayEventSource for MemoryListeningStore {
    fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        target_kind: ChartType,
    ) -> Result<Vec<PlayEvent>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        let mut events = Vec::new();
        for &(song_id, album_id, timestamp) in &inner.scrobbles {
            let date = timestamp.date_naive();
            if date < start || date >= end {
                continue;
            }
            let target_id = match target_kind {
                ChartType::Song => song_id,
                ChartType::Album => match album_id {
                    Some(album_id) => album_id,
                    None => continue,
                },
            };
            events.push(PlayEvent {
                target_kind,
                target_id,
                timestamp,
            });
        }
        Ok(events)
    }

    fn event_date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        let dates = inner
            .scrobbles
            .iter()
            .map(|&(_, _, timestamp)| timestamp.date_naive());
        let min = dates.clone().min();
        let max = dates.max();
        Ok(min.zip(max))
    }
}

impl ChartStore for MemoryListeningStore {
    fn replace_chart(&self, chart: &Chart, entries: &[ChartEntry]) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        inner.charts.insert(
            (chart.chart_type, chart.period_key.clone()),
            StoredChart {
                chart: chart.clone(),
                entries: entries.to_vec(),
            },
        );
        Ok(())
    }

    fn get_chart(&self, chart_type: ChartType, period_key: &str) -> Result<Option<StoredChart>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        Ok(inner
            .charts
            .get(&(chart_type, period_key.to_string()))
            .cloned())
    }

    fn latest_chart(&self, chart_type: ChartType) -> Result<Option<StoredChart>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        Ok(inner
            .charts
            .iter()
            .filter(|((stored_type, _), _)| *stored_type == chart_type)
            .max_by(|a, b| a.0 .1.cmp(&b.0 .1))
            .map(|(_, stored)| stored.clone()))
    }

    fn period_keys(&self, chart_type: ChartType) -> Result<Vec<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow!("memory listening store lock poisoned"))?;
        let mut keys: Vec<String> = inner
            .charts
            .keys()
            .filter(|(stored_type, _)| *stored_type == chart_type)
            .map(|(_, key)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_album_events_derived_from_scrobbles() {
        let store = MemoryListeningStore::new();
        let at = Utc.with_ymd_and_hms(2024, 11, 26, 10, 0, 0).unwrap();
        store.record(1, Some(10), at).unwrap();
        store.record(2, None, at).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 11, 25).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        let songs = store.events_in_range(start, end, ChartType::Song).unwrap();
        let albums = store.events_in_range(start, end, ChartType::Album).unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].target_id, 10);
    }

    #[test]
    fn test_replace_and_read_back() {
        let store = MemoryListeningStore::new();
        let chart = Chart {
            chart_type: ChartType::Song,
            period_key: "2024-W48".to_string(),
            period_start: NaiveDate::from_ymd_opt(2024, 11, 25).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2024, 12, 2).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2024, 12, 2, 8, 0, 0).unwrap(),
        };
        let entries = vec![ChartEntry {
            position: 1,
            target_id: 1,
            play_count: 3,
        }];
        store.replace_chart(&chart, &entries).unwrap();

        let stored = store.get_chart(ChartType::Song, "2024-W48").unwrap().unwrap();
        assert_eq!(stored.entries, entries);
        assert_eq!(store.period_keys(ChartType::Song).unwrap(), vec!["2024-W48"]);
        assert!(store.get_chart(ChartType::Album, "2024-W48").unwrap().is_none());
    }
}

//! End-to-end chart generation against real SQLite databases.

mod common;

use chrono::NaiveDate;
use common::{open_stores, play_times, seed_catalog};
use fonoteca::charts::{ChartError, ChartGenerator, ChartLimits, ChartStore, ChartType, Period};
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn generator(stores: &common::TestStores, limits: ChartLimits) -> ChartGenerator {
    ChartGenerator::new(
        Arc::new(stores.catalog.clone()),
        Arc::new(stores.listening.clone()),
        Arc::new(stores.listening.clone()),
        limits,
    )
}

// The week of 2024-11-25 (a Monday) through 2024-12-01 is 2024-W48.
const WEEK: &str = "2024-W48";

fn after_week() -> NaiveDate {
    date(2024, 12, 2)
}

#[test]
fn test_generate_week_end_to_end() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    play_times(&stores.listening, 1, Some(10), 2024, 11, 25, 5);
    play_times(&stores.listening, 2, Some(10), 2024, 11, 26, 5);
    play_times(&stores.listening, 4, None, 2024, 11, 27, 2);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    generator.generate_week(&period, after_week()).unwrap();

    let songs = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    assert_eq!(songs.chart.period_start, date(2024, 11, 25));
    assert_eq!(songs.chart.period_end, date(2024, 12, 2));

    let ids: Vec<i64> = songs.entries.iter().map(|e| e.target_id).collect();
    let positions: Vec<u32> = songs.entries.iter().map(|e| e.position).collect();
    let counts: Vec<u64> = songs.entries.iter().map(|e| e.play_count).collect();
    // Songs 1 and 2 tie at 5 plays; the lower id wins the tie
    assert_eq!(ids, vec![1, 2, 4]);
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(counts, vec![5, 5, 2]);

    // The albumless single contributes nothing to the album chart
    let albums = stores
        .listening
        .get_chart(ChartType::Album, WEEK)
        .unwrap()
        .unwrap();
    assert_eq!(albums.entries.len(), 1);
    assert_eq!(albums.entries[0].target_id, 10);
    assert_eq!(albums.entries[0].play_count, 10);
}

#[test]
fn test_events_on_period_boundaries() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    // Midnight on the start date is inside; midnight on the end date is not
    stores
        .listening
        .record_scrobble(1, Some(10), common::at(2024, 11, 25, 0))
        .unwrap();
    stores
        .listening
        .record_scrobble(1, Some(10), common::at(2024, 12, 2, 0))
        .unwrap();

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    generator.generate(ChartType::Song, &period).unwrap();

    let songs = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    assert_eq!(songs.entries.len(), 1);
    assert_eq!(songs.entries[0].play_count, 1);
}

#[test]
fn test_zero_scrobble_week_yields_empty_chart_not_error() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    generator.generate_week(&period, after_week()).unwrap();

    let songs = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    assert_eq!(songs.chart.period_key, WEEK);
    assert!(songs.entries.is_empty());
}

#[test]
fn test_incomplete_week_is_refused() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    let err = generator
        .generate_week(&period, date(2024, 11, 30))
        .unwrap_err();
    assert!(matches!(err, ChartError::PeriodNotComplete { .. }));
    assert!(stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .is_none());
}

#[test]
fn test_regeneration_replaces_never_mixes() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    play_times(&stores.listening, 1, Some(10), 2024, 11, 25, 3);
    play_times(&stores.listening, 2, Some(10), 2024, 11, 26, 1);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    generator.generate(ChartType::Song, &period).unwrap();

    let before = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    assert_eq!(before.entries.len(), 2);

    // More plays land for the same week (late import); regenerate
    play_times(&stores.listening, 3, Some(10), 2024, 11, 29, 7);
    generator.generate(ChartType::Song, &period).unwrap();

    let after = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = after.entries.iter().map(|e| e.target_id).collect();
    let positions: Vec<u32> = after.entries.iter().map(|e| e.position).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(positions, vec![1, 2, 3]);
    // Old entry rows are gone, not shadowed
    assert_eq!(after.entries.len(), 3);
}

#[test]
fn test_generation_is_idempotent() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    play_times(&stores.listening, 1, Some(10), 2024, 11, 25, 4);
    play_times(&stores.listening, 2, Some(10), 2024, 11, 26, 4);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();

    generator.generate(ChartType::Song, &period).unwrap();
    let first = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();

    generator.generate(ChartType::Song, &period).unwrap();
    let second = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();

    assert_eq!(first.entries, second.entries);
}

#[test]
fn test_orphaned_scrobbles_are_dropped_with_warning() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    play_times(&stores.listening, 1, Some(10), 2024, 11, 25, 2);
    // Scrobbles for a song that was deleted from the catalog
    play_times(&stores.listening, 77, None, 2024, 11, 26, 9);

    let generator = generator(&stores, ChartLimits::default());
    let period = Period::from_key(WEEK).unwrap();
    let build = generator.generate(ChartType::Song, &period).unwrap();

    assert_eq!(build.warnings.len(), 1);
    let stored = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = stored.entries.iter().map(|e| e.target_id).collect();
    assert_eq!(ids, vec![1]);
    assert_eq!(stored.entries[0].position, 1);
}

#[test]
fn test_cap_limits_entries() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    play_times(&stores.listening, 1, Some(10), 2024, 11, 25, 5);
    play_times(&stores.listening, 2, Some(10), 2024, 11, 26, 4);
    play_times(&stores.listening, 3, Some(10), 2024, 11, 27, 3);

    let generator = generator(
        &stores,
        ChartLimits {
            songs: 2,
            albums: 10,
        },
    );
    let period = Period::from_key(WEEK).unwrap();
    generator.generate(ChartType::Song, &period).unwrap();

    let stored = stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = stored.entries.iter().map(|e| e.target_id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_backfill_fills_only_missing_completed_weeks() {
    let stores = open_stores();
    seed_catalog(&stores.catalog);
    // Scrobbles across three weeks: W47, W48 and the (incomplete) W49
    play_times(&stores.listening, 1, Some(10), 2024, 11, 20, 2);
    play_times(&stores.listening, 2, Some(10), 2024, 11, 27, 3);
    play_times(&stores.listening, 3, Some(10), 2024, 12, 3, 1);

    let generator = generator(&stores, ChartLimits::default());

    // W47 already charted
    let w47 = Period::from_key("2024-W47").unwrap();
    generator.generate_week(&w47, after_week()).unwrap();

    // Today is Wednesday of W49
    let generated = generator.backfill(date(2024, 12, 4)).unwrap();
    assert_eq!(generated, vec![WEEK.to_string()]);

    assert!(stores
        .listening
        .get_chart(ChartType::Song, WEEK)
        .unwrap()
        .is_some());
    assert!(stores
        .listening
        .get_chart(ChartType::Song, "2024-W49")
        .unwrap()
        .is_none());

    // A second run has nothing left to do
    assert!(generator.backfill(date(2024, 12, 4)).unwrap().is_empty());
}

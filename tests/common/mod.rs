//! Shared fixtures for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use fonoteca::catalog_store::{Album, Artist, Song, SqliteCatalogStore, WritableCatalogStore};
use fonoteca::listening_store::SqliteListeningStore;
use tempfile::TempDir;

pub struct TestStores {
    // Held for the lifetime of the test databases
    #[allow(dead_code)]
    pub dir: TempDir,
    pub catalog: SqliteCatalogStore,
    pub listening: SqliteListeningStore,
}

/// Fresh, empty catalog and listening databases in a temp directory.
pub fn open_stores() -> TestStores {
    let dir = tempfile::tempdir().expect("create temp dir");
    let catalog =
        SqliteCatalogStore::open(dir.path().join("catalog.db"), 2).expect("open catalog db");
    let listening =
        SqliteListeningStore::open(dir.path().join("listening.db"), 2).expect("open listening db");
    TestStores {
        dir,
        catalog,
        listening,
    }
}

/// A small catalog: one rock artist with an album of three songs, plus an
/// albumless single by a second artist.
pub fn seed_catalog(catalog: &SqliteCatalogStore) {
    let mut artist = Artist::named(1, "The Knack");
    artist.genre = Some("Rock".to_string());
    artist.language = Some("English".to_string());
    catalog.insert_artist(&artist).expect("insert artist");

    catalog
        .insert_artist(&Artist::named(2, "Selena"))
        .expect("insert artist");

    catalog
        .insert_album(&Album::named(10, "Get The Knack", 1))
        .expect("insert album");

    for (id, name) in [(1, "My Sharona"), (2, "Good Girls Don't"), (3, "Frustrated")] {
        catalog
            .insert_song(&Song::named(id, name, 1, Some(10)))
            .expect("insert song");
    }
    catalog
        .insert_song(&Song::named(4, "Como La Flor", 2, None))
        .expect("insert song");
}

#[allow(dead_code)]
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Record `times` plays of a song on one day.
#[allow(dead_code)]
pub fn play_times(
    listening: &SqliteListeningStore,
    song_id: i64,
    album_id: Option<i64>,
    year: i32,
    month: u32,
    day: u32,
    times: usize,
) {
    for hour in 0..times {
        listening
            .record_scrobble(song_id, album_id, at(year, month, day, hour as u32))
            .expect("record scrobble");
    }
}

//! SQLite-backed catalog store implementation.

use super::models::{Album, Artist, Song};
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::{CatalogStore, WritableCatalogStore};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed catalog store.
///
/// One mutex-guarded write connection plus a round-robin pool of read-only
/// connections, all in WAL mode.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let mut current_version = (db_version - BASE_DB_VERSION as i64).max(0) as usize;

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
                current_version = schema.version;
            }
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema.validate(conn)
}

impl SqliteCatalogStore {
    /// Open (creating if necessary) the catalog database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open catalog database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let artist_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM artists", [], |r| r.get(0))
            .unwrap_or(0);
        let album_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM albums", [], |r| r.get(0))
            .unwrap_or(0);
        let song_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM songs", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened catalog: {} artists, {} albums, {} songs",
            artist_count, album_count, song_count
        );

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn count_table(&self, table: &str) -> usize {
        let conn = self.get_read_conn();
        let conn = match conn.lock() {
            Ok(conn) => conn,
            Err(_) => return 0,
        };
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
            r.get::<_, i64>(0)
        })
        .unwrap_or(0) as usize
    }

    fn parse_artist_row(row: &rusqlite::Row) -> rusqlite::Result<Artist> {
        Ok(Artist {
            id: row.get(0)?,
            name: row.get(1)?,
            genre: row.get(2)?,
            subgenre: row.get(3)?,
            language: row.get(4)?,
            gender: row.get(5)?,
            ethnicity: row.get(6)?,
        })
    }

    fn parse_album_row(row: &rusqlite::Row) -> rusqlite::Result<Album> {
        Ok(Album {
            id: row.get(0)?,
            name: row.get(1)?,
            artist_id: row.get(2)?,
            override_genre: row.get(3)?,
            override_subgenre: row.get(4)?,
            override_language: row.get(5)?,
        })
    }

    fn parse_song_row(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get(0)?,
            name: row.get(1)?,
            artist_id: row.get(2)?,
            album_id: row.get(3)?,
            duration_secs: row.get(4)?,
            override_genre: row.get(5)?,
            override_subgenre: row.get(6)?,
            override_language: row.get(7)?,
            override_gender: row.get(8)?,
            override_ethnicity: row.get(9)?,
        })
    }

    fn exists_in(&self, table: &str, id: i64) -> Result<bool> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog read connection poisoned"))?;
        let found = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", table),
                params![id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

const ARTIST_COLUMNS: &str = "id, name, genre, subgenre, language, gender, ethnicity";
const ALBUM_COLUMNS: &str =
    "id, name, artist_id, override_genre, override_subgenre, override_language";
const SONG_COLUMNS: &str = "id, name, artist_id, album_id, duration_secs, override_genre, \
     override_subgenre, override_language, override_gender, override_ethnicity";

impl CatalogStore for SqliteCatalogStore {
    fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog read connection poisoned"))?;
        let artist = conn
            .query_row(
                &format!("SELECT {} FROM artists WHERE id = ?1", ARTIST_COLUMNS),
                params![id],
                Self::parse_artist_row,
            )
            .optional()?;
        Ok(artist)
    }

    fn get_album(&self, id: i64) -> Result<Option<Album>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog read connection poisoned"))?;
        let album = conn
            .query_row(
                &format!("SELECT {} FROM albums WHERE id = ?1", ALBUM_COLUMNS),
                params![id],
                Self::parse_album_row,
            )
            .optional()?;
        Ok(album)
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog read connection poisoned"))?;
        let song = conn
            .query_row(
                &format!("SELECT {} FROM songs WHERE id = ?1", SONG_COLUMNS),
                params![id],
                Self::parse_song_row,
            )
            .optional()?;
        Ok(song)
    }

    fn song_exists(&self, id: i64) -> Result<bool> {
        self.exists_in("songs", id)
    }

    fn album_exists(&self, id: i64) -> Result<bool> {
        self.exists_in("albums", id)
    }

    fn list_songs(&self) -> Result<Vec<Song>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog read connection poisoned"))?;
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {} FROM songs ORDER BY id", SONG_COLUMNS))?;
        let songs = stmt
            .query_map([], Self::parse_song_row)?
            .collect::<Result<Vec<Song>, _>>()?;
        Ok(songs)
    }

    fn get_artists_count(&self) -> usize {
        self.count_table("artists")
    }

    fn get_albums_count(&self) -> usize {
        self.count_table("albums")
    }

    fn get_songs_count(&self) -> usize {
        self.count_table("songs")
    }
}

impl WritableCatalogStore for SqliteCatalogStore {
    fn insert_artist(&self, artist: &Artist) -> Result<()> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog write connection poisoned"))?;
        conn.execute(
            &format!(
                "INSERT INTO artists ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                ARTIST_COLUMNS
            ),
            params![
                artist.id,
                artist.name,
                artist.genre,
                artist.subgenre,
                artist.language,
                artist.gender,
                artist.ethnicity,
            ],
        )
        .with_context(|| format!("Failed to insert artist {}", artist.id))?;
        Ok(())
    }

    fn insert_album(&self, album: &Album) -> Result<()> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog write connection poisoned"))?;
        conn.execute(
            &format!(
                "INSERT INTO albums ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                ALBUM_COLUMNS
            ),
            params![
                album.id,
                album.name,
                album.artist_id,
                album.override_genre,
                album.override_subgenre,
                album.override_language,
            ],
        )
        .with_context(|| format!("Failed to insert album {}", album.id))?;
        Ok(())
    }

    fn insert_song(&self, song: &Song) -> Result<()> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow::anyhow!("catalog write connection poisoned"))?;
        conn.execute(
            &format!(
                "INSERT INTO songs ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                SONG_COLUMNS
            ),
            params![
                song.id,
                song.name,
                song.artist_id,
                song.album_id,
                song.duration_secs,
                song.override_genre,
                song.override_subgenre,
                song.override_language,
                song.override_gender,
                song.override_ethnicity,
            ],
        )
        .with_context(|| format!("Failed to insert song {}", song.id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteCatalogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteCatalogStore::open(dir.path().join("catalog.db"), 2).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_schema_and_reopen_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let store = SqliteCatalogStore::open(&path, 1).unwrap();
            store.insert_artist(&Artist::named(1, "A")).unwrap();
        }
        let store = SqliteCatalogStore::open(&path, 1).unwrap();
        assert_eq!(store.get_artists_count(), 1);
    }

    #[test]
    fn test_insert_and_get_roundtrip() {
        let (_dir, store) = temp_store();

        let mut artist = Artist::named(1, "The Knack");
        artist.genre = Some("Rock".to_string());
        store.insert_artist(&artist).unwrap();

        let mut album = Album::named(10, "Get The Knack", 1);
        album.override_genre = Some("Power Pop".to_string());
        store.insert_album(&album).unwrap();

        let song = Song::named(100, "My Sharona", 1, Some(10));
        store.insert_song(&song).unwrap();

        assert_eq!(store.get_artist(1).unwrap(), Some(artist));
        assert_eq!(store.get_album(10).unwrap(), Some(album));
        assert_eq!(store.get_song(100).unwrap(), Some(song));
        assert_eq!(store.get_song(999).unwrap(), None);
    }

    #[test]
    fn test_exists_checks() {
        let (_dir, store) = temp_store();
        store.insert_artist(&Artist::named(1, "A")).unwrap();
        store.insert_album(&Album::named(10, "AL", 1)).unwrap();
        store.insert_song(&Song::named(100, "S", 1, None)).unwrap();

        assert!(store.song_exists(100).unwrap());
        assert!(!store.song_exists(101).unwrap());
        assert!(store.album_exists(10).unwrap());
        assert!(!store.album_exists(11).unwrap());
    }

    #[test]
    fn test_insert_song_with_dangling_artist_fails() {
        let (_dir, store) = temp_store();
        let result = store.insert_song(&Song::named(100, "S", 42, None));
        assert!(result.is_err());
    }

    #[test]
    fn test_list_songs_ordered_by_id() {
        let (_dir, store) = temp_store();
        store.insert_artist(&Artist::named(1, "A")).unwrap();
        store.insert_song(&Song::named(3, "c", 1, None)).unwrap();
        store.insert_song(&Song::named(1, "a", 1, None)).unwrap();
        store.insert_song(&Song::named(2, "b", 1, None)).unwrap();

        let ids: Vec<i64> = store.list_songs().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}

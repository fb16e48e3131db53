//! CatalogStore trait definition.
//!
//! Abstracts read access to the catalog so the metadata resolver, the chart
//! builder and the statistics code work against any backend: the SQLite
//! store in production, the in-memory store in tests.

use super::models::{Album, Artist, Song};
use anyhow::Result;

/// Read interface over the catalog. The core never writes through this.
pub trait CatalogStore: Send + Sync {
    /// Get an artist by ID.
    fn get_artist(&self, id: i64) -> Result<Option<Artist>>;

    /// Get an album by ID.
    fn get_album(&self, id: i64) -> Result<Option<Album>>;

    /// Get a song by ID.
    fn get_song(&self, id: i64) -> Result<Option<Song>>;

    /// Check if a song exists. Used by the chart builder to drop play-event
    /// targets that are no longer in the catalog.
    fn song_exists(&self, id: i64) -> Result<bool>;

    /// Check if an album exists.
    fn album_exists(&self, id: i64) -> Result<bool>;

    /// All songs in the catalog, for statistics runs.
    fn list_songs(&self) -> Result<Vec<Song>>;

    /// Get the number of artists in the catalog.
    fn get_artists_count(&self) -> usize;

    /// Get the number of albums in the catalog.
    fn get_albums_count(&self) -> usize;

    /// Get the number of songs in the catalog.
    fn get_songs_count(&self) -> usize;
}

/// Extension trait for catalog stores that support writes.
///
/// Catalog population belongs to outer import layers; the core only consumes
/// the read interface above.
pub trait WritableCatalogStore: CatalogStore {
    /// Insert an artist into the catalog.
    fn insert_artist(&self, artist: &Artist) -> Result<()>;

    /// Insert an album into the catalog. Fails if the owning artist is
    /// missing.
    fn insert_album(&self, album: &Album) -> Result<()>;

    /// Insert a song into the catalog. Fails if the owning artist or the
    /// referenced album is missing.
    fn insert_song(&self, song: &Song) -> Result<()>;
}

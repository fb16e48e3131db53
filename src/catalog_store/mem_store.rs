//! In-memory catalog store.
//!
//! Backs unit tests and tools that don't need a database file. Same
//! contract as the SQLite store, including referential checks on insert.

use super::models::{Album, Artist, Song};
use super::trait_def::{CatalogStore, WritableCatalogStore};
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    artists: BTreeMap<i64, Artist>,
    albums: BTreeMap<i64, Album>,
    songs: BTreeMap<i64, Song>,
}

/// A catalog store backed by in-memory maps.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<Inner>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&Inner) -> T) -> Result<T> {
        match self.inner.lock() {
            Ok(inner) => Ok(f(&inner)),
            Err(_) => bail!("memory catalog store lock poisoned"),
        }
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn get_artist(&self, id: i64) -> Result<Option<Artist>> {
        self.with_inner(|inner| inner.artists.get(&id).cloned())
    }

    fn get_album(&self, id: i64) -> Result<Option<Album>> {
        self.with_inner(|inner| inner.albums.get(&id).cloned())
    }

    fn get_song(&self, id: i64) -> Result<Option<Song>> {
        self.with_inner(|inner| inner.songs.get(&id).cloned())
    }

    fn song_exists(&self, id: i64) -> Result<bool> {
        self.with_inner(|inner| inner.songs.contains_key(&id))
    }

    fn album_exists(&self, id: i64) -> Result<bool> {
        self.with_inner(|inner| inner.albums.contains_key(&id))
    }

    fn list_songs(&self) -> Result<Vec<Song>> {
        self.with_inner(|inner| inner.songs.values().cloned().collect())
    }

    fn get_artists_count(&self) -> usize {
        self.with_inner(|inner| inner.artists.len()).unwrap_or(0)
    }

    fn get_albums_count(&self) -> usize {
        self.with_inner(|inner| inner.albums.len()).unwrap_or(0)
    }

    fn get_songs_count(&self) -> usize {
        self.with_inner(|inner| inner.songs.len()).unwrap_or(0)
    }
}

impl WritableCatalogStore for MemoryCatalogStore {
    fn insert_artist(&self, artist: &Artist) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory catalog store lock poisoned"))?;
        if inner.artists.contains_key(&artist.id) {
            bail!("artist {} already exists", artist.id);
        }
        inner.artists.insert(artist.id, artist.clone());
        Ok(())
    }

    fn insert_album(&self, album: &Album) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory catalog store lock poisoned"))?;
        if !inner.artists.contains_key(&album.artist_id) {
            bail!(
                "album {} references missing artist {}",
                album.id,
                album.artist_id
            );
        }
        if inner.albums.contains_key(&album.id) {
            bail!("album {} already exists", album.id);
        }
        inner.albums.insert(album.id, album.clone());
        Ok(())
    }

    fn insert_song(&self, song: &Song) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory catalog store lock poisoned"))?;
        if !inner.artists.contains_key(&song.artist_id) {
            bail!(
                "song {} references missing artist {}",
                song.id,
                song.artist_id
            );
        }
        if let Some(album_id) = song.album_id {
            if !inner.albums.contains_key(&album_id) {
                bail!("song {} references missing album {}", song.id, album_id);
            }
        }
        if inner.songs.contains_key(&song.id) {
            bail!("song {} already exists", song.id);
        }
        inner.songs.insert(song.id, song.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let store = MemoryCatalogStore::new();
        store.insert_artist(&Artist::named(1, "A")).unwrap();
        store.insert_album(&Album::named(10, "AL", 1)).unwrap();
        store
            .insert_song(&Song::named(100, "S", 1, Some(10)))
            .unwrap();

        assert!(store.get_artist(1).unwrap().is_some());
        assert!(store.get_album(10).unwrap().is_some());
        assert!(store.song_exists(100).unwrap());
        assert_eq!(store.get_songs_count(), 1);
    }

    #[test]
    fn test_referential_checks() {
        let store = MemoryCatalogStore::new();
        assert!(store.insert_album(&Album::named(10, "AL", 1)).is_err());
        assert!(store.insert_song(&Song::named(100, "S", 1, None)).is_err());
    }
}

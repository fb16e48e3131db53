//! Catalog statistics over effective metadata.
//!
//! Songs are counted under their *effective* attribute value, so an album
//! override or artist base value places every song where a listener would
//! expect it, without any denormalized genre column on the song itself.

use crate::catalog_store::CatalogStore;
use crate::metadata::{resolve_song, Attribute, MetadataError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Song count for one attribute value. `value: None` is the bucket for
/// songs whose chain resolves to absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: Option<String>,
    pub song_count: u64,
}

/// Count songs per effective value of the given attribute, most common
/// first (ties by value). A broken ancestor link fails the whole run.
pub fn attribute_totals(
    catalog: &dyn CatalogStore,
    attribute: Attribute,
) -> Result<Vec<CategoryCount>, MetadataError> {
    let mut counts: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for song in catalog.list_songs()? {
        let effective = resolve_song(catalog, &song)?;
        let value = effective.get(attribute).map(str::to_string);
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut totals: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(value, song_count)| CategoryCount { value, song_count })
        .collect();
    totals.sort_by(|a, b| b.song_count.cmp(&a.song_count).then(a.value.cmp(&b.value)));
    Ok(totals)
}

pub fn genre_totals(catalog: &dyn CatalogStore) -> Result<Vec<CategoryCount>, MetadataError> {
    attribute_totals(catalog, Attribute::Genre)
}

pub fn subgenre_totals(catalog: &dyn CatalogStore) -> Result<Vec<CategoryCount>, MetadataError> {
    attribute_totals(catalog, Attribute::Subgenre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{
        Album, Artist, MemoryCatalogStore, Song, WritableCatalogStore,
    };

    #[test]
    fn test_songs_counted_under_effective_genre() {
        let store = MemoryCatalogStore::new();
        let mut rock_artist = Artist::named(1, "A1");
        rock_artist.genre = Some("Rock".to_string());
        store.insert_artist(&rock_artist).unwrap();
        store.insert_artist(&Artist::named(2, "A2")).unwrap();

        let mut jazz_album = Album::named(10, "AL1", 1);
        jazz_album.override_genre = Some("Jazz".to_string());
        store.insert_album(&jazz_album).unwrap();

        // Two songs inherit Rock from the artist, one gets Jazz from its
        // album, one resolves to nothing at all
        store.insert_song(&Song::named(100, "a", 1, None)).unwrap();
        store.insert_song(&Song::named(101, "b", 1, None)).unwrap();
        store
            .insert_song(&Song::named(102, "c", 1, Some(10)))
            .unwrap();
        store.insert_song(&Song::named(103, "d", 2, None)).unwrap();

        let totals = genre_totals(&store).unwrap();
        assert_eq!(
            totals,
            vec![
                CategoryCount {
                    value: Some("Rock".to_string()),
                    song_count: 2
                },
                CategoryCount {
                    value: None,
                    song_count: 1
                },
                CategoryCount {
                    value: Some("Jazz".to_string()),
                    song_count: 1
                },
            ]
        );
    }

    /// Catalog whose songs list includes a song with a dangling artist.
    /// MemoryCatalogStore refuses to insert broken links, so the broken
    /// record is spliced into the listing instead.
    struct BrokenCatalog(MemoryCatalogStore);

    impl CatalogStore for BrokenCatalog {
        fn get_artist(&self, id: i64) -> anyhow::Result<Option<Artist>> {
            self.0.get_artist(id)
        }
        fn get_album(&self, id: i64) -> anyhow::Result<Option<Album>> {
            self.0.get_album(id)
        }
        fn get_song(&self, id: i64) -> anyhow::Result<Option<Song>> {
            self.0.get_song(id)
        }
        fn song_exists(&self, id: i64) -> anyhow::Result<bool> {
            self.0.song_exists(id)
        }
        fn album_exists(&self, id: i64) -> anyhow::Result<bool> {
            self.0.album_exists(id)
        }
        fn list_songs(&self) -> anyhow::Result<Vec<Song>> {
            let mut songs = self.0.list_songs()?;
            songs.push(Song::named(999, "ghost", 42, None));
            Ok(songs)
        }
        fn get_artists_count(&self) -> usize {
            self.0.get_artists_count()
        }
        fn get_albums_count(&self) -> usize {
            self.0.get_albums_count()
        }
        fn get_songs_count(&self) -> usize {
            self.0.get_songs_count()
        }
    }

    #[test]
    fn test_dangling_artist_fails_the_run() {
        let store = MemoryCatalogStore::new();
        store.insert_artist(&Artist::named(1, "A1")).unwrap();
        store.insert_song(&Song::named(100, "a", 1, None)).unwrap();

        let broken = BrokenCatalog(store);
        assert!(matches!(
            genre_totals(&broken),
            Err(MetadataError::MissingArtist { .. })
        ));
    }

    #[test]
    fn test_empty_catalog_has_no_totals() {
        let store = MemoryCatalogStore::new();
        assert!(genre_totals(&store).unwrap().is_empty());
        assert!(subgenre_totals(&store).unwrap().is_empty());
    }
}

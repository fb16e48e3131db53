use super::resolver::{AncestorChain, Attribute, MetadataError};
use crate::catalog_store::{Album, CatalogStore, Song};
use serde::Serialize;

/// The fully resolved attribute set for one song or album.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EffectiveMetadata {
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
}

impl EffectiveMetadata {
    pub fn from_chain(chain: &AncestorChain<'_>) -> Self {
        EffectiveMetadata {
            genre: chain.resolve(Attribute::Genre).map(str::to_string),
            subgenre: chain.resolve(Attribute::Subgenre).map(str::to_string),
            language: chain.resolve(Attribute::Language).map(str::to_string),
            gender: chain.resolve(Attribute::Gender).map(str::to_string),
            ethnicity: chain.resolve(Attribute::Ethnicity).map(str::to_string),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Genre => self.genre.as_deref(),
            Attribute::Subgenre => self.subgenre.as_deref(),
            Attribute::Language => self.language.as_deref(),
            Attribute::Gender => self.gender.as_deref(),
            Attribute::Ethnicity => self.ethnicity.as_deref(),
        }
    }
}

/// Load a song's ancestor chain from the catalog and resolve all attributes.
pub fn resolve_song(
    catalog: &dyn CatalogStore,
    song: &Song,
) -> Result<EffectiveMetadata, MetadataError> {
    let artist =
        catalog
            .get_artist(song.artist_id)?
            .ok_or_else(|| MetadataError::MissingArtist {
                entity: "song",
                entity_id: song.id,
                artist_id: song.artist_id,
            })?;
    let album = match song.album_id {
        Some(album_id) => {
            Some(
                catalog
                    .get_album(album_id)?
                    .ok_or(MetadataError::MissingAlbum {
                        song_id: song.id,
                        album_id,
                    })?,
            )
        }
        None => None,
    };
    let chain = AncestorChain::for_song(song, album.as_ref(), &artist);
    Ok(EffectiveMetadata::from_chain(&chain))
}

/// Load an album's ancestor chain from the catalog and resolve all
/// attributes.
pub fn resolve_album(
    catalog: &dyn CatalogStore,
    album: &Album,
) -> Result<EffectiveMetadata, MetadataError> {
    let artist =
        catalog
            .get_artist(album.artist_id)?
            .ok_or_else(|| MetadataError::MissingArtist {
                entity: "album",
                entity_id: album.id,
                artist_id: album.artist_id,
            })?;
    let chain = AncestorChain::for_album(album, &artist);
    Ok(EffectiveMetadata::from_chain(&chain))
}

use crate::catalog_store::{Album, Artist, Song};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The five attributes subject to override inheritance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Genre,
    Subgenre,
    Language,
    Gender,
    Ethnicity,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Genre,
        Attribute::Subgenre,
        Attribute::Language,
        Attribute::Gender,
        Attribute::Ethnicity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Genre => "genre",
            Attribute::Subgenre => "subgenre",
            Attribute::Language => "language",
            Attribute::Gender => "gender",
            Attribute::Ethnicity => "ethnicity",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution failure. A song or album must always link to a real artist;
/// a dangling reference is a data integrity problem, not an absent value.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("{entity} {entity_id} references missing artist {artist_id}")]
    MissingArtist {
        entity: &'static str,
        entity_id: i64,
        artist_id: i64,
    },

    #[error("song {song_id} references missing album {album_id}")]
    MissingAlbum { song_id: i64, album_id: i64 },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// One level of the override chain, viewed per attribute.
///
/// Albums contribute nothing for gender and ethnicity: their view simply
/// leaves those slots empty, so the lookup falls through to the artist.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides<'a> {
    pub genre: Option<&'a str>,
    pub subgenre: Option<&'a str>,
    pub language: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub ethnicity: Option<&'a str>,
}

impl<'a> Overrides<'a> {
    pub fn of_song(song: &'a Song) -> Self {
        Overrides {
            genre: song.override_genre.as_deref(),
            subgenre: song.override_subgenre.as_deref(),
            language: song.override_language.as_deref(),
            gender: song.override_gender.as_deref(),
            ethnicity: song.override_ethnicity.as_deref(),
        }
    }

    pub fn of_album(album: &'a Album) -> Self {
        Overrides {
            genre: album.override_genre.as_deref(),
            subgenre: album.override_subgenre.as_deref(),
            language: album.override_language.as_deref(),
            gender: None,
            ethnicity: None,
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&'a str> {
        match attribute {
            Attribute::Genre => self.genre,
            Attribute::Subgenre => self.subgenre,
            Attribute::Language => self.language,
            Attribute::Gender => self.gender,
            Attribute::Ethnicity => self.ethnicity,
        }
    }
}

fn artist_base<'a>(artist: &'a Artist, attribute: Attribute) -> Option<&'a str> {
    match attribute {
        Attribute::Genre => artist.genre.as_deref(),
        Attribute::Subgenre => artist.subgenre.as_deref(),
        Attribute::Language => artist.language.as_deref(),
        Attribute::Gender => artist.gender.as_deref(),
        Attribute::Ethnicity => artist.ethnicity.as_deref(),
    }
}

/// Flattened ancestor chain for one entity: its own overrides, the optional
/// album hop, and the owning artist's base values.
///
/// The ownership graph is a strict forest, so a chain is at most three
/// levels deep and can never cycle.
#[derive(Clone, Copy, Debug)]
pub struct AncestorChain<'a> {
    own: Overrides<'a>,
    album: Option<Overrides<'a>>,
    artist: &'a Artist,
}

impl<'a> AncestorChain<'a> {
    /// Chain for a song: song overrides, then its album's (if any), then the
    /// artist base. The caller is responsible for having loaded the real
    /// album and artist of this song.
    pub fn for_song(song: &'a Song, album: Option<&'a Album>, artist: &'a Artist) -> Self {
        AncestorChain {
            own: Overrides::of_song(song),
            album: album.map(Overrides::of_album),
            artist,
        }
    }

    /// Chain for an album: album overrides, then the artist base.
    pub fn for_album(album: &'a Album, artist: &'a Artist) -> Self {
        AncestorChain {
            own: Overrides::of_album(album),
            album: None,
            artist,
        }
    }

    /// Walk the chain for one attribute; first present value wins.
    pub fn resolve(&self, attribute: Attribute) -> Option<&'a str> {
        self.own
            .get(attribute)
            .or_else(|| self.album.and_then(|album| album.get(attribute)))
            .or_else(|| artist_base(self.artist, attribute))
    }
}

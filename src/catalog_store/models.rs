//! Catalog entity models.
//!
//! Attribute fields hold the value directly; `None` means "unset" on an
//! artist and "defer to parent" on an album or song override. An override is
//! present or absent, never "override to empty".

use serde::{Deserialize, Serialize};

/// Artist entity. Base values are the root of the inheritance chain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub language: Option<String>,
    pub gender: Option<String>,
    pub ethnicity: Option<String>,
}

/// Album entity. Owned by exactly one artist.
///
/// Albums carry overrides for genre, subgenre and language only; gender and
/// ethnicity pass straight through from song to artist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub name: String,
    pub artist_id: i64,
    pub override_genre: Option<String>,
    pub override_subgenre: Option<String>,
    pub override_language: Option<String>,
}

/// Song entity. A single may have no album.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub name: String,
    pub artist_id: i64,
    pub album_id: Option<i64>,
    pub duration_secs: Option<i64>,
    pub override_genre: Option<String>,
    pub override_subgenre: Option<String>,
    pub override_language: Option<String>,
    pub override_gender: Option<String>,
    pub override_ethnicity: Option<String>,
}

impl Artist {
    /// Convenience constructor for an artist with no attributes set.
    pub fn named(id: i64, name: impl Into<String>) -> Self {
        Artist {
            id,
            name: name.into(),
            genre: None,
            subgenre: None,
            language: None,
            gender: None,
            ethnicity: None,
        }
    }
}

impl Album {
    /// Convenience constructor for an album with no overrides.
    pub fn named(id: i64, name: impl Into<String>, artist_id: i64) -> Self {
        Album {
            id,
            name: name.into(),
            artist_id,
            override_genre: None,
            override_subgenre: None,
            override_language: None,
        }
    }
}

impl Song {
    /// Convenience constructor for a song with no overrides.
    pub fn named(id: i64, name: impl Into<String>, artist_id: i64, album_id: Option<i64>) -> Self {
        Song {
            id,
            name: name.into(),
            artist_id,
            album_id,
            duration_secs: None,
            override_genre: None,
            override_subgenre: None,
            override_language: None,
            override_gender: None,
            override_ethnicity: None,
        }
    }
}

//! SQLite schema definitions for the catalog database.
//!
//! Integer primary keys throughout; override columns are nullable TEXT where
//! NULL means "defer to parent". Foreign keys are RESTRICT so a delete can
//! never orphan the inheritance chain.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const ARTIST_FK: ForeignKey = ForeignKey {
    foreign_table: "artists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

const ALBUM_FK: ForeignKey = ForeignKey {
    foreign_table: "albums",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Restrict,
};

/// Artists table - base attribute values, the root of inheritance
const ARTISTS_TABLE: Table = Table {
    name: "artists",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("subgenre", &SqlType::Text),
        sqlite_column!("language", &SqlType::Text),
        sqlite_column!("gender", &SqlType::Text),
        sqlite_column!("ethnicity", &SqlType::Text),
    ],
    indices: &[("idx_artists_name", "name")],
    unique_constraints: &[],
};

/// Albums table - one owning artist, overrides for genre/subgenre/language
const ALBUMS_TABLE: Table = Table {
    name: "albums",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("override_genre", &SqlType::Text),
        sqlite_column!("override_subgenre", &SqlType::Text),
        sqlite_column!("override_language", &SqlType::Text),
    ],
    indices: &[("idx_albums_artist", "artist_id")],
    unique_constraints: &[],
};

/// Songs table - album reference nullable (singles have none)
const SONGS_TABLE: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "artist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ARTIST_FK)
        ),
        sqlite_column!("album_id", &SqlType::Integer, foreign_key = Some(&ALBUM_FK)),
        sqlite_column!("duration_secs", &SqlType::Integer),
        sqlite_column!("override_genre", &SqlType::Text),
        sqlite_column!("override_subgenre", &SqlType::Text),
        sqlite_column!("override_language", &SqlType::Text),
        sqlite_column!("override_gender", &SqlType::Text),
        sqlite_column!("override_ethnicity", &SqlType::Text),
    ],
    indices: &[
        ("idx_songs_artist", "artist_id"),
        ("idx_songs_album", "album_id"),
    ],
    unique_constraints: &[],
};

const SCHEMA_V0: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[ARTISTS_TABLE, ALBUMS_TABLE, SONGS_TABLE],
    migration: None,
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[SCHEMA_V0];

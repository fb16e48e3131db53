//! SQLite schema definitions for the listening database.
//!
//! Holds the append-only scrobble history and the generated charts. The
//! album_id column on scrobbles is denormalized at ingest time so the
//! album-kind event stream never needs a catalog join.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

const CHART_FK: ForeignKey = ForeignKey {
    foreign_table: "charts",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Scrobbles table - append-only play history, unix-second timestamps
const SCROBBLES_TABLE: Table = Table {
    name: "scrobbles",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("song_id", &SqlType::Integer, non_null = true),
        sqlite_column!("album_id", &SqlType::Integer),
        sqlite_column!("scrobbled_at", &SqlType::Integer, non_null = true),
    ],
    indices: &[
        ("idx_scrobbles_at", "scrobbled_at"),
        ("idx_scrobbles_song", "song_id"),
    ],
    unique_constraints: &[],
};

/// Charts table - one row per (chart_type, period_key)
const CHARTS_TABLE: Table = Table {
    name: "charts",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("chart_type", &SqlType::Text, non_null = true), // 'song' or 'album'
        sqlite_column!("period_key", &SqlType::Text, non_null = true), // e.g. '2024-W48'
        sqlite_column!("period_start", &SqlType::Text, non_null = true), // inclusive, yyyy-mm-dd
        sqlite_column!("period_end", &SqlType::Text, non_null = true), // exclusive, yyyy-mm-dd
        sqlite_column!(
            "generated_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_charts_period_key", "period_key")],
    unique_constraints: &[&["chart_type", "period_key"]],
};

/// Chart entries table - wholesale replaced together with their chart
const CHART_ENTRIES_TABLE: Table = Table {
    name: "chart_entries",
    columns: &[
        sqlite_column!(
            "chart_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&CHART_FK)
        ),
        sqlite_column!("position", &SqlType::Integer, non_null = true),
        sqlite_column!("target_id", &SqlType::Integer, non_null = true),
        sqlite_column!("play_count", &SqlType::Integer, non_null = true),
    ],
    indices: &[("idx_chart_entries_chart", "chart_id")],
    unique_constraints: &[&["chart_id", "position"]],
};

const SCHEMA_V0: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[SCROBBLES_TABLE, CHARTS_TABLE, CHART_ENTRIES_TABLE],
    migration: None,
};

pub const LISTENING_VERSIONED_SCHEMAS: &[VersionedSchema] = &[SCHEMA_V0];

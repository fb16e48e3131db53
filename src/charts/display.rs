//! Chart display enrichment.
//!
//! Joins stored chart entries back to the catalog: names for the target and
//! its artist, plus the effective genre from the metadata resolver.

use super::models::{ChartType, StoredChart};
use crate::catalog_store::CatalogStore;
use crate::metadata::{resolve_album, resolve_song, MetadataError};
use serde::Serialize;
use tracing::warn;

/// One chart row ready for presentation.
#[derive(Clone, Debug, Serialize)]
pub struct ChartEntryView {
    pub position: u32,
    pub target_id: i64,
    pub name: String,
    pub artist_name: String,
    pub play_count: u64,
    pub genre: Option<String>,
}

/// Resolve every entry of a stored chart against the catalog.
///
/// Entries whose target has disappeared from the catalog since generation
/// are skipped with a warning; a broken ancestor link on a target that does
/// exist is still a hard integrity error.
pub fn enrich_chart(
    catalog: &dyn CatalogStore,
    stored: &StoredChart,
) -> Result<Vec<ChartEntryView>, MetadataError> {
    let mut views = Vec::with_capacity(stored.entries.len());
    for entry in &stored.entries {
        let view = match stored.chart.chart_type {
            ChartType::Song => match catalog.get_song(entry.target_id)? {
                Some(song) => {
                    let artist = catalog.get_artist(song.artist_id)?.ok_or_else(|| {
                        MetadataError::MissingArtist {
                            entity: "song",
                            entity_id: song.id,
                            artist_id: song.artist_id,
                        }
                    })?;
                    let effective = resolve_song(catalog, &song)?;
                    ChartEntryView {
                        position: entry.position,
                        target_id: entry.target_id,
                        name: song.name,
                        artist_name: artist.name,
                        play_count: entry.play_count,
                        genre: effective.genre,
                    }
                }
                None => {
                    warn!(
                        "Chart {} entry {} references missing song {}",
                        stored.chart.period_key, entry.position, entry.target_id
                    );
                    continue;
                }
            },
            ChartType::Album => match catalog.get_album(entry.target_id)? {
                Some(album) => {
                    let artist = catalog.get_artist(album.artist_id)?.ok_or_else(|| {
                        MetadataError::MissingArtist {
                            entity: "album",
                            entity_id: album.id,
                            artist_id: album.artist_id,
                        }
                    })?;
                    let effective = resolve_album(catalog, &album)?;
                    ChartEntryView {
                        position: entry.position,
                        target_id: entry.target_id,
                        name: album.name,
                        artist_name: artist.name,
                        play_count: entry.play_count,
                        genre: effective.genre,
                    }
                }
                None => {
                    warn!(
                        "Chart {} entry {} references missing album {}",
                        stored.chart.period_key, entry.position, entry.target_id
                    );
                    continue;
                }
            },
        };
        views.push(view);
    }
    Ok(views)
}

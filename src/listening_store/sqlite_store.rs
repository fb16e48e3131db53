//! SQLite-backed listening store: scrobble history and generated charts.

use super::schema::LISTENING_VERSIONED_SCHEMAS;
use crate::charts::{Chart, ChartEntry, ChartStore, ChartType, PlayEvent, PlayEventSource, StoredChart};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed store for play history and charts.
///
/// Same connection model as the catalog store: one mutex-guarded write
/// connection, a round-robin read pool, WAL mode.
#[derive(Clone)]
pub struct SqliteListeningStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = LISTENING_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &LISTENING_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if table_count == 0 {
        info!("Creating listening db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let mut current_version = (db_version - BASE_DB_VERSION as i64).max(0) as usize;

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in LISTENING_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating listening db from version {} to {}",
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

fn day_start_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

fn datetime_from_unix(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| anyhow!("timestamp {} out of range", secs))
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    text.parse::<NaiveDate>()
        .with_context(|| format!("invalid stored date '{}'", text))
}

impl SqliteListeningStore {
    /// Open (creating if necessary) the listening database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open listening database")?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let scrobble_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM scrobbles", [], |r| r.get(0))
            .unwrap_or(0);
        let chart_count: i64 = write_conn
            .query_row("SELECT COUNT(*) FROM charts", [], |r| r.get(0))
            .unwrap_or(0);

        info!(
            "Opened listening db: {} scrobbles, {} charts",
            scrobble_count, chart_count
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

        Ok(SqliteListeningStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    /// Append one scrobble. The album id is denormalized here so album
    /// charts never need a catalog join; pass `None` for singles.
    pub fn record_scrobble(
        &self,
        song_id: i64,
        album_id: Option<i64>,
        scrobbled_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow!("listening write connection poisoned"))?;
        conn.execute(
            "INSERT INTO scrobbles (song_id, album_id, scrobbled_at) VALUES (?1, ?2, ?3)",
            params![song_id, album_id, scrobbled_at.timestamp()],
        )
        .context("Failed to record scrobble")?;
        Ok(())
    }

    /// Number of scrobbles on record.
    pub fn get_scrobbles_count(&self) -> usize {
        let conn = self.get_read_conn();
        let conn = match conn.lock() {
            Ok(conn) => conn,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM scrobbles", [], |r| r.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    fn parse_chart_row(row: &rusqlite::Row) -> rusqlite::Result<(i64, ChartType, String, String, String, i64)> {
        Ok((
            row.get(0)?,
            ChartType::from_db_str(&row.get::<_, String>(1)?),
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
        ))
    }

    fn load_chart(&self, conn: &Connection, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<StoredChart>> {
        let row = conn
            .query_row(sql, args, Self::parse_chart_row)
            .optional()?;
        let Some((chart_id, chart_type, period_key, start_text, end_text, generated_secs)) = row
        else {
            return Ok(None);
        };

        let chart = Chart {
            chart_type,
            period_key,
            period_start: parse_date(&start_text)?,
            period_end: parse_date(&end_text)?,
            generated_at: datetime_from_unix(generated_secs)?,
        };

        let mut stmt = conn.prepare_cached(
            "SELECT position, target_id, play_count FROM chart_entries \
             WHERE chart_id = ?1 ORDER BY position",
        )?;
        let entries = stmt
            .query_map(params![chart_id], |row| {
                Ok(ChartEntry {
                    position: row.get(0)?,
                    target_id: row.get(1)?,
                    play_count: row.get::<_, i64>(2)? as u64,
                })
            })?
            .collect::<Result<Vec<ChartEntry>, _>>()?;

        Ok(Some(StoredChart { chart, entries }))
    }
}

const CHART_COLUMNS: &str = "id, chart_type, period_key, period_start, period_end, generated_at";

impl PlayEventSource for SqliteListeningStore {
    fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        target_kind: ChartType,
    ) -> Result<Vec<PlayEvent>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("listening read connection poisoned"))?;

        let sql = match target_kind {
            ChartType::Song => {
                "SELECT song_id, scrobbled_at FROM scrobbles \
                 WHERE scrobbled_at >= ?1 AND scrobbled_at < ?2"
            }
            ChartType::Album => {
                "SELECT album_id, scrobbled_at FROM scrobbles \
                 WHERE scrobbled_at >= ?1 AND scrobbled_at < ?2 AND album_id IS NOT NULL"
            }
        };

        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt
            .query_map(
                params![day_start_unix(start), day_start_unix(end)],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )?
            .collect::<Result<Vec<(i64, i64)>, _>>()?;

        let mut events = Vec::with_capacity(rows.len());
        for (target_id, secs) in rows {
            events.push(PlayEvent {
                target_kind,
                target_id,
                timestamp: datetime_from_unix(secs)?,
            });
        }
        Ok(events)
    }

    fn event_date_range(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("listening read connection poisoned"))?;
        let bounds: (Option<i64>, Option<i64>) = conn.query_row(
            "SELECT MIN(scrobbled_at), MAX(scrobbled_at) FROM scrobbles",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        match bounds {
            (Some(min), Some(max)) => Ok(Some((
                datetime_from_unix(min)?.date_naive(),
                datetime_from_unix(max)?.date_naive(),
            ))),
            _ => Ok(None),
        }
    }
}

impl ChartStore for SqliteListeningStore {
    fn replace_chart(&self, chart: &Chart, entries: &[ChartEntry]) -> Result<()> {
        let mut conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow!("listening write connection poisoned"))?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM chart_entries WHERE chart_id IN \
             (SELECT id FROM charts WHERE chart_type = ?1 AND period_key = ?2)",
            params![chart.chart_type.to_db_str(), chart.period_key],
        )?;
        tx.execute(
            "DELETE FROM charts WHERE chart_type = ?1 AND period_key = ?2",
            params![chart.chart_type.to_db_str(), chart.period_key],
        )?;

        tx.execute(
            "INSERT INTO charts (chart_type, period_key, period_start, period_end, generated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                chart.chart_type.to_db_str(),
                chart.period_key,
                chart.period_start.to_string(),
                chart.period_end.to_string(),
                chart.generated_at.timestamp(),
            ],
        )?;
        let chart_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO chart_entries (chart_id, position, target_id, play_count) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    chart_id,
                    entry.position,
                    entry.target_id,
                    entry.play_count as i64,
                ])?;
            }
        }

        tx.commit()
            .with_context(|| format!("Failed to commit chart {}", chart.period_key))?;
        Ok(())
    }

    fn get_chart(&self, chart_type: ChartType, period_key: &str) -> Result<Option<StoredChart>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("listening read connection poisoned"))?;
        self.load_chart(
            &conn,
            &format!(
                "SELECT {} FROM charts WHERE chart_type = ?1 AND period_key = ?2",
                CHART_COLUMNS
            ),
            &[&chart_type.to_db_str(), &period_key],
        )
    }

    fn latest_chart(&self, chart_type: ChartType) -> Result<Option<StoredChart>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("listening read connection poisoned"))?;
        self.load_chart(
            &conn,
            &format!(
                "SELECT {} FROM charts WHERE chart_type = ?1 \
                 ORDER BY period_key DESC LIMIT 1",
                CHART_COLUMNS
            ),
            &[&chart_type.to_db_str()],
        )
    }

    fn period_keys(&self, chart_type: ChartType) -> Result<Vec<String>> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("listening read connection poisoned"))?;
        let mut stmt = conn.prepare_cached(
            "SELECT period_key FROM charts WHERE chart_type = ?1 ORDER BY period_key",
        )?;
        let keys = stmt
            .query_map(params![chart_type.to_db_str()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

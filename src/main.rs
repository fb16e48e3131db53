use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod catalog_store;
use catalog_store::{CatalogStore, SqliteCatalogStore};

mod charts;
use charts::{enrich_chart, ChartGenerator, ChartStore, ChartType, Period};

mod config;
use config::{AppConfig, CliConfig, FileConfig};

mod listening_store;
use listening_store::SqliteListeningStore;

mod metadata;
use metadata::{resolve_album, resolve_song};

mod sqlite_persistence;

mod stats;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database file.
    #[clap(value_parser = parse_path)]
    pub catalog_db: PathBuf,

    /// Path to the SQLite listening database file (scrobbles and charts).
    #[clap(value_parser = parse_path)]
    pub listening_db: PathBuf,

    /// Path to an optional TOML config file; its values override the CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The maximum number of entries on a song chart.
    #[clap(long, default_value_t = 20)]
    pub songs_limit: usize,

    /// The maximum number of entries on an album chart.
    #[clap(long, default_value_t = 10)]
    pub albums_limit: usize,

    /// The number of read-only SQLite connections per store.
    #[clap(long, default_value_t = 4)]
    pub read_pool_size: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the song and album charts for a completed week.
    /// Defaults to the most recent completed week.
    Generate {
        /// Period key, e.g. 2024-W48.
        #[clap(long)]
        period: Option<String>,
    },

    /// Generate charts for every completed week that has scrobbles but no
    /// stored chart yet.
    Backfill,

    /// Print a stored chart as JSON, entries enriched from the catalog.
    Show {
        #[clap(long, value_enum)]
        chart_type: ChartTypeArg,

        /// Period key; defaults to the latest stored chart.
        #[clap(long)]
        period: Option<String>,
    },

    /// Print an entity's effective metadata as JSON.
    Resolve {
        #[command(subcommand)]
        target: ResolveTarget,
    },

    /// Print song counts per effective genre and subgenre as JSON.
    Stats,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartTypeArg {
    Song,
    Album,
}

impl From<ChartTypeArg> for ChartType {
    fn from(arg: ChartTypeArg) -> Self {
        match arg {
            ChartTypeArg::Song => ChartType::Song,
            ChartTypeArg::Album => ChartType::Album,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ResolveTarget {
    /// Resolve a song's effective metadata.
    Song { id: i64 },
    /// Resolve an album's effective metadata.
    Album { id: i64 },
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = AppConfig::resolve(
        &CliConfig {
            catalog_db: cli_args.catalog_db.clone(),
            listening_db: cli_args.listening_db.clone(),
            songs_limit: cli_args.songs_limit,
            albums_limit: cli_args.albums_limit,
            read_pool_size: cli_args.read_pool_size,
        },
        file_config,
    )?;

    info!("Opening catalog database at {:?}...", config.catalog_db);
    let catalog = Arc::new(SqliteCatalogStore::open(
        &config.catalog_db,
        config.read_pool_size,
    )?);

    info!("Opening listening database at {:?}...", config.listening_db);
    let listening = Arc::new(SqliteListeningStore::open(
        &config.listening_db,
        config.read_pool_size,
    )?);

    let generator = ChartGenerator::new(
        catalog.clone(),
        listening.clone(),
        listening.clone(),
        config.chart_limits(),
    );
    let today = Local::now().date_naive();

    match cli_args.command {
        Command::Generate { period } => {
            let period = match period {
                Some(key) => Period::from_key(&key)?,
                None => previous_week(today),
            };
            let builds = generator.generate_week(&period, today)?;
            for build in &builds {
                println!(
                    "{} chart {}: {} entries",
                    build.chart.chart_type,
                    build.chart.period_key,
                    build.entries.len()
                );
            }
        }
        Command::Backfill => {
            let generated = generator.backfill(today)?;
            if generated.is_empty() {
                println!("All completed weeks with scrobbles already have charts");
            } else {
                println!("Generated charts for {} weeks:", generated.len());
                for key in generated {
                    println!("  {}", key);
                }
            }
        }
        Command::Show { chart_type, period } => {
            let chart_type = ChartType::from(chart_type);
            let stored = match period {
                Some(key) => listening.get_chart(chart_type, &key)?,
                None => listening.latest_chart(chart_type)?,
            };
            let Some(stored) = stored else {
                bail!("No stored {} chart found", chart_type);
            };
            let entries = enrich_chart(catalog.as_ref(), &stored)?;
            let output = serde_json::json!({
                "chart": stored.chart,
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Resolve { target } => {
            let effective = match target {
                ResolveTarget::Song { id } => {
                    let Some(song) = catalog.get_song(id)? else {
                        bail!("Song {} not found", id);
                    };
                    resolve_song(catalog.as_ref(), &song)?
                }
                ResolveTarget::Album { id } => {
                    let Some(album) = catalog.get_album(id)? else {
                        bail!("Album {} not found", id);
                    };
                    resolve_album(catalog.as_ref(), &album)?
                }
            };
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        Command::Stats => {
            let output = serde_json::json!({
                "genres": stats::genre_totals(catalog.as_ref())?,
                "subgenres": stats::subgenre_totals(catalog.as_ref())?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// The most recent fully completed week.
fn previous_week(today: chrono::NaiveDate) -> Period {
    let current = Period::containing(today);
    Period::containing(current.start - chrono::Days::new(7))
}

//! L&D job board CLI
//!
//! Runs ingestion once or on a daily schedule, and reads back the stored
//! postings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use jobboard::{
    error::Result,
    models::{Config, Level, count_specialties},
    pipeline::{DailySchedule, IngestionPipeline, RunReport},
    services::{FixtureSource, JobSource, JobSpyClient},
    storage::{JobFilter, JobStore, SqliteJobStore},
};

const LIST_TEMPLATE: &str = "{id}  {title} | {company} | {location} | {level} | {salary} | {url}";

/// Job board - L&D job posting ingestion
#[derive(Parser, Debug)]
#[command(
    name = "jobboard",
    version,
    about = "Scrapes, filters and stores Learning & Development job postings"
)]
struct Cli {
    /// Path to storage directory containing config.toml and the database
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion pass over every search task
    Run {
        /// Replay provider answers from a JSON fixture instead of calling the API
        #[arg(long)]
        fixture: Option<PathBuf>,
    },

    /// Stay resident and run ingestion daily at the configured UTC time
    Schedule,

    /// List stored postings, newest first
    List {
        /// Match title or company
        #[arg(short, long)]
        keyword: Option<String>,

        /// junior, mid or senior
        #[arg(long)]
        level: Option<Level>,

        /// Match location
        #[arg(short, long)]
        location: Option<String>,

        /// With --location, also include remote/nationwide and same-state postings
        #[arg(long)]
        broad: bool,

        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,

        /// Print JSON instead of one line per posting
        #[arg(long)]
        json: bool,
    },

    /// Show board statistics
    Stats {
        /// Also print every distinct location
        #[arg(long)]
        locations: bool,

        #[arg(long)]
        json: bool,
    },

    /// Validate configuration
    Validate,

    /// Delete every stored posting
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Initialize logging. `RUST_LOG` wins over the default filter.
fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

fn open_store(storage_dir: &Path, config: &Config) -> Result<SqliteJobStore> {
    let path = storage_dir.join(&config.storage.database_file);
    log::debug!("Opening job store at {}", path.display());
    SqliteJobStore::open(path)
}

/// One ingestion pass. A failed run is returned as an error.
async fn run_once(storage_dir: &Path, config: &Config, fixture: Option<&Path>) -> Result<RunReport> {
    let source: Arc<dyn JobSource> = match fixture {
        Some(path) => {
            log::info!("Using fixture {}", path.display());
            Arc::new(FixtureSource::load(path)?)
        }
        None => Arc::new(JobSpyClient::new(config)?),
    };
    let store: Arc<dyn JobStore> = Arc::new(open_store(storage_dir, config)?);

    let mut pipeline = IngestionPipeline::new(config, source, store);
    pipeline.run(Utc::now().date_naive()).await.into_result()
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let loaded = Config::load(&config_path);
    let default_filter = match (&loaded, cli.verbose) {
        (_, true) => "debug".to_string(),
        (Ok(config), false) => config.logging.level.clone(),
        (Err(_), false) => "info".to_string(),
    };
    init_logging(&default_filter);

    let config = loaded.unwrap_or_else(|e| {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            config_path.display(),
            e
        );
        Config::default()
    });

    match cli.command {
        Command::Run { fixture } => {
            config.validate()?;
            let report = run_once(&cli.storage_dir, &config, fixture.as_deref()).await?;
            log::info!(
                "Run complete: {} new postings from {} tasks",
                report.inserted,
                report.tasks_attempted
            );
        }

        Command::Schedule => {
            config.validate()?;
            let schedule = DailySchedule::new(config.schedule.daily_time()?);
            log::info!("Scheduling daily run at {} UTC", config.schedule.daily_at_utc);

            let storage_dir = cli.storage_dir.clone();
            let mut current = config.clone();
            schedule
                .run(None, || {
                    // Pick up config edits between runs; invalid edits keep the last good config
                    current = Config::reload_or(&config_path, &current);
                    let config = current.clone();
                    let storage_dir = storage_dir.clone();
                    async move {
                        if let Err(e) = run_once(&storage_dir, &config, None).await {
                            log::error!("Scheduled run failed: {}", e);
                        }
                    }
                })
                .await;
        }

        Command::List {
            keyword,
            level,
            location,
            broad,
            limit,
            json,
        } => {
            let store = open_store(&cli.storage_dir, &config)?;
            let filter = JobFilter {
                keyword,
                level,
                location,
                include_broad_locations: broad,
                limit: Some(limit),
            };
            let rows = store.query(&filter)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!("{}", row.format(LIST_TEMPLATE));
                }
                log::info!("{} postings", rows.len());
            }
        }

        Command::Stats { locations, json } => {
            let store = open_store(&cli.storage_dir, &config)?;
            let stats = store.stats(Utc::now().date_naive())?;
            let rows = store.query(&JobFilter::default())?;
            let specialties = count_specialties(rows.iter().map(|r| &r.posting));
            let location_list = if locations {
                store.locations()?
            } else {
                Vec::new()
            };

            if json {
                let body = serde_json::json!({
                    "stats": stats,
                    "specialties": specialties,
                    "locations": location_list,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }

            println!("Total jobs:    {}", stats.total_jobs);
            println!("Companies:     {}", stats.companies);
            println!("Remote:        {}", stats.remote_jobs);
            println!("New today:     {}", stats.new_today);
            println!("With salary:   {}", stats.with_salary);
            println!("By level:");
            for (level, count) in &stats.by_level {
                println!("  {level:<22}{count}");
            }
            println!("By category:");
            for (category, count) in &stats.by_category {
                println!("  {category:<22}{count}");
            }
            println!("Specialties:");
            for s in &specialties {
                println!("  {:<22}{}", s.name, s.count);
            }
            if locations {
                println!("Locations:");
                for location in &location_list {
                    println!("  {location}");
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} terms x {} locations = {} tasks, {}-day window)",
                config.search.terms.len(),
                config.search.locations.len(),
                config.tasks().len(),
                config.search.lookback_days
            );

            let store = open_store(&cli.storage_dir, &config)?;
            log::info!("✓ Job store OK ({} postings)", store.count()?);

            log::info!("All validations passed!");
        }

        Command::Reset { yes } => {
            if !yes {
                log::warn!("Refusing to delete postings without --yes");
                return Ok(());
            }
            let store = open_store(&cli.storage_dir, &config)?;
            let removed = store.clear()?;
            log::info!("Removed {} postings", removed);
        }
    }

    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rankwatch::config::Config;
use rankwatch::pipeline::{ParsePipeline, PipelineStats};
use rankwatch::scheduler::OffsetCounter;
use rankwatch::server::RankServer;
use rankwatch::service::RankService;
use rankwatch::storage::{create_sqlite_repository, RankRepository, SharedRankRepository};

#[derive(Parser)]
#[command(
    name = "rankwatch",
    version,
    about = "Crowd-sourced search ranking tracker for sponsored results",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the contributor API and run the periodic parse batch
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
    },

    /// Parse pending captures
    Parse {
        /// Override the configured batch size
        #[arg(short, long)]
        limit: Option<usize>,

        /// Keep running batches until nothing is pending
        #[arg(long, default_value = "false")]
        all: bool,

        /// Make captures that failed to parse eligible again first
        #[arg(long, default_value = "false")]
        retry_failed: bool,
    },

    /// Print the current position report
    Report {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Replace the tracked phrases with the lines of a file
    Phrases {
        /// One phrase per line
        file: PathBuf,
    },

    /// Replace the sites of interest with the lines of a file
    Sites {
        /// One domain per line
        file: PathBuf,
    },

    /// Atomically add to a named counter and print its previous value
    Counter {
        name: String,

        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        database = %config.database.sqlite_path.display(),
        "rankwatch starting"
    );

    let repo = create_sqlite_repository(&config.database.sqlite_path)
        .context("Failed to open database")?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            serve(repo, config).await?;
        }

        Commands::Parse {
            limit,
            all,
            retry_failed,
        } => {
            parse(repo, limit.unwrap_or(config.rank.parse_batch_limit), all, retry_failed)?;
        }

        Commands::Report { format } => {
            report(repo, config, &format)?;
        }

        Commands::Phrases { file } => {
            let service = RankService::new(repo, config.rank)?;
            let count = service.replace_phrases(&read_lines(&file)?)?;
            println!("Tracking {count} phrases");
        }

        Commands::Sites { file } => {
            let service = RankService::new(repo, config.rank)?;
            let count = service.replace_sites(&read_lines(&file)?)?;
            println!("Tracking {count} sites");
        }

        Commands::Counter { name, delta } => {
            let counter = OffsetCounter::new(repo, name);
            let previous = counter.increment(delta)?;
            let current = previous
                .checked_add(delta)
                .context("Counter value out of range")?;
            println!("{}: {} -> {}", counter.name(), previous, current);
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("rankwatch=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("rankwatch={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

async fn serve(repo: SharedRankRepository, config: Config) -> Result<()> {
    if let Err(e) = rankwatch::metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics initialization failed, continuing without metrics");
    }

    let server = RankServer::new(repo, &config).context("Failed to create rank server")?;

    println!("{}", server.info().display());
    println!();
    println!("API Endpoints:");
    println!("  GET  /api/health        - Health check");
    println!("  GET  /api/donors?count= - Next search URLs and polling delay");
    println!("  POST /api/accept        - Submit a captured result page");
    println!("  GET  /api/result        - Current position report");
    println!("  POST /api/queries       - Replace tracked phrases");
    println!("  POST /api/sites         - Replace sites of interest");
    println!("  GET  /metrics           - Prometheus metrics endpoint");
    println!();
    println!("Press Ctrl+C to stop.\n");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("Rank server stopped.");
    Ok(())
}

fn parse(repo: SharedRankRepository, limit: usize, all: bool, retry_failed: bool) -> Result<()> {
    if retry_failed {
        let reset = repo.reset_parse_failures()?;
        println!("Re-queued {reset} captures that previously failed to parse");
    }

    let pipeline = ParsePipeline::new(repo, limit);
    let mut total = PipelineStats::default();

    loop {
        let stats = pipeline.run_once(Utc::now())?;
        total.merge(&stats);

        if !all || stats.processed == 0 || stats.failed == stats.processed {
            break;
        }
    }

    println!("Parse complete:");
    println!("  Processed:   {}", total.processed);
    println!("  Parsed:      {}", total.parsed);
    println!("  Empty:       {}", total.empty);
    println!("  Unsupported: {}", total.unsupported);
    println!("  Captcha:     {}", total.captcha);
    println!("  Unparseable: {}", total.unparseable);
    println!("  Undecodable: {}", total.undecodable);
    println!("  Failed:      {}", total.failed);
    Ok(())
}

fn report(repo: SharedRankRepository, config: Config, format: &str) -> Result<()> {
    let service = RankService::new(repo, config.rank)?;
    let mut rows = service.results(Utc::now())?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            rows.sort_by(|a, b| {
                (&a.phrase, a.position, &a.site).cmp(&(&b.phrase, b.position, &b.site))
            });
            println!("{:<40} {:<30} {:>8} {:>9}", "PHRASE", "SITE", "POSITION", "GUARANTEE");
            for row in &rows {
                println!(
                    "{:<40} {:<30} {:>8} {:>9}",
                    row.phrase,
                    row.site,
                    row.position,
                    if row.guarantee { "yes" } else { "no" }
                );
            }
            println!("\n{} rows", rows.len());
        }
    }

    Ok(())
}

/// Non-empty trimmed lines of a text file
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

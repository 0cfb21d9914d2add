//! blogboard CLI
//!
//! Serves the board over HTTP and syncs configured blogs into it.

use std::path::PathBuf;
use std::sync::Arc;

use blogboard::{
    board::Board,
    error::{AppError, Result},
    models::Config,
    pipeline::{SyncPipeline, SyncReport},
    query::{KeywordConfig, TitleKeywords},
    server::{self, AppState},
    services::TumblrClient,
    storage::{LocalStorage, PostStore, StoreSummary},
};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

/// blogboard - Blog Post Aggregator
#[derive(Parser, Debug)]
#[command(name = "blogboard", version, about = "Aggregates blog posts into a searchable board")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "blogboard.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the board and sync every configured blog in the background
    Serve {
        /// Only replay stored posts; do not contact the remote source
        #[arg(long)]
        no_fetch: bool,
    },

    /// Sync every configured blog into local storage
    Sync,

    /// Validate the configuration file
    Validate,

    /// Show stored post counts per blog
    Info,
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn build_pipeline(config: &Config, store: Arc<dyn PostStore>) -> Result<SyncPipeline> {
    let source = Arc::new(TumblrClient::new(&config.source)?);
    Ok(SyncPipeline::new(source, store, config.source.page_size))
}

fn log_summary(reports: &[SyncReport]) {
    let emitted: usize = reports.iter().map(SyncReport::emitted).sum();
    let fetched: usize = reports.iter().map(|r| r.fetched).sum();
    let failed = reports.iter().filter(|r| r.fetch_failed).count();
    log::info!(
        "Sync finished for {} blogs: {} posts, {} new, {} fetch failures",
        reports.len(),
        emitted,
        fetched,
        failed
    );
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Shutdown requested");
        }
        token.cancel();
    });
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = loaded
        .as_ref()
        .map_or_else(|_| "info".to_string(), |c| c.logging.level.clone());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) if matches!(cli.command, Command::Validate) => {
            log::error!("Config load failed from {}: {}", cli.config.display(), e);
            return Err(e);
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
    };
    config.apply_env();

    let store: Arc<dyn PostStore> = Arc::new(LocalStorage::new(&config.storage.data_dir));

    match cli.command {
        Command::Serve { no_fetch } => {
            config.validate()?;
            let shutdown = CancellationToken::new();
            cancel_on_ctrl_c(shutdown.clone());

            let board = Arc::new(Board::new());
            let extractor = Arc::new(TitleKeywords::with_config(KeywordConfig {
                limit: config.query.keyword_limit,
                ..KeywordConfig::default()
            }));
            let state = AppState::new(Arc::clone(&board), extractor, config.query.clone());

            let pipeline = build_pipeline(&config, Arc::clone(&store))?;
            let fetch_new = config.sync.fetch_new && !no_fetch;
            let blogs = config.sync.blogs.clone();
            let max_concurrent = config.sync.max_concurrent;
            let sync_cancel = shutdown.child_token();
            let sync_task = tokio::spawn(async move {
                let reports = pipeline
                    .sync_all(&blogs, fetch_new, board, max_concurrent, &sync_cancel)
                    .await;
                log_summary(&reports);
            });

            server::serve(state, &config.server.bind_addr, shutdown.clone()).await?;

            shutdown.cancel();
            if let Err(e) = sync_task.await {
                log::error!("Sync task failed: {}", e);
            }
        }

        Command::Sync => {
            config.validate()?;
            if config.sync.blogs.is_empty() {
                return Err(AppError::config("No blogs configured under [sync].blogs"));
            }

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            let pipeline = build_pipeline(&config, Arc::clone(&store))?;

            // The board only lives for this run; the store keeps the result.
            let board = Arc::new(Board::new());
            let reports = pipeline
                .sync_all(
                    &config.sync.blogs,
                    config.sync.fetch_new,
                    Arc::clone(&board),
                    config.sync.max_concurrent,
                    &cancel,
                )
                .await;
            log_summary(&reports);
            log::info!("Board holds {} posts", board.len());
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} blogs)", config.sync.blogs.len());
        }

        Command::Info => {
            log::info!("Storage directory: {}", config.storage.data_dir);
            for blog in &config.sync.blogs {
                let posts = store.load(blog).await.unwrap_or_default();
                let summary = StoreSummary::of(&posts);
                match summary.max_id {
                    Some(max_id) => log::info!(
                        "{}: {} posts, newest id {}",
                        blog,
                        summary.count,
                        max_id
                    ),
                    None => log::info!("{}: no posts stored yet", blog),
                }
            }
        }
    }

    log::info!("Done!");

    Ok(())
}

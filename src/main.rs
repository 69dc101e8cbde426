#![forbid(unsafe_code)]

//! `revq` — Slack work-queue bot binary.
//!
//! Bootstraps configuration, the `SQLite` store, the reminder scheduler,
//! and the Slack Socket Mode integration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use revq::config::GlobalConfig;
use revq::locks::ChannelLocks;
use revq::persistence::db;
use revq::queue::QueueStore;
use revq::reminders::ReminderRegistry;
use revq::scheduler::{spawn_scheduler_task, Scheduler};
use revq::slack::client::SlackService;
use revq::slack::handlers::AppState;
use revq::slack::spawn_reminder_delivery;
use revq::{AppError, Result};

/// Capacity of the scheduler → delivery event channel.
const REMINDER_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "revq", about = "Slack work-queue bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the database file path from the config.
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("revq server bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    if let Some(db_path) = args.db {
        config.db_path = db_path;
    }

    // Load Slack credentials from keyring / env vars.
    config.load_credentials().await?;

    let config = Arc::new(config);
    info!("configuration loaded");

    // ── Initialize database ─────────────────────────────
    let database = Arc::new(db::connect(&config.db_path).await?);
    info!(db_path = %config.db_path.display(), "database connected");

    // ── Build core services ─────────────────────────────
    let locks = ChannelLocks::new();
    let queue = QueueStore::new(Arc::clone(&database), locks.clone());
    let reminders = ReminderRegistry::new(Arc::clone(&database), locks);

    // ── Start Slack and the scheduler ───────────────────
    let (slack, sender_task) = SlackService::start(&config.slack)?;

    let (event_tx, event_rx) = mpsc::channel(REMINDER_EVENT_CAPACITY);
    let ct = CancellationToken::new();
    let scheduler = Scheduler::new(reminders.clone(), queue.clone(), event_tx);
    let scheduler_task = spawn_scheduler_task(
        scheduler,
        Duration::from_secs(config.scheduler.tick_seconds),
        ct.clone(),
    );
    let delivery_task = spawn_reminder_delivery(event_rx, slack.outbox());
    info!(
        tick_seconds = config.scheduler.tick_seconds,
        "reminder scheduler started"
    );

    let state = Arc::new(AppState {
        config: Arc::clone(&config),
        queue,
        reminders,
        outbox: slack.outbox(),
    });
    let socket_task = slack.spawn_socket_mode(Arc::clone(&state));
    info!("revq ready");

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    ct.cancel();

    // ── Wait for background tasks ───────────────────────
    // The Slack sender and socket listener hold open connections and are
    // torn down with the process; only the scheduler pipeline is joined.
    let _ = tokio::join!(scheduler_task, delivery_task);
    drop(sender_task);
    drop(socket_task);
    info!("revq shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}

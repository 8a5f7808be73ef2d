//! `peerwise-scheduler` - one occurrence rollover pass.
//!
//! Intended to be run by an external cron trigger. Loads configuration,
//! connects to PostgreSQL, rolls over every active feedback cycle whose
//! current occurrence has ended, logs the summary and exits.

use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use peerwise::adapters::PostgresFeedbackCycleStore;
use peerwise::application::{RollOverOccurrencesCommand, RollOverOccurrencesHandler};
use peerwise::config::{AppConfig, RuntimeConfig};
use peerwise::domain::foundation::Timestamp;

fn init_tracing(runtime: &RuntimeConfig) {
    let registry = tracing_subscriber::registry().with(runtime.env_filter());
    if runtime.is_production() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    init_tracing(&config.runtime);

    let pool = match config.database.pool_options().connect(&config.database.url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    if config.database.run_migrations {
        if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
            tracing::error!(error = %e, "Failed to run migrations");
            return ExitCode::FAILURE;
        }
        tracing::info!("Migrations applied");
    }

    let handler = RollOverOccurrencesHandler::new(
        Arc::new(PostgresFeedbackCycleStore::new(pool.clone())),
        config.scheduler.scheduler(),
        config.scheduler.retry_policy(),
    );

    let result = handler
        .handle(RollOverOccurrencesCommand {
            now: Timestamp::now(),
        })
        .await;
    pool.close().await;

    match result {
        Ok(summary) => {
            tracing::info!(
                evaluated = summary.evaluated,
                created = summary.created,
                rolled_over = summary.rolled_over,
                unchanged = summary.unchanged,
                conflicts = summary.conflicts,
                failed = summary.failed.len(),
                "Rollover pass finished"
            );
            if summary.failed.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!(code = %e.code(), error = %e, "Rollover pass aborted");
            ExitCode::FAILURE
        }
    }
}

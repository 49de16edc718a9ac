//! # haulhubd, the haulhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;
mod seed;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use haulhub_adapter_http_axum::state::{AppState, Repositories};
use haulhub_adapter_storage_sqlite_sqlx::{
    SqliteBookingRepository, SqliteBusinessRepository, SqliteQuoteRepository,
    SqliteReviewRepository, SqliteScheduleRepository, SqliteServiceRequestRepository,
    SqliteSubscriptionRepository,
};
use haulhub_app::services::booking_service::BookingService;
use haulhub_app::services::business_service::BusinessService;
use haulhub_app::services::request_service::RequestService;
use haulhub_app::services::schedule_service::ScheduleService;

use crate::config::Config;

/// The `SQLite` repository set served by the daemon.
struct SqliteRepositories;

impl Repositories for SqliteRepositories {
    type Requests = SqliteServiceRequestRepository;
    type Quotes = SqliteQuoteRepository;
    type Bookings = SqliteBookingRepository;
    type Businesses = SqliteBusinessRepository;
    type Reviews = SqliteReviewRepository;
    type Schedules = SqliteScheduleRepository;
    type Subscriptions = SqliteSubscriptionRepository;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("invalid log filter `{}`", config.logging.filter))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Database
    let db = haulhub_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
        max_connections: config.database.max_connections,
    }
    .build()
    .await
    .context("failed to open database")?;
    let pool = db.pool().clone();

    // Repositories
    let request_repo = SqliteServiceRequestRepository::new(pool.clone());
    let quote_repo = SqliteQuoteRepository::new(pool.clone());
    let booking_repo = SqliteBookingRepository::new(pool.clone());
    let business_repo = SqliteBusinessRepository::new(pool.clone());
    let review_repo = SqliteReviewRepository::new(pool.clone());
    let schedule_repo = SqliteScheduleRepository::new(pool.clone());
    let subscription_repo = SqliteSubscriptionRepository::new(pool);

    if config.seed.demo {
        seed::demo(&business_repo, &review_repo, &schedule_repo)
            .await
            .context("failed to seed demo data")?;
    }

    // Services
    let request_service = RequestService::new(
        request_repo.clone(),
        quote_repo.clone(),
        business_repo.clone(),
    );
    let booking_service = BookingService::new(booking_repo, quote_repo, request_repo);
    let business_service = BusinessService::new(business_repo, review_repo);
    let schedule_service = ScheduleService::new(schedule_repo, subscription_repo);

    // HTTP
    let state = AppState::<SqliteRepositories>::new(
        request_service,
        booking_service,
        business_service,
        schedule_service,
    );
    let app = haulhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "haulhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("haulhubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

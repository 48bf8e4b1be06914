// SPDX-License-Identifier: MIT
// Copyright 2026 Paceline Authors

//! Paceline API Server
//!
//! Aggregates daily step counts into shared leaderboards and manages
//! invite-code based competitive groups.

use paceline::{config::Config, db, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Paceline API");

    // Pick the store backend: Firestore in production, in-memory when
    // developing without a project.
    let store: Arc<dyn db::Store> = if std::env::var("STORE")
        .map(|v| v == "memory")
        .unwrap_or(false)
    {
        tracing::warn!("Using in-memory store; data will not survive restart");
        Arc::new(db::MemoryStore::new())
    } else {
        Arc::new(
            db::FirestoreStore::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore"),
        )
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = paceline::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paceline=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

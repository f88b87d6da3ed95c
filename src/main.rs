//! Merchant Dashboard Service - Main Application Entry Point
//!
//! This is the REST API backing a payment-gateway merchant dashboard:
//! transactions, settlements, refunds, disputes, payouts, analytics, KYC
//! submission and a back-office admin console.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Authentication**: bearer session tokens, SHA-256 hashed at rest
//! - **Documents**: object store behind a trait, filesystem-backed
//! - **Events**: typed in-process broadcast bus
//! - **Format**: JSON requests/responses (CSV for exports)
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations
//! 3. Build the document store and event bus
//! 4. Build the router: public, session-protected and admin route groups
//! 5. Start the server on the configured port

mod config;
mod db;
mod error;
mod events;
mod handlers;
mod middleware;
mod models;
mod services;
mod state;
mod storage;

use std::sync::Arc;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::events::EventBus;
use crate::state::AppState;
use crate::storage::FsObjectStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG (defaults to "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create database pool and run migrations
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // Document store and event bus
    let store = Arc::new(FsObjectStore::new(&config.storage_root));
    let events = EventBus::default();

    let server_port = config.server_port;
    let state = AppState::new(pool, store, events, config);

    // Back-office routes: session middleware plus the admin-role check
    let admin_routes = Router::new()
        .route("/api/v1/admin/users", get(handlers::admin::list_users))
        .route(
            "/api/v1/admin/kyc/applications",
            get(handlers::admin::list_kyc_applications),
        )
        .route(
            "/api/v1/admin/kyc/applications/{id}/review",
            post(handlers::admin::review_kyc_application),
        )
        .route(
            "/api/v1/admin/kyc/applications/{id}/documents/{slot}/url",
            get(handlers::admin::kyc_document_url),
        )
        .route(
            "/api/v1/admin/settlements",
            post(handlers::admin::create_settlement),
        )
        .route(
            "/api/v1/admin/settlements/{id}/settle",
            post(handlers::admin::settle_settlement),
        )
        .route(
            "/api/v1/admin/payouts/{id}/process",
            post(handlers::admin::process_payout),
        )
        .route(
            "/api/v1/admin/refunds/{id}/process",
            post(handlers::admin::process_refund),
        )
        .route(
            "/api/v1/admin/transactions/{id}/status",
            post(handlers::admin::update_transaction_status),
        )
        .route(
            "/api/v1/admin/disputes",
            post(handlers::admin::create_dispute),
        )
        .route(
            "/api/v1/admin/disputes/{id}/resolve",
            post(handlers::admin::resolve_dispute),
        )
        .route_layer(axum_middleware::from_fn(middleware::auth::require_admin));

    // Merchant routes, all behind the session middleware
    let protected_routes = Router::new()
        .route("/api/v1/auth/me", get(handlers::auth::me))
        .route("/api/v1/auth/signout", post(handlers::auth::sign_out))
        // Transactions
        .route(
            "/api/v1/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::create_transaction),
        )
        .route(
            "/api/v1/transactions/{id}",
            get(handlers::transactions::get_transaction),
        )
        // Settlements
        .route(
            "/api/v1/settlements",
            get(handlers::settlements::list_settlements),
        )
        .route(
            "/api/v1/settlements/{id}",
            get(handlers::settlements::get_settlement),
        )
        // Refunds
        .route(
            "/api/v1/refunds",
            get(handlers::refunds::list_refunds).post(handlers::refunds::create_refund),
        )
        // Disputes
        .route("/api/v1/disputes", get(handlers::disputes::list_disputes))
        .route(
            "/api/v1/disputes/{id}",
            get(handlers::disputes::get_dispute),
        )
        .route(
            "/api/v1/disputes/{id}/evidence",
            post(handlers::disputes::submit_evidence),
        )
        // Payouts
        .route(
            "/api/v1/payouts",
            get(handlers::payouts::list_payouts).post(handlers::payouts::create_payout),
        )
        // KYC
        .route(
            "/api/v1/kyc",
            get(handlers::kyc::get_application).post(handlers::kyc::submit_application),
        )
        .route(
            "/api/v1/kyc/requirements/{entity_type}",
            get(handlers::kyc::requirements),
        )
        // Analytics, customers, reports
        .route(
            "/api/v1/analytics/summary",
            get(handlers::analytics::summary),
        )
        .route("/api/v1/customers", get(handlers::customers::list_customers))
        .route(
            "/api/v1/reports/transactions.csv",
            get(handlers::reports::transactions_csv),
        )
        // Settings
        .route(
            "/api/v1/settings/profile",
            get(handlers::settings::get_profile).put(handlers::settings::update_profile),
        )
        .route(
            "/api/v1/settings/bank",
            put(handlers::settings::update_bank_details),
        )
        // Event long-polling
        .route("/api/v1/events/next", get(handlers::events::next_event))
        // Admin routes sit inside the session layer so the admin check can
        // read the injected context
        .merge(admin_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::session_middleware,
        ));

    // Combine with public routes; unmatched paths get the JSON 404
    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api/v1/auth/signup", post(handlers::auth::sign_up))
        .route("/api/v1/auth/signin", post(handlers::auth::sign_in))
        .merge(protected_routes)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        // The dashboard SPA is served from a different origin in development
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Bind and serve
    let addr = format!("0.0.0.0:{server_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::events::EventBus;
use crate::services::fees::FeePolicy;
use crate::storage::ObjectStore;

/// State handed to every handler via Axum's `State` extractor.
///
/// Cloning is cheap: the pool and bus are handles, the store sits behind an
/// `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: DbPool,

    /// Document store for KYC uploads
    pub storage: Arc<dyn ObjectStore>,

    /// Typed in-process event bus
    pub events: EventBus,

    /// Fee/tax arithmetic shared by transactions and settlements
    pub fees: FeePolicy,

    /// Loaded environment configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        storage: Arc<dyn ObjectStore>,
        events: EventBus,
        config: Config,
    ) -> Self {
        let fees = FeePolicy::new(config.fee_bps, config.tax_bps);
        Self {
            pool,
            storage,
            events,
            fees,
            config: Arc::new(config),
        }
    }
}

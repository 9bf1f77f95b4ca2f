//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use luma_core::config::LumaConfig;
use luma_engine::IntentGroupingEngine;
use luma_oracle::oracle_from_config;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The engine
/// does its own locking, so no outer `Mutex` is needed.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LumaConfig>,
    pub engine: Arc<IntentGroupingEngine>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: LumaConfig, engine: IntentGroupingEngine) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            start_time: Instant::now(),
        }
    }

    /// Build the configured oracle and an engine over in-memory stores.
    pub fn from_config(config: LumaConfig) -> Self {
        let oracle = oracle_from_config(&config.oracle);
        let engine = IntentGroupingEngine::from_config(&config, oracle);
        Self::new(config, engine)
    }
}

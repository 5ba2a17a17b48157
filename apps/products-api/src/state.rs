//! Application state management

use core_config::AppInfo;
use database::mongodb::Client;
use database::redis::ConnectionManager;
use domain_products::ProductUseCase;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub app: AppInfo,
    pub use_case: Arc<dyn ProductUseCase>,
    pub backends: Option<Backends>,
}

/// Connections checked by `/ready`.
#[derive(Clone)]
pub struct Backends {
    pub mongo_client: Client,
    pub mongo_database: String,
    pub redis: ConnectionManager,
}

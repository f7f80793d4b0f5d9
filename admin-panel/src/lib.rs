pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod resources;
pub mod services;
pub mod startup;
pub mod views;

use api::{ApiGateway, MessageCatalog};
use config::Settings;
use service_core::error::AppError;
use std::sync::Arc;

/// Shared application state: the upstream gateway plus read-only settings.
#[derive(Clone)]
pub struct AppState {
    pub gateway: ApiGateway,
    pub settings: Arc<Settings>,
    pub catalog: Arc<MessageCatalog>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let gateway = ApiGateway::new(&settings.api)?;
        let catalog = MessageCatalog::from_settings(&settings.messages);
        Ok(Self {
            gateway,
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
        })
    }
}

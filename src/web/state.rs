use crate::chain::ChainFactory;
use crate::config::AppConfig;
use crate::web::templates::init_templates;
use minijinja::Environment;
use std::sync::Arc;

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub chain_factory: Arc<dyn ChainFactory>,
    pub template_env: Environment<'static>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, chain_factory: Arc<dyn ChainFactory>) -> Self {
        Self {
            config,
            chain_factory,
            template_env: init_templates(),
            startup_time: chrono::Utc::now(),
        }
    }
}

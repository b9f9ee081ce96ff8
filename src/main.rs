use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod chain;
mod config;
mod db;
mod few_shots;
mod llm;
mod util;
mod web;

use crate::chain::{ChainFactory, FewShotDbChainFactory};
use crate::config::{AppConfig, CliArgs};
use crate::db::SqlDatabase;
use crate::llm::LlmManager;
use crate::util::logging::init_tracing;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_tracing(args.log_json);

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let database = match SqlDatabase::connect(&config.database) {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    info!("Initializing LLM manager with backend: {}", config.llm.backend);
    let llm_manager = LlmManager::new(&config.llm)?;

    info!(
        "Few-shot chain: dialect={}, selector={}, k={}",
        config.chain.dialect, config.chain.example_selector, config.chain.examples_k
    );
    let chain_factory: Arc<dyn ChainFactory> =
        match FewShotDbChainFactory::new(llm_manager, database, &config.chain) {
            Ok(factory) => Arc::new(factory),
            Err(e) => {
                error!("Failed to build the question chain: {}", e);
                return Err(e.into());
            }
        };

    let app_state = Arc::new(AppState::new(config.clone(), chain_factory));

    // Start the web server
    info!("Starting server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

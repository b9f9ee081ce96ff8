use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub connection_string: String,
    pub pool_size: usize,
    /// SQL file executed once against the database at startup
    pub init_script: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "remote" or "ollama"
    pub model: String,   // Model name
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChainConfig {
    /// SQL dialect named in the prompt
    pub dialect: String,
    /// Row limit the model is asked to respect
    pub top_k: usize,
    pub example_selector: String, // "similarity" or "all"
    pub examples_k: usize,
    /// Sample rows per table included in the table info
    pub sample_rows: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
    pub chain: ChainConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// DuckDB database file (or ":memory:")
    #[arg(long)]
    pub database: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config_builder = Self::with_defaults(Config::builder())?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = [
                "config.toml",
                "config/config.toml",
                "/etc/classicmodels-qa/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        config_builder = config_builder.add_source(Self::env_source());

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        config.apply_args(args);

        Ok(config)
    }

    // CMQA_LLM__API_KEY=... and friends
    fn env_source() -> Environment {
        Environment::with_prefix("CMQA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = AppConfig::default();
        builder
            .set_default("database.connection_string", defaults.database.connection_string)?
            .set_default("database.pool_size", defaults.database.pool_size as u64)?
            .set_default("web.host", defaults.web.host)?
            .set_default("web.port", defaults.web.port as u64)?
            .set_default("llm.backend", defaults.llm.backend)?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.temperature", defaults.llm.temperature as f64)?
            .set_default("chain.dialect", defaults.chain.dialect)?
            .set_default("chain.top_k", defaults.chain.top_k as u64)?
            .set_default("chain.example_selector", defaults.chain.example_selector)?
            .set_default("chain.examples_k", defaults.chain.examples_k as u64)?
            .set_default("chain.sample_rows", defaults.chain.sample_rows as u64)
    }

    fn apply_args(&mut self, args: &CliArgs) {
        if let Some(host) = &args.host {
            self.web.host = host.clone();
        }
        if let Some(port) = args.port {
            self.web.port = port;
        }
        if let Some(database) = &args.database {
            self.database.connection_string = database.clone();
        }
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                connection_string: "classicmodels.duckdb".to_string(),
                pool_size: 5,
                init_script: None,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 8501,
            },
            llm: LlmConfig {
                backend: "ollama".to_string(),
                model: "llama3".to_string(),
                api_key: None,
                api_url: None,
                temperature: 0.1,
            },
            chain: ChainConfig {
                dialect: "DuckDB".to_string(),
                top_k: 5,
                example_selector: "similarity".to_string(),
                examples_k: 2,
                sample_rows: 3,
            },
        }
    }
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use crate::cache::CacheBackend;

/// Command-line arguments for the dollar-coffee binary.
#[derive(Debug, Parser)]
#[command(name = "dollar-coffee", version, about = "Coffee shop ordering backend")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DOLLAR_COFFEE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the catalog cache backend (redis|memory|disabled).
    #[arg(long = "cache-backend", value_name = "BACKEND", value_parser = parse_cache_backend)]
    pub cache_backend: Option<CacheBackend>,

    /// Override the Redis URL used by the redis cache backend.
    #[arg(long = "cache-redis-url", value_name = "URL")]
    pub cache_redis_url: Option<String>,

    /// Override the catalog cache expiry.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the number of rows per listing page.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,
}

fn parse_cache_backend(value: &str) -> Result<CacheBackend, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "redis" => Ok(CacheBackend::Redis),
        "memory" => Ok(CacheBackend::Memory),
        "disabled" => Ok(CacheBackend::Disabled),
        other => Err(format!(
            "unknown cache backend `{other}`; expected redis, memory or disabled"
        )),
    }
}

use anyhow::Context;
use quarry_kernel::config::load_config;
use quarry_kernel::domain::config::{AppConfig, LoggingConfig};
use quarry_logger::{LevelFilter, Logger};
use quarry_server::Server;

fn init_logger(cfg: &LoggingConfig) -> anyhow::Result<Logger> {
    let level: LevelFilter =
        cfg.level.parse().with_context(|| format!("Unknown log level '{}'", cfg.level))?;

    let mut builder = Logger::builder().name(&cfg.name).level(level).console(cfg.console);
    if let Some(filter) = &cfg.filter {
        builder = builder.env_filter(filter);
    }

    let logger = match &cfg.directory {
        Some(dir) => builder.path(dir).max_files(cfg.max_files).json(cfg.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1);
    let cfg: AppConfig = load_config(path.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}

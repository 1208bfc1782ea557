use anyhow::{anyhow, Context};
use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;
use tracing::info;

use crate::models::console_model::ConsoleConfig;
use crate::CliArgs;

static CONFIG_CACHE: OnceLock<ConsoleConfig> = OnceLock::new();

/// Loads the config file (if any), applies command-line overrides and caches
/// the result for the rest of the process.
pub async fn init_config(args: &CliArgs) -> anyhow::Result<&'static ConsoleConfig> {
    let mut config = load_file(&args.config).await?;
    apply_overrides(&mut config, args);

    // Only parseability is checked; reachability is not.
    config
        .command
        .socket_addr()
        .context("command endpoint")?;
    config
        .forwarding
        .socket_addr()
        .context("forwarding endpoint")?;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| anyhow!("Config already initialized"))?;

    let config = get_cached_config();
    info!(
        "Config initialized: command {}:{}, forwarding {}:{}",
        config.command.ip, config.command.port, config.forwarding.ip, config.forwarding.port
    );
    Ok(config)
}

async fn load_file(file_path: &Path) -> anyhow::Result<ConsoleConfig> {
    if !fs::try_exists(file_path).await.unwrap_or(false) {
        info!("No config file at {}, using defaults", file_path.display());
        return Ok(ConsoleConfig::default());
    }

    let data = fs::read_to_string(file_path)
        .await
        .with_context(|| format!("File read Error: {}", file_path.display()))?;

    serde_json::from_str(&data).context("JSON Parse Error")
}

fn apply_overrides(config: &mut ConsoleConfig, args: &CliArgs) {
    if let Some(ip) = &args.server_ip {
        config.command.ip = ip.clone();
    }
    if let Some(port) = args.server_port {
        config.command.port = port;
    }
    if let Some(ip) = &args.forward_ip {
        config.forwarding.ip = ip.clone();
    }
    if let Some(port) = args.forward_port {
        config.forwarding.port = port;
    }
    if let Some(dir) = &args.csv_dir {
        config.csv_dir = dir.clone();
    }
}

pub fn get_cached_config() -> &'static ConsoleConfig {
    CONFIG_CACHE.get().expect("Config not initialized")
}

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, Level};

mod client;
mod models;
mod routes;
mod state;
mod utils;

use crate::routes::dispatch::{self, EVENT_QUEUE_DEPTH};
use crate::state::app_state::AppState;
use crate::utils::conf_helper::init_config;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Control console for the SCDTR luminaire testbed", long_about = None)]
pub struct CliArgs {
    /// JSON configuration file; defaults apply when it does not exist
    #[clap(long, default_value = "console.json")]
    pub config: PathBuf,
    #[clap(long)]
    pub server_ip: Option<String>,
    #[clap(long)]
    pub server_port: Option<u16>,
    #[clap(long)]
    pub forward_ip: Option<String>,
    #[clap(long)]
    pub forward_port: Option<u16>,
    /// Directory for the per-signal CSV files written at exit
    #[clap(long)]
    pub csv_dir: Option<String>,
    #[clap(long, short)]
    pub verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = init_config(&args).await?;

    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    routes::operator_routes::spawn_operator_input(events_tx.clone())?;

    let mut state = AppState::new(config, events_tx);
    if config.connect_on_start {
        state.connect();
    }
    if config.forward_on_start {
        state.set_forwarding(true);
    }

    info!("Console ready, type 'help' for commands");
    dispatch::run(&mut state, events_rx).await;

    let report = state.shutdown();
    if !report.is_complete() {
        anyhow::bail!("{} signal file(s) could not be written", report.failed.len());
    }
    Ok(())
}

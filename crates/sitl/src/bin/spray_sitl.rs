//! Spray controller SITL.
//!
//! Usage:
//!   cargo run -p agrispray_sitl --bin spray_sitl -- [OPTIONS]
//!
//! Without a config file the built-in demo mission runs against the
//! simulated sprayer.

use std::path::PathBuf;
use std::process::ExitCode;

use agrispray_sitl::{logging, Runner, SitlConfig, Transport};
use clap::Parser;

#[derive(Parser)]
#[command(name = "spray_sitl")]
#[command(version, about = "Spray controller software-in-the-loop runner", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long, env = "SPRAY_SITL_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging for the controller (ignored when RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    json: bool,

    /// Talk MAVLink over UDP instead of the simulated sprayer
    #[arg(long)]
    udp: bool,

    /// Exit once the mission completes
    #[arg(long)]
    once: bool,

    /// Override SPR_FS_ACTION (0=continue, 1=RTL, 2=loiter, 3=land)
    #[arg(long, value_parser = clap::value_parser!(i32).range(0..=3))]
    fs_action: Option<i32>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let mut config = match &cli.config {
        Some(path) => match SitlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "cannot load config");
                return ExitCode::FAILURE;
            }
        },
        None => SitlConfig::default(),
    };
    if cli.udp {
        config.link.transport = Transport::Udp;
    }
    if cli.once {
        config.stop_when_complete = true;
    }
    if let Some(action) = cli.fs_action {
        config.params.insert("SPR_FS_ACTION".to_string(), action);
    }

    let mut runner = match Runner::from_config(config) {
        Ok(runner) => runner,
        Err(e) => {
            tracing::error!(error = %e, "cannot start runner");
            return ExitCode::FAILURE;
        }
    };

    let summary = runner.run().await;
    tracing::info!(
        ticks = summary.controller.ticks,
        sent = summary.controller.commands_sent,
        failsafes = summary.controller.failsafes,
        mission_complete = summary.mission_complete,
        "simulation finished"
    );
    ExitCode::SUCCESS
}

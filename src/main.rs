//! bottango - command-line front end for the Bottango playback API

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use bottango_playback::cli::{self, Command};
use bottango_playback::config::AppConfig;
use bottango_playback::logging::init_logging;
use bottango_playback::paths::AppPaths;
use bottango_playback::BottangoClient;

/// Control Bottango animation playback from the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bottango API host
    #[arg(long, env = "BOTTANGO_HOST")]
    host: Option<String>,

    /// Bottango API port
    #[arg(short, long, env = "BOTTANGO_PORT")]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for the log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Command to run (interactive prompt when omitted)
    #[command(subcommand)]
    command: Option<Command>,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let paths = AppPaths::detect();

    // An explicit config file must exist, the default one is optional
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(&paths.config)?,
    };
    if let Some(host) = args.host {
        config.bottango.host = host;
    }
    if let Some(port) = args.port {
        config.bottango.port = port;
    }
    config.validate()?;

    let level = args
        .log_level
        .unwrap_or_else(|| config.logging.level.clone());
    let logs_dir = args
        .log_dir
        .or_else(|| config.logging.dir.clone())
        .unwrap_or_else(|| paths.logs_dir.clone());
    let _log_guard = init_logging(&level, &logs_dir, &config.logging.file_name)?;

    info!("Starting Bottango playback client...");
    info!(
        "Configuration file: {}",
        args.config.as_ref().unwrap_or(&paths.config).display()
    );

    // Connection failures end the process here, with the host and port in the message
    let client = BottangoClient::connect(&config.bottango)?
        .with_poll_interval(Duration::from_millis(config.playback.poll_interval_ms));

    let default_timeout = config.playback.wait_timeout();

    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => cli::run_repl(&client, default_timeout)?,
        command => cli::run_command(&client, &command, default_timeout)?,
    }

    info!("Bottango playback client done");
    Ok(())
}

//! This is the daemon binary that runs the Spotlite server.
//! there are no tests or anything else in this file because the only thing it does is set up and start the daemon
//! with functions from the `spotlite_daemon` library crate (which is tested).

use std::path::PathBuf;

use spotlite_core::{config::Settings, get_data_dir};
use spotlite_daemon::start_daemon;

use clap::Parser;

#[cfg(not(feature = "cli"))]
compile_error!("The cli feature is required to build the daemon binary");

/// Options configurable via the CLI.
#[derive(Parser)]
struct Flags {
    /// Sets the port number to listen on.
    #[clap(long)]
    port: Option<u16>,
    /// config file path
    #[clap(long)]
    config: Option<PathBuf>,
    /// log level
    #[clap(long)]
    log_level: Option<log::LevelFilter>,
    /// write logs to this file instead of stderr
    #[clap(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let flags = Flags::try_parse()?;

    let config_file = match flags.config {
        Some(config) => config,
        None => Settings::get_config_path()?,
    };

    let settings = Settings::init(config_file, flags.port, flags.log_level)?;

    let db_dir = match (&settings.daemon.db_path, get_data_dir()) {
        (Some(db_path), _) => db_path.clone(),
        (None, Ok(data_dir)) => data_dir.join("db"),
        (None, Err(e)) => {
            eprintln!("Error: {e}");
            eprintln!("Using a temporary directory for the database");
            std::env::temp_dir().join("spotlite_db")
        }
    };

    start_daemon(settings, db_dir, flags.log_file).await
}

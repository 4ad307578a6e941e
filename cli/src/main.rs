use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueHint};
use spotlite_core::{
    config::{ClientSettings, Settings},
    logger::init_logger,
};

mod client;
mod handlers;
mod probe;

use client::CatalogClient;
use handlers::{CommandHandler, utils::WriteAdapter};

/// Options configurable via the CLI.
#[derive(Debug, Parser)]
#[command(name = "spotlite-cli", version = env!("CARGO_PKG_VERSION"), about)]
struct Flags {
    /// The url of the server, overrides `client.server_url` from the config file
    #[clap(long, value_hint = ValueHint::Url)]
    server: Option<String>,
    /// config file path
    #[clap(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// log level
    #[clap(long, default_value = "warn")]
    log_level: log::LevelFilter,
    /// subcommand to run
    #[clap(subcommand)]
    subcommand: Option<handlers::Command>,
}

impl Flags {
    /// The client settings from the config file, with the flags applied on top.
    fn client_settings(&self) -> anyhow::Result<ClientSettings> {
        let config_file = match &self.config {
            Some(config) => config.clone(),
            None => Settings::get_config_path()?,
        };
        let mut settings = Settings::init(config_file, None, None)?.client;

        if let Some(server) = &self.server {
            settings.server_url.clone_from(server);
        }
        Ok(settings)
    }
}

#[test]
fn verify_cli() {
    Flags::command().debug_assert();
}

#[cfg(not(tarpaulin_include))]
fn main() -> anyhow::Result<()> {
    clap_complete::CompleteEnv::with_factory(Flags::command).complete();

    let flags = Flags::parse();
    init_logger(flags.log_level, None);
    let settings = flags.client_settings()?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let client = CatalogClient::new(&settings.server_url);

        let mut stdout_adapter = WriteAdapter(std::io::stdout());
        let mut stderr_adapter = WriteAdapter(std::io::stderr());

        if let Some(command) = flags.subcommand {
            command
                .handle(
                    &client,
                    &settings,
                    &mut stdout_adapter,
                    &mut stderr_adapter,
                    &std::io::stdin(),
                )
                .await?;
        } else {
            eprintln!("No subcommand provided");
        }

        Ok(())
    })
}

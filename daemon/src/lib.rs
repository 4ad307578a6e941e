#![deny(clippy::missing_inline_in_public_items)]

//----------------------------------------------------------------------------------------- std lib
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
//--------------------------------------------------------------------------------- other libraries
use log::{error, info};
use surrealdb::{Surreal, engine::local::Db};
use tokio::net::TcpListener;
//------------------------------------------------------------------------------ SPOTLITE libraries
use spotlite_core::{
    config::Settings,
    logger::{init_logger, init_tracing},
};
use spotlite_storage::db::init_database;

pub mod controller;
pub mod errors;
pub mod media;
pub mod services;
pub mod termination;
#[cfg(test)]
pub mod test_utils;

use crate::{
    controller::CatalogServer,
    media::MediaStore,
    termination::{InterruptReceiver, Interrupted, Terminator},
};

/// Wait for the shutdown broadcast, logging why.
async fn shutdown_signal(mut interrupt_rx: InterruptReceiver) {
    match interrupt_rx.wait().await {
        Ok(Interrupted::UserInt) => info!("Stopping server per user request"),
        Ok(Interrupted::OsSigInt) => info!("Stopping server because of an os sig int"),
        Ok(Interrupted::OsSigTerm) => info!("Stopping server because of an os sig term"),
        Ok(Interrupted::OsSigQuit) => info!("Stopping server because of an os sig quit"),
        Err(e) => error!("Stopping server because of an unexpected error: {e}"),
    }
}

/// Run the daemon
///
/// also initializes the logger, database, media store, and other necessary components.
///
/// # Arguments
///
/// * `settings` - The settings to use.
/// * `db_dir` - The directory where the database is stored.
///   If the directory does not exist, it will be created.
/// * `log_file_path` - The path to the file where logs will be written.
///
/// # Errors
///
/// If the daemon cannot be started, an error is returned.
#[inline]
pub async fn start_daemon(
    settings: Settings,
    db_dir: PathBuf,
    log_file_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    // Throw the given settings into an Arc so we can share settings across threads.
    let settings = Arc::new(settings);

    // Initialize the logger, database, and tracing.
    init_logger(settings.daemon.log_level, log_file_path);
    tracing::subscriber::set_global_default(init_tracing())?;
    let db = Arc::new(init_database(Some(db_dir)).await?);
    let media = Arc::new(MediaStore::from_settings(&settings.media).await?);
    info!("Media backend ... {:?}", settings.media.backend);

    // initialize the termination handler
    let (_terminator, interrupt_rx) = termination::create_termination()?;

    let server = CatalogServer::new(db, settings.clone(), media);

    let addr = format!("{}:{}", settings.daemon.host, settings.daemon.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to start server: {e}");
            return Err(anyhow::anyhow!("Failed to start server on {addr}: {e}"));
        }
    };
    info!("Listening on http://{}", listener.local_addr()?);

    // run the server until it is terminated
    axum::serve(listener, server.router())
        .with_graceful_shutdown(shutdown_signal(interrupt_rx))
        .await?;

    log::info!("Cleanup complete, exiting...");

    Ok(())
}

/// Start a server on an ephemeral local port, for testing clients against.
///
/// Returns the server's base url (with a trailing slash), and the handle that stops it.
///
/// # Errors
///
/// Errors if the media store can't be set up or the listener can't be bound.
#[inline]
pub async fn init_test_client_server(
    db: Arc<Surreal<Db>>,
    settings: Arc<Settings>,
) -> anyhow::Result<(String, Terminator)> {
    let media = Arc::new(MediaStore::from_settings(&settings.media).await?);
    let server = CatalogServer::new(db, settings, media);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let base_url = format!("http://{}/", listener.local_addr()?);

    let (terminator, interrupt_rx) = termination::channel();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, server.router())
            .with_graceful_shutdown(shutdown_signal(interrupt_rx))
            .await
        {
            error!("Test server failed: {e}");
        }
    });

    Ok((base_url, terminator))
}

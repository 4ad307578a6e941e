#[cfg(feature = "db")]
pub mod crud;
#[cfg(feature = "db")]
pub mod queries;
pub mod schemas;

#[cfg(feature = "db")]
use std::path::PathBuf;

#[cfg(feature = "db")]
use log::info;
#[cfg(feature = "db")]
use surrealdb::{
    Connection, Surreal,
    engine::local::{Db, Mem, SurrealKv},
};

/// Open the music database.
///
/// With a path, the database is persisted with the `SurrealKV` engine under that directory,
/// without one an in-memory engine is used (which is what the tests want).
///
/// # Errors
///
/// Fails if the engine cannot be started or the schema cannot be defined.
#[cfg(feature = "db")]
pub async fn init_database(path: Option<PathBuf>) -> surrealdb::Result<Surreal<Db>> {
    let db = match path {
        Some(path) => {
            info!("Opening music database at {}", path.display());
            Surreal::new::<SurrealKv>(path).await?
        }
        None => Surreal::new::<Mem>(()).await?,
    };

    db.use_ns("spotlite").use_db("music").await?;

    register_tables(&db).await?;

    info!("Connected to music database");

    Ok(db)
}

/// Define the tables (and their fields) used by the catalog.
///
/// Safe to call on an already initialized database.
///
/// # Errors
///
/// Fails if any of the definitions are rejected by the database.
#[cfg(feature = "db")]
pub async fn register_tables<C: Connection>(db: &Surreal<C>) -> surrealdb::Result<()> {
    db.query(queries::define_song_table()).await?.check()?;
    Ok(())
}

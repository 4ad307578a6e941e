use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[cfg(feature = "db")]
    #[error("SurrealDB error: {0}")]
    DbError(#[from] surrealdb::Error),
    #[error("Missing or empty field: {0}")]
    MissingField(&'static str),
}

pub type StorageResult<T> = Result<T, Error>;

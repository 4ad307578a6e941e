use thiserror::Error;

/// Errors that can occur with finding the config or data directories.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unable to find the config directory for spotlite.")]
    Config,
    #[error("Unable to find the data directory for spotlite.")]
    Data,
}

/// Errors a [`MediaBackend`](crate::audio::MediaBackend) can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Nothing is loaded.")]
    NothingLoaded,
    #[error("Failed to load {url}: {reason}")]
    Load { url: String, reason: String },
}

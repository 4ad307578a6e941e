use std::time::Duration;

use errors::DirectoryError;

pub mod audio;
pub mod config;
pub mod errors;
pub mod logger;
pub mod player;
pub mod state;

/// Get the directory where the config files are stored.
///
/// # Errors
///
/// Fails if the platform has no notion of a home directory.
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, DirectoryError> {
    directories::ProjectDirs::from("", "", "spotlite")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(DirectoryError::Config)
}

/// Get the directory where the database and logs are stored.
///
/// # Errors
///
/// Fails if the platform has no notion of a home directory.
#[inline]
pub fn get_data_dir() -> Result<std::path::PathBuf, DirectoryError> {
    directories::ProjectDirs::from("", "", "spotlite")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(DirectoryError::Data)
}

/// Format a duration for the log prefix, `seconds.millis`.
#[must_use]
pub fn format_duration(duration: &Duration) -> String {
    format!("{}.{:03}", duration.as_secs(), duration.subsec_millis())
}

/// Render a playback position as `MM:SS`.
///
/// Minutes aren't capped, so an hour-long track renders as `60:00`.
/// Anything that isn't a finite, non-negative number renders as `00:00`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::{Deserialize, Serialize};
use spotlite_storage::errors::Error as StorageError;
use thiserror::Error;

pub const SONG_NOT_FOUND: &str = "Song not found";
pub const MISSING_FILES: &str = "Both song and cover files are required.";
pub const UPLOAD_FAILED: &str = "Upload failed, please check server logs.";

/// Errors from saving or removing media.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("File format not allowed: {0}")]
    RejectedFormat(String),
    #[error("Media host rejected the upload ({status}): {body}")]
    Hosted { status: u16, body: String },
    #[error("Hosted media credentials are missing.")]
    NotConfigured,
    #[error("Refusing to touch a path outside the media root: {0}")]
    OutsideRoot(String),
}

/// Errors from the upload workflow.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Both song and cover files are required.")]
    MissingFiles,
    #[error("Malformed upload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The JSON body of every error response (and of the delete confirmation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An error a handler answers with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Song not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(MessageBody::new(self.to_string()))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        error!("Storage error: {e}");
        Self::Internal(e.to_string())
    }
}

/// Every upload failure is a 400, only the ones the client can fix say why.
impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::MissingFiles
            | UploadError::Malformed(_)
            | UploadError::Media(MediaError::RejectedFormat(_))
            | UploadError::Storage(StorageError::MissingField(_)) => Self::BadRequest(e.to_string()),
            e => {
                error!("Error during upload: {e}");
                Self::BadRequest(UPLOAD_FAILED.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(UploadError::MissingFiles, MISSING_FILES)]
    #[case(
        UploadError::Media(MediaError::RejectedFormat("song.wav".into())),
        "File format not allowed: song.wav"
    )]
    #[case(
        UploadError::Storage(StorageError::MissingField("songName")),
        "Missing or empty field: songName"
    )]
    #[case(UploadError::Media(MediaError::NotConfigured), UPLOAD_FAILED)]
    #[case(
        UploadError::Media(MediaError::Io(std::io::Error::other("disk full"))),
        UPLOAD_FAILED
    )]
    fn test_upload_errors_are_bad_requests(#[case] error: UploadError, #[case] message: &str) {
        let error = ApiError::from(error);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), message);
    }

    #[rstest]
    #[case(ApiError::BadRequest("nope".into()), StatusCode::BAD_REQUEST)]
    #[case(ApiError::NotFound, StatusCode::NOT_FOUND)]
    #[case(ApiError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status(#[case] error: ApiError, #[case] expected: StatusCode) {
        assert_eq!(error.into_response().status(), expected);
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let error = ApiError::from(StorageError::MissingField("songName"));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

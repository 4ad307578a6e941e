//! Where uploaded songs and covers end up.

pub mod hosted;
pub mod local;

use std::path::Path;

use spotlite_core::config::{MediaBackendKind, MediaSettings};

use crate::errors::MediaError;

pub use hosted::HostedStore;
pub use local::LocalStore;

/// Which of the two files of an upload this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Song,
    Cover,
}

impl MediaKind {
    /// The sub-directory (or hosted folder suffix) files of this kind go in.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Song => "songs",
            Self::Cover => "covers",
        }
    }
}

/// A file received in a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// The name the client gave the file.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum MediaStore {
    Local(LocalStore),
    Hosted(HostedStore),
}

impl MediaStore {
    /// Build the store picked by `media.backend`.
    ///
    /// # Errors
    ///
    /// Fails if the local media directories can't be created.
    pub async fn from_settings(settings: &MediaSettings) -> Result<Self, MediaError> {
        Ok(match settings.backend {
            MediaBackendKind::Local => Self::Local(LocalStore::new(settings.clone()).await?),
            MediaBackendKind::Hosted => Self::Hosted(HostedStore::new(settings.clone())),
        })
    }

    const fn settings(&self) -> &MediaSettings {
        match self {
            Self::Local(store) => store.settings(),
            Self::Hosted(store) => store.settings(),
        }
    }

    /// Make sure a file may be uploaded at all.
    ///
    /// # Errors
    ///
    /// [`MediaError::RejectedFormat`] if its extension isn't allowed.
    pub fn check(&self, file: &UploadedFile) -> Result<(), MediaError> {
        if self.settings().allows(&file.file_name) {
            Ok(())
        } else {
            Err(MediaError::RejectedFormat(file.file_name.clone()))
        }
    }

    /// Store a file, returning the path (or url) to record for it.
    ///
    /// # Errors
    ///
    /// Fails if the format isn't allowed, or the backend fails to store the file.
    pub async fn save(&self, kind: MediaKind, file: &UploadedFile) -> Result<String, MediaError> {
        self.check(file)?;
        match self {
            Self::Local(store) => store.save(kind, file).await,
            Self::Hosted(store) => store.save(kind, file).await,
        }
    }

    /// Remove a previously stored file.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but can't be removed, or the path is outside the store.
    pub async fn remove(&self, path: &str) -> Result<(), MediaError> {
        match self {
            Self::Local(store) => store.remove(path).await,
            Self::Hosted(store) => {
                store.remove(path);
                Ok(())
            }
        }
    }

    /// The directory to serve statically, if the files live on this machine.
    #[must_use]
    pub fn public_dir(&self) -> Option<&Path> {
        match self {
            Self::Local(store) => Some(store.root()),
            Self::Hosted(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::song("song.mp3", true)]
    #[case::cover("cover.PNG", true)]
    #[case::wav("song.wav", false)]
    #[case::sneaky("song.mp3.exe", false)]
    #[tokio::test]
    async fn test_check(#[case] file_name: &str, #[case] allowed: bool) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::from_settings(&MediaSettings {
            public_dir: dir.path().to_path_buf(),
            ..Default::default()
        })
        .await
        .unwrap();

        let file = UploadedFile {
            file_name: file_name.into(),
            bytes: vec![],
        };
        assert_eq!(store.check(&file).is_ok(), allowed);
    }

    #[tokio::test]
    async fn test_hosted_has_no_public_dir() {
        let store = MediaStore::from_settings(&MediaSettings {
            backend: MediaBackendKind::Hosted,
            ..Default::default()
        })
        .await
        .unwrap();

        assert!(store.public_dir().is_none());
        // and removing is a no-op
        assert!(store.remove("https://cdn.example.com/a.mp3").await.is_ok());
    }
}

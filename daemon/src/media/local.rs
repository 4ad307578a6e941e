//! Media kept on disk, below the statically served root.

use std::{
    path::{Component, Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use log::debug;
use spotlite_core::config::MediaSettings;
use tracing::instrument;

use super::{MediaKind, UploadedFile};
use crate::errors::MediaError;

#[derive(Debug)]
pub struct LocalStore {
    settings: MediaSettings,
}

impl LocalStore {
    /// Create the store, and the `songs` and `covers` directories below its root.
    ///
    /// # Errors
    ///
    /// Fails if the directories can't be created.
    pub async fn new(settings: MediaSettings) -> Result<Self, MediaError> {
        for kind in [MediaKind::Song, MediaKind::Cover] {
            tokio::fs::create_dir_all(settings.public_dir.join(kind.dir())).await?;
        }
        Ok(Self { settings })
    }

    pub(super) const fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.settings.public_dir
    }

    /// Write the file, returning its path relative to the root.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be written.
    #[instrument(skip(file), fields(file_name = %file.file_name))]
    pub async fn save(&self, kind: MediaKind, file: &UploadedFile) -> Result<String, MediaError> {
        let relative = format!("{}/{}", kind.dir(), stored_file_name(&file.file_name, now_millis()));
        tokio::fs::write(self.root().join(&relative), &file.bytes).await?;
        debug!("stored {relative}");
        Ok(relative)
    }

    /// Remove a file by the path [`LocalStore::save`] returned.
    ///
    /// A file that's already gone is fine.
    ///
    /// # Errors
    ///
    /// Fails if the path leads outside the root, or the file can't be removed.
    #[instrument]
    pub async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let full = self.resolve(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                debug!("removed {}", full.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Join a stored path onto the root, refusing anything that isn't a plain relative path.
    fn resolve(&self, path: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(path);
        let plain = relative.components().count() > 0
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if plain {
            Ok(self.root().join(relative))
        } else {
            Err(MediaError::OutsideRoot(path.to_string()))
        }
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

/// `<millis>-<name>`, where `name` is the client's file name without any directories.
#[must_use]
pub fn stored_file_name(original: &str, millis: u128) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let base = if base.is_empty() || base == "." || base == ".." {
        "upload"
    } else {
        base
    };
    format!("{millis}-{base}")
}

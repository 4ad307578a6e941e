use std::sync::Arc;

use log::{info, warn};
use spotlite_storage::{
    db::schemas::song::{Song, SongId, SongMetadata},
    errors::{Error, StorageResult},
};
use surrealdb::{Connection, Surreal};
use tracing::instrument;

use crate::{
    errors::UploadError,
    media::{MediaKind, MediaStore, UploadedFile},
};

/// The fields of an upload form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub song_name: Option<String>,
    pub artist: Option<String>,
    pub song_file: Option<UploadedFile>,
    pub cover_file: Option<UploadedFile>,
}

/// Store both files, then record the song.
///
/// Everything that can be checked up front is, so a rejected upload leaves nothing behind.
/// A failure after the files are stored leaves them orphaned.
///
/// # Errors
///
/// Fails if a file or the name is missing, a file has a format that isn't allowed,
/// or storing either the files or the record fails.
#[instrument(skip(media, form))]
pub async fn upload<C: Connection>(
    db: &Surreal<C>,
    media: &MediaStore,
    form: UploadForm,
) -> Result<Song, UploadError> {
    let (Some(song_file), Some(cover_file)) = (form.song_file, form.cover_file) else {
        return Err(UploadError::MissingFiles);
    };

    let song_name = form.song_name.unwrap_or_default();
    if song_name.trim().is_empty() {
        return Err(Error::MissingField("songName").into());
    }
    media.check(&song_file)?;
    media.check(&cover_file)?;

    let file_path = media.save(MediaKind::Song, &song_file).await?;
    let cover_path = media.save(MediaKind::Cover, &cover_file).await?;

    let song = Song::create(
        db,
        SongMetadata::new(song_name, form.artist, file_path, cover_path),
    )
    .await?;

    info!("Uploaded {} ({})", song.song_name, song.id);
    Ok(song)
}

/// Delete a song, returning it if it existed.
///
/// Its media is cleaned up in the background, failures there are only logged.
///
/// # Errors
///
/// Fails if the database can't be read or written.
#[instrument(skip(media))]
pub async fn delete<C: Connection>(
    db: &Surreal<C>,
    media: Arc<MediaStore>,
    id: SongId,
) -> StorageResult<Option<Song>> {
    let Some(song) = Song::delete(db, id).await? else {
        return Ok(None);
    };

    info!("Deleted {} ({})", song.song_name, song.id);

    let cleanup = song.clone();
    tokio::spawn(async move { remove_media(&media, &cleanup).await });

    Ok(Some(song))
}

/// Remove both files of a song, best effort.
pub async fn remove_media(media: &MediaStore, song: &Song) {
    for path in [&song.file_path, &song.cover_path] {
        if let Err(e) = media.remove(path).await {
            warn!("Error deleting file: {path}: {e}");
        }
    }
}

//! CRUD operations for the song table

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::instrument;

use crate::{
    db::{
        queries::{
            count_songs, create_song, delete_song, read_all_songs, read_random_songs,
            read_recent_songs, read_song,
        },
        schemas::song::{Song, SongId, SongMetadata, TABLE_NAME},
    },
    errors::StorageResult,
};

#[derive(Debug, Deserialize)]
struct Count {
    count: usize,
}

impl Song {
    /// Persist a new song, the id is generated here.
    ///
    /// # Errors
    ///
    /// Fails if the metadata is missing a required field, or if the database rejects the record.
    #[instrument]
    pub async fn create<C: Connection>(
        db: &Surreal<C>,
        metadata: SongMetadata,
    ) -> StorageResult<Self> {
        metadata.validate()?;

        let id = Self::generate_id();

        db.query(create_song())
            .bind(("table", TABLE_NAME))
            .bind(("id", id.clone()))
            .bind(("content", metadata.clone()))
            .await?
            .check()?;

        Ok(metadata.into_song(id))
    }

    /// Read every song, in the order they were created.
    #[instrument]
    pub async fn read_all<C: Connection>(db: &Surreal<C>) -> StorageResult<Vec<Self>> {
        Ok(db.query(read_all_songs()).await?.take(0)?)
    }

    #[instrument]
    pub async fn read<C: Connection>(db: &Surreal<C>, id: SongId) -> StorageResult<Option<Self>> {
        Ok(db
            .query(read_song())
            .bind(("table", TABLE_NAME))
            .bind(("id", id))
            .await?
            .take(0)?)
    }

    /// Read the `limit` most recently uploaded songs, newest first.
    #[instrument]
    pub async fn read_recent<C: Connection>(
        db: &Surreal<C>,
        limit: usize,
    ) -> StorageResult<Vec<Self>> {
        Ok(db
            .query(read_recent_songs())
            .bind(("limit", limit))
            .await?
            .take(0)?)
    }

    /// Read a random selection of (at most) `limit` songs.
    #[instrument]
    pub async fn read_featured<C: Connection>(
        db: &Surreal<C>,
        limit: usize,
    ) -> StorageResult<Vec<Self>> {
        Ok(db
            .query(read_random_songs())
            .bind(("limit", limit))
            .await?
            .take(0)?)
    }

    /// Delete a song from the database.
    ///
    /// Returns the deleted song, or `None` if there was no song with the given id
    /// (in which case nothing is changed).
    #[instrument]
    pub async fn delete<C: Connection>(
        db: &Surreal<C>,
        id: SongId,
    ) -> StorageResult<Option<Self>> {
        let Some(song) = Self::read(db, id.clone()).await? else {
            return Ok(None);
        };

        db.query(delete_song())
            .bind(("table", TABLE_NAME))
            .bind(("id", id))
            .await?
            .check()?;

        Ok(Some(song))
    }

    #[instrument]
    pub async fn count<C: Connection>(db: &Surreal<C>) -> StorageResult<usize> {
        let count: Option<Count> = db.query(count_songs()).await?.take(0)?;
        Ok(count.map_or(0, |c| c.count))
    }
}

//! The HTTP api.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use log::debug;
use spotlite_core::config::Settings;
use spotlite_storage::db::schemas::song::{Song, SongId};
use surrealdb::{Surreal, engine::local::Db};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::instrument;

use crate::{
    errors::{ApiError, MessageBody, UploadError},
    media::{MediaStore, UploadedFile},
    services::{self, catalog::UploadForm},
};

/// Everything the handlers share.
#[derive(Clone, Debug)]
pub struct CatalogServer {
    pub db: Arc<Surreal<Db>>,
    pub settings: Arc<Settings>,
    pub media: Arc<MediaStore>,
}

impl CatalogServer {
    #[must_use]
    #[inline]
    pub const fn new(db: Arc<Surreal<Db>>, settings: Arc<Settings>, media: Arc<MediaStore>) -> Self {
        Self {
            db,
            settings,
            media,
        }
    }

    /// Build the router, with the local media root (if any) served as the fallback.
    #[must_use]
    #[inline]
    pub fn router(self) -> Router {
        let max_upload_bytes = self.settings.daemon.max_upload_bytes;
        let public_dir = self.media.public_dir().map(std::path::Path::to_path_buf);

        let api = Router::new()
            .route("/api/ping", get(ping))
            .route("/api/songs", get(list_songs))
            .route("/api/songs/featured", get(list_featured))
            .route("/api/songs/recent", get(list_recent))
            .route("/api/songs/:id", delete(delete_song))
            .route(
                "/api/upload",
                post(upload_song).layer(DefaultBodyLimit::max(max_upload_bytes)),
            )
            .with_state(self);

        let app = match public_dir {
            Some(public_dir) => api.fallback_service(ServeDir::new(public_dir)),
            None => api,
        };

        app.layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
    }
}

async fn ping() -> &'static str {
    "pong"
}

#[instrument(skip(server))]
async fn list_songs(State(server): State<CatalogServer>) -> Result<Json<Vec<Song>>, ApiError> {
    Ok(Json(Song::read_all(&server.db).await?))
}

#[instrument(skip(server))]
async fn list_featured(State(server): State<CatalogServer>) -> Result<Json<Vec<Song>>, ApiError> {
    let limit = server.settings.catalog.featured_count;
    Ok(Json(Song::read_featured(&server.db, limit).await?))
}

#[instrument(skip(server))]
async fn list_recent(State(server): State<CatalogServer>) -> Result<Json<Vec<Song>>, ApiError> {
    let limit = server.settings.catalog.recent_count;
    Ok(Json(Song::read_recent(&server.db, limit).await?))
}

#[instrument(skip(server, multipart))]
async fn upload_song(
    State(server): State<CatalogServer>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let song = services::catalog::upload(&server.db, &server.media, form).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

#[instrument(skip(server))]
async fn delete_song(
    State(server): State<CatalogServer>,
    Path(id): Path<SongId>,
) -> Result<Json<MessageBody>, ApiError> {
    match services::catalog::delete(&server.db, server.media.clone(), id).await? {
        Some(_) => Ok(Json(MessageBody::new("Song deleted successfully"))),
        None => Err(ApiError::NotFound),
    }
}

/// Collect the upload's fields, unknown ones are ignored.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, UploadError> {
    let malformed = |e: axum::extract::multipart::MultipartError| UploadError::Malformed(e.body_text());

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "songName" => form.song_name = Some(field.text().await.map_err(malformed)?),
            "artist" => form.artist = Some(field.text().await.map_err(malformed)?),
            "songFile" | "coverFile" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(malformed)?.to_vec();
                let file = Some(UploadedFile { file_name, bytes });
                if name == "songFile" {
                    form.song_file = file;
                } else {
                    form.cover_file = file;
                }
            }
            other => debug!("ignoring upload field {other}"),
        }
    }
    Ok(form)
}

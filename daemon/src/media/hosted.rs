//! Media forwarded to a Cloudinary-style hosting service with signed uploads.

use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use spotlite_core::config::MediaSettings;
use tracing::instrument;

use super::{MediaKind, UploadedFile};
use crate::errors::MediaError;

/// The part of the host's upload response we care about.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug)]
pub struct HostedStore {
    client: reqwest::Client,
    settings: MediaSettings,
}

impl HostedStore {
    #[must_use]
    pub fn new(settings: MediaSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    pub(super) const fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    fn upload_url(&self) -> String {
        let hosted = &self.settings.hosted;
        format!(
            "{}/{}/auto/upload",
            hosted.api_base.trim_end_matches('/'),
            hosted.cloud_name
        )
    }

    /// Upload the file, returning the url the host serves it from.
    ///
    /// Songs and covers share one folder, the host tells them apart.
    ///
    /// # Errors
    ///
    /// Fails if no credentials are configured, the request fails, or the host rejects the upload.
    #[instrument(skip(self, file), fields(file_name = %file.file_name))]
    pub async fn save(&self, kind: MediaKind, file: &UploadedFile) -> Result<String, MediaError> {
        let hosted = &self.settings.hosted;
        if !hosted.is_configured() {
            return Err(MediaError::NotConfigured);
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());

        let form = Form::new()
            .part(
                "file",
                Part::bytes(file.bytes.clone()).file_name(file.file_name.clone()),
            )
            .text("api_key", hosted.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("folder", hosted.folder.clone())
            .text("signature_algorithm", "sha256")
            .text("signature", sign(&hosted.folder, timestamp, &hosted.api_secret));

        let response = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Hosted {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        debug!("uploaded {} {} to {}", kind.dir(), file.file_name, uploaded.secure_url);
        Ok(uploaded.secure_url)
    }

    /// Hosted media is never deleted.
    pub fn remove(&self, path: &str) {
        debug!("leaving hosted media in place: {path}");
    }
}

/// The request signature, the hex sha256 of the signed parameters followed by the secret.
#[must_use]
pub fn sign(folder: &str, timestamp: u64, api_secret: &str) -> String {
    let digest = Sha256::digest(format!("folder={folder}&timestamp={timestamp}{api_secret}"));
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Multipart, http::StatusCode, routing::post};
    use pretty_assertions::assert_eq;
    use spotlite_core::config::{HostedSettings, MediaBackendKind};
    use std::collections::HashMap;

    #[test]
    fn test_sign() {
        assert_eq!(
            sign("spotify_songs", 1_700_000_000, "abcd"),
            "21affdce7c54d741f78fb0f338e666489aa05ebcf27e05997765813471da9c41"
        );
    }

    /// Accepts uploads the way the real host does, checking the signature.
    async fn fake_upload(mut multipart: Multipart) -> Result<Json<serde_json::Value>, StatusCode> {
        let mut fields = HashMap::new();
        let mut file = None;
        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                file = field.file_name().map(ToString::to_string);
            } else {
                fields.insert(name, field.text().await.unwrap_or_default());
            }
        }

        let timestamp: u64 = fields["timestamp"].parse().map_err(|_| StatusCode::BAD_REQUEST)?;
        if fields["api_key"] != "key"
            || fields["signature_algorithm"] != "sha256"
            || fields["signature"] != sign(&fields["folder"], timestamp, "secret")
        {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let file = file.ok_or(StatusCode::BAD_REQUEST)?;
        Ok(Json(serde_json::json!({
            "secure_url": format!("https://cdn.example.com/{}/{file}", fields["folder"]),
            "public_id": "ignored",
        })))
    }

    async fn spawn_fake_host() -> String {
        let app = Router::new().route("/demo/auto/upload", post(fake_upload));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn store(api_base: String, api_secret: &str) -> HostedStore {
        HostedStore::new(MediaSettings {
            backend: MediaBackendKind::Hosted,
            hosted: HostedSettings {
                cloud_name: "demo".into(),
                api_key: "key".into(),
                api_secret: api_secret.into(),
                folder: "spotify_songs".into(),
                api_base,
            },
            ..Default::default()
        })
    }

    fn file() -> UploadedFile {
        UploadedFile {
            file_name: "song.mp3".into(),
            bytes: b"ID3".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_save_returns_the_secure_url() {
        let store = store(spawn_fake_host().await, "secret");

        let url = store.save(MediaKind::Song, &file()).await.unwrap();
        assert_eq!(url, "https://cdn.example.com/spotify_songs/song.mp3");
    }

    #[tokio::test]
    async fn test_save_reports_rejections() {
        let store = store(spawn_fake_host().await, "wrong");

        let result = store.save(MediaKind::Song, &file()).await;
        assert!(matches!(result, Err(MediaError::Hosted { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_save_without_credentials() {
        let store = HostedStore::new(MediaSettings::default());
        assert!(matches!(
            store.save(MediaKind::Cover, &file()).await,
            Err(MediaError::NotConfigured)
        ));
    }
}

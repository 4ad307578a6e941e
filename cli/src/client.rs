//! A thin client for the catalog server's HTTP api.

use std::path::Path;

use anyhow::{Context, anyhow, bail};
use log::{debug, warn};
use reqwest::{
    Response,
    multipart::{Form, Part},
};
use serde::Deserialize;
use spotlite_storage::db::schemas::song::Song;

/// What the server sends back with every non-list response.
#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// The full catalog, fetched in one go.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub songs: Vec<Song>,
    pub featured: Vec<Song>,
    pub recent: Vec<Song>,
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    /// Always ends with a `/`.
    base_url: String,
}

impl CatalogClient {
    #[must_use]
    pub fn new(server_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/", server_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// # Errors
    ///
    /// Fails if the server can't be reached.
    pub async fn ping(&self) -> anyhow::Result<String> {
        let response = self.http.get(self.url("api/ping")).send().await?;
        Ok(expect_success(response).await?.text().await?)
    }

    /// Every song, in upload order.
    ///
    /// # Errors
    ///
    /// Fails if the server can't be reached or answers with an error.
    pub async fn songs(&self) -> anyhow::Result<Vec<Song>> {
        self.list("api/songs").await
    }

    /// # Errors
    ///
    /// Fails if the server can't be reached or answers with an error.
    pub async fn featured(&self) -> anyhow::Result<Vec<Song>> {
        self.list("api/songs/featured").await
    }

    /// # Errors
    ///
    /// Fails if the server can't be reached or answers with an error.
    pub async fn recent(&self) -> anyhow::Result<Vec<Song>> {
        self.list("api/songs/recent").await
    }

    async fn list(&self, path: &str) -> anyhow::Result<Vec<Song>> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// Fetch the catalog and both shelves concurrently.
    ///
    /// The shelves are extras, if either of them fails it is logged and left empty.
    ///
    /// # Errors
    ///
    /// Fails if the catalog itself can't be fetched.
    pub async fn catalog(&self) -> anyhow::Result<CatalogSnapshot> {
        let (songs, featured, recent) =
            tokio::join!(self.songs(), self.featured(), self.recent());

        let songs = songs?;
        let featured = featured.unwrap_or_else(|e| {
            warn!("Failed to fetch featured songs: {e}");
            Vec::new()
        });
        let recent = recent.unwrap_or_else(|e| {
            warn!("Failed to fetch recent songs: {e}");
            Vec::new()
        });

        Ok(CatalogSnapshot {
            songs,
            featured,
            recent,
        })
    }

    /// Upload a song and its cover.
    ///
    /// # Errors
    ///
    /// Fails if either file can't be read, or if the server rejects the upload
    /// (the server's message is the error).
    pub async fn upload(
        &self,
        song_file: &Path,
        cover_file: &Path,
        song_name: &str,
        artist: Option<&str>,
    ) -> anyhow::Result<Song> {
        let mut form = Form::new()
            .text("songName", song_name.to_string())
            .part("songFile", file_part(song_file).await?)
            .part("coverFile", file_part(cover_file).await?);
        if let Some(artist) = artist {
            form = form.text("artist", artist.to_string());
        }

        let response = self
            .http
            .post(self.url("api/upload"))
            .multipart(form)
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// Delete a song, returning the server's confirmation.
    ///
    /// # Errors
    ///
    /// Fails if the server can't be reached, or the song doesn't exist.
    pub async fn delete(&self, id: &str) -> anyhow::Result<String> {
        let response = self
            .http
            .delete(self.url(&format!("api/songs/{id}")))
            .send()
            .await?;
        Ok(expect_success(response).await?.json::<MessageBody>().await?.message)
    }

    /// Download a media file, `url` is absolute.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be fetched.
    pub async fn media_bytes(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        debug!("Fetching media from {url}");
        let response = self.http.get(url).send().await?;
        Ok(expect_success(response).await?.bytes().await?.to_vec())
    }
}

async fn file_part(path: &Path) -> anyhow::Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} is not a file", path.display()))?;
    Ok(Part::bytes(bytes).file_name(file_name))
}

/// Turn an error status into an error carrying the server's message (if it sent one).
async fn expect_success(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<MessageBody>(&body) {
        Ok(MessageBody { message }) => bail!("{message} ({status})"),
        Err(_) if body.is_empty() => bail!("Server responded with {status}"),
        Err(_) => bail!("Server responded with {status}: {body}"),
    }
}

//! utilities used for testing
//!
//! NOTE: most of the stuff related to setting up database state is in the `spotlite_storage` crate
//! behind the `test_utils` feature flag.

use std::sync::{Arc, OnceLock};

use reqwest::multipart::{Form, Part};
use rstest::fixture;
use spotlite_core::{
    config::{CatalogSettings, DaemonSettings, MediaSettings, Settings},
    logger::{init_logger, init_tracing},
};
use spotlite_storage::test_utils::init_test_database;
use surrealdb::{Surreal, engine::local::Db};
use tempfile::TempDir;

use crate::{init_test_client_server, termination::Terminator};

static INIT: OnceLock<()> = OnceLock::new();

pub fn init() {
    INIT.get_or_init(|| {
        init_logger(log::LevelFilter::Debug, None);
        if let Err(e) = tracing::subscriber::set_global_default(init_tracing()) {
            panic!("Error setting global default tracing subscriber: {e:?}")
        }
    });
}

/// A running server, backed by an in-memory database and a temporary media root.
pub struct TestServer {
    pub base_url: String,
    pub db: Arc<Surreal<Db>>,
    pub terminator: Terminator,
    pub media_root: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// A server configured to return 2 recent and 3 featured songs.
#[fixture]
pub async fn server() -> TestServer {
    start_server(DaemonSettings::default()).await
}

/// Like the [`server`] fixture, with the given daemon settings.
pub async fn start_server(daemon: DaemonSettings) -> TestServer {
    init();
    let media_root = tempfile::tempdir().unwrap();
    let db = Arc::new(init_test_database().await.unwrap());
    let settings = Arc::new(Settings {
        daemon,
        catalog: CatalogSettings {
            featured_count: 3,
            recent_count: 2,
        },
        media: MediaSettings {
            public_dir: media_root.path().to_path_buf(),
            ..Default::default()
        },
        ..Default::default()
    });

    let (base_url, terminator) = init_test_client_server(db.clone(), settings).await.unwrap();

    TestServer {
        base_url,
        db,
        terminator,
        media_root,
    }
}

pub fn part(file_name: &str) -> Part {
    Part::bytes(b"ID3 fake mp3".to_vec()).file_name(file_name.to_string())
}

/// Just the text fields of an upload.
pub fn bare_form(song_name: &str, artist: Option<&str>) -> Form {
    let form = Form::new().text("songName", song_name.to_string());
    match artist {
        Some(artist) => form.text("artist", artist.to_string()),
        None => form,
    }
}

/// A complete upload.
pub fn form(song_name: &str, artist: Option<&str>) -> Form {
    bare_form(song_name, artist)
        .part("songFile", part("song.mp3"))
        .part("coverFile", part("cover.jpg"))
}

pub async fn upload(server: &TestServer, form: Form) -> reqwest::Result<reqwest::Response> {
    reqwest::Client::new()
        .post(server.url("api/upload"))
        .multipart(form)
        .send()
        .await
}

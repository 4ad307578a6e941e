use anyhow::Result;
use rand::{Rng, seq::SliceRandom};
use surrealdb::{Surreal, engine::local::Db};

use crate::db::{
    init_database,
    schemas::song::{Song, SongMetadata},
};

const NAMES: &[&str] = &[
    "Salam-e-Ishq",
    "Tum Hi Ho",
    "Kesariya",
    "Apna Bana Le",
    "Channa Mereya",
    "Raataan Lambiyan",
];

const ARTISTS: &[&str] = &["Sonu Nigam", "Arijit Singh", "Shreya Ghoshal", "Pritam"];

/// Initialize an in-memory database with the schema defined.
///
/// # Errors
///
/// Fails if the in-memory engine cannot be started.
pub async fn init_test_database() -> Result<Surreal<Db>> {
    Ok(init_database(None).await?)
}

/// Generates arbitrary song metadata, with a relative local-style path for the media.
#[must_use]
pub fn arb_song_metadata() -> impl Fn() -> SongMetadata {
    || {
        let rng = &mut rand::thread_rng();
        let name = NAMES.choose(rng).copied().unwrap_or("Song");
        let artist = ARTISTS.choose(rng).map(|a| (*a).to_string());
        let stamp: u32 = rng.r#gen();

        SongMetadata::new(
            format!("{name} {stamp}"),
            artist,
            format!("songs/{stamp}-{}.mp3", slug(name)),
            format!("covers/{stamp}-{}.jpg", slug(name)),
        )
    }
}

/// Create a song with the given name and artist in the database.
///
/// # Errors
///
/// Fails if the song cannot be created.
pub async fn create_song(db: &Surreal<Db>, name: &str, artist: Option<&str>) -> Result<Song> {
    let metadata = SongMetadata::new(
        name,
        artist.map(ToString::to_string),
        format!("songs/{}.mp3", slug(name)),
        format!("covers/{}.jpg", slug(name)),
    );
    Ok(Song::create(db, metadata).await?)
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

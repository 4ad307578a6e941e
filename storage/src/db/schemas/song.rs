#![allow(clippy::module_name_repetitions)]
//--------------------------------------------------------------------------------- other libraries
use serde::{Deserialize, Serialize};
//----------------------------------------------------------------------------------- local modules
use crate::errors::{Error, StorageResult};

/// The key of a [`Song`] record, a ULID rendered as a string.
pub type SongId = String;

pub const TABLE_NAME: &str = "song";

/// The artist recorded for songs uploaded without one.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

fn unknown_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}

/// This struct holds all the metadata about a particular [`Song`].
///
/// Serialized with the same camelCase keys the HTTP api uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// The unique identifier for this [`Song`], assigned by the database on creation.
    pub id: SongId,
    /// Title of the [`Song`].
    pub song_name: String,
    /// Artist of the [`Song`].
    #[serde(default = "unknown_artist")]
    pub artist: String,
    /// Where the audio lives, either relative to the static root (`songs/...`) or an absolute url.
    pub file_path: String,
    /// Where the cover image lives, same shape as `file_path`.
    pub cover_path: String,
}

impl Song {
    /// Generate a fresh id for a [`Song`].
    ///
    /// Ids are monotonic within this process, so sorting by id gives creation order.
    #[must_use]
    #[cfg(feature = "db")]
    pub fn generate_id() -> SongId {
        use once_cell::sync::Lazy;
        use std::sync::Mutex;
        use ulid::{Generator, Ulid};

        static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

        GENERATOR
            .lock()
            .ok()
            .and_then(|mut generator| generator.generate().ok())
            .unwrap_or_else(Ulid::new)
            .to_string()
    }

    /// Whether this song matches a search query,
    /// case-insensitive substring match against the name and the artist.
    ///
    /// An empty query matches everything.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.song_name.to_lowercase().contains(&query)
            || self.artist.to_lowercase().contains(&query)
    }
}

/// Everything about a [`Song`] except its id, what gets written to the database.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongMetadata {
    pub song_name: String,
    pub artist: String,
    pub file_path: String,
    pub cover_path: String,
}

impl SongMetadata {
    /// Build the metadata for a new song,
    /// a missing (or blank) artist is recorded as [`UNKNOWN_ARTIST`].
    #[must_use]
    pub fn new(
        song_name: impl Into<String>,
        artist: Option<String>,
        file_path: impl Into<String>,
        cover_path: impl Into<String>,
    ) -> Self {
        let artist = artist
            .map(|artist| artist.trim().to_string())
            .filter(|artist| !artist.is_empty())
            .unwrap_or_else(unknown_artist);

        Self {
            song_name: song_name.into().trim().to_string(),
            artist,
            file_path: file_path.into(),
            cover_path: cover_path.into(),
        }
    }

    /// Check that all the required fields are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] naming the first empty field.
    pub fn validate(&self) -> StorageResult<()> {
        if self.song_name.trim().is_empty() {
            return Err(Error::MissingField("songName"));
        }
        if self.file_path.is_empty() {
            return Err(Error::MissingField("filePath"));
        }
        if self.cover_path.is_empty() {
            return Err(Error::MissingField("coverPath"));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_song(self, id: SongId) -> Song {
        Song {
            id,
            song_name: self.song_name,
            artist: self.artist,
            file_path: self.file_path,
            cover_path: self.cover_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn song() -> Song {
        Song {
            id: "01J9ZQ5X1Y8K3M2N4P6R7S9T0V".into(),
            song_name: "Salam-e-Ishq".into(),
            artist: "Sonu Nigam".into(),
            file_path: "songs/1700000000000-salam.mp3".into(),
            cover_path: "covers/1700000000000-salam.jpg".into(),
        }
    }

    #[test]
    fn test_song_serializes_with_api_keys() {
        let json = serde_json::to_value(song()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "01J9ZQ5X1Y8K3M2N4P6R7S9T0V",
                "songName": "Salam-e-Ishq",
                "artist": "Sonu Nigam",
                "filePath": "songs/1700000000000-salam.mp3",
                "coverPath": "covers/1700000000000-salam.jpg",
            })
        );
    }

    #[test]
    fn test_song_deserializes_without_artist() {
        let song: Song = serde_json::from_str(
            r#"{"id":"x","songName":"Tum Hi Ho","filePath":"https://cdn.example/a.mp3","coverPath":"https://cdn.example/a.jpg"}"#,
        )
        .unwrap();

        assert_eq!(song.artist, UNKNOWN_ARTIST);
    }

    #[rstest]
    #[case::missing(None, UNKNOWN_ARTIST)]
    #[case::empty(Some(String::new()), UNKNOWN_ARTIST)]
    #[case::blank(Some("   ".into()), UNKNOWN_ARTIST)]
    #[case::given(Some("Arijit Singh".into()), "Arijit Singh")]
    #[case::padded(Some(" Arijit Singh ".into()), "Arijit Singh")]
    fn test_metadata_artist_default(#[case] artist: Option<String>, #[case] expected: &str) {
        let metadata = SongMetadata::new("Song", artist, "songs/a.mp3", "covers/a.jpg");
        assert_eq!(metadata.artist, expected);
    }

    #[rstest]
    #[case::ok(SongMetadata::new("Song", None, "songs/a.mp3", "covers/a.jpg"), None)]
    #[case::no_name(SongMetadata::new("  ", None, "songs/a.mp3", "covers/a.jpg"), Some("songName"))]
    #[case::no_file(SongMetadata::new("Song", None, "", "covers/a.jpg"), Some("filePath"))]
    #[case::no_cover(SongMetadata::new("Song", None, "songs/a.mp3", ""), Some("coverPath"))]
    fn test_metadata_validate(#[case] metadata: SongMetadata, #[case] missing: Option<&str>) {
        match (metadata.validate(), missing) {
            (Ok(()), None) => {}
            (Err(Error::MissingField(field)), Some(expected)) => assert_eq!(field, expected),
            (result, expected) => panic!("expected {expected:?}, got {result:?}"),
        }
    }

    #[rstest]
    #[case::name_lowercase("ishq", true)]
    #[case::name_uppercase("ISHQ", true)]
    #[case::artist("sonu", true)]
    #[case::empty("", true)]
    #[case::whitespace("  ", true)]
    #[case::miss("kesariya", false)]
    fn test_song_matches(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(song().matches(query), expected);
    }

    #[test]
    fn test_generated_ids_are_ordered() {
        let ids: Vec<SongId> = (0..64).map(|_| Song::generate_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

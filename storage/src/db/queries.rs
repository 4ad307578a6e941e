//! Raw `SurrealQL` statements used by the song CRUD operations.
//!
//! Records are keyed by a ULID string, every read projects that key back out as a plain `id`
//! field so the rows deserialize straight into [`Song`](super::schemas::song::Song).

macro_rules! song_fields {
    () => {
        "record::id(id) AS id, songName, artist, filePath, coverPath"
    };
}

/// Schema of the song table.
///
/// ```sql, ignore
/// DEFINE TABLE IF NOT EXISTS song SCHEMAFULL;
/// DEFINE FIELD IF NOT EXISTS songName ON song TYPE string ASSERT string::len($value) > 0;
/// DEFINE FIELD IF NOT EXISTS artist ON song TYPE string DEFAULT 'Unknown Artist';
/// DEFINE FIELD IF NOT EXISTS filePath ON song TYPE string;
/// DEFINE FIELD IF NOT EXISTS coverPath ON song TYPE string;
/// ```
#[must_use]
pub const fn define_song_table() -> &'static str {
    "DEFINE TABLE IF NOT EXISTS song SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS songName ON song TYPE string ASSERT string::len($value) > 0;
    DEFINE FIELD IF NOT EXISTS artist ON song TYPE string DEFAULT 'Unknown Artist';
    DEFINE FIELD IF NOT EXISTS filePath ON song TYPE string;
    DEFINE FIELD IF NOT EXISTS coverPath ON song TYPE string;"
}

/// Create a song record with a caller chosen key.
///
/// Binds `$table`, `$id`, and `$content`.
#[must_use]
pub const fn create_song() -> &'static str {
    "CREATE type::thing($table, $id) CONTENT $content RETURN NONE"
}

/// Every song, ordered by key (which is creation order).
#[must_use]
pub const fn read_all_songs() -> &'static str {
    concat!("SELECT ", song_fields!(), " FROM song ORDER BY id ASC")
}

/// One song by key, binds `$table` and `$id`.
#[must_use]
pub const fn read_song() -> &'static str {
    concat!("SELECT ", song_fields!(), " FROM type::thing($table, $id)")
}

/// The `$limit` most recently created songs, newest first.
#[must_use]
pub const fn read_recent_songs() -> &'static str {
    concat!(
        "SELECT ",
        song_fields!(),
        " FROM song ORDER BY id DESC LIMIT $limit"
    )
}

/// A random sample of at most `$limit` songs.
#[must_use]
pub const fn read_random_songs() -> &'static str {
    concat!(
        "SELECT ",
        song_fields!(),
        " FROM song ORDER BY RAND() LIMIT $limit"
    )
}

/// Delete a song by key, binds `$table` and `$id`.
#[must_use]
pub const fn delete_song() -> &'static str {
    "DELETE type::thing($table, $id) RETURN NONE"
}

/// Number of songs in the table.
#[must_use]
pub const fn count_songs() -> &'static str {
    "SELECT count() AS count FROM song GROUP ALL"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_str_eq;

    #[test]
    fn test_reads_project_the_record_key() {
        for query in [
            read_all_songs(),
            read_song(),
            read_recent_songs(),
            read_random_songs(),
        ] {
            assert!(query.starts_with("SELECT record::id(id) AS id, songName"));
        }
    }

    #[test]
    fn test_read_recent_songs() {
        assert_str_eq!(
            read_recent_songs(),
            "SELECT record::id(id) AS id, songName, artist, filePath, coverPath FROM song ORDER BY id DESC LIMIT $limit"
        );
    }
}

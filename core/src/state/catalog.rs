//! The songs a client knows about.

use std::collections::HashMap;

use spotlite_storage::db::schemas::song::{Song, SongId};

/// Which list the client shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// The full catalog, plus the featured and recent shelves.
    #[default]
    Home,
    /// Only the songs matching the search query.
    Results,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    /// Every song, in the order the server listed them.
    songs: Vec<Song>,
    featured: Vec<Song>,
    recent: Vec<Song>,
    /// Probed lengths in seconds.
    durations: HashMap<SongId, f64>,
    query: String,
}

impl Catalog {
    /// Replace the catalog with a freshly fetched one.
    ///
    /// Durations of songs that are still present are kept, the query is untouched.
    pub fn replace(&mut self, songs: Vec<Song>, featured: Vec<Song>, recent: Vec<Song>) {
        self.durations
            .retain(|id, _| songs.iter().any(|song| &song.id == id));
        self.songs = songs;
        self.featured = featured;
        self.recent = recent;
    }

    /// Forget every song.
    pub fn clear(&mut self) {
        self.replace(Vec::new(), Vec::new(), Vec::new());
    }

    #[must_use]
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    #[must_use]
    pub fn featured(&self) -> &[Song] {
        &self.featured
    }

    #[must_use]
    pub fn recent(&self) -> &[Song] {
        &self.recent
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Where a song sits in the catalog.
    #[must_use]
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.songs.iter().position(|song| song.id == id)
    }

    pub fn set_duration(&mut self, id: SongId, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.durations.insert(id, seconds);
        }
    }

    #[must_use]
    pub fn duration_of(&self, id: &str) -> Option<f64> {
        self.durations.get(id).copied()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        if self.query.trim().is_empty() {
            ViewMode::Home
        } else {
            ViewMode::Results
        }
    }

    /// The songs matching the current query, with their catalog index.
    #[must_use]
    pub fn results(&self) -> Vec<(usize, &Song)> {
        self.songs
            .iter()
            .enumerate()
            .filter(|(_, song)| song.matches(&self.query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn song(id: &str, name: &str, artist: &str) -> Song {
        Song {
            id: id.into(),
            song_name: name.into(),
            artist: artist.into(),
            file_path: format!("songs/{id}.mp3"),
            cover_path: format!("covers/{id}.jpg"),
        }
    }

    #[fixture]
    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.replace(
            vec![
                song("a", "Salam-e-Ishq", "Sonu Nigam"),
                song("b", "Tum Hi Ho", "Arijit Singh"),
                song("c", "Kesariya", "Arijit Singh"),
            ],
            vec![song("c", "Kesariya", "Arijit Singh")],
            vec![song("c", "Kesariya", "Arijit Singh")],
        );
        catalog
    }

    #[rstest]
    fn test_search_is_case_insensitive(mut catalog: Catalog) {
        catalog.set_query("ishq");

        let results = catalog.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, 0);
        assert_eq!(results[0].1.song_name, "Salam-e-Ishq");
        assert_eq!(catalog.view_mode(), ViewMode::Results);
    }

    #[rstest]
    fn test_search_matches_artist(mut catalog: Catalog) {
        catalog.set_query("ARIJIT");

        let indices: Vec<usize> = catalog.results().into_iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[rstest]
    fn test_empty_query_is_home(mut catalog: Catalog) {
        catalog.set_query("  ");
        assert_eq!(catalog.view_mode(), ViewMode::Home);
        assert_eq!(catalog.results().len(), 3);
    }

    #[rstest]
    fn test_replace_keeps_durations_of_survivors(mut catalog: Catalog) {
        catalog.set_duration("a".into(), 180.0);
        catalog.set_duration("b".into(), 200.0);

        catalog.replace(vec![song("a", "Salam-e-Ishq", "Sonu Nigam")], vec![], vec![]);

        assert_eq!(catalog.duration_of("a"), Some(180.0));
        assert_eq!(catalog.duration_of("b"), None);
    }

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::zero(0.0)]
    #[case::infinite(f64::INFINITY)]
    fn test_unusable_durations_are_ignored(mut catalog: Catalog, #[case] seconds: f64) {
        catalog.set_duration("a".into(), seconds);
        assert_eq!(catalog.duration_of("a"), None);
    }

    #[rstest]
    fn test_position_of(catalog: Catalog) {
        assert_eq!(catalog.position_of("b"), Some(1));
        assert_eq!(catalog.position_of("z"), None);
    }
}

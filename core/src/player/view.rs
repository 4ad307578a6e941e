use spotlite_storage::db::schemas::song::Song;

use super::{EMPTY_LIBRARY_MESSAGE, Player, is_absolute_url};
use crate::{format_time, state::catalog::ViewMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    Play,
    Pause,
}

impl Icon {
    /// `Pause` while playing, since that's what pressing it would do.
    const fn for_playing(playing: bool) -> Self {
        if playing { Self::Pause } else { Self::Play }
    }
}

/// One song in a list.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    /// Position in the catalog, what [`PlayerEvent::Select`](super::PlayerEvent::Select) takes.
    pub index: usize,
    pub id: String,
    pub name: String,
    pub artist: String,
    /// The cover url, or the placeholder if the song has no absolute cover url.
    pub cover: String,
    /// `MM:SS`, `00:00` until probed.
    pub duration: String,
    pub icon: Icon,
}

/// Everything a frontend needs to draw the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerView {
    pub mode: ViewMode,
    /// Shown instead of the lists.
    pub error: Option<String>,
    pub notice: Option<String>,
    pub now_playing: String,
    pub master: Icon,
    /// Catalog in home mode, search results otherwise.
    pub rows: Vec<RowView>,
    /// Only filled in home mode.
    pub featured: Vec<RowView>,
    /// Only filled in home mode.
    pub recent: Vec<RowView>,
    pub elapsed: String,
    pub total: String,
    /// 0-100
    pub progress: f64,
    /// What the volume slider shows, 0-1.
    pub volume: f32,
    pub muted: bool,
    pub allow_delete: bool,
}

impl Player {
    /// Render the current state.
    #[must_use]
    pub fn view(&self) -> PlayerView {
        let transport = self.transport();
        let playing = self.current.is_some() && !transport.paused;
        let catalog = self.catalog();
        let mode = catalog.view_mode();

        let rows = match mode {
            ViewMode::Home => catalog
                .songs()
                .iter()
                .enumerate()
                .map(|(index, song)| self.row(index, song))
                .collect(),
            ViewMode::Results => catalog
                .results()
                .into_iter()
                .map(|(index, song)| self.row(index, song))
                .collect(),
        };

        let (featured, recent) = match mode {
            ViewMode::Home => (self.shelf(catalog.featured()), self.shelf(catalog.recent())),
            ViewMode::Results => (vec![], vec![]),
        };

        let now_playing = match (self.current_song(), &self.error) {
            (Some(song), _) => song.song_name.clone(),
            (None, Some(_)) => String::new(),
            (None, None) => EMPTY_LIBRARY_MESSAGE.to_string(),
        };

        PlayerView {
            mode,
            error: self.error.clone(),
            notice: self.notice.clone(),
            now_playing,
            master: Icon::for_playing(playing),
            rows,
            featured,
            recent,
            elapsed: format_time(transport.position),
            total: transport.known_duration().map_or_else(|| format_time(0.0), format_time),
            progress: transport.progress(),
            volume: transport.slider_volume(),
            muted: transport.muted,
            allow_delete: self.allow_delete,
        }
    }

    fn row(&self, index: usize, song: &Song) -> RowView {
        let playing = self.current == Some(index) && !self.transport().paused;
        let cover = if is_absolute_url(&song.cover_path) {
            song.cover_path.clone()
        } else {
            self.placeholder_cover.clone()
        };

        RowView {
            index,
            id: song.id.clone(),
            name: song.song_name.clone(),
            artist: song.artist.clone(),
            cover,
            duration: format_time(self.catalog().duration_of(&song.id).unwrap_or(0.0)),
            icon: Icon::for_playing(playing),
        }
    }

    /// Shelf songs are drawn like catalog rows, those that aren't in the catalog are skipped.
    fn shelf(&self, songs: &[Song]) -> Vec<RowView> {
        songs
            .iter()
            .filter_map(|song| {
                let index = self.catalog().position_of(&song.id)?;
                Some(self.row(index, song))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{song, three_songs};
    use super::*;
    use crate::{
        audio::TransportSnapshot,
        config::ClientSettings,
        player::{LOAD_FAILED_MESSAGE, PlayerEvent},
    };

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn player() -> Player {
        let mut player = Player::new(&ClientSettings::default());
        player.update(PlayerEvent::CatalogLoaded {
            songs: three_songs(),
            featured: vec![],
            recent: vec![],
        });
        player
    }

    #[test]
    fn test_empty_library() {
        let mut player = Player::new(&ClientSettings::default());
        player.update(PlayerEvent::CatalogLoaded {
            songs: vec![],
            featured: vec![],
            recent: vec![],
        });

        let view = player.view();
        assert_eq!(view.now_playing, "No songs in library");
        assert_eq!(view.elapsed, "00:00");
        assert_eq!(view.total, "00:00");
        assert_eq!(view.progress, 0.0);
        assert_eq!(view.master, Icon::Play);
        assert!(view.rows.is_empty());
    }

    #[rstest]
    fn test_view_is_idempotent(mut player: Player) {
        player.update(PlayerEvent::Select(1));
        assert_eq!(player.view(), player.view());
    }

    #[rstest]
    fn test_only_the_playing_row_shows_pause(mut player: Player) {
        player.update(PlayerEvent::Select(1));

        let view = player.view();
        let icons: Vec<Icon> = view.rows.iter().map(|row| row.icon).collect();
        assert_eq!(icons, vec![Icon::Play, Icon::Pause, Icon::Play]);
        assert_eq!(view.master, Icon::Pause);
        assert_eq!(view.now_playing, "Tum Hi Ho");

        player.update(PlayerEvent::Select(1));
        let view = player.view();
        assert!(view.rows.iter().all(|row| row.icon == Icon::Play));
        assert_eq!(view.master, Icon::Play);
    }

    #[rstest]
    fn test_time_labels_and_progress(mut player: Player) {
        player.update(PlayerEvent::Select(0));
        player.update(PlayerEvent::Tick(TransportSnapshot {
            position: 65.0,
            duration: Some(260.0),
            paused: false,
        }));

        let view = player.view();
        assert_eq!(view.elapsed, "01:05");
        assert_eq!(view.total, "04:20");
        assert_eq!(view.progress, 25.0);
    }

    #[rstest]
    fn test_search_switches_to_results(mut player: Player) {
        player.update(PlayerEvent::Search("ishq".into()));

        let view = player.view();
        assert_eq!(view.mode, ViewMode::Results);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].name, "Salam-e-Ishq");
        assert_eq!(view.rows[0].index, 0);

        player.update(PlayerEvent::Search(String::new()));
        assert_eq!(player.view().mode, ViewMode::Home);
        assert_eq!(player.view().rows.len(), 3);
    }

    #[test]
    fn test_shelves_point_into_the_catalog() {
        let mut player = Player::new(&ClientSettings::default());
        player.update(PlayerEvent::CatalogLoaded {
            songs: three_songs(),
            featured: vec![song("c", "Kesariya", "Arijit Singh"), song("z", "Gone", "Nobody")],
            recent: vec![song("b", "Tum Hi Ho", "Arijit Singh")],
        });

        let view = player.view();
        assert_eq!(view.featured.len(), 1);
        assert_eq!(view.featured[0].index, 2);
        assert_eq!(view.recent[0].index, 1);

        player.update(PlayerEvent::Search("kes".into()));
        assert!(player.view().featured.is_empty());
    }

    #[test]
    fn test_relative_covers_use_the_placeholder() {
        let settings = ClientSettings::default();
        let mut player = Player::new(&settings);
        let mut local = song("a", "Salam-e-Ishq", "Sonu Nigam");
        local.cover_path = "covers/a.jpg".into();
        player.update(PlayerEvent::CatalogLoaded {
            songs: vec![local, song("b", "Tum Hi Ho", "Arijit Singh")],
            featured: vec![],
            recent: vec![],
        });

        let view = player.view();
        assert_eq!(view.rows[0].cover, settings.placeholder_cover);
        assert_eq!(view.rows[1].cover, "https://cdn.example.com/b.jpg");
    }

    #[rstest]
    fn test_row_durations(mut player: Player) {
        player.update(PlayerEvent::DurationProbed {
            id: "b".into(),
            seconds: 185.0,
        });

        let durations: Vec<String> = player.view().rows.into_iter().map(|r| r.duration).collect();
        assert_eq!(durations, vec!["00:00", "03:05", "00:00"]);
    }

    #[rstest]
    fn test_error_replaces_now_playing(mut player: Player) {
        player.update(PlayerEvent::CatalogFailed("timeout".into()));

        let view = player.view();
        assert_eq!(view.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
        assert_eq!(view.now_playing, "");
        assert!(view.rows.is_empty());
    }
}

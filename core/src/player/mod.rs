//! The player client's state machine.
//!
//! A [`Player`] takes one [`PlayerEvent`] at a time, updates its state, and hands back the
//! [`Effect`]s the runtime has to carry out (talking to the playback element, the server,
//! or the user). What to show is derived from the state with [`Player::view`].

mod view;

pub use view::{Icon, PlayerView, RowView};

use log::warn;
use spotlite_storage::db::schemas::song::{Song, SongId};

use crate::{
    audio::TransportSnapshot,
    config::ClientSettings,
    state::{Transport, catalog::Catalog},
};

pub const LOAD_FAILED_MESSAGE: &str = "Could not load songs. Is the server running?";
pub const EMPTY_LIBRARY_MESSAGE: &str = "No songs in library";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete the song.";

/// Something that happened, either a user command or a report from the outside world.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    /// The catalog (and its shelves) was fetched.
    CatalogLoaded {
        songs: Vec<Song>,
        featured: Vec<Song>,
        recent: Vec<Song>,
    },
    /// Fetching the catalog failed.
    CatalogFailed(String),
    /// The length of a song's media was found out.
    DurationProbed { id: SongId, seconds: f64 },
    /// The user picked the song at this catalog index.
    Select(usize),
    /// The master play/pause control.
    Toggle,
    Next,
    Previous,
    /// The progress slider was moved, 0-100.
    SeekPercent(f64),
    /// The volume slider was moved, 0-1.
    SetVolume(f32),
    ToggleMute,
    Search(String),
    /// The user asked to delete the song at this catalog index.
    Delete(usize),
    DeleteSucceeded,
    DeleteFailed(String),
    Reload,
    /// The playback element reported its state.
    Tick(TransportSnapshot),
}

/// Work for the runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Point the playback element at a new source (which stops the old one).
    Load { url: String },
    Play,
    Pause,
    /// Move the playback element to this many seconds in.
    Seek(f64),
    SetVolume(f32),
    SetMuted(bool),
    /// Fetch the catalog and send back [`PlayerEvent::CatalogLoaded`] or [`PlayerEvent::CatalogFailed`].
    FetchCatalog,
    /// Ask the user, and if they agree delete the song, then send back
    /// [`PlayerEvent::DeleteSucceeded`] or [`PlayerEvent::DeleteFailed`].
    ConfirmDelete { id: SongId, name: String },
}

/// Resolve a stored media path against the server's base url.
///
/// Absolute urls (what the hosted media store records) are returned untouched.
#[must_use]
pub fn resolve_media_url(server_url: &str, path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[must_use]
pub fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

#[derive(Clone, Debug)]
pub struct Player {
    catalog: Catalog,
    /// Index into the catalog of the loaded song.
    current: Option<usize>,
    transport: Transport,
    /// Replaces the list when set.
    error: Option<String>,
    /// A one-off message, cleared by the next user command.
    notice: Option<String>,
    server_url: String,
    allow_delete: bool,
    placeholder_cover: String,
}

impl Player {
    #[must_use]
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            catalog: Catalog::default(),
            current: None,
            transport: Transport::default(),
            error: None,
            notice: None,
            server_url: settings.server_url.clone(),
            allow_delete: settings.allow_delete,
            placeholder_cover: settings.placeholder_cover.clone(),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub fn current_song(&self) -> Option<&Song> {
        self.current.and_then(|index| self.catalog.get(index))
    }

    #[must_use]
    pub fn media_url(&self, song: &Song) -> String {
        resolve_media_url(&self.server_url, &song.file_path)
    }

    /// Apply one event, returning the effects to carry out (in order).
    pub fn update(&mut self, event: PlayerEvent) -> Vec<Effect> {
        if !matches!(
            event,
            PlayerEvent::Tick(_) | PlayerEvent::DurationProbed { .. }
        ) {
            self.notice = None;
        }

        match event {
            PlayerEvent::CatalogLoaded {
                songs,
                featured,
                recent,
            } => self.catalog_loaded(songs, featured, recent),
            PlayerEvent::CatalogFailed(reason) => {
                warn!("Failed to fetch songs: {reason}");
                self.catalog.clear();
                // the element still holds the old source, stop it with the list
                let had_source = self.current.take().is_some();
                self.transport.paused = true;
                self.transport.reset(None);
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
                if had_source { vec![Effect::Pause] } else { vec![] }
            }
            PlayerEvent::DurationProbed { id, seconds } => {
                self.catalog.set_duration(id.clone(), seconds);
                if self.current_song().is_some_and(|song| song.id == id)
                    && self.transport.known_duration().is_none()
                {
                    self.transport.duration = self.catalog.duration_of(&id);
                }
                vec![]
            }
            PlayerEvent::Select(index) => self.select(index),
            PlayerEvent::Toggle => self.toggle(),
            PlayerEvent::Next => self.skip(1),
            PlayerEvent::Previous => self.skip(-1),
            PlayerEvent::SeekPercent(percent) => self.seek(percent),
            PlayerEvent::SetVolume(volume) => {
                self.transport.set_volume(volume);
                vec![
                    Effect::SetVolume(self.transport.volume),
                    Effect::SetMuted(self.transport.muted),
                ]
            }
            PlayerEvent::ToggleMute => {
                self.transport.toggle_mute();
                vec![
                    Effect::SetMuted(self.transport.muted),
                    Effect::SetVolume(self.transport.volume),
                ]
            }
            PlayerEvent::Search(query) => {
                self.catalog.set_query(query);
                vec![]
            }
            PlayerEvent::Delete(index) => {
                if !self.allow_delete {
                    return vec![];
                }
                self.catalog
                    .get(index)
                    .map(|song| Effect::ConfirmDelete {
                        id: song.id.clone(),
                        name: song.song_name.clone(),
                    })
                    .into_iter()
                    .collect()
            }
            PlayerEvent::DeleteSucceeded | PlayerEvent::Reload => vec![Effect::FetchCatalog],
            PlayerEvent::DeleteFailed(reason) => {
                warn!("Error deleting song: {reason}");
                self.notice = Some(DELETE_FAILED_MESSAGE.to_string());
                vec![]
            }
            PlayerEvent::Tick(snapshot) => {
                if self.current.is_some() {
                    self.transport.position = snapshot.position;
                    self.transport.paused = snapshot.paused;
                    if snapshot.duration.is_some() {
                        self.transport.duration = snapshot.duration;
                    }
                }
                vec![]
            }
        }
    }

    /// The first song is loaded, but not started.
    fn catalog_loaded(&mut self, songs: Vec<Song>, featured: Vec<Song>, recent: Vec<Song>) -> Vec<Effect> {
        self.error = None;
        self.catalog.replace(songs, featured, recent);
        self.transport.paused = true;

        match self.catalog.get(0) {
            Some(first) => {
                let url = self.media_url(first);
                let duration = self.catalog.duration_of(&first.id);
                self.current = Some(0);
                self.transport.reset(duration);
                vec![Effect::Load { url }]
            }
            None => {
                self.current = None;
                self.transport.reset(None);
                vec![]
            }
        }
    }

    fn select(&mut self, index: usize) -> Vec<Effect> {
        if self.current == Some(index) && !self.transport.paused {
            self.transport.paused = true;
            return vec![Effect::Pause];
        }
        self.play_index(index)
    }

    /// Load the song at `index` from the start and play it.
    fn play_index(&mut self, index: usize) -> Vec<Effect> {
        let Some(song) = self.catalog.get(index) else {
            return vec![];
        };
        let url = self.media_url(song);
        let duration = self.catalog.duration_of(&song.id);

        self.current = Some(index);
        self.transport.reset(duration);
        self.transport.paused = false;
        vec![Effect::Load { url }, Effect::Play]
    }

    fn toggle(&mut self) -> Vec<Effect> {
        if self.current.is_none() {
            return vec![];
        }
        if self.transport.paused || self.transport.position <= 0.0 {
            self.transport.paused = false;
            vec![Effect::Play]
        } else {
            self.transport.paused = true;
            vec![Effect::Pause]
        }
    }

    fn skip(&mut self, step: isize) -> Vec<Effect> {
        let len = self.catalog.len();
        if len == 0 {
            return vec![];
        }
        let current = self.current.unwrap_or(0);
        let index = if step < 0 {
            (current + len - 1) % len
        } else {
            (current + 1) % len
        };
        self.play_index(index)
    }

    fn seek(&mut self, percent: f64) -> Vec<Effect> {
        let Some(duration) = self.transport.known_duration() else {
            return vec![];
        };
        if self.current.is_none() || !percent.is_finite() {
            return vec![];
        }
        let position = percent.clamp(0.0, 100.0) / 100.0 * duration;
        self.transport.position = position;
        vec![Effect::Seek(position)]
    }
}

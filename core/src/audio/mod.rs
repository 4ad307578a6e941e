//! The playback element a player drives.

use std::{collections::HashMap, time::Instant};

use log::debug;

use crate::{errors::PlaybackError, player::Effect};

/// What a backend reports back to the player after every command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransportSnapshot {
    pub position: f64,
    pub duration: Option<f64>,
    pub paused: bool,
}

/// The single shared playback element.
///
/// Loading a new source stops whatever was playing before.
pub trait MediaBackend {
    /// Load a source, leaving it paused at the start.
    ///
    /// # Errors
    ///
    /// Fails if the source can't be loaded.
    fn load(&mut self, url: &str) -> Result<(), PlaybackError>;
    /// # Errors
    ///
    /// Fails if nothing is loaded.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);

    fn position(&self) -> f64;
    fn duration(&self) -> Option<f64>;
    fn paused(&self) -> bool;

    fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            position: self.position(),
            duration: self.duration(),
            paused: self.paused(),
        }
    }
}

/// Apply an effect to the backend.
///
/// Returns `false` for effects the backend has nothing to do with
/// (fetching, confirming), those are left to the caller.
///
/// # Errors
///
/// Forwards load and play failures.
pub fn drive<B: MediaBackend + ?Sized>(
    backend: &mut B,
    effect: &Effect,
) -> Result<bool, PlaybackError> {
    match effect {
        Effect::Load { url } => backend.load(url)?,
        Effect::Play => backend.play()?,
        Effect::Pause => backend.pause(),
        Effect::Seek(seconds) => backend.seek(*seconds),
        Effect::SetVolume(volume) => backend.set_volume(*volume),
        Effect::SetMuted(muted) => backend.set_muted(*muted),
        Effect::FetchCatalog | Effect::ConfirmDelete { .. } => return Ok(false),
    }
    Ok(true)
}

/// A backend with no audio device, it just keeps time.
///
/// The length of a source has to be registered up front with
/// [`ClockBackend::register_duration`], unknown sources play forever.
/// When the clock reaches the end of the source it reports itself paused there.
#[derive(Debug, Default)]
pub struct ClockBackend {
    source: Option<String>,
    durations: HashMap<String, f64>,
    /// Position at the last play/pause/seek.
    offset: f64,
    /// Set while playing.
    started: Option<Instant>,
    volume: f32,
    muted: bool,
}

impl ClockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Default::default()
        }
    }

    pub fn register_duration(&mut self, url: impl Into<String>, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.durations.insert(url.into(), seconds);
        }
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.volume
    }

    #[must_use]
    pub const fn muted(&self) -> bool {
        self.muted
    }

    fn clamp(&self, position: f64) -> f64 {
        let position = position.max(0.0);
        self.duration().map_or(position, |d| position.min(d))
    }
}

impl MediaBackend for ClockBackend {
    fn load(&mut self, url: &str) -> Result<(), PlaybackError> {
        if url.is_empty() {
            return Err(PlaybackError::Load {
                url: url.to_string(),
                reason: "empty source".to_string(),
            });
        }
        debug!("loading {url}");
        self.source = Some(url.to_string());
        self.offset = 0.0;
        self.started = None;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }
        // replaying a finished source starts it over
        if self.duration().is_some_and(|d| self.position() >= d) {
            self.offset = 0.0;
        } else {
            self.offset = self.position();
        }
        self.started = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started = None;
    }

    fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        self.offset = self.clamp(seconds);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn position(&self) -> f64 {
        let elapsed = self
            .started
            .map_or(0.0, |started| started.elapsed().as_secs_f64());
        self.clamp(self.offset + elapsed)
    }

    fn duration(&self) -> Option<f64> {
        self.source
            .as_ref()
            .and_then(|source| self.durations.get(source).copied())
    }

    fn paused(&self) -> bool {
        self.started.is_none() || self.duration().is_some_and(|d| self.position() >= d)
    }
}

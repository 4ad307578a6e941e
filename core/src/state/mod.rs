//! The state a player client keeps between events.

pub mod catalog;

/// Transport state of the single playback element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transport {
    pub paused: bool,
    /// Seconds from the start of the loaded song.
    pub position: f64,
    /// Length of the loaded song in seconds, `None` until it is known.
    pub duration: Option<f64>,
    /// 0.0 ..= 1.0
    pub volume: f32,
    pub muted: bool,
    /// The last volume that wasn't zero, restored when unmuting.
    last_volume: f32,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            paused: true,
            position: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            last_volume: 1.0,
        }
    }
}

impl Transport {
    /// Reset the position for a freshly loaded song.
    pub fn reset(&mut self, duration: Option<f64>) {
        self.position = 0.0;
        self.duration = duration.filter(|d| d.is_finite() && *d > 0.0);
    }

    /// The duration, if it's known and usable for seeking.
    #[must_use]
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Playback progress as a percentage, 0 when the duration isn't known.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.known_duration()
            .map_or(0.0, |duration| (self.position / duration * 100.0).clamp(0.0, 100.0))
    }

    /// Set the volume from the slider.
    ///
    /// A volume of exactly zero mutes, anything else unmutes.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };

        self.volume = volume;
        if volume == 0.0 {
            self.muted = true;
        } else {
            self.last_volume = volume;
            self.muted = false;
        }
    }

    /// Flip the mute state.
    ///
    /// Unmuting from a volume of zero restores the last non-zero volume.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            if self.volume == 0.0 {
                self.volume = self.last_volume;
            }
        } else {
            self.muted = true;
        }
    }

    /// What the volume slider shows.
    #[must_use]
    pub const fn slider_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    #[must_use]
    pub const fn last_volume(&self) -> f32 {
        self.last_volume
    }
}

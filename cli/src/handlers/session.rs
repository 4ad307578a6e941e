//! The interactive player: reads commands line by line, drives a [`Player`] with them,
//! and carries out the effects it asks for.

use std::{collections::VecDeque, fmt, io, str::FromStr};

use futures::future::join_all;
use log::warn;
use spotlite_core::{
    audio::{ClockBackend, MediaBackend, drive},
    config::ClientSettings,
    player::{Effect, Player, PlayerEvent},
};
use spotlite_storage::db::schemas::song::Song;

use super::{
    printing,
    utils::{StdIn, confirm},
};
use crate::{client::CatalogClient, probe};

pub const HELP: &str = "Commands:
\tplay <n>      play (or pause) song number n
\ttoggle        play or pause the current song
\tnext, prev    skip to the next or previous song
\tseek <0-100>  jump to a point in the current song
\tvol <0-100>   set the volume
\tmute          mute or unmute
\tsearch [q]    filter the songs by name or artist, no query to go back
\tdelete <n>    delete song number n
\treload        fetch the songs again
\tshow          show the songs and what's playing
\thelp          show this message
\tquit          leave the player";

#[derive(Clone, Debug, PartialEq)]
pub enum SessionCommand {
    /// Catalog index, parsed from the 1-based number that gets printed.
    Play(usize),
    Toggle,
    Next,
    Previous,
    /// 0-100
    Seek(f64),
    /// 0-1
    Volume(f32),
    Mute,
    Search(String),
    /// Catalog index.
    Delete(usize),
    Reload,
    Show,
    Help,
    Quit,
}

fn song_number(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(format!("Expected a song number, got \"{arg}\"")),
    }
}

fn percent(arg: &str) -> Result<f64, String> {
    match arg.trim_end_matches('%').parse::<f64>() {
        Ok(p) if p.is_finite() => Ok(p.clamp(0.0, 100.0)),
        _ => Err(format!("Expected a number between 0 and 100, got \"{arg}\"")),
    }
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (command, arg) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let arg = arg.trim();

        match (command.to_lowercase().as_str(), arg) {
            ("play" | "p", arg) if !arg.is_empty() => Ok(Self::Play(song_number(arg)?)),
            ("play" | "p" | "toggle" | "pause", "") => Ok(Self::Toggle),
            ("next" | "n", "") => Ok(Self::Next),
            ("prev" | "previous", "") => Ok(Self::Previous),
            ("seek", arg) if !arg.is_empty() => Ok(Self::Seek(percent(arg)?)),
            #[allow(clippy::cast_possible_truncation)]
            ("vol" | "volume", arg) if !arg.is_empty() => {
                Ok(Self::Volume((percent(arg)? / 100.0) as f32))
            }
            ("mute" | "unmute", "") => Ok(Self::Mute),
            ("search" | "/", query) => Ok(Self::Search(query.to_string())),
            ("delete" | "rm", arg) if !arg.is_empty() => Ok(Self::Delete(song_number(arg)?)),
            ("reload", "") => Ok(Self::Reload),
            ("show" | "ls", "") => Ok(Self::Show),
            ("help" | "?", "") => Ok(Self::Help),
            ("quit" | "exit" | "q", "") => Ok(Self::Quit),
            _ => Err(format!("Unknown command: \"{s}\", try \"help\"")),
        }
    }
}

/// A player bound to a server, with a clock standing in for the audio device.
pub struct Session<'a> {
    client: &'a CatalogClient,
    player: Player,
    backend: ClockBackend,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(client: &'a CatalogClient, settings: &ClientSettings) -> Self {
        let settings = ClientSettings {
            server_url: client.base_url().to_string(),
            ..settings.clone()
        };
        Self {
            client,
            player: Player::new(&settings),
            backend: ClockBackend::new(),
        }
    }

    #[cfg(test)]
    pub const fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub const fn backend(&self) -> &ClockBackend {
        &self.backend
    }

    /// Read commands until the input runs out or the user quits.
    ///
    /// # Errors
    ///
    /// Fails if the output can't be written, or the input can't be read.
    pub async fn run<W1: fmt::Write + Send, W2: fmt::Write + Send>(
        &mut self,
        stdin: &impl StdIn,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> anyhow::Result<()> {
        let interactive = stdin.is_terminal();
        let mut lines = stdin.lines();

        self.dispatch(PlayerEvent::Reload, &mut lines, stdout, stderr).await?;
        write!(stdout, "{}", printing::player_view(&self.player.view())?)?;
        if interactive {
            writeln!(stdout, "Type \"help\" for a list of commands")?;
        }

        loop {
            if interactive {
                write!(stdout, "> ")?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match line.parse::<SessionCommand>() {
                Ok(command) => command,
                Err(e) => {
                    writeln!(stderr, "{e}")?;
                    continue;
                }
            };

            let (event, full_view) = match command {
                SessionCommand::Quit => break,
                SessionCommand::Help => {
                    writeln!(stdout, "{HELP}")?;
                    continue;
                }
                SessionCommand::Show => (None, true),
                SessionCommand::Play(index) => (Some(PlayerEvent::Select(index)), false),
                SessionCommand::Toggle => (Some(PlayerEvent::Toggle), false),
                SessionCommand::Next => (Some(PlayerEvent::Next), false),
                SessionCommand::Previous => (Some(PlayerEvent::Previous), false),
                SessionCommand::Seek(percent) => (Some(PlayerEvent::SeekPercent(percent)), false),
                SessionCommand::Volume(volume) => (Some(PlayerEvent::SetVolume(volume)), false),
                SessionCommand::Mute => (Some(PlayerEvent::ToggleMute), false),
                SessionCommand::Search(query) => (Some(PlayerEvent::Search(query)), true),
                SessionCommand::Delete(_) if !self.player.view().allow_delete => {
                    writeln!(stderr, "Deleting songs is disabled")?;
                    continue;
                }
                SessionCommand::Delete(index) => (Some(PlayerEvent::Delete(index)), true),
                SessionCommand::Reload => (Some(PlayerEvent::Reload), true),
            };

            match event {
                Some(event) => {
                    self.dispatch(event, &mut lines, stdout, stderr).await?;
                }
                None => self.tick(),
            }

            let view = self.player.view();
            if full_view {
                write!(stdout, "{}", printing::player_view(&view)?)?;
            } else {
                write!(stdout, "{}", printing::status(&view)?)?;
            }
        }

        Ok(())
    }

    /// Apply an event, then everything that follows from it, until the player settles.
    ///
    /// Confirmation prompts read their answer from `lines`.
    ///
    /// # Errors
    ///
    /// Fails if a prompt can't be written.
    pub async fn dispatch<W1: fmt::Write + Send, W2: fmt::Write + Send>(
        &mut self,
        event: PlayerEvent,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> anyhow::Result<()> {
        let mut events = VecDeque::from([event]);

        while let Some(event) = events.pop_front() {
            for effect in self.player.update(event) {
                match drive(&mut self.backend, &effect) {
                    Ok(true) => {}
                    Ok(false) => events.extend(self.carry_out(effect, lines, stdout).await?),
                    Err(e) => writeln!(stderr, "Playback error: {e}")?,
                }
            }
        }

        self.tick();
        Ok(())
    }

    /// Bring the player up to date with the clock.
    fn tick(&mut self) {
        self.player.update(PlayerEvent::Tick(self.backend.snapshot()));
    }

    /// The effects the backend can't handle, returns the events they lead to.
    async fn carry_out<W: fmt::Write + Send>(
        &mut self,
        effect: Effect,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        stdout: &mut W,
    ) -> anyhow::Result<Vec<PlayerEvent>> {
        match effect {
            Effect::FetchCatalog => Ok(self.fetch_catalog().await),
            Effect::ConfirmDelete { id, name } => {
                if !confirm(&format!("Delete \"{name}\"?"), lines, stdout)? {
                    return Ok(vec![]);
                }
                match self.client.delete(&id).await {
                    Ok(message) => {
                        writeln!(stdout, "{message}")?;
                        Ok(vec![PlayerEvent::DeleteSucceeded])
                    }
                    Err(e) => Ok(vec![PlayerEvent::DeleteFailed(e.to_string())]),
                }
            }
            _ => Ok(vec![]),
        }
    }

    async fn fetch_catalog(&mut self) -> Vec<PlayerEvent> {
        match self.client.catalog().await {
            Ok(catalog) => {
                let probed = self.probe_durations(&catalog.songs).await;
                let mut events = vec![PlayerEvent::CatalogLoaded {
                    songs: catalog.songs,
                    featured: catalog.featured,
                    recent: catalog.recent,
                }];
                events.extend(probed);
                events
            }
            Err(e) => vec![PlayerEvent::CatalogFailed(e.to_string())],
        }
    }

    /// Download every song we don't know the length of yet and read its length.
    ///
    /// The lengths are registered with the backend, and returned as events for the player.
    async fn probe_durations(&mut self, songs: &[Song]) -> Vec<PlayerEvent> {
        let client = self.client;
        let pending: Vec<(String, String)> = songs
            .iter()
            .filter(|song| self.player.catalog().duration_of(&song.id).is_none())
            .map(|song| (song.id.clone(), self.player.media_url(song)))
            .collect();

        let probes = pending.into_iter().map(|(id, url)| async move {
            let seconds = match client.media_bytes(&url).await {
                Ok(bytes) => probe::duration_of(&bytes),
                Err(e) => {
                    warn!("Could not fetch {url}: {e}");
                    None
                }
            };
            seconds.map(|seconds| (id, url, seconds))
        });

        join_all(probes)
            .await
            .into_iter()
            .flatten()
            .map(|(id, url, seconds)| {
                self.backend.register_duration(url, seconds);
                PlayerEvent::DurationProbed { id, seconds }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::play("play 3", SessionCommand::Play(2))]
    #[case::play_short("p 1", SessionCommand::Play(0))]
    #[case::toggle("toggle", SessionCommand::Toggle)]
    #[case::bare_play("play", SessionCommand::Toggle)]
    #[case::next("next", SessionCommand::Next)]
    #[case::prev("prev", SessionCommand::Previous)]
    #[case::seek("seek 50", SessionCommand::Seek(50.0))]
    #[case::seek_clamped("seek 150", SessionCommand::Seek(100.0))]
    #[case::volume("vol 25", SessionCommand::Volume(0.25))]
    #[case::volume_percent("volume 80%", SessionCommand::Volume(0.8))]
    #[case::mute("mute", SessionCommand::Mute)]
    #[case::search("search Arijit Singh", SessionCommand::Search("Arijit Singh".into()))]
    #[case::search_clear("search", SessionCommand::Search(String::new()))]
    #[case::delete("delete 2", SessionCommand::Delete(1))]
    #[case::reload("reload", SessionCommand::Reload)]
    #[case::show("show", SessionCommand::Show)]
    #[case::help("help", SessionCommand::Help)]
    #[case::quit("quit", SessionCommand::Quit)]
    #[case::padded("  NEXT  ", SessionCommand::Next)]
    fn test_parse_command(#[case] input: &str, #[case] expected: SessionCommand) {
        assert_eq!(input.parse::<SessionCommand>(), Ok(expected));
    }

    #[rstest]
    #[case::zero("play 0")]
    #[case::not_a_number("play one")]
    #[case::seek_nothing("seek")]
    #[case::seek_nan("seek NaN")]
    #[case::delete_nothing("delete")]
    #[case::next_with_arg("next 2")]
    #[case::unknown("dance")]
    fn test_parse_bad_command(#[case] input: &str) {
        assert!(input.parse::<SessionCommand>().is_err());
    }
}

//! Handles displaying the output of the commands in a human readable format.
//!
//! Songs are numbered from 1, those are the numbers the player session takes.

use std::fmt::Write;

use spotlite_core::{
    player::{Icon, PlayerView, RowView, is_absolute_url, resolve_media_url},
    state::catalog::ViewMode,
};
use spotlite_storage::db::schemas::song::Song;

const PROGRESS_BAR_WIDTH: usize = 20;

pub fn song_list(title: &str, songs: &[Song]) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "{title}:")?;
    if songs.is_empty() {
        writeln!(output, "\t(none)")?;
    }
    for (i, song) in songs.iter().enumerate() {
        writeln!(
            output,
            "\t{}: \"{}\" by {} (id: {})",
            i + 1,
            song.song_name,
            song.artist,
            song.id
        )?;
    }

    Ok(output)
}

/// Like [`song_list`], but with where every song's media lives.
///
/// Covers that aren't absolute urls are shown as `placeholder_cover`.
pub fn song_list_long(
    title: &str,
    songs: &[Song],
    server_url: &str,
    placeholder_cover: &str,
) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "{title}:")?;
    if songs.is_empty() {
        writeln!(output, "\t(none)")?;
    }
    for (i, song) in songs.iter().enumerate() {
        writeln!(output, "\t{}: \"{}\" by {}", i + 1, song.song_name, song.artist)?;
        writeln!(output, "\t\tid: {}", song.id)?;
        writeln!(
            output,
            "\t\tsong: {}",
            resolve_media_url(server_url, &song.file_path)
        )?;
        let cover = if is_absolute_url(&song.cover_path) {
            song.cover_path.as_str()
        } else {
            placeholder_cover
        };
        writeln!(output, "\t\tcover: {cover}")?;
    }

    Ok(output)
}

pub fn song(song: &Song) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "Song: \"{}\"", song.song_name)?;
    writeln!(output, "\tid: {}", song.id)?;
    writeln!(output, "\tartist: {}", song.artist)?;
    writeln!(output, "\tfile: {}", song.file_path)?;
    writeln!(output, "\tcover: {}", song.cover_path)?;

    Ok(output)
}

const fn icon(icon: Icon) -> &'static str {
    match icon {
        Icon::Play => "[>]",
        Icon::Pause => "[||]",
    }
}

fn progress_bar(progress: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((progress.clamp(0.0, 100.0) / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

/// The now playing line and the transport controls.
pub fn status(view: &PlayerView) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "{} {}", icon(view.master), view.now_playing)?;
    write!(
        output,
        "\t{} / {} {} {:.0}%",
        view.elapsed,
        view.total,
        progress_bar(view.progress),
        view.progress
    )?;
    #[allow(clippy::cast_possible_truncation)]
    let volume = (view.volume * 100.0).round() as i32;
    if view.muted {
        writeln!(output, "\tvolume: {volume}% (muted)")?;
    } else {
        writeln!(output, "\tvolume: {volume}%")?;
    }

    Ok(output)
}

fn rows(output: &mut String, title: &str, rows: &[RowView]) -> std::fmt::Result {
    writeln!(output, "{title}:")?;
    for row in rows {
        writeln!(
            output,
            "\t{} {}: \"{}\" by {} ({})",
            icon(row.icon),
            row.index + 1,
            row.name,
            row.artist,
            row.duration
        )?;
    }
    Ok(())
}

/// Everything the player shows.
pub fn player_view(view: &PlayerView) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    if let Some(error) = &view.error {
        writeln!(output, "Error: {error}")?;
        return Ok(output);
    }

    match view.mode {
        ViewMode::Home => {
            if !view.featured.is_empty() {
                rows(&mut output, "Featured", &view.featured)?;
            }
            if !view.recent.is_empty() {
                rows(&mut output, "Recently added", &view.recent)?;
            }
            rows(&mut output, "All songs", &view.rows)?;
        }
        ViewMode::Results if view.rows.is_empty() => writeln!(output, "No results")?,
        ViewMode::Results => rows(&mut output, "Results", &view.rows)?,
    }

    output.push_str(&status(view)?);
    if let Some(notice) = &view.notice {
        writeln!(output, "{notice}")?;
    }

    Ok(output)
}

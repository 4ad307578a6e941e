//! Completion candidates for arguments that name songs on the server.

use clap::builder::StyledStr;
use clap_complete::CompletionCandidate;
use spotlite_core::config::{ClientSettings, Settings};
use spotlite_storage::db::schemas::song::Song;

use crate::client::CatalogClient;

/// Song ids, with the name and artist as help.
///
/// The server is found from the configuration file (and environment), there are no flags
/// to go on at completion time.
pub fn complete_song_ids() -> Vec<CompletionCandidate> {
    let server_url = Settings::get_config_path()
        .ok()
        .and_then(|path| Settings::init(path, None, None).ok())
        .map_or_else(
            || ClientSettings::default().server_url,
            |settings| settings.client.server_url,
        );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return vec![];
        }
    };

    match rt.block_on(CatalogClient::new(&server_url).songs()) {
        Ok(songs) => song_candidates(&songs),
        Err(e) => {
            eprintln!("Failed to fetch songs: {e}");
            vec![]
        }
    }
}

fn song_candidates(songs: &[Song]) -> Vec<CompletionCandidate> {
    songs
        .iter()
        .map(|song| {
            CompletionCandidate::new(song.id.clone()).help(Some(StyledStr::from(format!(
                "\"{}\" (by: {})",
                song.song_name, song.artist
            ))))
        })
        .collect()
}

pub mod complete;
pub mod implementations;
pub mod printing;
pub mod session;
pub mod utils;


use std::path::PathBuf;

use clap::{Subcommand, ValueHint};
use clap_complete::ArgValueCandidates;
use spotlite_core::config::ClientSettings;

use crate::client::CatalogClient;
use utils::StdIn;

pub trait CommandHandler {
    type Output;

    async fn handle<W1: std::fmt::Write + Send, W2: std::fmt::Write + Send>(
        &self,
        client: &CatalogClient,
        settings: &ClientSettings,
        stdout: &mut W1,
        stderr: &mut W2,
        stdin: &impl StdIn,
    ) -> Self::Output;
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the server is up
    Ping,
    /// List every song in the catalog, in upload order
    #[clap(alias = "ls")]
    List {
        /// Also show where each song's media lives
        #[clap(long, short)]
        long: bool,
    },
    /// List a random selection of songs
    Featured,
    /// List the most recently uploaded songs, newest first
    Recent,
    /// Find songs by name or artist
    Search {
        /// The search query, matched case-insensitively
        query: String,
    },
    /// Upload a song and its cover image
    Upload {
        /// The audio file
        #[clap(value_hint = ValueHint::FilePath)]
        song: PathBuf,
        /// The cover image
        #[clap(value_hint = ValueHint::FilePath)]
        cover: PathBuf,
        /// The name of the song
        #[clap(long, short)]
        name: String,
        /// Who performs it, "Unknown Artist" if not given
        #[clap(long, short)]
        artist: Option<String>,
    },
    /// Delete a song, its media is cleaned up by the server
    #[clap(alias = "rm")]
    Delete {
        /// The id of the song
        #[clap(add = ArgValueCandidates::new(complete::complete_song_ids))]
        id: String,
        /// Don't ask for confirmation
        #[clap(long, short)]
        yes: bool,
    },
    /// Start an interactive player
    Play,
}

use anyhow::bail;
use spotlite_core::config::ClientSettings;

use super::{
    Command, CommandHandler, printing,
    session::Session,
    utils::{StdIn, confirm},
};
use crate::client::CatalogClient;

impl CommandHandler for Command {
    type Output = anyhow::Result<()>;

    async fn handle<W1: std::fmt::Write + Send, W2: std::fmt::Write + Send>(
        &self,
        client: &CatalogClient,
        settings: &ClientSettings,
        stdout: &mut W1,
        stderr: &mut W2,
        stdin: &impl StdIn,
    ) -> Self::Output {
        match self {
            Self::Ping => {
                let resp = client.ping().await?;
                writeln!(stdout, "Server response:\n{resp}")?;
                Ok(())
            }
            Self::List { long: false } => {
                let songs = client.songs().await?;
                write!(stdout, "{}", printing::song_list("Songs", &songs)?)?;
                Ok(())
            }
            Self::List { long: true } => {
                let songs = client.songs().await?;
                write!(
                    stdout,
                    "{}",
                    printing::song_list_long(
                        "Songs",
                        &songs,
                        client.base_url(),
                        &settings.placeholder_cover
                    )?
                )?;
                Ok(())
            }
            Self::Featured => {
                let songs = client.featured().await?;
                write!(stdout, "{}", printing::song_list("Featured", &songs)?)?;
                Ok(())
            }
            Self::Recent => {
                let songs = client.recent().await?;
                write!(stdout, "{}", printing::song_list("Recently added", &songs)?)?;
                Ok(())
            }
            Self::Search { query } => {
                let songs: Vec<_> = client
                    .songs()
                    .await?
                    .into_iter()
                    .filter(|song| song.matches(query))
                    .collect();
                if songs.is_empty() {
                    writeln!(stdout, "No results")?;
                } else {
                    write!(
                        stdout,
                        "{}",
                        printing::song_list(&format!("Results for \"{query}\""), &songs)?
                    )?;
                }
                Ok(())
            }
            Self::Upload {
                song,
                cover,
                name,
                artist,
            } => {
                let created = client
                    .upload(song, cover, name, artist.as_deref())
                    .await?;
                writeln!(stdout, "Uploaded")?;
                write!(stdout, "{}", printing::song(&created)?)?;
                Ok(())
            }
            Self::Delete { id, yes } => {
                if !settings.allow_delete {
                    bail!("Deleting songs is disabled, set `client.allow_delete` to enable it");
                }

                if !yes {
                    let name = match client.songs().await {
                        Ok(songs) => songs
                            .into_iter()
                            .find(|song| &song.id == id)
                            .map_or_else(|| id.clone(), |song| song.song_name),
                        Err(e) => {
                            writeln!(stderr, "Could not look up the song: {e}")?;
                            id.clone()
                        }
                    };
                    if !confirm(&format!("Delete \"{name}\"?"), &mut stdin.lines(), stdout)? {
                        writeln!(stdout, "Cancelled")?;
                        return Ok(());
                    }
                }

                let resp = client.delete(id).await?;
                writeln!(stdout, "{resp}")?;
                Ok(())
            }
            Self::Play => Session::new(client, settings).run(stdin, stdout, stderr).await,
        }
    }
}

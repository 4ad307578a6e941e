//! Handles the configuration of the daemon and the clients.
//!
//! this module is responsible for parsing the Spotlite.toml file, layering environment variables
//! and cli arguments on top of it.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use std::{fmt, path::PathBuf, str::FromStr};

pub static DEFAULT_CONFIG: &str = include_str!("../Spotlite.toml");

#[derive(Clone, Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Settings {
    /// General Daemon Settings
    #[serde(default)]
    pub daemon: DaemonSettings,
    /// What the catalog endpoints return
    #[serde(default)]
    pub catalog: CatalogSettings,
    /// Where uploaded media goes
    #[serde(default)]
    pub media: MediaSettings,
    /// Settings for the player client
    #[serde(default)]
    pub client: ClientSettings,
}

impl Settings {
    /// Load settings from the config file, environment variables, and CLI arguments.
    ///
    /// The environment variables are prefixed with `SPOTLITE_`, and use `__` to separate
    /// the section from the key (e.g. `SPOTLITE_DAEMON__PORT`).
    ///
    /// # Arguments
    ///
    /// * `config` - path to the config file.
    /// * `port` - overrides the port the daemon listens on.
    /// * `log_level` - overrides the log level.
    ///
    /// # Errors
    ///
    /// This function will return an error if the config file is not found or if the config file is
    /// invalid.
    #[inline]
    pub fn init(
        config: PathBuf,
        port: Option<u16>,
        log_level: Option<log::LevelFilter>,
    ) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(config))
            .add_source(
                Environment::with_prefix("SPOTLITE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        settings.media.public_dir = expand_tilde(&settings.media.public_dir);
        settings.daemon.db_path = settings.daemon.db_path.as_deref().map(expand_tilde);
        settings.media.hosted.fill_from_env();

        if let Some(port) = port {
            settings.daemon.port = port;
        }

        if let Some(log_level) = log_level {
            settings.daemon.log_level = log_level;
        }

        Ok(settings)
    }

    /// Get the (default) path to the config file.
    /// If the config file does not exist at this path, it will be created with the default config.
    ///
    /// See [`crate::get_config_dir`] for more information about where this default path is located.
    ///
    /// # Errors
    ///
    /// This function will return an error if the system config directory (e.g., `~/.config` on linux) could not be found, or if the config file was missing and could not be created.
    #[inline]
    pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
        match crate::get_config_dir() {
            Ok(config_dir) => {
                // if the config directory does not exist, create it
                if !config_dir.exists() {
                    std::fs::create_dir_all(&config_dir)?;
                }
                let config_file = config_dir.join("Spotlite.toml");

                if !config_file.exists() {
                    std::fs::write(&config_file, DEFAULT_CONFIG)?;
                }

                Ok(config_file)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Unable to find the config directory for spotlite.",
                ))
            }
        }
    }
}

fn expand_tilde(path: &std::path::Path) -> PathBuf {
    shellexpand::tilde(&path.to_string_lossy())
        .into_owned()
        .into()
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct DaemonSettings {
    /// The address to listen on.
    /// Default is "127.0.0.1".
    #[serde(default = "default_host")]
    pub host: String,
    /// The port to listen on for HTTP requests.
    /// Default is 3000.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where the database lives, if unset the daemon picks a directory in the platform data dir.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// The largest upload (request body) accepted, in bytes.
    /// Default is 50 MiB.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// What level of logging to use.
    /// Default is "info".
    #[serde(default = "default_log_level")]
    #[serde(deserialize_with = "de_log_level")]
    pub log_level: log::LevelFilter,
}

fn de_log_level<'de, D>(deserializer: D) -> Result<log::LevelFilter, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(log::LevelFilter::from_str(&s).unwrap_or_else(|_| default_log_level()))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

const fn default_log_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

impl Default for DaemonSettings {
    #[inline]
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: None,
            max_upload_bytes: default_max_upload_bytes(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct CatalogSettings {
    /// The (maximum) number of songs returned by the featured endpoint.
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
    /// The number of songs returned by the recent endpoint.
    #[serde(default = "default_recent_count")]
    pub recent_count: usize,
}

const fn default_featured_count() -> usize {
    6
}

const fn default_recent_count() -> usize {
    6
}

impl Default for CatalogSettings {
    #[inline]
    fn default() -> Self {
        Self {
            featured_count: default_featured_count(),
            recent_count: default_recent_count(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackendKind {
    /// Files are written below `public_dir` and served by the daemon.
    #[default]
    Local,
    /// Files are forwarded to a hosted media service.
    Hosted,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MediaSettings {
    #[serde(default)]
    pub backend: MediaBackendKind,
    /// The root of the statically served media, used by the local backend.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Accepted file extensions (lowercase, no dot), empty means anything goes.
    #[serde(default = "default_allowed_formats")]
    pub allowed_formats: Vec<String>,
    #[serde(default)]
    pub hosted: HostedSettings,
}

impl MediaSettings {
    /// Whether a file with the given name may be uploaded.
    #[must_use]
    pub fn allows(&self, file_name: &str) -> bool {
        if self.allowed_formats.is_empty() {
            return true;
        }
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.allowed_formats
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_allowed_formats() -> Vec<String> {
    ["mp3", "jpeg", "png", "jpg"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for MediaSettings {
    #[inline]
    fn default() -> Self {
        Self {
            backend: MediaBackendKind::default(),
            public_dir: default_public_dir(),
            allowed_formats: default_allowed_formats(),
            hosted: HostedSettings::default(),
        }
    }
}

/// Credentials and options for the hosted media backend.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct HostedSettings {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// The folder uploads are grouped under.
    #[serde(default = "default_folder")]
    pub folder: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl HostedSettings {
    /// Fill in missing credentials from the `CLOUDINARY_*` environment variables.
    fn fill_from_env(&mut self) {
        for (field, var) in [
            (&mut self.cloud_name, "CLOUDINARY_CLOUD_NAME"),
            (&mut self.api_key, "CLOUDINARY_API_KEY"),
            (&mut self.api_secret, "CLOUDINARY_API_SECRET"),
        ] {
            if field.is_empty() {
                if let Ok(value) = std::env::var(var) {
                    *field = value;
                }
            }
        }
    }

    /// Whether enough credentials are present to attempt an upload.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !(self.cloud_name.is_empty() || self.api_key.is_empty() || self.api_secret.is_empty())
    }
}

impl fmt::Debug for HostedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedSettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .field("api_base", &self.api_base)
            .finish()
    }
}

fn default_folder() -> String {
    "spotify_songs".to_string()
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

impl Default for HostedSettings {
    #[inline]
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_folder(),
            api_base: default_api_base(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base url of the catalog service.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Whether the player offers deleting songs.
    /// Default is true.
    #[serde(default = "default_allow_delete")]
    pub allow_delete: bool,
    /// Shown in place of covers that aren't absolute urls.
    #[serde(default = "default_placeholder_cover")]
    pub placeholder_cover: String,
}

fn default_server_url() -> String {
    "http://localhost:3000/".to_string()
}

const fn default_allow_delete() -> bool {
    true
}

fn default_placeholder_cover() -> String {
    "https://placehold.co/300x300?text=No+Cover".to_string()
}

impl Default for ClientSettings {
    #[inline]
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            allow_delete: default_allow_delete(),
            placeholder_cover: default_placeholder_cover(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_init_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[daemon]
host = "0.0.0.0"
port = 8080
db_path = "/var/lib/spotlite"
max_upload_bytes = 1024
log_level = "debug"

[catalog]
featured_count = 3
recent_count = 10

[media]
backend = "hosted"
public_dir = "/srv/public"
allowed_formats = ["mp3"]

[media.hosted]
cloud_name = "demo"
api_key = "key"
api_secret = "secret"
folder = "tracks"

[client]
server_url = "https://music.example.com/"
allow_delete = false
            "#,
        )
        .unwrap();

        let expected = Settings {
            daemon: DaemonSettings {
                host: "0.0.0.0".into(),
                port: 8080,
                db_path: Some("/var/lib/spotlite".into()),
                max_upload_bytes: 1024,
                log_level: log::LevelFilter::Debug,
            },
            catalog: CatalogSettings {
                featured_count: 3,
                recent_count: 10,
            },
            media: MediaSettings {
                backend: MediaBackendKind::Hosted,
                public_dir: "/srv/public".into(),
                allowed_formats: vec!["mp3".into()],
                hosted: HostedSettings {
                    cloud_name: "demo".into(),
                    api_key: "key".into(),
                    api_secret: "secret".into(),
                    folder: "tracks".into(),
                    api_base: default_api_base(),
                },
            },
            client: ClientSettings {
                server_url: "https://music.example.com/".into(),
                allow_delete: false,
                placeholder_cover: default_placeholder_cover(),
            },
        };

        let settings = Settings::init(config_path, None, None).unwrap();

        assert_eq!(settings, expected);
    }

    #[test]
    fn test_cli_overrides_win() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[daemon]\nport = 8080\nlog_level = \"warn\"\n").unwrap();

        let settings =
            Settings::init(config_path, Some(9000), Some(log::LevelFilter::Trace)).unwrap();

        assert_eq!(settings.daemon.port, 9000);
        assert_eq!(settings.daemon.log_level, log::LevelFilter::Trace);
    }

    #[test]
    fn test_bad_log_level_falls_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[daemon]\nlog_level = \"loud\"\n").unwrap();

        let settings = Settings::init(config_path, None, None).unwrap();

        assert_eq!(settings.daemon.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn test_default_config_works() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, DEFAULT_CONFIG).unwrap();

        let settings = Settings::init(config_path, None, None);

        assert!(settings.is_ok(), "Error: {:?}", settings.err());
        let settings = settings.unwrap();
        assert_eq!(settings.daemon, DaemonSettings::default());
        assert_eq!(settings.catalog, CatalogSettings::default());
        assert_eq!(settings.client, ClientSettings::default());
        assert_eq!(settings.media.backend, MediaBackendKind::Local);
        assert_eq!(settings.media.allowed_formats, default_allowed_formats());
    }

    #[rstest]
    #[case::mp3("song.mp3", true)]
    #[case::uppercase("COVER.JPG", true)]
    #[case::png("cover.png", true)]
    #[case::wav("song.wav", false)]
    #[case::no_extension("song", false)]
    fn test_media_allows(#[case] file_name: &str, #[case] expected: bool) {
        assert_eq!(MediaSettings::default().allows(file_name), expected);
    }

    #[test]
    fn test_media_allows_anything_when_unrestricted() {
        let settings = MediaSettings {
            allowed_formats: vec![],
            ..Default::default()
        };
        assert!(settings.allows("song.wav"));
        assert!(settings.allows("song"));
    }

    #[test]
    fn test_hosted_debug_redacts_secret() {
        let hosted = HostedSettings {
            api_secret: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{hosted:?}").contains("hunter2"));
    }
}

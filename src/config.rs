//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionConfig,
    /// Transfer settings
    pub transfer: TransferConfig,
    /// Playback settings
    pub playback: PlaybackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            transfer: TransferConfig::default(),
            playback: PlaybackConfig::default(),
        }
    }
}

/// Settings for the FTP connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Path to the credential file (host, user, password, base directory,
    /// one per line)
    pub auth_file: PathBuf,
    /// How many times to retry the login sequence before giving up
    pub login_attempts: u32,
    /// Seconds to wait between login attempts
    pub retry_delay_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            auth_file: PathBuf::from("auth.txt"),
            login_attempts: default_login_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

/// Settings for clip selection and download
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Filename suffix that marks an entry as a downloadable clip
    pub target_suffix: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            target_suffix: ".h264".to_string(),
        }
    }
}

/// Settings for handing downloaded clips to a player
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Command to run for each downloaded clip (the local path is appended
    /// as its single argument). Empty means just print the path.
    pub command: String,
}

fn default_login_attempts() -> u32 {
    5
}

fn default_retry_delay_secs() -> u64 {
    2
}

/// Get the configuration directory path
fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("camfetch"));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("camfetch"))
}

/// Get the config file path
pub fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CAMFETCH_CONFIG") {
        return Some(PathBuf::from(path));
    }
    config_dir().map(|p| p.join("config.toml"))
}

/// Default config file content with comments
fn default_config() -> &'static str {
    r##"# camfetch configuration
# This file is auto-generated. Edit as needed.

[connection]
# Credential file: four lines, in order -- host, username, password,
# base remote directory. Passwords are never stored anywhere else.
auth_file = "auth.txt"

# How many times to retry the login sequence before giving up.
login_attempts = 5

# Seconds to wait between login attempts.
retry_delay_secs = 2

[transfer]
# Entries ending in this suffix are downloaded; everything else is treated
# as a directory to enter.
target_suffix = ".h264"

[playback]
# Command run for each downloaded clip, with the local path appended.
# Leave empty to just print the path.
command = ""
"##
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Self {
        let Some(config_path) = config_file() else {
            eprintln!("Warning: Could not determine config directory");
            return Config::default();
        };

        // Create config directory if it doesn't exist
        if let Some(config_dir) = config_path.parent()
            && !config_dir.exists()
            && let Err(e) = fs::create_dir_all(config_dir)
        {
            eprintln!("Warning: Could not create config directory: {}", e);
            return Config::default();
        }

        // Create default config if it doesn't exist
        if !config_path.exists()
            && let Err(e) = fs::write(&config_path, default_config())
        {
            eprintln!("Warning: Could not create config file: {}", e);
            return Config::default();
        }

        // Read and parse config
        match fs::read_to_string(&config_path) {
            Ok(content) => match toml_edit::de::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Could not parse config file: {}", e);
                    eprintln!("Using default configuration");
                    Config::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Could not read config file: {}", e);
                Config::default()
            }
        }
    }
}

/// Login details for the FTP server, read from the flat credential file
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub base_dir: String,
}

impl Credentials {
    /// Parse a credential file: host, username, password, base remote
    /// directory, one per line.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut lines = content.lines().map(|l| l.trim_end().to_string());

        let mut next_line = |what: &str| {
            lines.next().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("credential file is missing the {} line", what),
                )
            })
        };

        Ok(Self {
            host: next_line("host")?,
            user: next_line("username")?,
            password: next_line("password")?,
            base_dir: next_line("base directory")?,
        })
    }

    /// Server address with the default FTP control port unless the host
    /// already carries one.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            self.host.clone()
        } else {
            format!("{}:21", self.host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config: Config = toml_edit::de::from_str(default_config()).unwrap();
        assert_eq!(config.connection.auth_file, PathBuf::from("auth.txt"));
        assert_eq!(config.connection.login_attempts, 5);
        assert_eq!(config.transfer.target_suffix, ".h264");
        assert!(config.playback.command.is_empty());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            toml_edit::de::from_str("[transfer]\ntarget_suffix = \".mp4\"\n").unwrap();
        assert_eq!(config.transfer.target_suffix, ".mp4");
        assert_eq!(config.connection.login_attempts, 5);
    }

    #[test]
    fn test_credentials_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ftp.example.com").unwrap();
        writeln!(file, "anon").unwrap();
        writeln!(file, "x").unwrap();
        writeln!(file, "/data").unwrap();

        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.host, "ftp.example.com");
        assert_eq!(creds.user, "anon");
        assert_eq!(creds.password, "x");
        assert_eq!(creds.base_dir, "/data");
        assert_eq!(creds.addr(), "ftp.example.com:21");
    }

    #[test]
    fn test_credentials_short_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ftp.example.com").unwrap();
        writeln!(file, "anon").unwrap();

        let err = Credentials::from_file(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_credentials_host_with_port() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ftp.example.com:2121").unwrap();
        writeln!(file, "anon").unwrap();
        writeln!(file, "x").unwrap();
        writeln!(file, "/data").unwrap();

        let creds = Credentials::from_file(file.path()).unwrap();
        assert_eq!(creds.addr(), "ftp.example.com:2121");
    }
}

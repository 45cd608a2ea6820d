//! Video providers for different recording backends
//!
//! Providers abstract the recording archive, allowing the navigator to work
//! with:
//! - An FTP server holding camera-capture archives
//! - A local filesystem mirror of the same layout

#![allow(dead_code)]

mod ftp;
mod local;

pub use ftp::FtpProvider;
pub use local::LocalProvider;

use std::path::PathBuf;

use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
#[allow(dead_code)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Other(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// True for failures an operator can fix by correcting the credential
    /// file while the process keeps running.
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            ProviderError::Auth(_) | ProviderError::PermissionDenied(_)
        )
    }
}

/// Connection state of a provider.
///
/// `NeverConnected` means the initial login never succeeded; `Unreachable`
/// means it did succeed at some point but the last liveness probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    NeverConnected,
    Connected,
    Unreachable,
}

/// Trait for video recording providers
///
/// Implementors expose directory navigation plus clip download over some
/// backing store. All remote paths are provider-relative strings with `/`
/// separators. Recoverable transport failures never escape this surface:
/// they are reported on the console and collapsed into the "nothing
/// happened" return value of each operation.
pub trait VideoProvider {
    /// Probe the connection state
    fn status(&mut self) -> ConnectionStatus;

    /// Two-flag form of [`status`](Self::status): `(never_connected, alive)`.
    ///
    /// `(true, false)` if the provider never connected, `(false, true)` if
    /// the probe succeeded, `(false, false)` if the connection went away.
    fn is_connected(&mut self) -> (bool, bool) {
        match self.status() {
            ConnectionStatus::NeverConnected => (true, false),
            ConnectionStatus::Connected => (false, true),
            ConnectionStatus::Unreachable => (false, false),
        }
    }

    /// List the current working directory, in listing order.
    /// Transport errors downgrade to an empty listing.
    fn list_directory(&mut self) -> Vec<String>;

    /// Current working directory
    fn current_directory(&self) -> String;

    /// Change to `path`; on failure stay in the prior directory and return
    /// false.
    fn change_directory(&mut self, path: &str) -> bool;

    /// Return to the configured base directory
    fn to_home(&mut self);

    /// Open `name`: if it carries the target suffix, download it to a fresh
    /// temp file and return its local path; otherwise treat it as a
    /// subdirectory of the current directory and try to enter it, returning
    /// `None` whether or not that worked.
    fn goto(&mut self, name: &str) -> Option<PathBuf>;

    /// Download the clip after the currently selected one, replacing the
    /// previous temp file. `None` when the current clip is the last one.
    ///
    /// Panics if no clip was ever selected.
    fn next_video(&mut self) -> Option<PathBuf>;

    /// Delete the current temp file, if any. Safe to call repeatedly.
    fn end_video(&mut self);

    /// Release the backing connection
    fn close(&mut self);

    /// Name of the currently selected clip
    fn current_video_name(&self) -> Option<&str>;

    /// Recording date of the current clip, taken from the archive layout
    /// `.../<date>/<session>/`: the name of the parent of the current
    /// working directory.
    fn current_video_date(&self) -> String {
        date_component(&self.current_directory())
    }
}

/// Parent of a `/`-separated remote path. The root is its own parent.
pub fn parent_of(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => "/".to_string(),
    }
}

/// Join a remote directory and an entry name
pub fn join_remote(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), name)
    }
}

/// Name of the parent directory of `path` (the `<date>` component when the
/// working directory is `.../<date>/<session>`).
pub fn date_component(path: &str) -> String {
    let parent = parent_of(path);
    let trimmed = parent.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[idx + 1..].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/data/2024-01-01"), "/data");
        assert_eq!(parent_of("/data"), "/");
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/data/2024-01-01/"), "/data");
    }

    #[test]
    fn test_join_remote() {
        assert_eq!(join_remote("/", "data"), "/data");
        assert_eq!(join_remote("/data", "clip.h264"), "/data/clip.h264");
        assert_eq!(join_remote("/data/", "clip.h264"), "/data/clip.h264");
    }

    #[test]
    fn test_date_component() {
        assert_eq!(date_component("/data/2024-01-01/morning"), "2024-01-01");
        assert_eq!(date_component("/data/morning"), "data");
        assert_eq!(date_component("/data"), "");
        assert_eq!(date_component("/"), "");
    }
}

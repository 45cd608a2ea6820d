//! Local-filesystem video provider
//!
//! Sibling of [`FtpProvider`](super::FtpProvider) sharing the same calling
//! contract, for archives that are already mounted locally. Also what the
//! navigator tests drive, since it needs no server.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::NamedTempFile;

use super::{ConnectionStatus, ProviderResult, VideoProvider};

/// Provider for a recording archive on the local filesystem
pub struct LocalProvider {
    base_dir: PathBuf,
    cwd: PathBuf,
    target_suffix: String,
    current_video: Option<String>,
    download: Option<NamedTempFile>,
    /// True if the base directory existed when the provider was opened
    opened: bool,
}

impl LocalProvider {
    /// Open an archive rooted at `base_dir`. A missing root leaves the
    /// provider in the never-connected state, mirroring a failed login.
    pub fn open(base_dir: impl Into<PathBuf>, target_suffix: impl Into<String>) -> Self {
        let base_dir = base_dir.into();
        let opened = base_dir.is_dir();
        if !opened {
            eprintln!("No such directory: {}", base_dir.display());
        }
        Self {
            cwd: base_dir.clone(),
            base_dir,
            target_suffix: target_suffix.into(),
            current_video: None,
            download: None,
            opened,
        }
    }

    /// Copy `name` from the current directory into a fresh temp file,
    /// making it the current clip
    fn download(&mut self, name: &str) -> ProviderResult<PathBuf> {
        let mut tmp = NamedTempFile::new()?;
        let mut src = fs::File::open(self.cwd.join(name))?;
        io::copy(&mut src, tmp.as_file_mut())?;

        let path = tmp.path().to_path_buf();
        self.current_video = Some(name.to_string());
        self.download = Some(tmp);
        Ok(path)
    }
}

impl VideoProvider for LocalProvider {
    fn status(&mut self) -> ConnectionStatus {
        if !self.opened {
            ConnectionStatus::NeverConnected
        } else if self.base_dir.is_dir() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Unreachable
        }
    }

    fn list_directory(&mut self) -> Vec<String> {
        match fs::read_dir(&self.cwd) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                names.sort();
                names
            }
            Err(e) => {
                warn!("listing {} failed: {}", self.cwd.display(), e);
                eprintln!("File Error: {}", e);
                Vec::new()
            }
        }
    }

    fn current_directory(&self) -> String {
        self.cwd.to_string_lossy().into_owned()
    }

    fn change_directory(&mut self, path: &str) -> bool {
        let target = Path::new(path);
        if target.is_dir() {
            self.cwd = target.to_path_buf();
            true
        } else {
            eprintln!("Invalid Entry");
            false
        }
    }

    fn to_home(&mut self) {
        self.cwd = self.base_dir.clone();
    }

    fn goto(&mut self, name: &str) -> Option<PathBuf> {
        if name.ends_with(&self.target_suffix) {
            match self.download(name) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("copy of {} failed: {}", name, e);
                    eprintln!("File Error: {}", e);
                    None
                }
            }
        } else {
            let target = self.cwd.join(name);
            self.change_directory(&target.to_string_lossy());
            None
        }
    }

    fn next_video(&mut self) -> Option<PathBuf> {
        let current = self
            .current_video
            .clone()
            .expect("next_video called before a clip was selected");

        let list = self.list_directory();
        let idx = list.iter().position(|n| *n == current)?;
        let successor = list.get(idx + 1)?.clone();

        match self.download(&successor) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("copy of {} failed: {}", successor, e);
                eprintln!("File Error: {}", e);
                None
            }
        }
    }

    fn end_video(&mut self) {
        if let Some(file) = self.download.take()
            && let Err(e) = file.close()
        {
            warn!("could not remove temp file: {}", e);
        }
    }

    fn close(&mut self) {
        // Nothing held open beyond the temp file handle
    }

    fn current_video_name(&self) -> Option<&str> {
        self.current_video.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build `<base>/2024-01-01/morning/{clip1,clip2}.h264` plus a stray
    /// text file at the base, the layout of a camera-capture archive.
    fn archive() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("2024-01-01").join("morning");
        fs::create_dir_all(&session).unwrap();
        fs::write(session.join("clip1.h264"), b"first clip").unwrap();
        fs::write(session.join("clip2.h264"), b"second clip").unwrap();
        fs::write(dir.path().join("readme.txt"), b"notes").unwrap();
        dir
    }

    fn open(dir: &tempfile::TempDir) -> LocalProvider {
        LocalProvider::open(dir.path(), ".h264")
    }

    #[test]
    fn test_status_and_flags() {
        let dir = archive();
        let mut provider = open(&dir);
        assert_eq!(provider.status(), ConnectionStatus::Connected);
        assert_eq!(provider.is_connected(), (false, true));

        let mut missing = LocalProvider::open("/no/such/archive", ".h264");
        assert_eq!(missing.status(), ConnectionStatus::NeverConnected);
        assert_eq!(missing.is_connected(), (true, false));
    }

    #[test]
    fn test_list_and_navigate() {
        let dir = archive();
        let mut provider = open(&dir);
        assert_eq!(provider.list_directory(), ["2024-01-01", "readme.txt"]);

        let before = provider.current_directory();
        assert!(!provider.change_directory("/no/such/dir"));
        assert_eq!(provider.current_directory(), before);

        assert!(provider.goto("2024-01-01").is_none());
        assert!(provider.goto("morning").is_none());
        assert_eq!(provider.list_directory(), ["clip1.h264", "clip2.h264"]);

        provider.to_home();
        assert_eq!(provider.current_directory(), before);
    }

    #[test]
    fn test_goto_without_suffix_never_selects() {
        let dir = archive();
        let mut provider = open(&dir);
        assert!(provider.goto("readme.txt").is_none());
        assert!(provider.goto("missing-dir").is_none());
    }

    #[test]
    fn test_goto_downloads_and_keeps_directory() {
        let dir = archive();
        let mut provider = open(&dir);
        provider.goto("2024-01-01");
        provider.goto("morning");
        let in_session = provider.current_directory();

        let path = provider.goto("clip1.h264").expect("clip should download");
        assert_eq!(provider.current_directory(), in_session);
        assert_eq!(provider.current_video_name(), Some("clip1.h264"));
        assert_eq!(provider.current_video_date(), "2024-01-01");
        assert_eq!(fs::read(&path).unwrap(), b"first clip");
    }

    #[test]
    fn test_next_video_walks_the_directory() {
        let dir = archive();
        let mut provider = open(&dir);
        provider.goto("2024-01-01");
        provider.goto("morning");

        let first = provider.goto("clip1.h264").unwrap();
        let second = provider.next_video().expect("clip2 should follow");
        assert_eq!(provider.current_video_name(), Some("clip2.h264"));
        assert_eq!(fs::read(&second).unwrap(), b"second clip");
        // Replacing the handle removed the first download.
        assert!(!first.exists());

        // clip2 is the last entry.
        assert!(provider.next_video().is_none());
        assert_eq!(provider.current_video_name(), Some("clip2.h264"));
        assert!(second.exists());
    }

    #[test]
    fn test_end_video_removes_temp_file() {
        let dir = archive();
        let mut provider = open(&dir);
        provider.goto("2024-01-01");
        provider.goto("morning");
        let path = provider.goto("clip1.h264").unwrap();
        assert!(path.exists());

        provider.end_video();
        assert!(!path.exists());

        // Safe to call again with nothing downloaded.
        provider.end_video();
    }
}

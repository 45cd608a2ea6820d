//! FTP-backed video provider
//!
//! Holds exactly one live FTP control connection and translates navigation
//! and download intents into protocol calls. Raw protocol errors never
//! escape this module: they are printed, logged, and collapsed into the
//! neutral return value of each operation.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use suppaftp::FtpStream;
use suppaftp::types::{FileType, Mode};
use tempfile::NamedTempFile;

use crate::config::{Config, Credentials};

use super::{
    ConnectionStatus, ProviderError, ProviderResult, VideoProvider, join_remote,
};

/// Provider for a remote recording archive reached over FTP
pub struct FtpProvider {
    stream: Option<FtpStream>,
    /// True once a login and base-directory change have succeeded.
    /// Not cleared on transport failure; liveness is reverified by `status`.
    connected: bool,
    base_dir: String,
    cwd: String,
    target_suffix: String,
    current_video: Option<String>,
    download: Option<NamedTempFile>,
}

impl FtpProvider {
    /// Connect using the credential file named in `config`.
    ///
    /// Never returns an error: if the credential file is missing this prints
    /// a message once and gives up, and login failures are retried (with the
    /// file re-read each time, so an operator can fix it) up to the
    /// configured attempt count. Check [`status`](VideoProvider::status) on
    /// the returned provider.
    pub fn connect(config: &Config) -> Self {
        let mut provider = Self {
            stream: None,
            connected: false,
            base_dir: "/".to_string(),
            cwd: "/".to_string(),
            target_suffix: config.transfer.target_suffix.clone(),
            current_video: None,
            download: None,
        };

        let auth_file = &config.connection.auth_file;
        let attempts = config.connection.login_attempts.max(1);
        for attempt in 1..=attempts {
            if !auth_file.exists() {
                eprintln!(
                    "No credential file at {}. Create one with the host, username, password and base directory on separate lines.",
                    auth_file.display()
                );
                break;
            }
            match provider.try_login(auth_file) {
                Ok(()) => break,
                Err(e) if e.is_credential_failure() => {
                    eprintln!(
                        "Connection failure: {}. Check your login credentials in {}.",
                        e,
                        auth_file.display()
                    );
                }
                Err(e) => {
                    eprintln!("Connection failure: {}", e);
                }
            }
            if attempt < attempts {
                thread::sleep(Duration::from_secs(config.connection.retry_delay_secs));
            }
        }

        provider
    }

    /// One full read-credentials / connect / login / enter-base sequence
    fn try_login(&mut self, auth_file: &Path) -> ProviderResult<()> {
        let creds = Credentials::from_file(auth_file).map_err(|e| {
            if e.kind() == io::ErrorKind::InvalidData {
                // Malformed file: treat like bad credentials so the
                // operator gets another attempt after fixing it.
                ProviderError::Auth(e.to_string())
            } else {
                ProviderError::Io(e)
            }
        })?;

        debug!("connecting to {}", creds.addr());
        let mut stream = FtpStream::connect(creds.addr()).map_err(map_ftp_error)?;
        stream.set_mode(Mode::Passive);
        stream
            .login(&creds.user, &creds.password)
            .map_err(map_ftp_error)?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(map_ftp_error)?;
        stream.cwd(&creds.base_dir).map_err(map_ftp_error)?;
        self.cwd = stream.pwd().map_err(map_ftp_error)?;

        self.base_dir = creds.base_dir;
        self.stream = Some(stream);
        self.connected = true;
        debug!("logged in, base directory {}", self.base_dir);
        Ok(())
    }

    fn stream_mut(&mut self) -> ProviderResult<&mut FtpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| ProviderError::Connection("FTP connection closed".to_string()))
    }

    /// Download `name` from the current directory into a fresh temp file,
    /// making it the current clip. The previous temp file, if any, is
    /// removed when its handle is replaced.
    fn download(&mut self, name: &str) -> ProviderResult<PathBuf> {
        let remote = join_remote(&self.cwd, name);
        let mut tmp = NamedTempFile::new()?;

        debug!("retrieving {}", remote);
        let stream = self.stream_mut()?;
        let mut data = stream.retr_as_stream(&remote).map_err(map_ftp_error)?;
        io::copy(&mut data, tmp.as_file_mut())?;
        stream.finalize_retr_stream(data).map_err(map_ftp_error)?;

        let path = tmp.path().to_path_buf();
        self.current_video = Some(name.to_string());
        self.download = Some(tmp);
        Ok(path)
    }
}

impl VideoProvider for FtpProvider {
    fn status(&mut self) -> ConnectionStatus {
        if !self.connected {
            return ConnectionStatus::NeverConnected;
        }
        match self.stream.as_mut().map(|s| s.noop()) {
            Some(Ok(())) => ConnectionStatus::Connected,
            _ => ConnectionStatus::Unreachable,
        }
    }

    fn list_directory(&mut self) -> Vec<String> {
        let result = self
            .stream_mut()
            .and_then(|s| s.nlst(None).map_err(map_ftp_error));
        match result {
            Ok(names) => names,
            Err(e) => {
                warn!("listing failed: {}", e);
                eprintln!("FTP Error: {}", e);
                Vec::new()
            }
        }
    }

    fn current_directory(&self) -> String {
        self.cwd.clone()
    }

    fn change_directory(&mut self, path: &str) -> bool {
        let prior = self.cwd.clone();
        let result = self.stream_mut().and_then(|s| {
            s.cwd(path).map_err(map_ftp_error)?;
            s.pwd().map_err(map_ftp_error)
        });
        match result {
            Ok(pwd) => {
                self.cwd = pwd;
                true
            }
            Err(e) => {
                warn!("cwd {} failed: {}", path, e);
                eprintln!("Invalid Entry");
                // The server may or may not have moved; put it back.
                if let Ok(stream) = self.stream_mut() {
                    let _ = stream.cwd(&prior);
                }
                self.cwd = prior;
                false
            }
        }
    }

    fn to_home(&mut self) {
        let base = self.base_dir.clone();
        self.change_directory(&base);
    }

    fn goto(&mut self, name: &str) -> Option<PathBuf> {
        if name.ends_with(&self.target_suffix) {
            match self.download(name) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("download of {} failed: {}", name, e);
                    eprintln!("FTP Error: {}", e);
                    None
                }
            }
        } else {
            let target = join_remote(&self.cwd, name);
            self.change_directory(&target);
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
                warn!("download of {} failed: {}", successor, e);
                eprintln!("FTP Error: {}", e);
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
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.quit();
        }
    }

    fn current_video_name(&self) -> Option<&str> {
        self.current_video.as_deref()
    }
}

impl Drop for FtpProvider {
    fn drop(&mut self) {
        self.close();
    }
}

/// Convert a suppaftp error to a provider error
fn map_ftp_error(e: suppaftp::FtpError) -> ProviderError {
    match &e {
        suppaftp::FtpError::ConnectionError(e) => ProviderError::Connection(e.to_string()),
        suppaftp::FtpError::UnexpectedResponse(resp) => {
            let code = resp.status.code();
            let body = String::from_utf8_lossy(&resp.body).to_string();
            if code == 530 {
                ProviderError::Auth("Login incorrect".to_string())
            } else if code == 550 {
                ProviderError::NotFound(body)
            } else if code == 553 || code == 451 {
                ProviderError::PermissionDenied(body)
            } else {
                ProviderError::Other(format!("FTP error {}: {}", code, body))
            }
        }
        _ => ProviderError::Other(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn offline_config(auth_file: &Path) -> Config {
        let mut config = Config::default();
        config.connection.auth_file = auth_file.to_path_buf();
        config.connection.login_attempts = 1;
        config.connection.retry_delay_secs = 0;
        config
    }

    #[test]
    fn test_missing_credential_file_never_connects() {
        let dir = tempfile::tempdir().unwrap();
        let config = offline_config(&dir.path().join("auth.txt"));

        let mut provider = FtpProvider::connect(&config);
        assert_eq!(provider.status(), ConnectionStatus::NeverConnected);
        assert_eq!(provider.is_connected(), (true, false));
    }

    #[test]
    fn test_malformed_credential_file_never_connects() {
        let dir = tempfile::tempdir().unwrap();
        let auth = dir.path().join("auth.txt");
        std::fs::write(&auth, "ftp.example.com\nanon\n").unwrap();
        let config = offline_config(&auth);

        let mut provider = FtpProvider::connect(&config);
        assert_eq!(provider.status(), ConnectionStatus::NeverConnected);
    }

    #[test]
    fn test_map_connection_error() {
        let err = suppaftp::FtpError::ConnectionError(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(map_ftp_error(err), ProviderError::Connection(_)));
    }
}

//! camfetch - browse a camera-capture archive over FTP and fetch clips
//!
//! Connects to the FTP server named in the credential file, lets the user
//! walk the date-stamped directory tree, downloads the chosen clip to a
//! temp file and hands it to the configured player (or prints its path),
//! optionally continuing through the rest of the directory.

use std::path::Path;
use std::process::Command;

use log::debug;

mod config;
mod errors;
mod navigator;
mod providers;

use config::Config;
use errors::{AppError, AppResult};
use navigator::Navigator;
use providers::{ConnectionStatus, FtpProvider};

fn main() {
    env_logger::init();

    let config = Config::load();
    println!("Initializing FTP connection");
    let provider = FtpProvider::connect(&config);
    let mut navigator = Navigator::new(provider);

    match navigator.status() {
        ConnectionStatus::Connected => {}
        ConnectionStatus::NeverConnected => {
            eprintln!("No FTP connection could be established. Exiting.");
            std::process::exit(1);
        }
        ConnectionStatus::Unreachable => {
            eprintln!("The FTP server went away after login. Exiting.");
            std::process::exit(1);
        }
    }

    let selected = match navigator.get_downloaded_file() {
        Ok(selected) => selected,
        Err(e) => {
            eprintln!("Input error: {}", e);
            navigator.close();
            std::process::exit(1);
        }
    };

    let Some(mut path) = selected else {
        navigator.close();
        return;
    };

    loop {
        if let Some(name) = navigator.current_video_name() {
            println!(
                "\n{} ({}) -> {}",
                name,
                navigator.current_video_date(),
                path.display()
            );
        }
        if let Err(e) = play(&config, &path) {
            eprintln!("{}", e);
        }
        match navigator.continue_to_next_file() {
            Some(next) => path = next,
            None => break,
        }
    }

    navigator.end_video();
    navigator.close();
}

/// Hand a downloaded clip to the configured player, if any
fn play(config: &Config, path: &Path) -> AppResult<()> {
    let command = config.playback.command.trim();
    if command.is_empty() {
        return Ok(());
    }
    debug!("running player: {} {}", command, path.display());
    let status = Command::new(command)
        .arg(path)
        .status()
        .map_err(|e| AppError::Playback(format!("could not run '{}': {}", command, e)))?;
    if !status.success() {
        return Err(AppError::Playback(format!("player exited with {}", status)));
    }
    Ok(())
}

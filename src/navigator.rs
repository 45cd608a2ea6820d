//! Interactive clip selection loop
//!
//! Drives a [`VideoProvider`] from console input: prints the current
//! directory as a fixed-width grid, accepts directory names, clip names and
//! the `base` / `up` / `quit` keywords, and hands back the local path of
//! the downloaded clip. Owns no protocol knowledge beyond what the provider
//! trait exposes.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::providers::{ConnectionStatus, VideoProvider, parent_of};

/// Interactive driver over a video provider
pub struct Navigator<P: VideoProvider> {
    provider: P,
    /// Whether the user opted in to fetching subsequent clips automatically
    continue_to_next: bool,
}

impl<P: VideoProvider> Navigator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            continue_to_next: false,
        }
    }

    /// Run the selection loop on stdin/stdout until a clip is downloaded or
    /// the user quits. Returns the local path of the clip, or `None` on
    /// quit.
    pub fn get_downloaded_file(&mut self) -> io::Result<Option<PathBuf>> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        self.run(&mut input, &mut out)
    }

    fn run(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<Option<PathBuf>> {
        let selected = loop {
            writeln!(out, "Current Directory: {}", self.provider.current_directory())?;
            writeln!(out, "Current Directory Contains: ")?;
            write_listing(out, &self.provider.list_directory())?;
            write!(
                out,
                "Enter: \n-The item you want to open\n-The directory to navigate to\n-'up' to go up a directory\n-'base' to return to the home directory\n-'quit' to quit\n > "
            )?;
            out.flush()?;

            let Some(line) = read_line(input)? else {
                break None;
            };
            let entry = line.trim();
            match entry.to_lowercase().as_str() {
                "base" => self.provider.to_home(),
                "up" => {
                    let parent = parent_of(&self.provider.current_directory());
                    self.provider.change_directory(&parent);
                }
                "quit" => break None,
                _ => {
                    // A failed navigation just lands back on the listing.
                    if let Some(path) = self.provider.goto(entry) {
                        break Some(path);
                    }
                }
            }
        };

        match selected {
            Some(path) => {
                self.continue_to_next = self.prompt_continuation(input, out)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Ask whether playback should continue through the rest of the
    /// directory, re-prompting until the answer is y or n.
    fn prompt_continuation(
        &mut self,
        input: &mut impl BufRead,
        out: &mut impl Write,
    ) -> io::Result<bool> {
        loop {
            write!(out, "\nPlay every video after this one automatically? (y/n)\n > ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(false);
            };
            match line.trim().to_lowercase().as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => writeln!(out, "Invalid Entry")?,
            }
        }
    }

    /// Fetch the next clip in the directory, if the user opted in and one
    /// exists
    pub fn continue_to_next_file(&mut self) -> Option<PathBuf> {
        if self.continue_to_next {
            self.provider.next_video()
        } else {
            None
        }
    }

    pub fn status(&mut self) -> ConnectionStatus {
        self.provider.status()
    }

    #[allow(dead_code)]
    pub fn is_connected(&mut self) -> (bool, bool) {
        self.provider.is_connected()
    }

    pub fn end_video(&mut self) {
        self.provider.end_video();
    }

    pub fn close(&mut self) {
        self.provider.close();
    }

    pub fn current_video_name(&self) -> Option<&str> {
        self.provider.current_video_name()
    }

    pub fn current_video_date(&self) -> String {
        self.provider.current_video_date()
    }
}

/// Print entries four to a row, each truncated and padded to 20 columns,
/// between two rule lines
fn write_listing(out: &mut impl Write, entries: &[String]) -> io::Result<()> {
    writeln!(out, "{0:_<20}\t{0:_<20}\t{0:_<20}\t{0:_<20}", "")?;
    for (i, name) in entries.iter().enumerate() {
        write!(out, "{:<20.20}\t", name)?;
        if (i + 1) % 4 == 0 {
            writeln!(out)?;
        }
    }
    if entries.len() % 4 != 0 {
        writeln!(out)?;
    }
    writeln!(out, "{0:_<20}\t{0:_<20}\t{0:_<20}\t{0:_<20}", "")?;
    Ok(())
}

/// One line of input; `None` on end of input
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf))
}

//! Stdin command language
//!
//! Each input line is one command. Most map directly onto a playback
//! [`Intent`]; the rest query the session or edit the library.

use crate::error::{CliError, Result};
use std::time::Duration;
use tensai_core::{PlaylistId, TrackId};
use tensai_playback::Intent;

pub const HELP: &str = "\
commands:
  play <track>          play a library item now (library queued after it)
  playlist <playlist>   replace the queue with a playlist
  toggle | p            play/pause
  resume | pause        play or pause
  next | n, prev | b    skip forward/back
  seek <m:ss|secs>      seek to a position
  seekp <0-100>         seek to a percentage
  vol <0-1>             set volume
  shuffle, repeat       toggle modes
  add <track>           append a track to the queue
  addlist <playlist>    append a playlist to the queue
  rm <index>            remove a queue slot
  select <index>        play a queue slot
  clear                 keep only the playing item
  autoplay on|off       advance when a track ends
  status, queue, history, library, playlists
  delete <track>        delete a library item
  rename <track> <name> rename a library item
  mkpl <name>           create a playlist
  rmpl <playlist>       delete a playlist
  pladd <playlist> <track>
  plrm <playlist> <track>
  reset                 clear the library, playlists and settings
  help, quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Intent(Intent),
    Status,
    Queue,
    History,
    Library,
    Playlists,
    DeleteTrack(TrackId),
    RenameTrack(TrackId, String),
    CreatePlaylist(String),
    DeletePlaylist(PlaylistId),
    AddToPlaylist(PlaylistId, TrackId),
    RemoveFromPlaylist(PlaylistId, TrackId),
    Reset,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some((word, rest)) = split_word(line) else {
            return Ok(None);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "play" => intent(Intent::PlayTrack(TrackId::new(required(word, rest)?))),
            "playlist" => intent(Intent::PlayPlaylist(PlaylistId::new(required(word, rest)?))),
            "toggle" | "p" => intent(Intent::TogglePlayPause),
            "resume" => intent(Intent::Play),
            "pause" => intent(Intent::Pause),
            "next" | "n" => intent(Intent::Next),
            "prev" | "previous" | "b" => intent(Intent::Previous),
            "seek" => intent(Intent::Seek(parse_time(word, required(word, rest)?)?)),
            "seekp" => {
                let percent: f64 = parse_number(word, required(word, rest)?)?;
                intent(Intent::SeekPercent(percent / 100.0))
            }
            "vol" | "volume" => intent(Intent::SetVolume(parse_number(word, required(word, rest)?)?)),
            "shuffle" => intent(Intent::ToggleShuffle),
            "repeat" => intent(Intent::ToggleRepeat),
            "add" => intent(Intent::AddToQueue(TrackId::new(required(word, rest)?))),
            "addlist" => intent(Intent::QueuePlaylist(PlaylistId::new(required(word, rest)?))),
            "rm" | "remove" => intent(Intent::RemoveFromQueue(parse_number(word, required(word, rest)?)?)),
            "select" => intent(Intent::SelectQueueIndex(parse_number(word, required(word, rest)?)?)),
            "clear" => intent(Intent::ClearQueue),
            "autoplay" => intent(Intent::SetAutoPlayNext(parse_switch(word, required(word, rest)?)?)),
            "status" => Command::Status,
            "queue" | "q" => Command::Queue,
            "history" => Command::History,
            "library" | "ls" => Command::Library,
            "playlists" => Command::Playlists,
            "delete" => Command::DeleteTrack(TrackId::new(required(word, rest)?)),
            "mkpl" => Command::CreatePlaylist(required(word, rest)?.to_string()),
            "rmpl" => Command::DeletePlaylist(PlaylistId::new(required(word, rest)?)),
            "rename" => {
                let (track, name) = pair(word, rest, "expected <track> <name>")?;
                Command::RenameTrack(TrackId::new(track), name.to_string())
            }
            "pladd" => {
                let (playlist, track) = pair(word, rest, "expected <playlist> <track>")?;
                Command::AddToPlaylist(PlaylistId::new(playlist), TrackId::new(track))
            }
            "plrm" => {
                let (playlist, track) = pair(word, rest, "expected <playlist> <track>")?;
                Command::RemoveFromPlaylist(PlaylistId::new(playlist), TrackId::new(track))
            }
            "reset" => Command::Reset,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(CliError::UnknownCommand(word.to_string())),
        };

        Ok(Some(command))
    }
}

fn intent(intent: Intent) -> Command {
    Command::Intent(intent)
}

fn split_word(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((line, "")),
    }
}

/// Two arguments: a first word and the rest of the line
fn pair<'a>(command: &str, rest: &'a str, usage: &str) -> Result<(&'a str, &'a str)> {
    split_word(required(command, rest)?)
        .filter(|(_, second)| !second.is_empty())
        .ok_or_else(|| CliError::invalid_argument(command, usage))
}

fn required<'a>(command: &str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(CliError::invalid_argument(command, "missing argument"))
    } else {
        Ok(rest)
    }
}

fn parse_number<T: std::str::FromStr>(command: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::invalid_argument(command, format!("not a number: {value}")))
}

fn parse_switch(command: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CliError::invalid_argument(command, "expected on or off")),
    }
}

/// `m:ss` or plain seconds
fn parse_time(command: &str, value: &str) -> Result<Duration> {
    let secs = match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = parse_number(command, minutes)?;
            let seconds: f64 = parse_number(command, seconds)?;
            minutes as f64 * 60.0 + seconds
        }
        None => parse_number(command, value)?,
    };

    if secs < 0.0 {
        return Err(CliError::invalid_argument(command, "time must be positive"));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| CliError::invalid_argument(command, "time out of range"))
}

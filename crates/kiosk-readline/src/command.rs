//! REPL command parsing.
//!
//! Plain text stands in for a spoken transcript; slash commands drive the
//! rest of the kiosk screen.

use std::str::FromStr;

use kiosk_core::Position;
use kiosk_core::place::Category;
use kiosk_core::session::AppMode;

pub const COMMANDS: [&str; 13] = [
    "/start", "/stop", "/mode", "/source", "/target", "/languages", "/discover", "/select", "/close", "/move",
    "/status", "/reset", "/help",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start and immediately stop with this transcript.
    Say(String),
    Start,
    /// Stop with the transcript captured so far (possibly blank).
    Stop(String),
    Mode(AppMode),
    SourceLanguage(String),
    TargetLanguage(String),
    Languages,
    Discover(Category),
    /// One-based index into the open discovery list.
    Select(usize),
    /// Closes the directions overlay, or the discovery overlay if no
    /// directions are shown.
    Close,
    Move(Position),
    Status,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

fn usage(text: &str) -> ParseError {
    ParseError(format!("usage: {text}"))
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Say(line.to_string()));
        }

        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match name {
            "/start" => Ok(Command::Start),
            "/stop" => Ok(Command::Stop(rest.to_string())),
            "/mode" => match rest.to_ascii_lowercase().as_str() {
                "kiosk" => Ok(Command::Mode(AppMode::Kiosk)),
                "conversation" | "translate" => Ok(Command::Mode(AppMode::Conversation)),
                _ => Err(usage("/mode kiosk|conversation")),
            },
            "/source" if !rest.is_empty() => Ok(Command::SourceLanguage(rest.to_string())),
            "/source" => Err(usage("/source <code>, e.g. /source en-IN")),
            "/target" if !rest.is_empty() => Ok(Command::TargetLanguage(rest.to_string())),
            "/target" => Err(usage("/target <code>, e.g. /target hi-IN")),
            "/languages" => Ok(Command::Languages),
            "/discover" => Category::from_str(rest)
                .map(Command::Discover)
                .map_err(|_| usage("/discover medical|police|restaurant")),
            "/select" => match rest.parse::<usize>() {
                Ok(index) if index >= 1 => Ok(Command::Select(index)),
                _ => Err(usage("/select <number from the list>")),
            },
            "/close" => Ok(Command::Close),
            "/move" => parse_position(rest)
                .map(Command::Move)
                .ok_or_else(|| usage("/move <lat> <lng>")),
            "/status" => Ok(Command::Status),
            "/reset" => Ok(Command::Reset),
            "/help" => Ok(Command::Help),
            other => Err(ParseError(format!("unknown command {other}, try /help"))),
        }
    }
}

fn parse_position(text: &str) -> Option<Position> {
    let mut parts = text.split(|c: char| c == ',' || c.is_whitespace()).filter(|p| !p.is_empty());
    let lat: f64 = parts.next()?.parse().ok()?;
    let lng: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return None;
    }
    Some(Position::new(lat, lng))
}

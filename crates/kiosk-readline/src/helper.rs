use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use kiosk_core::place::Category;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::command::COMMANDS;

/// Completion, highlighting and hints for slash commands.
#[derive(Clone, Default)]
pub struct KioskHelper;

impl KioskHelper {
    fn candidates(line: &str) -> Vec<String> {
        if let Some(partial) = line.strip_prefix("/discover ") {
            return Category::ALL
                .iter()
                .map(|category| format!("/discover {}", category.slug()))
                .filter(|candidate| candidate["/discover ".len()..].starts_with(partial.trim_start()))
                .collect();
        }
        if line.contains(' ') {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .filter(|command| command.starts_with(line))
            .map(|command| command.to_string())
            .collect()
    }
}

impl Helper for KioskHelper {}

impl Completer for KioskHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = Self::candidates(line)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for KioskHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for KioskHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return None;
        }

        Self::candidates(line)
            .into_iter()
            .find(|candidate| candidate.len() > line.len())
            .map(|candidate| candidate[line.len()..].to_string())
    }
}

impl Validator for KioskHelper {}

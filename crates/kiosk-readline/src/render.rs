//! Terminal rendering of the kiosk screen.

use colored::Colorize;
use kiosk_application::{DiscoveryStatus, DiscoveryView, InteractionSnapshot};
use kiosk_core::directions::{DirectionsRequest, MapCollaborator};
use kiosk_core::place::{Category, Place};
use kiosk_core::session::{InteractionState, LANGUAGES, Message, MessageRole};

pub const READY_LABEL: &str = "Ready to View";
pub const SYNCING_LABEL: &str = "Syncing...";

pub fn banner(kiosk_name: &str) {
    println!("{}", format!("=== {kiosk_name} ===").bright_magenta().bold());
    println!(
        "{}",
        "Type a question to ask the kiosk, '/help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();
}

pub fn help() {
    let rows = [
        ("<text>", "ask the kiosk (start and stop in one go)"),
        ("/start, /stop [text]", "record, then submit the transcript"),
        ("/mode kiosk|conversation", "switch between assistance and translation"),
        ("/source <code>, /target <code>", "change capture or translation language"),
        ("/languages", "list supported languages"),
        ("/discover medical|police|restaurant", "open a nearby category"),
        ("/select <n>", "route to a place from the open list"),
        ("/close", "close directions, then the discovery list"),
        ("/move <lat> <lng>", "report a new device position"),
        ("/status", "show location and category readiness"),
        ("/reset", "clear the conversation"),
    ];
    for (usage, what) in rows {
        println!("  {:<38} {}", usage.bright_cyan(), what.bright_black());
    }
}

pub fn languages(source: &str, target: &str) {
    for language in &LANGUAGES {
        let marker = match (language.code == source, language.code == target) {
            (true, _) => " (source)",
            (_, true) => " (target)",
            _ => "",
        };
        println!("  {:<6} {}{}", language.code.bright_cyan(), language.name, marker.bright_black());
    }
}

/// The compact state line printed after each interaction step.
pub fn state_line(snapshot: &InteractionSnapshot) -> String {
    format!(
        "[{} | {} | {} -> {}]",
        snapshot.state, snapshot.mode, snapshot.source_language.code, snapshot.target_language.code
    )
}

pub fn state(snapshot: &InteractionSnapshot) {
    let line = state_line(snapshot);
    match snapshot.state {
        InteractionState::Error => println!("{}", line.red()),
        InteractionState::Recording => println!("{}", line.yellow()),
        _ => println!("{}", line.bright_black()),
    }
    if let Some(error) = &snapshot.error {
        println!("{}", error.red());
    }
}

pub fn message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}", format!("> {}", message.text).green()),
        MessageRole::Assistant => {
            for line in message.text.lines() {
                println!("{}", line.bright_blue());
            }
            if let Some(translated) = &message.translated_text {
                for line in translated.lines() {
                    println!("{}", line.bright_magenta());
                }
            }
        }
    }
}

pub fn readiness_label(ready: bool) -> &'static str {
    if ready { READY_LABEL } else { SYNCING_LABEL }
}

pub fn category_status(category: Category, ready: bool) {
    let label = readiness_label(ready);
    let label = if ready { label.green() } else { label.yellow() };
    println!("  {} {:<10} {}", category.icon(), category.label(), label);
}

pub fn place_line(index: usize, place: &Place) -> String {
    let rating = place.rating.map(|r| format!(" ★{r:.1}")).unwrap_or_default();
    format!("{:>2}. {}{} - {}", index + 1, place.name, rating, place.address)
}

pub fn discovery(view: &DiscoveryView) {
    println!(
        "{}",
        format!("{} {}", view.category.icon(), view.category.label()).bright_yellow().bold()
    );
    match &view.status {
        DiscoveryStatus::Ready => {
            for (index, place) in view.places.iter().enumerate() {
                println!("{}", place_line(index, place));
            }
            println!("{}", "Use /select <n> for directions.".bright_black());
        }
        DiscoveryStatus::Empty => println!("{}", format!("No {} found nearby.", view.category.query_noun()).yellow()),
        DiscoveryStatus::Failed(message) => println!("{}", message.red()),
    }
}

/// Prints routes instead of drawing them.
pub struct TerminalMap;

impl TerminalMap {
    pub fn describe(request: &DirectionsRequest) -> Vec<String> {
        let mut lines = vec![
            format!("{} {}", request.to.icon, request.to.title),
            request.to.description.clone(),
            format!("From {} to {}", request.from, request.to.coords()),
            format!("About {} min on foot", request.walking_minutes()),
        ];
        if let Some(helpline) = request.to.helpline {
            lines.push(format!("Helpline: {helpline}"));
        }
        lines.push(request.external_maps_url());
        lines
    }
}

impl MapCollaborator for TerminalMap {
    fn show_route(&self, request: &DirectionsRequest) {
        let mut lines = Self::describe(request).into_iter();
        if let Some(title) = lines.next() {
            println!("{}", title.bright_yellow().bold());
        }
        for line in lines {
            println!("  {}", line.bright_white());
        }
    }
}

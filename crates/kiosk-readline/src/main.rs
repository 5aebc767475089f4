//! Terminal host for the transit kiosk.
//!
//! Typed lines stand in for speech capture and `/move` stands in for the
//! device geolocation; everything else runs through the same session the
//! kiosk screen would use.

mod command;
mod helper;
mod position_feed;
mod render;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use kiosk_application::{KioskServices, KioskSession, SweepReport};
use kiosk_core::answerer::Answerer;
use kiosk_core::directions::MapCollaborator;
use kiosk_core::place::Category;
use kiosk_core::secret::SecretService;
use kiosk_infrastructure::{ConfigService, KioskPaths, SecretServiceImpl, init_file_logging};
use kiosk_interaction::GeminiApiAgent;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::mpsc;

use crate::command::Command;
use crate::helper::KioskHelper;
use crate::position_feed::ManualPositionSource;
use crate::render::TerminalMap;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // ===== Bootstrap =====
    let paths = KioskPaths::new(None)?;
    let _log_guard = init_file_logging(&paths.logs_dir())?;

    let config_service = ConfigService::new(&paths);
    let config = config_service.ensure_exists()?;
    let secret_service = SecretServiceImpl::new(&paths);
    let gemini = match secret_service.load_secrets().await {
        Ok(secrets) => secrets.gemini,
        Err(e) => {
            let template = paths.ensure_secret_file()?;
            tracing::warn!("[Bootstrap] {}", e);
            return Err(anyhow!(
                "no Gemini API key; set {} or fill in {}",
                kiosk_infrastructure::GEMINI_API_KEY_ENV,
                template.display()
            ));
        }
    }
    .context("secret.json has no gemini section")?;

    let mut models = config.models.clone();
    if let Some(model_name) = gemini.model_name.filter(|name| !name.trim().is_empty()) {
        tracing::info!("[Bootstrap] grounded model overridden to {}", model_name);
        models.grounded = model_name;
    }

    let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let answerer: Arc<dyn Answerer> = Arc::new(GeminiApiAgent::new(gemini.api_key, &models).with_client(client));

    let positions = Arc::new(ManualPositionSource::new(config.kiosk.position()));
    let services = KioskServices::from_answerer(answerer, positions.clone(), &config.discovery);
    let session = KioskSession::new(&config, services)?;

    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<SweepReport>();
    session.start_tracking(Some(report_tx));

    let report_handler = tokio::spawn(async move {
        while let Some(report) = report_rx.recv().await {
            println!(
                "{}",
                format!(
                    "Nearby places refreshed at {} ({}/{} categories)",
                    report.position,
                    report.stored_count(),
                    Category::ALL.len()
                )
                .bright_black()
            );
        }
    });

    // ===== REPL =====
    let mut rl: Editor<KioskHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(KioskHelper));

    render::banner(&config.kiosk.name);
    let map = TerminalMap;

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    Ok(command) => handle(command, &session, &positions, &config_service, &map).await,
                    Err(e) => println!("{}", e.to_string().yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    session.stop_tracking();
    report_handler.abort();

    Ok(())
}

async fn handle(
    command: Command,
    session: &KioskSession,
    positions: &ManualPositionSource,
    config: &ConfigService,
    map: &dyn MapCollaborator,
) {
    let orchestrator = session.orchestrator();

    match command {
        Command::Say(transcript) => {
            if let Err(e) = orchestrator.start() {
                println!("{}", e.to_string().yellow());
                return;
            }
            submit(session, &transcript).await;
        }
        Command::Start => match orchestrator.start() {
            Ok(()) => render::state(&session.snapshot()),
            Err(e) => println!("{}", e.to_string().yellow()),
        },
        Command::Stop(transcript) => submit(session, &transcript).await,
        Command::Mode(mode) => {
            orchestrator.set_mode(mode);
            render::state(&session.snapshot());
        }
        Command::SourceLanguage(code) => {
            let result = orchestrator
                .set_source_language(&code)
                .and_then(|()| config.save_source_language(&code).map(|_| ()));
            report(result, session);
        }
        Command::TargetLanguage(code) => {
            let result = orchestrator
                .set_target_language(&code)
                .and_then(|()| config.save_target_language(&code).map(|_| ()));
            report(result, session);
        }
        Command::Languages => {
            let snapshot = session.snapshot();
            render::languages(snapshot.source_language.code, snapshot.target_language.code);
        }
        Command::Discover(category) => {
            if !session.category_ready(category).await {
                println!("{}", render::SYNCING_LABEL.yellow());
            }
            let view = session.open_category(category).await;
            render::discovery(&view);
        }
        Command::Select(index) => {
            let place = session
                .snapshot()
                .discovery
                .and_then(|view| view.places.get(index - 1).cloned());
            match place {
                Some(place) => map.show_route(&session.select_place(&place)),
                None => println!("{}", "No such place in the open list; try /discover first.".yellow()),
            }
        }
        Command::Close => {
            let snapshot = session.snapshot();
            if snapshot.selection.is_some() {
                session.close_directions();
                println!("{}", "Directions closed.".bright_black());
            } else if snapshot.discovery.is_some() {
                session.close_discovery();
                println!("{}", "Discovery closed.".bright_black());
            } else {
                println!("{}", "Nothing to close.".bright_black());
            }
        }
        Command::Move(position) => {
            if positions.push(position) {
                println!("{}", format!("Position reported: {position}").bright_black());
            } else {
                println!("{}", "Tracking is not running.".yellow());
            }
        }
        Command::Status => {
            println!("{} {}", "Area:".bright_white(), session.area_label());
            println!("{} {}", "Position:".bright_white(), session.position());
            let tracking = if session.is_tracking() { "on" } else { "off" };
            println!("{} {}", "Tracking:".bright_white(), tracking);
            for category in Category::ALL {
                render::category_status(category, session.category_ready(category).await);
            }
            render::state(&session.snapshot());
        }
        Command::Reset => {
            session.reset();
            render::state(&session.snapshot());
        }
        Command::Help => render::help(),
        Command::Quit => {}
    }
}

/// Stops the recording with `transcript` and prints whatever it added.
async fn submit(session: &KioskSession, transcript: &str) {
    let before = session.snapshot().messages.len();
    if let Err(e) = session.orchestrator().stop(transcript).await {
        println!("{}", e.to_string().yellow());
        return;
    }

    let snapshot = session.snapshot();
    for message in snapshot.messages.iter().skip(before) {
        render::message(message);
    }
    render::state(&snapshot);
}

fn report(result: kiosk_core::Result<()>, session: &KioskSession) {
    match result {
        Ok(()) => render::state(&session.snapshot()),
        Err(e) => println!("{}", e.to_string().yellow()),
    }
}

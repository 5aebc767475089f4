//! Voice interaction lifecycle.
//!
//! The orchestrator owns the interaction state, the message log and the
//! overlay selections. State sits behind a synchronous mutex that is never
//! held across an await; every async step re-checks the session epoch so a
//! reset or a new recording invalidates work started before it.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use kiosk_core::answerer::Answerer;
use kiosk_core::directions::EmergencyInfo;
use kiosk_core::place::AreaLabel;
use kiosk_core::session::{
    AppMode, DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE, InteractionState, LANGUAGES, Language, Message,
    MessageLog, find_language,
};
use kiosk_core::{KioskError, Position, Result};
use kiosk_interaction::PromptPresets;
use serde::Serialize;
use tokio::sync::watch;

use crate::discovery::DiscoveryView;

/// Shown when the answerer returns no text.
pub const EMPTY_ANSWER_TEXT: &str = "Scanning...";

/// Shown while in the `Error` state.
pub const ANSWER_FAILED_MESSAGE: &str = "Assistance is unavailable right now. Please try again.";

pub const DEFAULT_AUTO_IDLE: Duration = Duration::from_secs(5);

/// Read-only view of the orchestrator for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionSnapshot {
    pub state: InteractionState,
    pub mode: AppMode,
    pub messages: Vec<Message>,
    pub error: Option<String>,
    pub discovery: Option<DiscoveryView>,
    pub selection: Option<EmergencyInfo>,
    pub source_language: Language,
    pub target_language: Language,
}

struct Inner {
    state: InteractionState,
    mode: AppMode,
    messages: MessageLog,
    error: Option<String>,
    discovery: Option<DiscoveryView>,
    selection: Option<EmergencyInfo>,
    source_language: &'static Language,
    target_language: &'static Language,
    epoch: u64,
    overlay_epoch: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            mode: AppMode::Kiosk,
            messages: MessageLog::new(),
            error: None,
            discovery: None,
            selection: None,
            source_language: find_language(DEFAULT_SOURCE_LANGUAGE).unwrap_or(&LANGUAGES[0]),
            target_language: find_language(DEFAULT_TARGET_LANGUAGE).unwrap_or(&LANGUAGES[1]),
            epoch: 0,
            overlay_epoch: 0,
        }
    }
}

pub struct InteractionOrchestrator {
    inner: Arc<Mutex<Inner>>,
    answerer: Arc<dyn Answerer>,
    presets: PromptPresets,
    position: watch::Receiver<Position>,
    area: watch::Receiver<AreaLabel>,
    auto_idle: Duration,
}

impl InteractionOrchestrator {
    pub fn new(
        answerer: Arc<dyn Answerer>,
        presets: PromptPresets,
        position: watch::Receiver<Position>,
        area: watch::Receiver<AreaLabel>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new())),
            answerer,
            presets,
            position,
            area,
            auto_idle: DEFAULT_AUTO_IDLE,
        }
    }

    pub fn with_auto_idle(mut self, auto_idle: Duration) -> Self {
        self.auto_idle = auto_idle;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    pub fn state(&self) -> InteractionState {
        self.lock().state
    }

    pub fn mode(&self) -> AppMode {
        self.lock().mode
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        let inner = self.lock();
        InteractionSnapshot {
            state: inner.state,
            mode: inner.mode,
            messages: inner.messages.as_slice().to_vec(),
            error: inner.error.clone(),
            discovery: inner.discovery.clone(),
            selection: inner.selection.clone(),
            source_language: *inner.source_language,
            target_language: *inner.target_language,
        }
    }

    /// Begins recording. Clears a previous error.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.lock();
        if !inner.state.can_start() {
            return Err(KioskError::invalid_transition("start", inner.state));
        }
        inner.epoch += 1;
        inner.error = None;
        inner.state = InteractionState::Recording;
        tracing::debug!("[Orchestrator] recording {}", inner.source_language.code);
        Ok(())
    }

    /// Ends recording with the captured transcript and waits for the answer.
    ///
    /// A blank transcript returns to `Idle` without a request. Answerer
    /// failures are reported through the `Error` state, not as `Err`.
    pub async fn stop(&self, transcript: &str) -> Result<InteractionState> {
        let transcript = transcript.trim();

        let (epoch, mode, target) = {
            let mut inner = self.lock();
            if inner.state != InteractionState::Recording {
                return Err(KioskError::invalid_transition("stop", inner.state));
            }
            if transcript.is_empty() {
                inner.state = InteractionState::Idle;
                return Ok(InteractionState::Idle);
            }
            inner.state = InteractionState::Processing;
            (inner.epoch, inner.mode, inner.target_language)
        };

        let outcome = self.answer(transcript, mode, target).await;

        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::info!("[Orchestrator] discarding answer from a superseded session");
            return Ok(inner.state);
        }

        match outcome {
            Ok(text) => {
                let text = if text.trim().is_empty() {
                    EMPTY_ANSWER_TEXT.to_string()
                } else {
                    text
                };
                let reply = match mode {
                    AppMode::Kiosk => Message::assistant(text),
                    AppMode::Conversation => Message::assistant(text.clone()).with_translation(text),
                };
                inner.messages.push(Message::user(transcript));
                inner.messages.push(reply);
                inner.state = InteractionState::Responding;
                drop(inner);
                self.schedule_auto_idle(epoch);
                Ok(InteractionState::Responding)
            }
            Err(e) => {
                tracing::error!("[Orchestrator] answer failed: {}", e);
                inner.error = Some(ANSWER_FAILED_MESSAGE.to_string());
                inner.state = InteractionState::Error;
                Ok(InteractionState::Error)
            }
        }
    }

    async fn answer(&self, transcript: &str, mode: AppMode, target: &'static Language) -> Result<String> {
        let request = match mode {
            AppMode::Kiosk => {
                let area = self.area.borrow().clone();
                let position = *self.position.borrow();
                self.presets.assistance_request(transcript, &area, position)?
            }
            AppMode::Conversation => self.presets.translation_request(transcript, target),
        };
        self.answerer.generate(request).await
    }

    fn schedule_auto_idle(&self, epoch: u64) {
        let inner = self.inner.clone();
        let delay = self.auto_idle;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = lock_inner(&inner);
            if inner.epoch == epoch && inner.state == InteractionState::Responding {
                inner.state = InteractionState::Idle;
            }
        });
    }

    /// Clears the conversation and overlays and returns to `Idle` from any
    /// state. An answer still in flight is discarded when it arrives.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.epoch += 1;
        inner.overlay_epoch += 1;
        inner.messages.clear();
        inner.discovery = None;
        inner.selection = None;
        inner.error = None;
        inner.state = InteractionState::Idle;
        tracing::info!("[Orchestrator] session reset");
    }

    pub fn set_mode(&self, mode: AppMode) {
        self.lock().mode = mode;
    }

    pub fn set_source_language(&self, code: &str) -> Result<()> {
        let language = lookup_language(code)?;
        self.lock().source_language = language;
        Ok(())
    }

    pub fn set_target_language(&self, code: &str) -> Result<()> {
        let language = lookup_language(code)?;
        self.lock().target_language = language;
        Ok(())
    }

    pub fn show_discovery(&self, view: DiscoveryView) {
        let mut inner = self.lock();
        inner.overlay_epoch += 1;
        inner.discovery = Some(view);
    }

    /// Claims the discovery overlay for a page that is still loading.
    ///
    /// The returned ticket is invalidated by a later claim, `show_discovery`,
    /// `close_discovery` or `reset`.
    pub fn begin_discovery(&self) -> u64 {
        let mut inner = self.lock();
        inner.overlay_epoch += 1;
        inner.overlay_epoch
    }

    /// Shows `view` only if `ticket` is still the latest overlay claim.
    pub fn show_discovery_if(&self, ticket: u64, view: DiscoveryView) -> bool {
        let mut inner = self.lock();
        if inner.overlay_epoch != ticket {
            tracing::debug!("[Orchestrator] discarding stale discovery page for {}", view.category);
            return false;
        }
        inner.discovery = Some(view);
        true
    }

    pub fn close_discovery(&self) {
        let mut inner = self.lock();
        inner.overlay_epoch += 1;
        inner.discovery = None;
    }

    pub fn set_selection(&self, selection: EmergencyInfo) {
        self.lock().selection = Some(selection);
    }

    pub fn clear_selection(&self) {
        self.lock().selection = None;
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lookup_language(code: &str) -> Result<&'static Language> {
    find_language(code).ok_or_else(|| KioskError::config(format!("unsupported language code: {code}")))
}

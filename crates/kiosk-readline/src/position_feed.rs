//! Position source driven from the REPL.

use std::sync::Mutex;

use async_trait::async_trait;
use kiosk_core::position::PositionSource;
use kiosk_core::{Position, Result};
use tokio::sync::mpsc;

const WATCH_CAPACITY: usize = 16;

/// Reports a fixed first fix, then whatever is pushed with [`push`].
///
/// [`push`]: ManualPositionSource::push
pub struct ManualPositionSource {
    initial: Position,
    watcher: Mutex<Option<mpsc::Sender<Result<Position>>>>,
}

impl ManualPositionSource {
    pub fn new(initial: Position) -> Self {
        Self {
            initial,
            watcher: Mutex::new(None),
        }
    }

    /// Delivers `position` to the open watch. Returns `false` if no watch is
    /// open or it has been released.
    pub fn push(&self, position: Position) -> bool {
        let watcher = self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match watcher.as_ref() {
            Some(tx) => tx.try_send(Ok(position)).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl PositionSource for ManualPositionSource {
    async fn current_position(&self) -> Result<Position> {
        Ok(self.initial)
    }

    async fn watch(&self) -> Result<mpsc::Receiver<Result<Position>>> {
        let (tx, rx) = mpsc::channel(WATCH_CAPACITY);
        let mut watcher = self.watcher.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *watcher = Some(tx);
        Ok(rx)
    }
}

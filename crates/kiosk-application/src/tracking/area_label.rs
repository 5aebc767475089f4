//! Coalescing reverse-geocode worker.
//!
//! Requests go through a `watch` channel, so a burst of position updates
//! collapses into the newest one. A single task performs the lookups, which
//! keeps at most one request in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kiosk_core::Position;
use kiosk_core::place::{AreaLabel, AreaLabeler};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cloneable handle for submitting positions to the worker.
#[derive(Clone)]
pub struct AreaLabelRequester {
    tx: Arc<watch::Sender<Option<Position>>>,
}

impl AreaLabelRequester {
    /// Replaces any pending request with `position`.
    pub fn request(&self, position: Position) {
        self.tx.send_replace(Some(position));
    }
}

pub struct AreaLabelWorker {
    requester: AreaLabelRequester,
    label_rx: watch::Receiver<AreaLabel>,
    in_flight: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl AreaLabelWorker {
    /// Spawns the worker. The label starts as "Locating...".
    pub fn spawn(labeler: Arc<dyn AreaLabeler>) -> Self {
        let (request_tx, mut request_rx) = watch::channel(None::<Position>);
        let (label_tx, label_rx) = watch::channel(AreaLabel::locating());
        let in_flight = Arc::new(AtomicUsize::new(0));

        let counter = in_flight.clone();
        let task = tokio::spawn(async move {
            while request_rx.changed().await.is_ok() {
                let requested = *request_rx.borrow_and_update();
                let Some(position) = requested else {
                    continue;
                };

                counter.fetch_add(1, Ordering::SeqCst);
                let label = labeler.label(position).await;
                counter.fetch_sub(1, Ordering::SeqCst);

                tracing::debug!("[AreaLabel] {} -> {}", position, label);
                label_tx.send_replace(label);
            }
        });

        Self {
            requester: AreaLabelRequester {
                tx: Arc::new(request_tx),
            },
            label_rx,
            in_flight,
            task,
        }
    }

    pub fn requester(&self) -> AreaLabelRequester {
        self.requester.clone()
    }

    pub fn request(&self, position: Position) {
        self.requester.request(position);
    }

    pub fn current(&self) -> AreaLabel {
        self.label_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AreaLabel> {
        self.label_rx.clone()
    }

    /// Lookups currently running (0 or 1).
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for AreaLabelWorker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! Device position tracking and movement-triggered prefetch.

use std::sync::Arc;

use kiosk_core::Position;
use kiosk_core::geo::DEFAULT_PREFETCH_THRESHOLD;
use kiosk_core::position::PositionSource;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::area_label::AreaLabelRequester;
use crate::discovery::{CategoryCache, SweepReport};

/// Whether `next` warrants a new prefetch sweep.
///
/// With no reference yet every fix sweeps; otherwise the movement since the
/// reference must strictly exceed `threshold`.
pub fn should_sweep(reference: Option<Position>, next: Position, threshold: f64) -> bool {
    reference.is_none_or(|reference| next.moved_beyond(&reference, threshold))
}

/// Follows the device position for the lifetime of a kiosk session.
///
/// Every accepted fix is published on the positions channel and handed to
/// the area label worker. Sweeps run in the background so tracking never
/// waits on the answerer.
pub struct GeolocationTracker {
    source: Arc<dyn PositionSource>,
    cache: Arc<CategoryCache>,
    labels: AreaLabelRequester,
    positions: Arc<watch::Sender<Position>>,
    threshold: f64,
    reports: Option<mpsc::UnboundedSender<SweepReport>>,
}

impl GeolocationTracker {
    pub fn new(
        source: Arc<dyn PositionSource>,
        cache: Arc<CategoryCache>,
        labels: AreaLabelRequester,
        positions: Arc<watch::Sender<Position>>,
    ) -> Self {
        Self {
            source,
            cache,
            labels,
            positions,
            threshold: DEFAULT_PREFETCH_THRESHOLD,
            reports: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Delivers a report when each sweep completes.
    pub fn with_sweep_reports(mut self, reports: mpsc::UnboundedSender<SweepReport>) -> Self {
        self.reports = Some(reports);
        self
    }

    pub fn start(self) -> TrackerHandle {
        TrackerHandle {
            task: tokio::spawn(self.run()),
        }
    }

    async fn run(self) {
        let mut reference = None;

        match self.source.current_position().await {
            Ok(position) => {
                tracing::info!("[Tracker] initial fix at {}", position);
                self.accept(position, &mut reference);
            }
            Err(e) => {
                tracing::warn!(
                    "[Tracker] initial fix failed, staying at {}: {}",
                    *self.positions.borrow(),
                    e
                );
            }
        }

        let mut updates = match self.source.watch().await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!("[Tracker] could not open position watch: {}", e);
                return;
            }
        };

        while let Some(update) = updates.recv().await {
            match update {
                Ok(position) => self.accept(position, &mut reference),
                Err(e) => tracing::warn!("[Tracker] position update skipped: {}", e),
            }
        }
        tracing::info!("[Tracker] position watch closed");
    }

    fn accept(&self, position: Position, reference: &mut Option<Position>) {
        self.positions.send_replace(position);
        self.labels.request(position);

        if should_sweep(*reference, position, self.threshold) {
            *reference = Some(position);
            self.spawn_sweep(position);
        }
    }

    fn spawn_sweep(&self, position: Position) {
        let cache = self.cache.clone();
        let reports = self.reports.clone();
        tokio::spawn(async move {
            let report = cache.refresh_all(position).await;
            if let Some(reports) = reports {
                let _ = reports.send(report);
            }
        });
    }
}

/// Owns the tracking task. Stopping (or dropping) it releases the position
/// watch.
pub struct TrackerHandle {
    task: JoinHandle<()>,
}

impl TrackerHandle {
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

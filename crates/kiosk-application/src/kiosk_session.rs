//! Kiosk session facade.
//!
//! `KioskSession` wires the tracker, category cache, area label worker,
//! discovery controller and interaction orchestrator around a set of
//! injected collaborators. One instance lives for one kiosk session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use kiosk_core::answerer::Answerer;
use kiosk_core::config::{DiscoverySettings, RootConfig};
use kiosk_core::directions::DirectionsRequest;
use kiosk_core::place::{AreaLabel, AreaLabeler, Category, Place, PlacesLookup};
use kiosk_core::position::PositionSource;
use kiosk_core::{Position, Result};
use kiosk_interaction::{PlacesLookupClient, PromptPresets, RatingPolicy, ReverseGeocodeClient};
use tokio::sync::{mpsc, watch};

use crate::discovery::{CategoryCache, DiscoveryController, DiscoveryView, SweepReport};
use crate::interaction::{InteractionOrchestrator, InteractionSnapshot};
use crate::tracking::{AreaLabelWorker, GeolocationTracker, TrackerHandle};

/// External collaborators a session depends on.
#[derive(Clone)]
pub struct KioskServices {
    pub answerer: Arc<dyn Answerer>,
    pub places: Arc<dyn PlacesLookup>,
    pub labeler: Arc<dyn AreaLabeler>,
    pub positions: Arc<dyn PositionSource>,
}

impl KioskServices {
    /// Builds the places and area label clients on top of one answerer.
    pub fn from_answerer(
        answerer: Arc<dyn Answerer>,
        positions: Arc<dyn PositionSource>,
        discovery: &DiscoverySettings,
    ) -> Self {
        let ratings = if discovery.synthetic_ratings {
            RatingPolicy::Synthetic
        } else {
            RatingPolicy::Omit
        };
        let places = PlacesLookupClient::new(answerer.clone())
            .with_places_per_lookup(discovery.places_per_lookup)
            .with_ratings(ratings);

        Self {
            places: Arc::new(places),
            labeler: Arc::new(ReverseGeocodeClient::new(answerer.clone())),
            answerer,
            positions,
        }
    }
}

/// Session-scoped coordinator for everything the kiosk screen shows.
///
/// # Responsibilities
///
/// - Starting and stopping position tracking (and with it the prefetch sweeps)
/// - Opening category pages and keeping the discovery overlay in sync
/// - Turning a selected place into a directions request
/// - Exposing the interaction orchestrator for the voice flow
///
/// Must be created inside a Tokio runtime; the area label worker is spawned
/// on construction.
pub struct KioskSession {
    cache: Arc<CategoryCache>,
    controller: DiscoveryController,
    orchestrator: InteractionOrchestrator,
    labels: AreaLabelWorker,
    positions_tx: Arc<watch::Sender<Position>>,
    positions_rx: watch::Receiver<Position>,
    source: Arc<dyn PositionSource>,
    prefetch_threshold: f64,
    tracker: Mutex<Option<TrackerHandle>>,
}

impl KioskSession {
    /// Creates a session from validated configuration.
    ///
    /// The position starts at the configured kiosk site until the first fix.
    pub fn new(config: &RootConfig, services: KioskServices) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(CategoryCache::new(services.places));
        let labels = AreaLabelWorker::spawn(services.labeler);
        let (positions_tx, positions_rx) = watch::channel(config.kiosk.position());

        let orchestrator = InteractionOrchestrator::new(
            services.answerer,
            PromptPresets::new(config.kiosk.name.clone())?,
            positions_rx.clone(),
            labels.subscribe(),
        )
        .with_auto_idle(Duration::from_secs(config.interaction.auto_idle_secs));
        orchestrator.set_source_language(&config.languages.source)?;
        orchestrator.set_target_language(&config.languages.target)?;

        tracing::info!(
            "[Session] kiosk {} ({}) at {}",
            config.kiosk.id,
            config.kiosk.name,
            config.kiosk.position()
        );

        Ok(Self {
            controller: DiscoveryController::new(cache.clone()),
            cache,
            orchestrator,
            labels,
            positions_tx: Arc::new(positions_tx),
            positions_rx,
            source: services.positions,
            prefetch_threshold: config.discovery.prefetch_threshold,
            tracker: Mutex::new(None),
        })
    }

    /// Starts following the device. A running tracker is replaced.
    pub fn start_tracking(&self, reports: Option<mpsc::UnboundedSender<SweepReport>>) {
        let mut tracker = GeolocationTracker::new(
            self.source.clone(),
            self.cache.clone(),
            self.labels.requester(),
            self.positions_tx.clone(),
        )
        .with_threshold(self.prefetch_threshold);
        if let Some(reports) = reports {
            tracker = tracker.with_sweep_reports(reports);
        }

        let handle = tracker.start();
        if let Some(previous) = self.lock_tracker().replace(handle) {
            previous.stop();
        }
    }

    /// Releases the position watch.
    pub fn stop_tracking(&self) {
        if let Some(handle) = self.lock_tracker().take() {
            handle.stop();
            tracing::info!("[Session] tracking stopped");
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.lock_tracker().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn lock_tracker(&self) -> std::sync::MutexGuard<'_, Option<TrackerHandle>> {
        self.tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn position(&self) -> Position {
        *self.positions_rx.borrow()
    }

    pub fn subscribe_positions(&self) -> watch::Receiver<Position> {
        self.positions_rx.clone()
    }

    pub fn area_label(&self) -> AreaLabel {
        self.labels.current()
    }

    pub fn orchestrator(&self) -> &InteractionOrchestrator {
        &self.orchestrator
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        self.orchestrator.snapshot()
    }

    pub async fn category_ready(&self, category: Category) -> bool {
        self.cache.is_ready(category).await
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    /// Opens the category page at the current position and shows it as the
    /// discovery overlay.
    ///
    /// The page is not shown if the overlay was closed, reset or claimed by
    /// another open while the fetch was running.
    pub async fn open_category(&self, category: Category) -> DiscoveryView {
        let ticket = self.orchestrator.begin_discovery();
        let view = self.controller.open(category, self.position()).await;
        self.orchestrator.show_discovery_if(ticket, view.clone());
        view
    }

    pub fn close_discovery(&self) {
        self.orchestrator.close_discovery();
    }

    /// Makes `place` the active selection and returns its route from the
    /// current position.
    pub fn select_place(&self, place: &Place) -> DirectionsRequest {
        let info = self.controller.select(place);
        self.orchestrator.set_selection(info.clone());
        DirectionsRequest::new(self.position(), info)
    }

    pub fn close_directions(&self) {
        self.orchestrator.clear_selection();
    }

    pub fn reset(&self) {
        self.orchestrator.reset();
    }
}

impl Drop for KioskSession {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiosk_core::answerer::AnswerRequest;
    use kiosk_core::place::LookupError;
    use kiosk_core::session::InteractionState;

    /// Reports one fix and then a watch that never moves.
    struct FixedSource {
        fix: Position,
        watchers: Mutex<Vec<mpsc::Sender<Result<Position>>>>,
    }

    impl FixedSource {
        fn new(fix: Position) -> Arc<Self> {
            Arc::new(Self {
                fix,
                watchers: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PositionSource for FixedSource {
        async fn current_position(&self) -> Result<Position> {
            Ok(self.fix)
        }

        async fn watch(&self) -> Result<mpsc::Receiver<Result<Position>>> {
            let (tx, rx) = mpsc::channel(1);
            self.watchers.lock().unwrap().push(tx);
            Ok(rx)
        }
    }

    /// Answers place lookups with one row and everything else with a
    /// sector name.
    struct StationAnswerer;

    #[async_trait]
    impl Answerer for StationAnswerer {
        async fn generate(&self, request: AnswerRequest) -> Result<String> {
            if request.contents.starts_with("Find") {
                Ok("Lady Hardinge | Connaught Place | 28.6353 | 77.2090".to_string())
            } else if request.contents.starts_with("Location:") {
                Ok("Paharganj".to_string())
            } else {
                Ok("Go straight ahead.".to_string())
            }
        }
    }

    const FIX: Position = Position::new(28.6430, 77.2190);

    fn session() -> KioskSession {
        let services = KioskServices::from_answerer(
            Arc::new(StationAnswerer),
            FixedSource::new(FIX),
            &DiscoverySettings::default(),
        );
        KioskSession::new(&RootConfig::default(), services).unwrap()
    }

    #[tokio::test]
    async fn test_starts_at_configured_site() {
        let session = session();
        assert_eq!(session.position(), RootConfig::default().kiosk.position());
        assert_eq!(session.area_label().as_str(), "Locating...");
    }

    #[tokio::test]
    async fn test_tracking_prefetches_all_categories() {
        let session = session();
        let (tx, mut reports) = mpsc::unbounded_channel();

        session.start_tracking(Some(tx));
        let report = reports.recv().await.unwrap();

        assert_eq!(report.position, FIX);
        assert_eq!(session.position(), FIX);
        for category in Category::ALL {
            assert!(session.category_ready(category).await);
        }

        session.stop_tracking();
        assert!(!session.is_tracking());
    }

    #[tokio::test]
    async fn test_open_and_select_place() {
        let session = session();

        let view = session.open_category(Category::Medical).await;
        assert!(view.is_ready());
        assert_eq!(session.snapshot().discovery.as_ref(), Some(&view));

        let directions = session.select_place(&view.places[0]);
        assert_eq!(directions.to.title, "Lady Hardinge");
        assert_eq!(directions.from, session.position());
        assert!(session.snapshot().selection.is_some());

        session.close_directions();
        session.close_discovery();
        let snapshot = session.snapshot();
        assert!(snapshot.selection.is_none());
        assert!(snapshot.discovery.is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_overlays() {
        let session = session();
        let view = session.open_category(Category::Police).await;
        session.select_place(&view.places[0]);

        session.orchestrator().start().unwrap();
        session.reset();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, InteractionState::Idle);
        assert!(snapshot.discovery.is_none());
        assert!(snapshot.selection.is_none());
    }

    /// Returns one place per category after a fixed delay.
    struct SlowLookup {
        delays: fn(Category) -> Duration,
    }

    #[async_trait]
    impl PlacesLookup for SlowLookup {
        async fn lookup(&self, category: Category, position: Position) -> std::result::Result<Vec<Place>, LookupError> {
            tokio::time::sleep((self.delays)(category)).await;
            Ok(vec![Place {
                id: format!("{category}-0"),
                name: format!("{category} desk"),
                address: "Concourse".to_string(),
                coords: position,
                category,
                rating: None,
            }])
        }
    }

    fn slow_session(delays: fn(Category) -> Duration) -> Arc<KioskSession> {
        let mut services = KioskServices::from_answerer(
            Arc::new(StationAnswerer),
            FixedSource::new(FIX),
            &DiscoverySettings::default(),
        );
        services.places = Arc::new(SlowLookup { delays });
        Arc::new(KioskSession::new(&RootConfig::default(), services).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_open_keeps_overlay_closed() {
        let session = slow_session(|_| Duration::from_millis(500));

        let opening = tokio::spawn({
            let session = session.clone();
            async move { session.open_category(Category::Medical).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.reset();
        assert!(session.snapshot().discovery.is_none());

        let view = opening.await.unwrap();
        assert!(view.is_ready());
        assert!(session.snapshot().discovery.is_none());
        assert!(session.category_ready(Category::Medical).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_open_keeps_overlay_closed() {
        let session = slow_session(|_| Duration::from_millis(500));

        let opening = tokio::spawn({
            let session = session.clone();
            async move { session.open_category(Category::Police).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.close_discovery();

        opening.await.unwrap();
        assert!(session.snapshot().discovery.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_open_wins_the_overlay() {
        let session = slow_session(|category| match category {
            Category::Medical => Duration::from_millis(500),
            _ => Duration::from_millis(50),
        });

        let slow = tokio::spawn({
            let session = session.clone();
            async move { session.open_category(Category::Medical).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.open_category(Category::Restaurant).await;
        slow.await.unwrap();

        let shown = session.snapshot().discovery.map(|view| view.category);
        assert_eq!(shown, Some(Category::Restaurant));
    }

    #[tokio::test]
    async fn test_invalid_language_in_config_is_rejected() {
        let mut config = RootConfig::default();
        config.languages.target = "fr-FR".to_string();
        let services = KioskServices::from_answerer(
            Arc::new(StationAnswerer),
            FixedSource::new(FIX),
            &config.discovery,
        );

        let err = KioskSession::new(&config, services).err().unwrap();
        assert!(err.is_config());
    }
}

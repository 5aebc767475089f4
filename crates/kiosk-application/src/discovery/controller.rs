use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kiosk_core::Position;
use kiosk_core::directions::EmergencyInfo;
use kiosk_core::place::{Category, Place};
use serde::Serialize;

use super::cache::{CategoryCache, Ensured};

/// User-facing text when a category could not be fetched.
pub const DISCOVERY_FAILED_MESSAGE: &str = "AI scan slow.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum DiscoveryStatus {
    Ready,
    /// The lookup succeeded but found nothing.
    Empty,
    Failed(String),
}

/// Content of the discovery overlay for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryView {
    pub category: Category,
    pub places: Vec<Place>,
    pub status: DiscoveryStatus,
}

impl DiscoveryView {
    pub fn is_ready(&self) -> bool {
        self.status == DiscoveryStatus::Ready
    }
}

/// Opens category pages from the cache, fetching on demand.
pub struct DiscoveryController {
    cache: Arc<CategoryCache>,
    /// On-demand fetches in flight.
    loading: AtomicUsize,
}

impl DiscoveryController {
    pub fn new(cache: Arc<CategoryCache>) -> Self {
        Self {
            cache,
            loading: AtomicUsize::new(0),
        }
    }

    pub fn cache(&self) -> &Arc<CategoryCache> {
        &self.cache
    }

    /// Whether any on-demand fetch is running.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Returns the category's places, fetching once when nothing is cached.
    pub async fn open(&self, category: Category, position: Position) -> DiscoveryView {
        if let Some(places) = self.cache.get(category).await {
            return DiscoveryView {
                category,
                places,
                status: DiscoveryStatus::Ready,
            };
        }

        let _loading = LoadingGuard::engage(&self.loading);
        let (places, status) = match self.cache.ensure(category, position).await {
            Ensured::Hit(places) | Ensured::Fetched(places) => (places, DiscoveryStatus::Ready),
            Ensured::Empty => (Vec::new(), DiscoveryStatus::Empty),
            Ensured::Failed(e) => {
                tracing::warn!(category = %category, "[Discovery] fetch failed: {}", e);
                (Vec::new(), DiscoveryStatus::Failed(DISCOVERY_FAILED_MESSAGE.to_string()))
            }
        };

        DiscoveryView {
            category,
            places,
            status,
        }
    }

    pub fn select(&self, place: &Place) -> EmergencyInfo {
        EmergencyInfo::from_place(place.clone())
    }
}

/// Counts one fetch in flight until dropped, however the fetch ends.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn engage(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiosk_core::KioskError;
    use kiosk_core::place::{LookupError, PlacesLookup};
    use std::time::Duration;

    const HERE: Position = Position::new(28.6415, 77.2197);

    struct FixedLookup {
        result: Result<Vec<Place>, LookupError>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FixedLookup {
        fn new(result: Result<Vec<Place>, LookupError>) -> Self {
            Self {
                result,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PlacesLookup for FixedLookup {
        async fn lookup(&self, _category: Category, _position: Position) -> Result<Vec<Place>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn hospital() -> Place {
        Place {
            id: "medical-0".to_string(),
            name: "Lady Hardinge".to_string(),
            address: "Shaheed Bhagat Singh Marg".to_string(),
            coords: Position::new(28.6353, 77.2090),
            category: Category::Medical,
            rating: Some(4.5),
        }
    }

    fn controller(lookup: FixedLookup) -> (DiscoveryController, Arc<FixedLookup>) {
        let lookup = Arc::new(lookup);
        let cache = Arc::new(CategoryCache::new(lookup.clone()));
        (DiscoveryController::new(cache), lookup)
    }

    #[tokio::test]
    async fn test_open_cached_category_skips_lookup() {
        let (controller, lookup) = controller(FixedLookup::new(Ok(vec![hospital()])));
        controller.cache().refresh_all(HERE).await;
        let before = lookup.calls.load(Ordering::SeqCst);

        let view = controller.open(Category::Medical, HERE).await;

        assert!(view.is_ready());
        assert_eq!(view.places[0].name, "Lady Hardinge");
        assert_eq!(lookup.calls.load(Ordering::SeqCst), before);
    }

    #[tokio::test]
    async fn test_open_uncached_category_fetches_and_displays() {
        let (controller, lookup) = controller(FixedLookup::new(Ok(vec![hospital()])));

        let view = controller.open(Category::Medical, HERE).await;

        assert!(view.is_ready());
        assert_eq!(view.places.len(), 1);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
        assert!(controller.cache().is_ready(Category::Medical).await);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_open_failure_shows_slow_scan_message() {
        let failed = LookupError::Failed(KioskError::answerer("503"));
        let (controller, _) = controller(FixedLookup::new(Err(failed)));

        let view = controller.open(Category::Police, HERE).await;

        assert_eq!(view.status, DiscoveryStatus::Failed("AI scan slow.".to_string()));
        assert!(view.places.is_empty());
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_open_empty_result_is_not_a_failure() {
        let (controller, _) = controller(FixedLookup::new(Err(LookupError::Empty)));
        let view = controller.open(Category::Restaurant, HERE).await;
        assert_eq!(view.status, DiscoveryStatus::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_is_set_during_fetch() {
        let mut lookup = FixedLookup::new(Ok(vec![hospital()]));
        lookup.delay = Duration::from_millis(200);
        let (controller, _) = controller(lookup);
        let controller = Arc::new(controller);

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.open(Category::Medical, HERE).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(controller.is_loading());

        task.await.unwrap();
        assert!(!controller.is_loading());
    }

    /// Medical answers slowly, every other category quickly.
    struct StaggeredLookup;

    #[async_trait]
    impl PlacesLookup for StaggeredLookup {
        async fn lookup(&self, category: Category, _position: Position) -> Result<Vec<Place>, LookupError> {
            let delay = match category {
                Category::Medical => Duration::from_millis(500),
                _ => Duration::from_millis(50),
            };
            tokio::time::sleep(delay).await;
            Ok(vec![hospital()])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_stays_set_while_any_fetch_runs() {
        let cache = Arc::new(CategoryCache::new(Arc::new(StaggeredLookup)));
        let controller = Arc::new(DiscoveryController::new(cache));

        let slow = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.open(Category::Medical, HERE).await })
        };
        let fast = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.open(Category::Police, HERE).await })
        };

        fast.await.unwrap();
        assert!(controller.is_loading());

        slow.await.unwrap();
        assert!(!controller.is_loading());
    }

    #[test]
    fn test_select_builds_emergency_info() {
        let cache = Arc::new(CategoryCache::new(Arc::new(FixedLookup::new(Err(LookupError::Empty)))));
        let controller = DiscoveryController::new(cache);

        let info = controller.select(&hospital());

        assert_eq!(info.title, "Lady Hardinge");
        assert_eq!(info.description, "GPS tracking active to Lady Hardinge.");
        assert_eq!(info.helpline, Some("108"));
    }
}

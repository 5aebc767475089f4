use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use kiosk_core::place::{Category, LookupError, Place, PlacesLookup};
use kiosk_core::{KioskError, Position};
use tokio::sync::RwLock;

/// Per-category cache state.
///
/// `issued` counts fetches started for the category; `applied` is the
/// ticket of the result currently held. A result whose ticket is not newer
/// than `applied` is discarded.
#[derive(Default)]
struct Slot {
    places: Option<Vec<Place>>,
    issued: u64,
    applied: u64,
}

/// Result of [`CategoryCache::ensure`].
#[derive(Debug, Clone)]
pub enum Ensured {
    /// Served from cache without a request.
    Hit(Vec<Place>),
    /// Fetched now and stored (or superseded by a newer stored result,
    /// which is what is returned).
    Fetched(Vec<Place>),
    /// The lookup succeeded but nothing parsed.
    Empty,
    /// The lookup failed.
    Failed(KioskError),
}

/// What a sweep did for one category.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepOutcome {
    Stored(usize),
    /// A newer result for the category was already in place.
    Superseded,
    Empty,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub position: Position,
    pub outcomes: Vec<(Category, SweepOutcome)>,
}

impl SweepReport {
    pub fn stored_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, SweepOutcome::Stored(_)))
            .count()
    }
}

/// Session-scoped cache of the latest non-empty lookup per category.
///
/// An entry is only ever replaced by a newer non-empty result; failed and
/// empty lookups leave it untouched.
pub struct CategoryCache {
    lookup: Arc<dyn PlacesLookup>,
    slots: RwLock<HashMap<Category, Slot>>,
}

impl CategoryCache {
    pub fn new(lookup: Arc<dyn PlacesLookup>) -> Self {
        Self {
            lookup,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, category: Category) -> Option<Vec<Place>> {
        let slots = self.slots.read().await;
        slots.get(&category).and_then(|slot| slot.places.clone())
    }

    pub async fn is_ready(&self, category: Category) -> bool {
        let slots = self.slots.read().await;
        slots.get(&category).is_some_and(|slot| slot.places.is_some())
    }

    /// Looks up every category concurrently and stores each success.
    ///
    /// Categories are independent: one failing never affects another.
    pub async fn refresh_all(&self, position: Position) -> SweepReport {
        let fetches = Category::ALL.map(|category| async move {
            let outcome = match self.fetch(category, position).await {
                Ok(Applied { places, stored: true }) => SweepOutcome::Stored(places.len()),
                Ok(Applied { stored: false, .. }) => SweepOutcome::Superseded,
                Err(LookupError::Empty) => SweepOutcome::Empty,
                Err(LookupError::Failed(e)) => SweepOutcome::Failed(e.to_string()),
            };
            (category, outcome)
        });

        let report = SweepReport {
            position,
            outcomes: join_all(fetches).await,
        };
        tracing::info!(
            "[Prefetch] sweep at {} stored {}/{} categories",
            position,
            report.stored_count(),
            Category::ALL.len()
        );
        report
    }

    /// Returns the cached entry, or performs one lookup for it.
    pub async fn ensure(&self, category: Category, position: Position) -> Ensured {
        if let Some(places) = self.get(category).await {
            return Ensured::Hit(places);
        }

        match self.fetch(category, position).await {
            Ok(Applied { places, stored: true }) => Ensured::Fetched(places),
            Ok(Applied { places, stored: false }) => {
                Ensured::Fetched(self.get(category).await.unwrap_or(places))
            }
            Err(LookupError::Empty) => Ensured::Empty,
            Err(LookupError::Failed(e)) => Ensured::Failed(e),
        }
    }

    async fn fetch(&self, category: Category, position: Position) -> Result<Applied, LookupError> {
        let ticket = self.issue_ticket(category).await;
        let places = self.lookup.lookup(category, position).await?;
        let stored = self.apply(category, ticket, &places).await;
        Ok(Applied { places, stored })
    }

    async fn issue_ticket(&self, category: Category) -> u64 {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(category).or_default();
        slot.issued += 1;
        slot.issued
    }

    async fn apply(&self, category: Category, ticket: u64, places: &[Place]) -> bool {
        if places.is_empty() {
            return false;
        }
        let mut slots = self.slots.write().await;
        let slot = slots.entry(category).or_default();
        if ticket <= slot.applied {
            tracing::debug!(
                category = %category,
                "[Prefetch] discarding result #{} older than applied #{}",
                ticket,
                slot.applied
            );
            return false;
        }
        slot.applied = ticket;
        slot.places = Some(places.to_vec());
        true
    }
}

struct Applied {
    places: Vec<Place>,
    stored: bool,
}

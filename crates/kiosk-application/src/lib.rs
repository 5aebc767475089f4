//! Application layer for the transit kiosk.
//!
//! Coordinates position tracking, category prefetch, area labelling and the
//! voice interaction lifecycle on top of the collaborator traits defined in
//! `kiosk-core`.

pub mod discovery;
pub mod interaction;
pub mod kiosk_session;
pub mod tracking;

pub use discovery::{CategoryCache, DiscoveryController, DiscoveryStatus, DiscoveryView, Ensured, SweepReport};
pub use interaction::{InteractionOrchestrator, InteractionSnapshot};
pub use kiosk_session::{KioskServices, KioskSession};
pub use tracking::{AreaLabelWorker, GeolocationTracker, TrackerHandle};

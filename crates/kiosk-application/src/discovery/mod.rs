//! Category discovery: cached lookups and the category page controller.

pub mod cache;
pub mod controller;

pub use cache::{CategoryCache, Ensured, SweepOutcome, SweepReport};
pub use controller::{DISCOVERY_FAILED_MESSAGE, DiscoveryController, DiscoveryStatus, DiscoveryView};

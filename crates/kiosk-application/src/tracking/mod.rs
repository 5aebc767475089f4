pub mod area_label;
pub mod tracker;

pub use area_label::{AreaLabelRequester, AreaLabelWorker};
pub use tracker::{GeolocationTracker, TrackerHandle, should_sweep};

//! Place discovery domain module.
//!
//! - `category`: the fixed discovery categories (`Category`)
//! - `model`: discovered places and area labels (`Place`, `AreaLabel`)
//! - `lookup`: collaborator traits for places and reverse-geocode lookups

mod category;
mod lookup;
mod model;

pub use category::Category;
pub use lookup::{AreaLabeler, LookupError, PlacesLookup};
pub use model::{AreaLabel, FALLBACK_AREA_LABEL, LOCATING_AREA_LABEL, Place};

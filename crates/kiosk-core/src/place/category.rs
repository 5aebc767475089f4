//! Discovery categories.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The fixed set of nearby-place categories the kiosk can discover.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
    Medical,
    Police,
    Restaurant,
}

impl Category {
    /// Every category, in sweep order.
    pub const ALL: [Category; 3] = [Category::Medical, Category::Police, Category::Restaurant];

    /// Identifier prefix for places of this category.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Police => "police",
            Category::Restaurant => "restaurant",
        }
    }

    /// The plural noun used when asking the answerer for places.
    pub fn query_noun(&self) -> &'static str {
        match self {
            Category::Medical => "hospitals",
            Category::Police => "police stations",
            Category::Restaurant => "restaurants",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Medical => "🏥",
            Category::Police => "🚔",
            Category::Restaurant => "🍽️",
        }
    }

    /// Label shown on the quick-discover buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Medical => "Hospitals",
            Category::Police => "Safety",
            Category::Restaurant => "Dining",
        }
    }

    /// National helpline for emergency categories (India).
    pub fn helpline(&self) -> Option<&'static str> {
        match self {
            Category::Medical => Some("108"),
            Category::Police => Some("100"),
            Category::Restaurant => None,
        }
    }
}

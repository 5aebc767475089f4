//! Languages offered for speech capture and translation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// BCP-47 code handed to the speech capture collaborator.
    pub code: &'static str,
    /// Name shown to the user and used in translation prompts.
    pub name: &'static str,
}

pub static LANGUAGES: [Language; 10] = [
    Language { code: "en-IN", name: "Indian English" },
    Language { code: "hi-IN", name: "हिन्दी (Hindi)" },
    Language { code: "bn-IN", name: "বাংলা (Bengali)" },
    Language { code: "te-IN", name: "తెలుగు (Telugu)" },
    Language { code: "mr-IN", name: "मराठी (Marathi)" },
    Language { code: "ta-IN", name: "தமிழ் (Tamil)" },
    Language { code: "gu-IN", name: "ગુજરાતી (Gujarati)" },
    Language { code: "kn-IN", name: "ಕನ್ನಡ (Kannada)" },
    Language { code: "ml-IN", name: "മലയാളം (Malayalam)" },
    Language { code: "pa-IN", name: "ਪੰਜਾਬੀ (Punjabi)" },
];

pub const DEFAULT_SOURCE_LANGUAGE: &str = "en-IN";
pub const DEFAULT_TARGET_LANGUAGE: &str = "hi-IN";

/// Looks up a language by its exact code.
pub fn find_language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

//! Prompt presets for the assistance and translation flows.

use kiosk_core::answerer::{AnswerRequest, Grounding};
use kiosk_core::place::AreaLabel;
use kiosk_core::session::Language;
use kiosk_core::{KioskError, Position, Result};
use minijinja::{Environment, context};

/// Words that mark a transcript as asking about nearby places.
pub const LOCATION_KEYWORDS: [&str; 9] = [
    "near", "nearby", "where", "hospital", "pharmacy", "police", "food", "locate", "find",
];

const KIOSK_INSTRUCTION: &str = "kiosk_instruction";

const KIOSK_INSTRUCTION_TEMPLATE: &str = r#"
You are a Public Voice Translator Kiosk located at {{ kiosk_name }} in India.
Your primary goal is to help visitors, migrants, and travelers.

Rules:
1. Detect the user's language and intent.
2. If intent is EMERGENCY, provide info for Medical (108) or Police (100).
3. Always translate accurately between the source and target languages.
4. If in Kiosk Mode, respond to the user in their selected language.
5. If in Translator Mode, strictly translate the speaker's input into the target language.
6. Use Indian English and common Indian terms where appropriate.

Current Area: {{ area }}
Request: "{{ request }}""#;

/// Case-insensitive substring match against [`LOCATION_KEYWORDS`].
pub fn is_location_intent(transcript: &str) -> bool {
    let lowered = transcript.to_lowercase();
    LOCATION_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Renders requests for the two interaction flows.
pub struct PromptPresets {
    env: Environment<'static>,
    kiosk_name: String,
}

impl PromptPresets {
    pub fn new(kiosk_name: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(KIOSK_INSTRUCTION, KIOSK_INSTRUCTION_TEMPLATE)
            .map_err(|e| KioskError::internal(format!("invalid kiosk template: {e}")))?;
        Ok(Self {
            env,
            kiosk_name: kiosk_name.into(),
        })
    }

    /// Assistance request; grounded at `position` when the transcript asks
    /// about nearby places.
    pub fn assistance_request(
        &self,
        transcript: &str,
        area: &AreaLabel,
        position: Position,
    ) -> Result<AnswerRequest> {
        let instruction = self
            .env
            .get_template(KIOSK_INSTRUCTION)
            .and_then(|template| {
                template.render(context! {
                    kiosk_name => self.kiosk_name.as_str(),
                    area => area.as_str(),
                    request => transcript,
                })
            })
            .map_err(|e| KioskError::internal(format!("failed to render kiosk prompt: {e}")))?;

        let grounding = if is_location_intent(transcript) {
            Grounding::MapsAt(position)
        } else {
            Grounding::None
        };

        Ok(AnswerRequest::new(transcript)
            .with_system_instruction(instruction)
            .grounded(grounding))
    }

    /// Translation request; never grounded.
    pub fn translation_request(&self, transcript: &str, target: &Language) -> AnswerRequest {
        AnswerRequest::new(transcript)
            .with_system_instruction(format!("Translate to {}: \"{}\"", target.name, transcript))
    }
}

pub mod orchestrator;

pub use orchestrator::{
    ANSWER_FAILED_MESSAGE, DEFAULT_AUTO_IDLE, EMPTY_ANSWER_TEXT, InteractionOrchestrator, InteractionSnapshot,
};

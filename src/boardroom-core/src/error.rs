//! Error types for the meeting system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetingError {
    /// A persona or backend was used before it was fully configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The text-generation call failed. Never caught inside orchestration
    /// primitives; surfaces to the caller of the meeting run.
    #[error("OpenAI API error: {0}")]
    Backend(#[from] async_openai::error::OpenAIError),

    /// Audio rendering failed. Contained at the point of use.
    #[error("Audio rendering error: {0}")]
    Audio(String),

    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Transcript write failed: {0}")]
    Io(#[from] std::io::Error),
}

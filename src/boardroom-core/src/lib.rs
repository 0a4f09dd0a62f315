//! Boardroom core library.
//!
//! Simulated executive strategy meetings: a data-driven persona registry,
//! meeting orchestration primitives, an append-only transcript, and
//! optional audio rendering of each statement.

pub mod backend;
pub mod config;
pub mod error;
pub mod meeting;
pub mod persona;
pub mod scenario;
pub mod tts;

pub use backend::{BackendConfig, ChatBackend, OpenAiBackend};
pub use config::{Config, default_config};
pub use error::MeetingError;
pub use meeting::{DEFAULT_TRANSCRIPT_PATH, MeetingEvent, MeetingSession, Statement};
pub use persona::{Persona, PersonaSpec};
pub use scenario::{Scenario, available_scenarios};
pub use tts::{AudioRenderer, KokoroRenderer};

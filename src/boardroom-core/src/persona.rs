//! Persona definitions.
//!
//! A persona models one organizational role with a fixed viewpoint
//! (title, expertise, personality) that biases everything it says.
//! Specialization is data-driven: one generic type, many descriptors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::ChatBackend;
use crate::config::PromptsConfig;
use crate::error::MeetingError;

/// Token budget for a topic-opening statement.
const OPENING_MAX_TOKENS: u32 = 400;
/// Token budget for a reply to a colleague.
const REPLY_MAX_TOKENS: u32 = 350;

/// Descriptor for one meeting participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaSpec {
    /// Stable identifier used to address this persona ("ceo", "cfo", ...).
    pub role_key: String,
    /// Display name, e.g. "Sarah Chen".
    pub name: String,
    /// Job title, e.g. "Chief Executive Officer (CEO)".
    pub title: String,
    /// Areas of expertise, in presentation order.
    pub expertise: Vec<String>,
    /// Free-text personality used to color generated statements.
    pub personality: String,
    /// Chat model used for this persona's statements.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// A fixed-viewpoint meeting participant.
///
/// Both operations are pure with respect to session state: they build a
/// prompt from the persona's viewpoint and call the attached backend.
/// Recording results is the orchestrator's job.
#[derive(Clone)]
pub struct Persona {
    spec: PersonaSpec,
    system_prompt: String,
    reply_template: String,
    backend: Option<Arc<dyn ChatBackend>>,
}

impl Persona {
    /// Build a persona from its descriptor and the prompt templates.
    pub fn new(spec: PersonaSpec, prompts: &PromptsConfig, company: &str) -> Self {
        let system_prompt = prompts.system_prompt(&spec, company);
        Self {
            spec,
            system_prompt,
            reply_template: prompts.reply_template.clone(),
            backend: None,
        }
    }

    /// Attach the text-generation backend.
    pub fn with_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn role_key(&self) -> &str {
        &self.spec.role_key
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    /// The fully rendered system prompt for this persona.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn backend(&self) -> Result<&Arc<dyn ChatBackend>, MeetingError> {
        self.backend.as_ref().ok_or_else(|| {
            MeetingError::Configuration(format!(
                "no chat backend attached to persona '{}'",
                self.spec.role_key
            ))
        })
    }

    /// Produce a first-person statement on `topic` from this persona's
    /// fixed viewpoint.
    pub async fn opening_statement(
        &self,
        topic: &str,
        context: &str,
    ) -> Result<String, MeetingError> {
        let backend = self.backend()?;
        let prompt = format!("Topic: {topic}\n\nContext: {context}");
        backend
            .complete(&self.spec.model, &self.system_prompt, &prompt, OPENING_MAX_TOKENS)
            .await
    }

    /// Respond to a colleague's statement: extend it, counter it, or raise
    /// a concern from this persona's area of expertise.
    pub async fn reply(
        &self,
        colleague_name: &str,
        colleague_statement: &str,
        topic: &str,
    ) -> Result<String, MeetingError> {
        let backend = self.backend()?;
        let prompt = self
            .reply_template
            .replace("{colleague_name}", colleague_name)
            .replace("{colleague_statement}", colleague_statement)
            .replace("{topic}", topic);
        backend
            .complete(&self.spec.model, &self.system_prompt, &prompt, REPLY_MAX_TOKENS)
            .await
    }
}

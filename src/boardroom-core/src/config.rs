//! Configuration module for the meeting roster, voices, and prompts.
//!
//! A configuration can be loaded from a TOML file or taken from the
//! built-in default roster embedded in the binary.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::MeetingError;
use crate::persona::{Persona, PersonaSpec};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub meeting: MeetingConfig,
    pub personas: Vec<PersonaSpec>,
    #[serde(default)]
    pub voices: VoicesConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
}

/// Meeting-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    /// Company name substituted into persona prompts.
    pub company: String,
    /// role_key of the persona that opens and closes meetings.
    #[serde(default = "default_chair")]
    pub chair: String,
}

fn default_chair() -> String {
    "ceo".to_string()
}

/// Voice configuration for TTS, keyed by role_key.
#[derive(Debug, Clone, Deserialize)]
pub struct VoicesConfig {
    #[serde(default = "default_voice")]
    pub default_voice: String,
    #[serde(default)]
    pub speakers: BTreeMap<String, String>,
}

fn default_voice() -> String {
    "af_sky".to_string()
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            speakers: BTreeMap::new(),
        }
    }
}

impl VoicesConfig {
    /// Voice ID for a speaker, falling back to the default voice.
    pub fn voice_for(&self, role_key: &str) -> &str {
        self.speakers
            .get(role_key)
            .map(String::as_str)
            .unwrap_or(&self.default_voice)
    }
}

/// Prompt templates with `{placeholder}` substitution.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    #[serde(default = "default_system_template")]
    pub system_template: String,
    #[serde(default = "default_reply_template")]
    pub reply_template: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            system_template: default_system_template(),
            reply_template: default_reply_template(),
        }
    }
}

impl PromptsConfig {
    /// Render the system prompt for one persona descriptor.
    pub fn system_prompt(&self, spec: &PersonaSpec, company: &str) -> String {
        self.system_template
            .replace("{name}", &spec.name)
            .replace("{title}", &spec.title)
            .replace("{company}", company)
            .replace("{expertise}", &spec.expertise.join(", "))
            .replace("{personality}", &spec.personality)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MeetingError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| MeetingError::Configuration(format!("Failed to read config: {e}")))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, MeetingError> {
        toml::from_str(content)
            .map_err(|e| MeetingError::Configuration(format!("Failed to parse config: {e}")))
    }

    /// Build the persona registry in declaration order. Backends are
    /// attached separately.
    pub fn build_personas(&self) -> Vec<Persona> {
        self.personas
            .iter()
            .map(|spec| Persona::new(spec.clone(), &self.prompts, &self.meeting.company))
            .collect()
    }
}

fn default_system_template() -> String {
    DEFAULT_SYSTEM_TEMPLATE.to_string()
}

fn default_reply_template() -> String {
    DEFAULT_REPLY_TEMPLATE.to_string()
}

const DEFAULT_SYSTEM_TEMPLATE: &str = r#"You are {name}, the {title} at {company}.

Your expertise: {expertise}
Your personality: {personality}

You are participating in a corporate strategy meeting. Provide thoughtful, data-driven insights from your perspective.
Be respectful of other team members' viewpoints while advocating for your department's priorities.
Keep responses concise (2-3 sentences) unless asked for more detail.
Use real business terminology and concepts relevant to your role."#;

const DEFAULT_REPLY_TEMPLATE: &str = r#"Your colleague {colleague_name} just said:
"{colleague_statement}"

You're discussing: {topic}

Provide a thoughtful response that either builds on their idea, offers an alternative perspective,
or raises important considerations from your area of expertise."#;

/// Default configuration embedded in the binary: the TechVenture Corp
/// executive roster.
pub fn default_config() -> Config {
    let spec = |role_key: &str, name: &str, title: &str, expertise: &[&str], personality: &str| {
        PersonaSpec {
            role_key: role_key.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            expertise: expertise.iter().map(|s| s.to_string()).collect(),
            personality: personality.to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    };

    let personas = vec![
        spec(
            "ceo",
            "Sarah Chen",
            "Chief Executive Officer (CEO)",
            &[
                "Strategic Planning",
                "Market Leadership",
                "Stakeholder Management",
                "Business Growth",
            ],
            "Visionary, decisive, and focused on long-term value creation. \
             Values strategic alignment and shareholder returns.",
        ),
        spec(
            "cfo",
            "Marcus Johnson",
            "Chief Financial Officer (CFO)",
            &[
                "Financial Planning",
                "Risk Management",
                "Budget Allocation",
                "ROI Analysis",
            ],
            "Data-driven, risk-conscious, and pragmatic. Ensures financial \
             sustainability and scrutinizes spending.",
        ),
        spec(
            "cto",
            "Priya Patel",
            "Chief Technology Officer (CTO)",
            &[
                "AI/ML Innovation",
                "Cloud Infrastructure",
                "System Architecture",
                "Tech Stack Selection",
            ],
            "Technically ambitious, forward-thinking, and passionate about \
             cutting-edge solutions. Sometimes optimistic about timelines.",
        ),
        spec(
            "coo",
            "James Wilson",
            "Chief Operating Officer (COO)",
            &[
                "Operations Management",
                "Process Optimization",
                "Team Productivity",
                "Supply Chain",
            ],
            "Detail-oriented, process-focused, and pragmatic. Concerned with \
             execution realities and team capabilities.",
        ),
        spec(
            "marketing",
            "Elena Rodriguez",
            "Vice President of Marketing",
            &[
                "Market Research",
                "Customer Acquisition",
                "Brand Positioning",
                "Product Launch",
            ],
            "Customer-centric, creative, and data-focused. Advocates for \
             customer needs and market realities.",
        ),
    ];

    let mut speakers = BTreeMap::new();
    speakers.insert("ceo".to_string(), "af_heart".to_string());
    speakers.insert("cfo".to_string(), "bm_george".to_string());
    speakers.insert("cto".to_string(), "bf_emma".to_string());
    speakers.insert("coo".to_string(), "am_michael".to_string());
    speakers.insert("marketing".to_string(), "af_bella".to_string());

    Config {
        meeting: MeetingConfig {
            company: "TechVenture Corp".to_string(),
            chair: "ceo".to_string(),
        },
        personas,
        voices: VoicesConfig {
            default_voice: default_voice(),
            speakers,
        },
        prompts: PromptsConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_has_five_executives_in_order() {
        let config = default_config();
        let keys: Vec<&str> = config.personas.iter().map(|p| p.role_key.as_str()).collect();
        assert_eq!(keys, vec!["ceo", "cfo", "cto", "coo", "marketing"]);
        assert_eq!(config.meeting.chair, "ceo");
    }

    #[test]
    fn voice_lookup_falls_back_to_default() {
        let config = default_config();
        assert_eq!(config.voices.voice_for("cfo"), "bm_george");
        assert_eq!(config.voices.voice_for("intern"), config.voices.default_voice);
    }

    #[test]
    fn parse_minimal_toml_config() {
        let toml = r#"
            [meeting]
            company = "Acme Inc"

            [[personas]]
            role_key = "ceo"
            name = "Jo Smith"
            title = "CEO"
            expertise = ["Vision"]
            personality = "Calm and direct."
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.meeting.company, "Acme Inc");
        assert_eq!(config.meeting.chair, "ceo");
        assert_eq!(config.personas.len(), 1);
        assert_eq!(config.personas[0].model, "gpt-4o-mini");
    }

    #[test]
    fn parse_rejects_invalid_toml() {
        let err = Config::parse("not = [valid").unwrap_err();
        assert!(matches!(err, MeetingError::Configuration(_)));
    }

    #[test]
    fn system_prompt_substitutes_placeholders() {
        let config = default_config();
        let prompt = config
            .prompts
            .system_prompt(&config.personas[1], &config.meeting.company);
        assert!(prompt.contains("Marcus Johnson"));
        assert!(prompt.contains("Financial Planning, Risk Management"));
        assert!(!prompt.contains("{name}"));
        assert!(!prompt.contains("{expertise}"));
    }
}

//! Meeting orchestration.
//!
//! Sequences persona calls across the discussion formats (opening, topic
//! discussion, structured debate, round table, closing) and keeps the
//! transcript in exact call order. Each generation call is awaited before
//! the next begins, so transcript ordering is total.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MeetingError;
use crate::persona::Persona;
use crate::tts::AudioRenderer;

/// Default transcript destination for a full meeting.
pub const DEFAULT_TRANSCRIPT_PATH: &str = "meeting_transcript.txt";

/// Default number of respondents in a topic discussion.
pub const DEFAULT_MAX_RESPONSES: usize = 3;

const OPENING_TOPIC: &str = "Open a quarterly strategy meeting by setting the agenda \
                             for discussing AI innovation and market expansion";

const CLOSING_TOPIC: &str = "Provide closing remarks summarizing the key decisions \
                             and next steps from this strategy meeting";

/// One recorded utterance, attributed to a persona. Never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// role_key of the speaker.
    pub speaker: String,
    /// Speaker's title, used as the transcript header.
    pub title: String,
    /// Statement body.
    pub text: String,
}

impl Statement {
    /// Transcript block: header line plus body.
    pub fn render(&self) -> String {
        format!("[{}]\n{}\n", self.title, self.text)
    }
}

/// Events emitted while a meeting runs. Console formatting lives with the
/// consumer, not the orchestrator.
#[derive(Debug, Clone)]
pub enum MeetingEvent {
    /// A new agenda section is starting.
    SectionStart { heading: String },
    /// A persona is about to speak; their generation call follows.
    SpeakerStart {
        role_key: String,
        name: String,
        title: String,
    },
    /// A persona's statement was produced and is being recorded.
    SpeakerStatement {
        role_key: String,
        name: String,
        title: String,
        text: String,
    },
    /// The meeting has concluded and the transcript is saved.
    MeetingEnd,
}

/// Callback for meeting events.
pub type MeetingCallback = Box<dyn Fn(MeetingEvent) + Send + Sync>;

/// Orchestrates one meeting session.
///
/// Owns the persona registry (insertion order = agenda order), the
/// transcript, and the optional audio renderer. Generation failures
/// propagate out of every primitive; audio failures are logged and
/// swallowed so they never abort a meeting.
pub struct MeetingSession {
    personas: Vec<Persona>,
    /// role_key of the persona that opens and closes meetings.
    chair: String,
    transcript: Vec<Statement>,
    audio: Option<Box<dyn AudioRenderer>>,
    callback: Option<MeetingCallback>,
}

impl MeetingSession {
    /// Create a session over the given registry. The first persona chairs
    /// the meeting unless [`with_chair`](Self::with_chair) overrides it.
    pub fn new(personas: Vec<Persona>) -> Result<Self, MeetingError> {
        let chair = personas
            .first()
            .map(|p| p.role_key().to_string())
            .ok_or_else(|| {
                MeetingError::Configuration("a meeting needs at least one persona".to_string())
            })?;

        Ok(Self {
            personas,
            chair,
            transcript: Vec::new(),
            audio: None,
            callback: None,
        })
    }

    pub fn with_chair(mut self, role_key: impl Into<String>) -> Self {
        self.chair = role_key.into();
        self
    }

    /// Attach an audio renderer. Rendering failures never abort the run.
    pub fn with_audio(mut self, renderer: Box<dyn AudioRenderer>) -> Self {
        self.audio = Some(renderer);
        self
    }

    /// Set a callback for meeting events.
    pub fn with_callback(mut self, callback: MeetingCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn transcript(&self) -> &[Statement] {
        &self.transcript
    }

    fn persona(&self, role_key: &str) -> Result<&Persona, MeetingError> {
        self.personas
            .iter()
            .find(|p| p.role_key() == role_key)
            .ok_or_else(|| MeetingError::UnknownPersona(role_key.to_string()))
    }

    pub(crate) fn emit(&self, event: MeetingEvent) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }

    fn section(&self, heading: impl Into<String>) {
        self.emit(MeetingEvent::SectionStart {
            heading: heading.into(),
        });
    }

    /// Announce the next speaker before their generation call starts.
    fn announce(&self, role_key: &str) -> Result<(), MeetingError> {
        let persona = self.persona(role_key)?;
        self.emit(MeetingEvent::SpeakerStart {
            role_key: role_key.to_string(),
            name: persona.name().to_string(),
            title: persona.title().to_string(),
        });
        Ok(())
    }

    /// Record one statement: notify the callback, forward to audio, append
    /// to the transcript. Audio failures are logged and swallowed here.
    fn record(&mut self, role_key: &str, text: String) -> Result<(), MeetingError> {
        let persona = self.persona(role_key)?;
        let name = persona.name().to_string();
        let title = persona.title().to_string();

        self.emit(MeetingEvent::SpeakerStatement {
            role_key: role_key.to_string(),
            name: name.clone(),
            title: title.clone(),
            text: text.clone(),
        });

        if let Some(renderer) = self.audio.as_mut() {
            if let Err(e) = renderer.render(&text, role_key) {
                eprintln!("[TTS Error] {name}: {e}");
            }
        }

        self.transcript.push(Statement {
            speaker: role_key.to_string(),
            title,
            text,
        });

        Ok(())
    }

    /// The chair opens the meeting with agenda-setting remarks.
    pub async fn open_meeting(&mut self) -> Result<(), MeetingError> {
        self.section("QUARTERLY STRATEGY MEETING");

        let chair = self.chair.clone();
        self.announce(&chair)?;
        let opening = self.persona(&chair)?.opening_statement(OPENING_TOPIC, "").await?;
        self.record(&chair, opening)
    }

    /// Facilitate a discussion: the primary speaker opens the topic, then
    /// up to `max_responses` other personas reply in registry insertion
    /// order. If `max_responses` exceeds the number of other personas,
    /// every other persona responds exactly once.
    pub async fn discuss_topic(
        &mut self,
        topic: &str,
        primary_speaker: &str,
        max_responses: usize,
    ) -> Result<(), MeetingError> {
        self.section(format!("TOPIC: {topic}"));

        self.announce(primary_speaker)?;
        let primary = self.persona(primary_speaker)?;
        let primary_name = primary.name().to_string();
        let opening = primary.opening_statement(topic, "").await?;
        self.record(primary_speaker, opening.clone())?;

        let respondents: Vec<String> = self
            .personas
            .iter()
            .map(|p| p.role_key().to_string())
            .filter(|key| key != primary_speaker)
            .take(max_responses)
            .collect();

        for key in respondents {
            self.announce(&key)?;
            let response = self.persona(&key)?.reply(&primary_name, &opening, topic).await?;
            self.record(&key, response)?;
        }

        Ok(())
    }

    /// A two-sided structured debate: side1 argues for the topic, side2
    /// responds, side1 rebuts. Exactly three statements.
    pub async fn facilitate_debate(
        &mut self,
        topic: &str,
        side1: &str,
        side2: &str,
    ) -> Result<(), MeetingError> {
        self.section(format!("DEBATE: {topic}"));

        let name1 = self.persona(side1)?.name().to_string();
        let name2 = self.persona(side2)?.name().to_string();

        let argue = format!("Argue for: {topic}");
        self.announce(side1)?;
        let statement1 = self.persona(side1)?.opening_statement(&argue, "").await?;
        self.record(side1, statement1.clone())?;

        self.announce(side2)?;
        let statement2 = self.persona(side2)?.reply(&name1, &statement1, topic).await?;
        self.record(side2, statement2.clone())?;

        self.announce(side1)?;
        let rebuttal = self.persona(side1)?.reply(&name2, &statement2, topic).await?;
        self.record(side1, rebuttal)
    }

    /// Every persona contributes one statement on `topic`, in registry
    /// insertion order. Nobody is skipped.
    pub async fn round_table_discussion(&mut self, topic: &str) -> Result<(), MeetingError> {
        self.section(format!("ROUND TABLE: {topic}"));

        let keys: Vec<String> = self
            .personas
            .iter()
            .map(|p| p.role_key().to_string())
            .collect();

        for key in keys {
            self.announce(&key)?;
            let thought = self.persona(&key)?.opening_statement(topic, "").await?;
            self.record(&key, thought)?;
        }

        Ok(())
    }

    /// The chair summarizes decisions and next steps.
    pub async fn closing_remarks(&mut self) -> Result<(), MeetingError> {
        self.section("CLOSING REMARKS");

        let chair = self.chair.clone();
        self.announce(&chair)?;
        let closing = self.persona(&chair)?.opening_statement(CLOSING_TOPIC, "").await?;
        self.record(&chair, closing)
    }

    /// Render the transcript as newline-joined statement blocks, in
    /// recorded order.
    pub fn render_transcript(&self) -> String {
        self.transcript
            .iter()
            .map(Statement::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the transcript to `path`, replacing any existing file. The
    /// in-memory transcript is untouched.
    pub fn save_transcript<P: AsRef<Path>>(&self, path: P) -> Result<(), MeetingError> {
        fs::write(path, self.render_transcript())?;
        Ok(())
    }

    /// The scripted quarterly strategy meeting: opening, topic discussions,
    /// a budget debate, a round table, closing remarks, and the saved
    /// transcript.
    pub async fn run_full_meeting(&mut self) -> Result<(), MeetingError> {
        self.open_meeting().await?;

        self.discuss_topic(
            "Should we invest heavily in in-house AI/ML capabilities or partner \
             with external AI providers?",
            "cto",
            DEFAULT_MAX_RESPONSES,
        )
        .await?;

        self.facilitate_debate(
            "Budget Allocation: R&D Investment vs Shareholder Returns",
            "cto",
            "cfo",
        )
        .await?;

        self.round_table_discussion(
            "How should we position TechVenture in emerging markets while \
             managing operational complexity?",
        )
        .await?;

        self.discuss_topic(
            "What are the key talent challenges in scaling our AI team?",
            "coo",
            DEFAULT_MAX_RESPONSES,
        )
        .await?;

        self.discuss_topic(
            "What should be our primary competitive advantage in the next 18 months?",
            "marketing",
            DEFAULT_MAX_RESPONSES,
        )
        .await?;

        self.closing_remarks().await?;
        self.save_transcript(DEFAULT_TRANSCRIPT_PATH)?;
        self.emit(MeetingEvent::MeetingEnd);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ChatBackend;
    use crate::config::default_config;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct CannedBackend;

    #[async_trait]
    impl ChatBackend for CannedBackend {
        async fn complete(
            &self,
            _model: &str,
            _system_prompt: &str,
            user_prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, MeetingError> {
            Ok(format!("position on: {}", user_prompt.lines().next().unwrap_or("")))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ChatBackend for FailingBackend {
        async fn complete(
            &self,
            _model: &str,
            _system_prompt: &str,
            _user_prompt: &str,
            _max_tokens: u32,
        ) -> Result<String, MeetingError> {
            Err(MeetingError::Configuration("simulated backend outage".to_string()))
        }
    }

    struct FailingRenderer;

    impl AudioRenderer for FailingRenderer {
        fn render(&mut self, _text: &str, _speaker: &str) -> Result<PathBuf, MeetingError> {
            Err(MeetingError::Audio("no audio device".to_string()))
        }
    }

    fn session_with(backend: Arc<dyn ChatBackend>) -> MeetingSession {
        let config = default_config();
        let personas = config
            .build_personas()
            .into_iter()
            .map(|p| p.with_backend(backend.clone()))
            .collect();
        MeetingSession::new(personas)
            .unwrap()
            .with_chair(&config.meeting.chair)
    }

    fn session() -> MeetingSession {
        session_with(Arc::new(CannedBackend))
    }

    fn speakers(session: &MeetingSession) -> Vec<&str> {
        session.transcript().iter().map(|s| s.speaker.as_str()).collect()
    }

    #[test]
    fn empty_registry_is_rejected() {
        let err = MeetingSession::new(Vec::new()).unwrap_err();
        assert!(matches!(err, MeetingError::Configuration(_)));
    }

    #[tokio::test]
    async fn discuss_topic_records_primary_first_then_others_in_order() {
        let mut session = session();
        session.discuss_topic("X", "ceo", 3).await.unwrap();
        assert_eq!(speakers(&session), vec!["ceo", "cfo", "cto", "coo"]);
    }

    #[tokio::test]
    async fn discuss_topic_skips_primary_among_respondents() {
        let mut session = session();
        session.discuss_topic("X", "cto", 3).await.unwrap();
        assert_eq!(speakers(&session), vec!["cto", "ceo", "cfo", "coo"]);
    }

    #[tokio::test]
    async fn discuss_topic_caps_responses_at_available_personas() {
        let mut session = session();
        session.discuss_topic("X", "ceo", 10).await.unwrap();
        // 1 opening + each of the 4 others exactly once
        assert_eq!(speakers(&session), vec!["ceo", "cfo", "cto", "coo", "marketing"]);
    }

    #[tokio::test]
    async fn discuss_topic_with_zero_responses_records_only_primary() {
        let mut session = session();
        session.discuss_topic("X", "cfo", 0).await.unwrap();
        assert_eq!(speakers(&session), vec!["cfo"]);
    }

    #[tokio::test]
    async fn discuss_topic_rejects_unknown_primary() {
        let mut session = session();
        let err = session.discuss_topic("X", "intern", 3).await.unwrap_err();
        assert!(matches!(err, MeetingError::UnknownPersona(_)));
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn debate_records_exactly_three_statements_in_order() {
        let mut session = session();
        session.facilitate_debate("R&D vs returns", "cto", "cfo").await.unwrap();
        assert_eq!(speakers(&session), vec!["cto", "cfo", "cto"]);
    }

    #[tokio::test]
    async fn round_table_covers_every_persona_once_in_order() {
        let mut session = session();
        session.round_table_discussion("Y").await.unwrap();
        assert_eq!(speakers(&session), vec!["ceo", "cfo", "cto", "coo", "marketing"]);
    }

    #[tokio::test]
    async fn open_and_closing_are_spoken_by_the_chair() {
        let mut session = session();
        session.open_meeting().await.unwrap();
        session.closing_remarks().await.unwrap();
        assert_eq!(speakers(&session), vec!["ceo", "ceo"]);
    }

    #[tokio::test]
    async fn backend_failure_propagates_and_records_nothing() {
        let mut session = session_with(Arc::new(FailingBackend));
        assert!(session.discuss_topic("X", "ceo", 3).await.is_err());
        assert!(session.round_table_discussion("Y").await.is_err());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn audio_failure_never_aborts_the_meeting() {
        let mut session = session().with_audio(Box::new(FailingRenderer));
        session.round_table_discussion("Y").await.unwrap();
        assert_eq!(session.transcript().len(), 5);
    }

    #[tokio::test]
    async fn transcript_round_trips_through_save() {
        let mut session = session();
        session.facilitate_debate("Z", "ceo", "cfo").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");
        session.save_transcript(&path).unwrap();

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, session.render_transcript());

        let blocks: Vec<String> = session.transcript().iter().map(Statement::render).collect();
        assert_eq!(on_disk, blocks.join("\n"));
        assert!(on_disk.starts_with("[Chief Executive Officer (CEO)]\n"));
    }

    #[tokio::test]
    async fn save_transcript_is_idempotent() {
        let mut session = session();
        session.discuss_topic("X", "ceo", 2).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.txt");

        session.save_transcript(&path).unwrap();
        let first = std::fs::read(&path).unwrap();
        session.save_transcript(&path).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.transcript().len(), 3);
    }

    fn tagging_callback(sink: Arc<std::sync::Mutex<Vec<String>>>) -> MeetingCallback {
        Box::new(move |event| {
            let tag = match event {
                MeetingEvent::SectionStart { .. } => "section".to_string(),
                MeetingEvent::SpeakerStart { role_key, .. } => format!("start:{role_key}"),
                MeetingEvent::SpeakerStatement { role_key, .. } => format!("said:{role_key}"),
                MeetingEvent::MeetingEnd => "end".to_string(),
            };
            sink.lock().unwrap().push(tag);
        })
    }

    #[tokio::test]
    async fn each_speaker_is_announced_before_their_statement() {
        use std::sync::Mutex;

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let mut session = session().with_callback(tagging_callback(seen.clone()));

        session.facilitate_debate("Z", "coo", "marketing").await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "section",
                "start:coo",
                "said:coo",
                "start:marketing",
                "said:marketing",
                "start:coo",
                "said:coo",
            ]
        );
    }

    #[tokio::test]
    async fn full_meeting_emits_meeting_end_once_after_saving() {
        use std::sync::Mutex;

        // Relative transcript path; point the working directory at a
        // scratch dir. No other test relies on the working directory.
        let dir = tempfile::tempdir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let mut session = session().with_callback(tagging_callback(seen.clone()));

        session.run_full_meeting().await.unwrap();

        let events = seen.lock().unwrap();
        assert_eq!(events.last().map(String::as_str), Some("end"));
        assert_eq!(events.iter().filter(|tag| *tag == "end").count(), 1);
        assert!(dir.path().join(DEFAULT_TRANSCRIPT_PATH).exists());
    }
}

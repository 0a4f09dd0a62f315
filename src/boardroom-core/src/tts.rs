//! Text-to-speech rendering for meeting statements using kokoro-tiny.
//!
//! Audio is an optional collaborator: the orchestrator forwards each
//! statement here and swallows any failure, so a broken audio stack never
//! stops a meeting.

use std::path::{Path, PathBuf};

use kokoro_tiny::TtsEngine;

use crate::config::VoicesConfig;
use crate::error::MeetingError;

/// Kokoro output sample rate.
const SAMPLE_RATE: u32 = 24_000;
/// Kokoro has a strict input length limit, so text is synthesized in
/// chunks of at most this many characters.
const CHUNK_CHARS: usize = 200;

/// Audio-rendering collaborator. Renders one statement and returns the
/// written artifact path.
pub trait AudioRenderer: Send {
    fn render(&mut self, text: &str, speaker: &str) -> Result<PathBuf, MeetingError>;
}

/// TTS renderer backed by kokoro-tiny, writing one WAV artifact per
/// speaker into the output directory.
pub struct KokoroRenderer {
    engine: TtsEngine,
    voices: VoicesConfig,
    available_voices: Vec<String>,
    output_dir: PathBuf,
}

impl KokoroRenderer {
    /// Initialize the TTS engine (downloads the model on first run).
    pub async fn new(voices: VoicesConfig) -> Result<Self, MeetingError> {
        let engine = TtsEngine::new()
            .await
            .map_err(|e| MeetingError::Audio(format!("Failed to initialize TTS: {e}")))?;

        let available_voices = engine.voices();
        let output_dir = PathBuf::from("audio_output");
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| MeetingError::Audio(format!("Failed to create audio dir: {e}")))?;

        Ok(Self {
            engine,
            voices,
            available_voices,
            output_dir,
        })
    }

    fn resolve_voice(&self, speaker: &str) -> String {
        let voice = self.voices.voice_for(speaker);
        if self.available_voices.iter().any(|v| v == voice) {
            voice.to_string()
        } else {
            // Unknown voice in config; fall back rather than fail the run
            self.voices.default_voice.clone()
        }
    }

    /// Synthesize text in chunks to stay under the kokoro input limit,
    /// with short pauses between chunks so words are not cut off.
    fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, MeetingError> {
        let mut all_samples = Vec::new();

        for chunk in split_into_chunks(text, CHUNK_CHARS) {
            let samples = self
                .engine
                .synthesize(&chunk, Some(voice_id))
                .map_err(|e| MeetingError::Audio(format!("Synthesis failed: {e}")))?;

            all_samples.extend(samples);
            // 0.3 s pause between chunks
            all_samples.extend(std::iter::repeat(0.0).take(7200));
        }

        // trailing 0.5 s so the last word is not clipped
        all_samples.extend(std::iter::repeat(0.0).take(12000));
        Ok(all_samples)
    }
}

impl AudioRenderer for KokoroRenderer {
    fn render(&mut self, text: &str, speaker: &str) -> Result<PathBuf, MeetingError> {
        let voice = self.resolve_voice(speaker);
        let samples = self.synthesize(text, &voice)?;
        let path = self.output_dir.join(artifact_filename(speaker));
        write_wav(&path, &samples)?;
        Ok(path)
    }
}

/// Write mono float samples as a WAV file.
fn write_wav(path: &Path, samples: &[f32]) -> Result<(), MeetingError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| MeetingError::Audio(format!("Failed to create {}: {e}", path.display())))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| MeetingError::Audio(format!("Failed to write sample: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| MeetingError::Audio(format!("Failed to finalize WAV: {e}")))
}

/// WAV artifact name for a speaker, overwritten on each statement.
fn artifact_filename(speaker: &str) -> String {
    let sanitized: String = speaker
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{sanitized}.wav")
}

/// Split text into synthesis-safe chunks at sentence boundaries, falling
/// back to comma boundaries for very long sentences.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let mut push_part = |current: &mut String, part: &str| {
        if !current.is_empty() && current.len() + part.len() + 1 > max_chars {
            chunks.push(current.trim().to_string());
            current.clear();
        }
        current.push_str(part);
        current.push(' ');
    };

    for sentence in text.split_inclusive(&['.', '!', '?', ';'][..]) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if sentence.len() > max_chars {
            for part in sentence.split_inclusive(',') {
                let part = part.trim();
                if !part.is_empty() {
                    push_part(&mut current, part);
                }
            }
        } else {
            push_part(&mut current, sentence);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_the_size_limit() {
        let text = "First point here. Second point follows. A third one closes it out.";
        let chunks = split_into_chunks(text, 30);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() <= 35, "chunk too long: {chunk}");
        }
    }

    #[test]
    fn long_sentences_split_on_commas() {
        let text = "one very long clause, another very long clause, and yet another very long clause.";
        let chunks = split_into_chunks(text, 30);
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_into_chunks("", 200).is_empty());
        assert!(split_into_chunks("   ", 200).is_empty());
    }

    #[test]
    fn artifact_names_are_filesystem_safe() {
        assert_eq!(artifact_filename("ceo"), "ceo.wav");
        assert_eq!(artifact_filename("vp/marketing"), "vp_marketing.wav");
    }
}

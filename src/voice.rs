//! Speech capture gate
//!
//! Converts a microphone session into validated text, suppressing clips that
//! are unlikely to contain usable speech before spending a transcription
//! call. Two weak signals are combined: encoded payload size and the peak of
//! the amplitude envelope sampled during recording. A clip is rejected as
//! silent only when BOTH are low; requiring both avoids dropping
//! quiet-but-real speech (low energy, adequate size) as well as short loud
//! bursts (small size, high energy).

use crate::ai::{AudioClip, CompletionProvider};
use crate::config::VoiceConfig;
use crate::i18n::Language;
use crate::{Result, TabiPlanError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why a recording attempt produced no query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Stopped before the minimum recording duration
    TooShort,
    /// Payload and peak amplitude were both below their floors
    NoSpeech,
    /// Transcription returned empty or whitespace-only text
    EmptyTranscript,
    /// Transcription returned fewer than two characters
    TranscriptTooShort,
    /// Transcription transport or service failure
    TranscriptionFailed,
}

impl GateRejection {
    /// Machine-readable kind, stable across languages
    #[must_use]
    pub fn kind(self) -> &'static str {
        match self {
            GateRejection::TooShort => "recording_too_short",
            GateRejection::NoSpeech => "no_speech_detected",
            GateRejection::EmptyTranscript => "empty_transcript",
            GateRejection::TranscriptTooShort => "transcript_too_short",
            GateRejection::TranscriptionFailed => "transcription_failed",
        }
    }

    /// User-facing message in the active display language
    #[must_use]
    pub fn user_message(self, language: Language) -> &'static str {
        match (self, language) {
            (GateRejection::TooShort, Language::Ja) => {
                "録音時間が短すぎます。もう一度お試しください。"
            }
            (GateRejection::TooShort, Language::En) => "Recording too short. Please try again.",
            (GateRejection::NoSpeech, Language::Ja) => {
                "音声が検出されませんでした。もう一度お試しください。"
            }
            (GateRejection::NoSpeech, Language::En) => "No speech detected. Please try again.",
            (GateRejection::EmptyTranscript, Language::Ja) => {
                "音声を認識できませんでした。もう一度お試しください。"
            }
            (GateRejection::EmptyTranscript, Language::En) => {
                "Could not recognize speech. Please try again."
            }
            (GateRejection::TranscriptTooShort, Language::Ja) => {
                "音声が短すぎます。もう一度はっきりと話してください。"
            }
            (GateRejection::TranscriptTooShort, Language::En) => {
                "Speech too short. Please speak clearly."
            }
            (GateRejection::TranscriptionFailed, Language::Ja) => {
                "音声の文字起こしに失敗しました。もう一度お試しください。"
            }
            (GateRejection::TranscriptionFailed, Language::En) => {
                "Failed to transcribe audio. Please try again."
            }
        }
    }
}

/// Final result of one recording attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The transcript is ready to feed into the planning pipeline
    Delivered(String),
    Rejected(GateRejection),
}

/// Releases the gate's exclusive session slot when dropped, whatever the
/// exit path
#[derive(Debug)]
struct SessionGuard {
    active: Arc<AtomicBool>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// One in-flight microphone capture
///
/// Accumulates encoded audio chunks and tracks the running maximum of the
/// sampled amplitude envelope until stopped.
#[derive(Debug)]
pub struct RecordingSession {
    config: VoiceConfig,
    started_at: Instant,
    payload: Vec<u8>,
    mime_type: String,
    peak_level: f32,
    _guard: SessionGuard,
}

/// A clip that passed the no-speech heuristic, still holding the gate's
/// session slot until transcription finishes
#[derive(Debug)]
pub struct CapturedClip {
    clip: AudioClip,
    _guard: SessionGuard,
}

/// What a stopped session turned into
#[derive(Debug)]
pub enum StopDecision {
    Captured(CapturedClip),
    Rejected(GateRejection),
}

impl RecordingSession {
    fn new(config: VoiceConfig, mime_type: String, guard: SessionGuard) -> Self {
        Self {
            config,
            started_at: Instant::now(),
            payload: Vec::new(),
            mime_type,
            peak_level: 0.0,
            _guard: guard,
        }
    }

    /// Append a chunk of encoded audio
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.payload.extend_from_slice(chunk);
    }

    /// Record one amplitude sample; only the running maximum is kept
    pub fn push_level(&mut self, level: f32) {
        if level.is_finite() {
            self.peak_level = self.peak_level.max(level);
        }
    }

    /// Peak amplitude normalized against the metric's maximum scale
    #[must_use]
    pub fn normalized_peak(&self) -> f32 {
        (self.peak_level / self.config.level_scale).clamp(0.0, 1.0)
    }

    /// Time since the session started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stop the session and apply the capture heuristics
    pub fn stop(self) -> StopDecision {
        let elapsed = self.started_at.elapsed();
        self.stop_with_elapsed(elapsed)
    }

    /// Stop with an externally measured duration, for payloads recorded
    /// upstream (the HTTP boundary receives finished clips together with
    /// the duration the client observed)
    pub fn stop_with_elapsed(self, elapsed: Duration) -> StopDecision {
        if elapsed < Duration::from_millis(self.config.min_duration_ms) {
            info!(
                "Recording stopped after {}ms, below the {}ms minimum",
                elapsed.as_millis(),
                self.config.min_duration_ms
            );
            return StopDecision::Rejected(GateRejection::TooShort);
        }

        let normalized_peak = self.normalized_peak();
        let no_speech = self.payload.len() < self.config.min_payload_bytes
            && normalized_peak < self.config.min_peak_level;

        debug!(
            "Gate check: {} bytes, normalized peak {:.3}",
            self.payload.len(),
            normalized_peak
        );

        if no_speech {
            info!("No speech detected, discarding clip without transcription");
            return StopDecision::Rejected(GateRejection::NoSpeech);
        }

        StopDecision::Captured(CapturedClip {
            clip: AudioClip::new(self.payload, self.mime_type),
            _guard: self._guard,
        })
    }
}

/// The speech capture gate
///
/// Owns the single-session exclusivity rule and the transcription step.
pub struct VoiceGate {
    provider: Arc<dyn CompletionProvider>,
    config: VoiceConfig,
    active: Arc<AtomicBool>,
}

impl VoiceGate {
    /// Create a new gate using the given transcription provider
    pub fn new(provider: Arc<dyn CompletionProvider>, config: VoiceConfig) -> Self {
        Self {
            provider,
            config,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a session is currently recording or processing
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Begin a recording session; fails while another session is active
    pub fn begin(&self, mime_type: impl Into<String>) -> Result<RecordingSession> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(TabiPlanError::validation(
                "a recording session is already active",
            ));
        }

        let guard = SessionGuard {
            active: Arc::clone(&self.active),
        };
        Ok(RecordingSession::new(
            self.config.clone(),
            mime_type.into(),
            guard,
        ))
    }

    /// Transcribe a captured clip and validate the transcript
    ///
    /// The session slot is released when `captured` is dropped at the end of
    /// this call, on success and failure alike.
    pub async fn transcribe(&self, captured: CapturedClip, language: Language) -> GateOutcome {
        let CapturedClip { clip, _guard } = captured;

        let text = match self.provider.transcribe(clip, language).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Transcription failed: {}", e);
                return GateOutcome::Rejected(GateRejection::TranscriptionFailed);
            }
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return GateOutcome::Rejected(GateRejection::EmptyTranscript);
        }
        if trimmed.chars().count() < 2 {
            return GateOutcome::Rejected(GateRejection::TranscriptTooShort);
        }

        info!("Delivered transcript of {} characters", trimmed.chars().count());
        GateOutcome::Delivered(trimmed.to_string())
    }
}

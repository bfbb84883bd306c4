//! Voice intake - push-to-talk speech capture and phrase-to-portal conversion.
//!
//! The speech engine itself is an external collaborator behind
//! [`SpeechEngine`]. Partial transcripts stream in through
//! [`VoiceIntake::on_transcript`]; releasing the speak key turns the last
//! transcript into a [`PortalConfig`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::components::Color;
use crate::config::WorldConfig;
use crate::error::SpeechError;

/// The portal's requested state. Identical phrases always produce the
/// same color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    pub is_open: bool,
    /// "#RRGGBB"
    pub color: String,
    pub description: String,
}

impl PortalConfig {
    /// Open portal for a spoken phrase
    pub fn from_phrase(description: &str) -> Self {
        Self {
            is_open: true,
            color: derive_color(description),
            description: description.to_string(),
        }
    }

    pub fn closed() -> Self {
        Self {
            is_open: false,
            color: "#000000".to_string(),
            description: String::new(),
        }
    }

    /// The config the world starts with
    pub fn initial(config: &WorldConfig) -> Self {
        Self {
            is_open: config.initial_portal_open,
            color: config.initial_portal_color.clone(),
            description: config.initial_portal_description.clone(),
        }
    }

    /// Same portal, shut
    pub fn to_closed(&self) -> Self {
        Self {
            is_open: false,
            ..self.clone()
        }
    }

    pub fn parsed_color(&self) -> Option<Color> {
        Color::parse_hex(&self.color)
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::initial(&WorldConfig::default())
    }
}

/// `h = unit + (h << 5) - h` over UTF-16 code units, wrapping at 32 bits
pub fn phrase_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    })
}

/// "#RRGGBB" from the low 24 bits of the phrase hash
pub fn derive_color(text: &str) -> String {
    format!("#{:06X}", phrase_hash(text) & 0x00FF_FFFF)
}

/// Whether a transcript is worth acting on
pub fn is_actionable(transcript: &str) -> bool {
    !transcript.trim().is_empty()
}

/// Speech-to-text collaborator
pub trait SpeechEngine {
    fn start(&mut self) -> Result<(), SpeechError>;
    fn stop(&mut self) -> Result<(), SpeechError>;
}

/// Push-to-talk state
pub struct VoiceIntake {
    engine: Option<Box<dyn SpeechEngine>>,
    listening: bool,
    transcript: String,
    disabled: bool,
}

impl VoiceIntake {
    pub fn new(engine: Option<Box<dyn SpeechEngine>>) -> Self {
        if engine.is_none() {
            log::warn!("Speech recognition not available, voice input disabled");
        }
        Self {
            engine,
            listening: false,
            transcript: String::new(),
            disabled: false,
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some() && !self.disabled
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Speak key pressed. Returns true when listening started, in which
    /// case the caller closes the portal.
    pub fn press(&mut self, locked: bool) -> bool {
        if !locked || self.listening || !self.is_available() {
            return false;
        }
        self.listening = true;
        self.transcript.clear();

        let result = match self.engine.as_mut() {
            Some(engine) => engine.start(),
            None => return false,
        };
        if let Err(e) = result {
            self.on_error(e);
        }
        // a permanent failure inside on_error ends the session before it began
        self.listening
    }

    /// Latest partial transcript; replaces the previous one
    pub fn on_transcript(&mut self, text: &str) {
        self.transcript.clear();
        self.transcript.push_str(text);
    }

    /// Speak key released. Returns the portal to open, if anything
    /// worth acting on was heard.
    pub fn release(&mut self) -> Option<PortalConfig> {
        if !self.listening {
            return None;
        }
        self.listening = false;

        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.stop() {
                log::warn!("Speech recognition stop failed: {}", e);
            }
        }

        if is_actionable(&self.transcript) {
            Some(PortalConfig::from_phrase(&self.transcript))
        } else {
            None
        }
    }

    /// Errors reported by the engine, synchronously or later
    pub fn on_error(&mut self, error: SpeechError) {
        if error.is_permanent() {
            log::warn!("Speech recognition unavailable ({}), voice input disabled", error);
            self.disabled = true;
            self.listening = false;
        } else {
            log::warn!("Speech recognition error: {}", error);
        }
    }
}

/// Calls seen by a [`ScriptedSpeech`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechCall {
    Start,
    Stop,
}

/// Shared view of a scripted engine's call history
pub type SpeechLog = Rc<RefCell<Vec<SpeechCall>>>;

/// Speech engine for headless sessions and tests. Transcripts are fed
/// through the engine's `on_transcript` entrypoint.
#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    log: SpeechLog,
    start_error: Option<SpeechError>,
    running: bool,
}

impl ScriptedSpeech {
    pub fn new() -> (Self, SpeechLog) {
        let speech = Self::default();
        let log = speech.log.clone();
        (speech, log)
    }

    /// Every start attempt fails with `error`
    pub fn failing(error: SpeechError) -> (Self, SpeechLog) {
        let (mut speech, log) = Self::new();
        speech.start_error = Some(error);
        (speech, log)
    }
}

impl SpeechEngine for ScriptedSpeech {
    fn start(&mut self) -> Result<(), SpeechError> {
        self.log.borrow_mut().push(SpeechCall::Start);
        if let Some(error) = &self.start_error {
            return Err(error.clone());
        }
        if self.running {
            return Err(SpeechError::AlreadyRunning);
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SpeechError> {
        self.log.borrow_mut().push(SpeechCall::Stop);
        if !self.running {
            return Err(SpeechError::NotRunning);
        }
        self.running = false;
        Ok(())
    }
}

//! Audio director - drives the generative score and UI blips from the
//! lock state, gaze pressure and portal cues.
//!
//! The synthesis backend is an external collaborator behind
//! [`AudioBackend`]; the director only issues [`AudioCommand`]s. The
//! output context is opened on the first user gesture, resumed on
//! demand, and never recreated.

use std::cell::RefCell;
use std::rc::Rc;

use rand::Rng;

use crate::config::AudioConfig;
use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Voice {
    Pad,
    Bass,
    Arp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

/// Musical note lengths used by the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLength {
    Measure,
    Eighth,
    Sixteenth,
}

impl NoteLength {
    /// Length in beats (quarter notes)
    pub fn beats(&self) -> f64 {
        match self {
            NoteLength::Measure => 4.0,
            NoteLength::Eighth => 0.5,
            NoteLength::Sixteenth => 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Build the instrument graph at the given master volume
    Setup { master_db: f32 },
    SetTempo { bpm: f32, ramp: f64 },
    StartTransport,
    StopTransport,
    StartAmbience,
    StopAmbience,
    RampVolume { voice: Voice, db: f32, seconds: f64 },
    ReleaseAll { voice: Voice },
    Play {
        voice: Voice,
        notes: Vec<&'static str>,
        length: NoteLength,
        velocity: f32,
    },
    DroneAttack { note: &'static str },
    DroneRamp {
        modulation_index: f32,
        harmonicity: f32,
        volume_db: f32,
        frequency: f32,
        seconds: f64,
    },
    DroneRelease,
    Blip { frequency: f32, waveform: Waveform, seconds: f32 },
}

/// Synthesis collaborator
pub trait AudioBackend {
    /// Create the output context. Called at most once successfully.
    fn open(&mut self) -> Result<(), AudioError>;
    fn resume(&mut self) -> Result<(), AudioError>;
    fn is_running(&self) -> bool;
    fn submit(&mut self, command: AudioCommand);
}

/// One measure of the progression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChordStep {
    pub chord: [&'static str; 4],
    pub bass: &'static str,
}

/// C minor progression: Cm, Ab, Fm9, G7sus
pub const PROGRESSION: [ChordStep; 4] = [
    ChordStep { chord: ["C3", "G3", "Eb4", "G4"], bass: "C2" },
    ChordStep { chord: ["Ab2", "Eb3", "Ab3", "C4"], bass: "Ab1" },
    ChordStep { chord: ["F2", "C3", "Eb3", "G3"], bass: "F1" },
    ChordStep { chord: ["G2", "D3", "F3", "Bb3"], bass: "G1" },
];

pub const ARP_NOTES: [&str; 5] = ["C5", "Eb5", "G5", "Bb5", "C6"];
pub const ARP_PATTERN: [bool; 8] = [true, false, true, true, false, true, false, false];
pub const ARP_STEPS: u32 = 16;
const ARP_SKIP_CHANCE: f32 = 0.2;

const CHORD_VELOCITY: f32 = 0.6;
const BASS_VELOCITY: f32 = 0.8;

/// Gaze above which the core drone sounds
pub const DRONE_THRESHOLD: f32 = 0.05;
const DRONE_NOTE: &str = "C1";

pub const CLICK_BLIP_HZ: f32 = 1200.0;
pub const PORTAL_CUE_HZ: f32 = 100.0;

/// Beat clock for the chord and arpeggio sequences. Runs only while the
/// transport does; stopping rewinds it.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    beats: f64,
    next_chord: u64,
    next_arp: u64,
}

impl Sequencer {
    pub fn rewind(&mut self) {
        *self = Self::default();
    }

    /// Advance by `dt` seconds at `bpm`, returning every note due
    pub fn advance(&mut self, dt: f64, bpm: f32, rng: &mut impl Rng) -> Vec<AudioCommand> {
        let mut due = Vec::new();
        self.beats += dt * bpm as f64 / 60.0;

        while self.next_chord as f64 * NoteLength::Measure.beats() <= self.beats {
            let step = PROGRESSION[(self.next_chord % PROGRESSION.len() as u64) as usize];
            due.push(AudioCommand::Play {
                voice: Voice::Pad,
                notes: step.chord.to_vec(),
                length: NoteLength::Measure,
                velocity: CHORD_VELOCITY,
            });
            due.push(AudioCommand::Play {
                voice: Voice::Bass,
                notes: vec![step.bass],
                length: NoteLength::Measure,
                velocity: BASS_VELOCITY,
            });
            self.next_chord += 1;
        }

        while self.next_arp as f64 * NoteLength::Eighth.beats() <= self.beats {
            let index = (self.next_arp % ARP_STEPS as u64) as usize;
            self.next_arp += 1;
            if !ARP_PATTERN[index % ARP_PATTERN.len()] {
                continue;
            }
            if rng.gen::<f32>() <= ARP_SKIP_CHANCE {
                continue;
            }
            let note = ARP_NOTES[rng.gen_range(0..ARP_NOTES.len())];
            let velocity = rng.gen::<f32>() * 0.4 + 0.3;
            due.push(AudioCommand::Play {
                voice: Voice::Arp,
                notes: vec![note],
                length: NoteLength::Sixteenth,
                velocity,
            });
        }

        due
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// No user gesture yet
    Unopened,
    Open,
}

pub struct AudioDirector {
    backend: Box<dyn AudioBackend>,
    config: AudioConfig,
    context: ContextState,
    music_ready: bool,
    transport_running: bool,
    locked: bool,
    drone_active: bool,
    /// When the transport stops if the pointer stays unlocked
    stop_at: Option<f64>,
    sequencer: Sequencer,
}

impl AudioDirector {
    pub fn new(backend: Box<dyn AudioBackend>, config: AudioConfig) -> Self {
        Self {
            backend,
            config,
            context: ContextState::Unopened,
            music_ready: false,
            transport_running: false,
            locked: false,
            drone_active: false,
            stop_at: None,
            sequencer: Sequencer::default(),
        }
    }

    pub fn context(&self) -> ContextState {
        self.context
    }

    pub fn is_music_ready(&self) -> bool {
        self.music_ready
    }

    pub fn is_transport_running(&self) -> bool {
        self.transport_running
    }

    pub fn is_drone_active(&self) -> bool {
        self.drone_active
    }

    /// A click: open the context once, resume it afterwards
    pub fn user_gesture(&mut self) {
        match self.context {
            ContextState::Unopened => match self.backend.open() {
                Ok(()) => {
                    self.context = ContextState::Open;
                    log::info!("Audio context opened");
                }
                Err(e) => log::warn!("Audio context unavailable: {}", e),
            },
            ContextState::Open => self.resume(),
        }
    }

    fn resume(&mut self) {
        if self.backend.is_running() {
            return;
        }
        if let Err(e) = self.backend.resume() {
            log::warn!("Audio resume failed, will retry on next lock: {}", e);
        }
    }

    fn is_running(&self) -> bool {
        self.context == ContextState::Open && self.backend.is_running()
    }

    pub fn set_locked(&mut self, locked: bool, now: f64) {
        if locked == self.locked {
            return;
        }
        self.locked = locked;

        if locked {
            if self.context == ContextState::Unopened {
                self.user_gesture();
            }
            if !self.music_ready {
                self.setup_music();
            }
            self.engage();
        } else if self.music_ready {
            self.disengage(now);
        }
    }

    fn setup_music(&mut self) {
        self.backend.submit(AudioCommand::Setup {
            master_db: self.config.master_volume_db,
        });
        self.music_ready = true;
        log::info!("Score started at {} bpm", self.config.tempo_bpm);
    }

    fn engage(&mut self) {
        self.resume();
        self.stop_at = None;
        self.backend.submit(AudioCommand::ReleaseAll { voice: Voice::Pad });
        self.backend.submit(AudioCommand::ReleaseAll { voice: Voice::Bass });
        self.backend.submit(AudioCommand::SetTempo {
            bpm: self.config.tempo_bpm,
            ramp: 2.0,
        });
        if !self.transport_running {
            self.sequencer.rewind();
        }
        self.backend.submit(AudioCommand::StartTransport);
        self.backend.submit(AudioCommand::StartAmbience);
        self.transport_running = true;

        let ramps = [
            (Voice::Pad, self.config.pad_volume_db, 2.0),
            (Voice::Bass, self.config.bass_volume_db, 2.0),
            (Voice::Arp, self.config.arp_volume_db, 3.0),
        ];
        for (voice, db, seconds) in ramps {
            self.backend.submit(AudioCommand::RampVolume { voice, db, seconds });
        }
    }

    fn disengage(&mut self, now: f64) {
        for voice in [Voice::Pad, Voice::Bass, Voice::Arp] {
            self.backend.submit(AudioCommand::RampVolume {
                voice,
                db: self.config.muted_volume_db,
                seconds: 1.0,
            });
        }
        if self.drone_active {
            self.backend.submit(AudioCommand::DroneRelease);
            self.drone_active = false;
        }
        self.stop_at = Some(now + self.config.transport_stop_delay);
    }

    /// Core drone follows gaze pressure
    pub fn set_gaze(&mut self, gaze: f32) {
        if !self.music_ready {
            return;
        }
        if gaze > DRONE_THRESHOLD {
            if !self.drone_active {
                self.backend.submit(AudioCommand::DroneAttack { note: DRONE_NOTE });
                self.drone_active = true;
            }
            self.backend.submit(AudioCommand::DroneRamp {
                modulation_index: 5.0 + gaze * 20.0,
                harmonicity: 1.0 + gaze * 0.5,
                volume_db: -30.0 + gaze * 25.0,
                frequency: 30.0 + gaze * 10.0,
                seconds: 0.1,
            });
        } else if self.drone_active {
            self.backend.submit(AudioCommand::DroneRelease);
            self.drone_active = false;
        }
    }

    /// Short tone if the context is live; dropped otherwise
    pub fn blip(&mut self, frequency: f32, waveform: Waveform, seconds: f32) {
        if !self.is_running() {
            return;
        }
        self.backend.submit(AudioCommand::Blip {
            frequency,
            waveform,
            seconds,
        });
    }

    pub fn portal_opened(&mut self) {
        self.blip(PORTAL_CUE_HZ, Waveform::Sawtooth, 2.0);
    }

    /// Per-frame: run the sequencer and the delayed transport stop
    pub fn update(&mut self, now: f64, dt: f64, rng: &mut impl Rng) {
        if let Some(stop_at) = self.stop_at {
            if now >= stop_at {
                self.stop_at = None;
                if !self.locked && self.transport_running {
                    self.backend.submit(AudioCommand::StopTransport);
                    self.backend.submit(AudioCommand::StopAmbience);
                    self.transport_running = false;
                    self.sequencer.rewind();
                }
            }
        }

        if self.transport_running {
            for command in self.sequencer.advance(dt, self.config.tempo_bpm, rng) {
                self.backend.submit(command);
            }
        }
    }
}

/// Shared view of a recording backend's command history
pub type AudioLog = Rc<RefCell<Vec<AudioCommand>>>;

/// Backend that records commands instead of playing them
#[derive(Debug, Default)]
pub struct RecordingAudio {
    log: AudioLog,
    opened: bool,
    running: bool,
    /// Resumes (including the implicit one at open) that fail first
    blocked_resumes: u32,
}

impl RecordingAudio {
    pub fn new() -> (Self, AudioLog) {
        let audio = Self::default();
        let log = audio.log.clone();
        (audio, log)
    }

    /// The first `count` start attempts are blocked by autoplay policy
    pub fn blocked(count: u32) -> (Self, AudioLog) {
        let (mut audio, log) = Self::new();
        audio.blocked_resumes = count;
        (audio, log)
    }
}

impl AudioBackend for RecordingAudio {
    fn open(&mut self) -> Result<(), AudioError> {
        self.opened = true;
        if self.blocked_resumes > 0 {
            self.blocked_resumes -= 1;
        } else {
            self.running = true;
        }
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        if !self.opened {
            return Err(AudioError::NotStarted);
        }
        if self.blocked_resumes > 0 {
            self.blocked_resumes -= 1;
            return Err(AudioError::Blocked("autoplay policy".to_string()));
        }
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn submit(&mut self, command: AudioCommand) {
        self.log.borrow_mut().push(command);
    }
}

/// Backend with no output device
#[derive(Debug, Default)]
pub struct SilentAudio {
    running: bool,
}

impl AudioBackend for SilentAudio {
    fn open(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn submit(&mut self, _command: AudioCommand) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn director() -> (AudioDirector, AudioLog) {
        let (audio, log) = RecordingAudio::new();
        (AudioDirector::new(Box::new(audio), AudioConfig::default()), log)
    }

    #[test]
    fn test_context_opened_once() {
        let (mut director, _) = director();
        director.user_gesture();
        assert_eq!(director.context(), ContextState::Open);
        director.user_gesture();
        assert_eq!(director.context(), ContextState::Open);
    }

    #[test]
    fn test_blips_need_running_context() {
        let (mut director, log) = director();
        director.blip(CLICK_BLIP_HZ, Waveform::Sine, 0.1);
        assert!(log.borrow().is_empty());

        director.user_gesture();
        director.blip(CLICK_BLIP_HZ, Waveform::Sine, 0.1);
        assert_eq!(
            log.borrow().last(),
            Some(&AudioCommand::Blip {
                frequency: 1200.0,
                waveform: Waveform::Sine,
                seconds: 0.1
            })
        );
    }

    #[test]
    fn test_lock_ramps_voices() {
        let (mut director, log) = director();
        director.set_locked(true, 0.0);
        let commands = log.borrow();
        assert!(matches!(commands[0], AudioCommand::Setup { .. }));
        assert!(commands.contains(&AudioCommand::StartTransport));
        assert!(commands.contains(&AudioCommand::RampVolume {
            voice: Voice::Arp,
            db: -18.0,
            seconds: 3.0
        }));
    }

    #[test]
    fn test_unlock_stops_transport_after_delay() {
        let (mut director, log) = director();
        let mut rng = StdRng::seed_from_u64(1);
        director.set_locked(true, 0.0);
        director.set_locked(false, 5.0);

        director.update(5.5, 0.5, &mut rng);
        assert!(director.is_transport_running());
        director.update(6.0, 0.5, &mut rng);
        assert!(!director.is_transport_running());
        assert!(log.borrow().contains(&AudioCommand::StopTransport));
    }

    #[test]
    fn test_relock_cancels_pending_stop() {
        let (mut director, _) = director();
        let mut rng = StdRng::seed_from_u64(1);
        director.set_locked(true, 0.0);
        director.set_locked(false, 1.0);
        director.set_locked(true, 1.5);
        director.update(3.0, 1.5, &mut rng);
        assert!(director.is_transport_running());
    }

    #[test]
    fn test_drone_follows_gaze() {
        let (mut director, log) = director();
        director.set_gaze(0.5);
        assert!(log.borrow().is_empty());

        director.set_locked(true, 0.0);
        log.borrow_mut().clear();
        director.set_gaze(0.5);
        director.set_gaze(1.0);
        director.set_gaze(0.05);

        let commands = log.borrow();
        let attacks = commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::DroneAttack { .. }))
            .count();
        assert_eq!(attacks, 1);
        assert!(commands.contains(&AudioCommand::DroneRamp {
            modulation_index: 25.0,
            harmonicity: 1.5,
            volume_db: -5.0,
            frequency: 40.0,
            seconds: 0.1
        }));
        assert_eq!(commands.last(), Some(&AudioCommand::DroneRelease));
    }

    #[test]
    fn test_blocked_resume_retried_on_next_lock() {
        let (audio, _) = RecordingAudio::blocked(2);
        let mut director = AudioDirector::new(Box::new(audio), AudioConfig::default());
        director.user_gesture();
        director.set_locked(true, 0.0);
        assert!(!director.is_running());
        director.set_locked(false, 1.0);
        director.set_locked(true, 2.0);
        assert!(director.is_running());
    }

    #[test]
    fn test_sequencer_measure_and_arp() {
        let mut sequencer = Sequencer::default();
        let mut rng = StdRng::seed_from_u64(7);
        // one measure at 60 bpm is 4 seconds; stop just short of the next downbeat
        let commands = sequencer.advance(3.9, 60.0, &mut rng);
        let chords = commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { voice: Voice::Pad, .. }))
            .count();
        assert_eq!(chords, 1);
        // 8 eighth-note steps, 4 of them active in the pattern
        let arps = commands
            .iter()
            .filter(|c| matches!(c, AudioCommand::Play { voice: Voice::Arp, .. }))
            .count();
        assert!(arps <= 4);
        for command in &commands {
            if let AudioCommand::Play { voice: Voice::Arp, velocity, notes, .. } = command {
                assert!((0.3..0.7).contains(velocity));
                assert!(ARP_NOTES.contains(&notes[0]));
            }
        }

        let next = sequencer.advance(0.2, 60.0, &mut rng);
        assert!(next.contains(&AudioCommand::Play {
            voice: Voice::Bass,
            notes: vec!["Ab1"],
            length: NoteLength::Measure,
            velocity: 0.8
        }));
    }
}

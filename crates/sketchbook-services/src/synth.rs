//! Polyphonic synth with piano, organ and strings presets

use std::f32::consts::TAU;

use fundsp::hacker::{db_amp, midi_hz};
use sketchbook_core::Instrument;

const MAX_VOICES: usize = 16;
const MASTER_GAIN_DB: f32 = -12.0;
/// Released voices below this level (about -80 dB) are freed
const SILENCE_LEVEL: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wave {
    Sine,
    Triangle,
}

impl Wave {
    /// One cycle over phase 0..1
    fn sample(self, phase: f32) -> f32 {
        match self {
            Self::Sine => (phase * TAU).sin(),
            Self::Triangle => {
                // Quarter-cycle shift so the wave starts at zero like the sine
                let p = (phase + 0.25).fract();
                1.0 - 4.0 * (p - 0.5).abs()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Timbre {
    /// Frequency modulation: modulator at `harmonicity` x carrier, depth `index`
    Fm { harmonicity: f32, index: f32, carrier: Wave, modulator: Wave },
    /// Amplitude modulation of a sine carrier
    Am { harmonicity: f32 },
}

/// Envelope and timbre for one instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthPreset {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
    timbre: Timbre,
}

impl SynthPreset {
    pub fn for_instrument(instrument: Instrument) -> Self {
        match instrument {
            Instrument::Piano => Self {
                attack: 0.01,
                decay: 0.1,
                sustain: 0.3,
                release: 1.0,
                timbre: Timbre::Fm { harmonicity: 0.5, index: 1.0, carrier: Wave::Triangle, modulator: Wave::Sine },
            },
            Instrument::Organ => Self {
                attack: 0.01,
                decay: 0.2,
                sustain: 0.1,
                release: 0.2,
                timbre: Timbre::Am { harmonicity: 1.5 },
            },
            Instrument::Strings => Self {
                attack: 0.2,
                decay: 0.1,
                sustain: 1.0,
                release: 0.5,
                timbre: Timbre::Fm { harmonicity: 3.0, index: 10.0, carrier: Wave::Sine, modulator: Wave::Triangle },
            },
        }
    }

    /// Longest time a released voice keeps sounding
    pub fn release_secs(&self) -> f32 {
        self.release
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Per-voice state
#[derive(Debug, Clone)]
struct SynthVoice {
    stage: Stage,
    pitch: u8,
    freq: f32,
    velocity: f32,
    level: f32,
    release_step: f32,
    carrier_phase: f32,
    mod_phase: f32,
    /// Samples left before a timed note releases itself
    hold_remaining: Option<u64>,
    age: u64,
}

impl SynthVoice {
    fn new() -> Self {
        Self {
            stage: Stage::Idle,
            pitch: 0,
            freq: 0.0,
            velocity: 0.0,
            level: 0.0,
            release_step: 0.0,
            carrier_phase: 0.0,
            mod_phase: 0.0,
            hold_remaining: None,
            age: 0,
        }
    }

    fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    fn is_held(&self) -> bool {
        matches!(self.stage, Stage::Attack | Stage::Decay | Stage::Sustain)
    }

    fn trigger(&mut self, pitch: u8, velocity: u8, hold: Option<u64>) {
        self.stage = Stage::Attack;
        self.pitch = pitch;
        self.freq = midi_hz(pitch as f32);
        self.velocity = velocity as f32 / 127.0;
        self.carrier_phase = 0.0;
        self.mod_phase = 0.0;
        self.hold_remaining = hold;
        self.age = 0;
    }

    fn start_release(&mut self, preset: &SynthPreset, sample_rate: f32) {
        if !self.is_held() {
            return;
        }
        self.stage = Stage::Release;
        self.hold_remaining = None;
        let release_samples = (preset.release * sample_rate).max(1.0);
        self.release_step = self.level / release_samples;
    }

    fn advance_envelope(&mut self, preset: &SynthPreset, sample_rate: f32) {
        match self.stage {
            Stage::Idle | Stage::Sustain => {}
            Stage::Attack => {
                self.level += 1.0 / (preset.attack * sample_rate).max(1.0);
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level -= (1.0 - preset.sustain) / (preset.decay * sample_rate).max(1.0);
                if self.level <= preset.sustain {
                    self.level = preset.sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Release => {
                self.level -= self.release_step;
                if self.level <= SILENCE_LEVEL {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }

        if let Some(remaining) = self.hold_remaining {
            if remaining == 0 {
                self.start_release(preset, sample_rate);
            } else {
                self.hold_remaining = Some(remaining - 1);
            }
        }
    }

    fn tick(&mut self, preset: &SynthPreset, sample_rate: f32) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        self.age += 1;

        let raw = match preset.timbre {
            Timbre::Fm { harmonicity, index, carrier, modulator } => {
                let modulation = modulator.sample(self.mod_phase) * index;
                let phase = (self.carrier_phase + modulation / TAU).rem_euclid(1.0);
                self.mod_phase = (self.mod_phase + self.freq * harmonicity / sample_rate).fract();
                carrier.sample(phase)
            }
            Timbre::Am { harmonicity } => {
                let am = 0.5 + 0.5 * Wave::Sine.sample(self.mod_phase);
                self.mod_phase = (self.mod_phase + self.freq * harmonicity / sample_rate).fract();
                Wave::Sine.sample(self.carrier_phase) * am
            }
        };
        self.carrier_phase = (self.carrier_phase + self.freq / sample_rate).fract();

        let out = raw * self.level * self.velocity;
        self.advance_envelope(preset, sample_rate);
        out
    }
}

/// Polyphonic synth. Notes can be held (note on/off) or timed.
pub struct PolySynth {
    instrument: Instrument,
    preset: SynthPreset,
    sample_rate: f32,
    voices: Vec<SynthVoice>,
    output: Vec<f32>,
    master: f32,
}

impl std::fmt::Debug for PolySynth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolySynth")
            .field("instrument", &self.instrument)
            .field("sample_rate", &self.sample_rate)
            .field("active_voices", &self.active_voices())
            .finish()
    }
}

impl PolySynth {
    pub fn new(instrument: Instrument, sample_rate: f32) -> Self {
        Self {
            instrument,
            preset: SynthPreset::for_instrument(instrument),
            sample_rate,
            voices: (0..MAX_VOICES).map(|_| SynthVoice::new()).collect(),
            output: Vec::new(),
            master: db_amp(MASTER_GAIN_DB),
        }
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Switch preset; sounding notes are cut
    pub fn set_instrument(&mut self, instrument: Instrument) {
        self.kill_all();
        self.instrument = instrument;
        self.preset = SynthPreset::for_instrument(instrument);
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Start a held note; it sounds until `note_off`
    pub fn note_on(&mut self, pitch: u8, velocity: u8) {
        self.trigger(pitch, velocity, None);
    }

    /// Start a note that releases itself after `duration_samples`
    pub fn note_on_for(&mut self, pitch: u8, velocity: u8, duration_samples: u64) {
        self.trigger(pitch, velocity, Some(duration_samples));
    }

    pub fn note_off(&mut self, pitch: u8) {
        let (preset, sample_rate) = (self.preset, self.sample_rate);
        for voice in self.voices.iter_mut().filter(|v| v.pitch == pitch && v.is_held()) {
            voice.start_release(&preset, sample_rate);
        }
    }

    /// Release every held note
    pub fn all_notes_off(&mut self) {
        let (preset, sample_rate) = (self.preset, self.sample_rate);
        for voice in &mut self.voices {
            voice.start_release(&preset, sample_rate);
        }
    }

    fn kill_all(&mut self) {
        for voice in &mut self.voices {
            *voice = SynthVoice::new();
        }
    }

    fn trigger(&mut self, pitch: u8, velocity: u8, hold: Option<u64>) {
        // Retrigger a voice already playing this pitch, else a free one, else steal the oldest
        let idx = self
            .voices
            .iter()
            .position(|v| v.is_active() && v.pitch == pitch)
            .or_else(|| self.voices.iter().position(|v| !v.is_active()))
            .or_else(|| {
                self.voices
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, v)| v.age)
                    .map(|(i, _)| i)
            });

        if let Some(idx) = idx {
            self.voices[idx].trigger(pitch, velocity, hold);
        }
    }

    /// Render `num_frames` mono samples
    pub fn process(&mut self, num_frames: usize) -> &[f32] {
        if self.output.len() < num_frames {
            self.output.resize(num_frames, 0.0);
        }

        let (preset, sample_rate, master) = (self.preset, self.sample_rate, self.master);
        for sample in &mut self.output[..num_frames] {
            let mixed: f32 = self.voices.iter_mut().map(|v| v.tick(&preset, sample_rate)).sum();
            *sample = (mixed * master).clamp(-1.0, 1.0);
        }

        &self.output[..num_frames]
    }
}

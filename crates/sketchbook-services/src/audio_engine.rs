//! Audio engine: the playback surface the UI talks to

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sketchbook_core::{Instrument, PlayableNote};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::audio_io::{AudioOutputError, OutputDeviceInfo, RealtimeOutputStream, StreamFormat};
use crate::synth::PolySynth;

const DEFAULT_VELOCITY: u8 = 100;

#[derive(Debug, Error)]
pub enum AudioEngineError {
    #[error("Audio output error: {0}")]
    Output(#[from] AudioOutputError),
    #[error("Engine already running")]
    AlreadyRunning,
    #[error("Engine not running")]
    NotRunning,
    #[error("Note out of range: {0}")]
    NoteOutOfRange(PlayableNote),
    #[error("Synth unavailable after an audio thread panic")]
    SynthUnavailable,
}

/// State shared between the UI and the audio thread
pub struct EngineState {
    pub synth: Mutex<PolySynth>,
    pub muted: AtomicBool,
}

impl EngineState {
    pub fn new(instrument: Instrument, sample_rate: u32) -> Self {
        Self {
            synth: Mutex::new(PolySynth::new(instrument, sample_rate as f32)),
            muted: AtomicBool::new(false),
        }
    }
}

/// Plays absolute notes and chords through the default output device.
/// `start` must succeed before any play call.
pub struct AudioEngine {
    state: Arc<EngineState>,
    stream: Option<RealtimeOutputStream>,
    velocity: u8,
}

impl AudioEngine {
    pub fn new(instrument: Instrument, sample_rate: u32) -> Self {
        Self {
            state: Arc::new(EngineState::new(instrument, sample_rate)),
            stream: None,
            velocity: DEFAULT_VELOCITY,
        }
    }

    /// Open the output device and start rendering
    pub fn start(&mut self) -> Result<(), AudioEngineError> {
        if self.stream.is_some() {
            return Err(AudioEngineError::AlreadyRunning);
        }

        let state = self.state.clone();

        let stream = RealtimeOutputStream::start(move |buffer, format| {
            Self::render_audio(&state, buffer, format);
        })?;

        info!(device = %stream.info().name, "Audio engine started");
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop the audio engine
    pub fn stop(&mut self) -> Result<(), AudioEngineError> {
        let stream = self.stream.take().ok_or(AudioEngineError::NotRunning)?;
        stream.stop();
        let _ = self.with_synth(|s| s.all_notes_off());
        info!("Audio engine stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// Device the engine is rendering to, once started
    pub fn output_info(&self) -> Option<&OutputDeviceInfo> {
        self.stream.as_ref().map(RealtimeOutputStream::info)
    }

    /// Start a held note
    pub fn play_note(&self, note: &PlayableNote) -> Result<(), AudioEngineError> {
        let pitch = self.playable_pitch(note)?;
        let velocity = self.velocity;
        self.with_synth(|s| s.note_on(pitch, velocity))?;
        debug!(%note, "Note on");
        Ok(())
    }

    /// Release a held note
    pub fn stop_note(&self, note: &PlayableNote) -> Result<(), AudioEngineError> {
        let pitch = self.playable_pitch(note)?;
        self.with_synth(|s| s.note_off(pitch))?;
        debug!(%note, "Note off");
        Ok(())
    }

    /// Sound every note together for `duration`
    pub fn play_chord(&self, notes: &[PlayableNote], duration: Duration) -> Result<(), AudioEngineError> {
        let pitches = notes
            .iter()
            .map(|n| self.playable_pitch(n))
            .collect::<Result<Vec<_>, _>>()?;
        let velocity = self.velocity;
        self.with_synth(|s| {
            let samples = duration_samples(duration, s.sample_rate());
            for &pitch in &pitches {
                s.note_on_for(pitch, velocity, samples);
            }
        })?;
        debug!(notes = ?notes.iter().map(ToString::to_string).collect::<Vec<_>>(), ?duration, "Chord");
        Ok(())
    }

    pub fn play_note_with_duration(&self, note: &PlayableNote, duration: Duration) -> Result<(), AudioEngineError> {
        self.play_chord(std::slice::from_ref(note), duration)
    }

    /// Switch instrument; sounding notes are cut
    pub fn set_instrument(&self, instrument: Instrument) {
        if self.with_synth(|s| s.set_instrument(instrument)).is_ok() {
            info!(instrument = instrument.name(), "Instrument changed");
        }
    }

    pub fn instrument(&self) -> Instrument {
        self.with_synth(|s| s.instrument()).unwrap_or_default()
    }

    /// Flip the master mute and return the new state
    pub fn toggle_mute(&self) -> bool {
        let muted = !self.state.muted.fetch_xor(true, Ordering::SeqCst);
        info!(muted, "Mute toggled");
        muted
    }

    pub fn is_muted(&self) -> bool {
        self.state.muted.load(Ordering::SeqCst)
    }

    fn playable_pitch(&self, note: &PlayableNote) -> Result<u8, AudioEngineError> {
        if self.stream.is_none() {
            return Err(AudioEngineError::NotRunning);
        }
        note.to_midi().ok_or(AudioEngineError::NoteOutOfRange(*note))
    }

    fn with_synth<F, R>(&self, f: F) -> Result<R, AudioEngineError>
    where
        F: FnOnce(&mut PolySynth) -> R,
    {
        match self.state.synth.lock() {
            Ok(mut synth) => Ok(f(&mut synth)),
            Err(_) => {
                warn!("Synth lock poisoned");
                Err(AudioEngineError::SynthUnavailable)
            }
        }
    }

    /// Render audio into output buffer (called from audio thread)
    fn render_audio(state: &EngineState, buffer: &mut [f32], format: StreamFormat) {
        let sample_rate = format.sample_rate;
        let channels = format.channels.max(1) as usize;
        let num_frames = buffer.len() / channels;

        let Ok(mut synth) = state.synth.lock() else {
            buffer.fill(0.0);
            return;
        };

        if synth.sample_rate() != sample_rate as f32 {
            synth.set_sample_rate(sample_rate as f32);
        }

        // Keep voices running while muted so envelopes stay in step
        let mono = synth.process(num_frames);
        let gain = if state.muted.load(Ordering::Relaxed) { 0.0 } else { 1.0 };

        for (frame, &sample) in buffer.chunks_mut(channels).zip(mono) {
            frame.fill(sample * gain);
        }
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn duration_samples(duration: Duration, sample_rate: f32) -> u64 {
    (duration.as_secs_f64() * sample_rate as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchbook_core::PitchClass;

    #[test]
    fn test_play_before_start_fails() {
        let engine = AudioEngine::new(Instrument::Piano, 44_100);
        let note = PlayableNote::new(PitchClass::C, 4);
        assert!(matches!(engine.play_note(&note), Err(AudioEngineError::NotRunning)));
        assert!(matches!(
            engine.play_chord(&[note], Duration::from_secs(1)),
            Err(AudioEngineError::NotRunning)
        ));
        assert!(matches!(engine.stop_note(&note), Err(AudioEngineError::NotRunning)));
    }

    #[test]
    fn test_toggle_mute() {
        let engine = AudioEngine::new(Instrument::Piano, 44_100);
        assert!(!engine.is_muted());
        assert!(engine.toggle_mute());
        assert!(engine.is_muted());
        assert!(!engine.toggle_mute());
    }

    #[test]
    fn test_set_instrument() {
        let engine = AudioEngine::new(Instrument::Piano, 44_100);
        engine.set_instrument(Instrument::Strings);
        assert_eq!(engine.instrument(), Instrument::Strings);
    }

    #[test]
    fn test_poisoned_synth_is_reported() {
        let engine = AudioEngine::new(Instrument::Piano, 44_100);
        assert!(engine.with_synth(|s| s.note_on(60, 100)).is_ok());

        let state = engine.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = state.synth.lock().unwrap();
            panic!("render thread died");
        })
        .join();

        assert!(matches!(engine.with_synth(|_| ()), Err(AudioEngineError::SynthUnavailable)));
        assert_eq!(engine.instrument(), Instrument::default());
    }

    #[test]
    fn test_render_fills_every_channel() {
        let state = EngineState::new(Instrument::Organ, 48_000);
        state.synth.lock().unwrap().note_on(69, 100);

        let mut buffer = vec![0.0f32; 2 * 512];
        AudioEngine::render_audio(&state, &mut buffer, StreamFormat { sample_rate: 48_000, channels: 2 });

        assert!(buffer.iter().any(|s| *s != 0.0));
        for frame in buffer.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_render_muted_is_silent() {
        let state = EngineState::new(Instrument::Piano, 44_100);
        state.synth.lock().unwrap().note_on(60, 100);
        state.muted.store(true, Ordering::SeqCst);

        let mut buffer = vec![1.0f32; 256];
        AudioEngine::render_audio(&state, &mut buffer, StreamFormat { sample_rate: 44_100, channels: 1 });
        assert!(buffer.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_render_adopts_device_sample_rate() {
        let state = EngineState::new(Instrument::Piano, 44_100);
        let mut buffer = vec![0.0f32; 64];
        AudioEngine::render_audio(&state, &mut buffer, StreamFormat { sample_rate: 48_000, channels: 1 });
        assert_eq!(state.synth.lock().unwrap().sample_rate(), 48_000.0);
    }

    #[test]
    fn test_duration_samples() {
        assert_eq!(duration_samples(Duration::from_secs(1), 44_100.0), 44_100);
        assert_eq!(duration_samples(Duration::from_millis(250), 48_000.0), 12_000);
    }
}

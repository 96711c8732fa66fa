//! sketchbook-services: audio playback and AI suggestion collaborators

pub mod audio_engine;
pub mod audio_io;
pub mod suggest;
pub mod synth;

pub use audio_engine::{AudioEngine, AudioEngineError, EngineState};
pub use audio_io::{default_device_info, AudioOutputError, OutputDeviceInfo, RealtimeOutputStream, StreamFormat};
pub use suggest::{build_prompt, parse_suggestion, OllamaClient, SuggestConfig, SuggestError, SuggestionWorker};
pub use synth::{PolySynth, SynthPreset};

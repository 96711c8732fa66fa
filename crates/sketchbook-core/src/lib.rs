//! sketchbook-core: Harmony engine and domain types for the keyboard sketchbook

mod chord;
mod error;
mod instrument;
pub mod keyboard;
pub mod keys;
pub mod pitch;
pub mod progressions;
pub mod roman;
mod suggestion;
pub mod transcript;
pub mod voicing;

pub use chord::{Chord, ChordQuality};
pub use error::{HarmonyError, Result};
pub use instrument::Instrument;
pub use keyboard::{key_label, keyboard_range, note_for_key, KEYBOARD_MAPPING};
pub use keys::{display_scale_of, find_key, list_keys, scale_of, Key, Mode};
pub use pitch::{PitchClass, PlayableNote, Spelling};
pub use progressions::{
    resolve_library, resolve_progressions, ProgressionDef, ResolvedProgression,
    ResolvedProgressions, COMMON_OTHER_CHORDS, TYPICAL_PROGRESSIONS,
};
pub use roman::{resolve_descriptor, Descriptor};
pub use suggestion::{HarmonyRequest, HarmonySuggestion};
pub use transcript::{EntryId, EntryKind, RowId, Sketchbook, SketchbookRow, TranscriptEntry};
pub use voicing::{clamp_octave, voice_chord, MAX_OCTAVE, MIN_OCTAVE};

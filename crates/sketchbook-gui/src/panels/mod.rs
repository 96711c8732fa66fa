//! UI panels

mod chord_player;
mod controls;
mod harmony_helper;
mod piano;
mod sketchbook;

pub use chord_player::{ChordPlayerAction, ChordPlayerPanel};
pub use controls::{ControlsAction, ControlsPanel};
pub use harmony_helper::{HarmonyHelperAction, HarmonyHelperPanel};
pub use piano::{PianoAction, PianoPanel};
pub use sketchbook::{SketchbookAction, SketchbookPanel};

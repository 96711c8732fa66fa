//! AI harmony suggestion data model

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::instrument::Instrument;

/// What the user asks the harmony helper for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarmonyRequest {
    pub instrument: Instrument,
    pub key: String,
}

/// A suggested progression plus free-text harmony advice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonySuggestion {
    pub chord_progression: Vec<Chord>,
    pub harmony_suggestions: String,
}

impl HarmonySuggestion {
    pub fn find_chord(&self, name: &str) -> Option<&Chord> {
        self.chord_progression.iter().find(|c| c.name == name)
    }
}

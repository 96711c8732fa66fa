//! Chords and chord qualities

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonyError, Result};
use crate::keys::Key;
use crate::pitch::PitchClass;

/// Chord quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Dominant7,
    Major7,
    Minor7,
    HalfDiminished7,
    Sus2,
    Sus4,
}

impl ChordQuality {
    /// Intervals from root
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 4, 7],
            Self::Minor => &[0, 3, 7],
            Self::Diminished => &[0, 3, 6],
            Self::Dominant7 => &[0, 4, 7, 10],
            Self::Major7 => &[0, 4, 7, 11],
            Self::Minor7 => &[0, 3, 7, 10],
            Self::HalfDiminished7 => &[0, 3, 6, 10],
            Self::Sus2 => &[0, 2, 7],
            Self::Sus4 => &[0, 5, 7],
        }
    }

    /// Suffix appended to the root name
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Major => "",
            Self::Minor => "m",
            Self::Diminished => "°",
            Self::Dominant7 => "7",
            Self::Major7 => "maj7",
            Self::Minor7 => "m7",
            Self::HalfDiminished7 => "m7b5",
            Self::Sus2 => "sus2",
            Self::Sus4 => "sus4",
        }
    }
}

/// A named chord; `notes[0]` is always the functional root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub name: String,
    pub notes: Vec<PitchClass>,
}

impl Chord {
    /// Stack a quality on a root, naming the root the way `key` spells it
    pub fn build(root: PitchClass, quality: ChordQuality, key: &Key) -> Self {
        Self {
            name: format!("{}{}", key.spell(root), quality.suffix()),
            notes: quality.intervals().iter().map(|&i| root.transpose(i as i32)).collect(),
        }
    }

    /// Build a chord from raw note names (`"Bb"`, `"F#"`, ...)
    pub fn from_note_names<S: AsRef<str>>(name: impl Into<String>, notes: &[S]) -> Result<Self> {
        let name = name.into();
        if notes.is_empty() {
            return Err(HarmonyError::InvalidChord(format!("{name}: no notes")));
        }
        let notes = notes
            .iter()
            .map(|n| n.as_ref().parse::<PitchClass>())
            .collect::<Result<Vec<_>>>()
            .map_err(|e| HarmonyError::InvalidChord(format!("{name}: {e}")))?;
        Ok(Self { name, notes })
    }

    pub fn root(&self) -> Option<PitchClass> {
        self.notes.first().copied()
    }

    /// Note names spelled for display in `key`
    pub fn spelled_notes(&self, key: &Key) -> Vec<&'static str> {
        self.notes.iter().map(|&pc| key.spell(pc)).collect()
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

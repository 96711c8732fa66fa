//! Progression library: named progressions and common extra chords, resolved per key

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::Chord;
use crate::error::Result;
use crate::keys::{find_key, Key};
use crate::roman::resolve_descriptor;

/// A named progression of Roman-numeral descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionDef {
    pub name: &'static str,
    pub numerals: &'static [&'static str],
}

pub static TYPICAL_PROGRESSIONS: &[ProgressionDef] = &[
    ProgressionDef { name: "Pop Progression (I-V-vi-IV)", numerals: &["I", "V", "vi", "IV"] },
    ProgressionDef { name: "Classic Cadence (I-IV-V-I)", numerals: &["I", "IV", "V", "I"] },
    ProgressionDef { name: "Jazz Turnaround (ii-V-I)", numerals: &["ii", "V", "I"] },
    ProgressionDef { name: "50s Progression (I-vi-IV-V)", numerals: &["I", "vi", "IV", "V"] },
    ProgressionDef { name: "Plagal Cadence (IV-I)", numerals: &["IV", "I"] },
    ProgressionDef { name: "Circle Progression (vi-ii-V-I)", numerals: &["vi", "ii", "V", "I"] },
    ProgressionDef { name: "Hymn Progression (I-IV-I-V-I)", numerals: &["I", "IV", "I", "V", "I"] },
    ProgressionDef {
        name: "Pachelbel (I-V-vi-iii-IV-I-IV-V)",
        numerals: &["I", "V", "vi", "iii", "IV", "I", "IV", "V"],
    },
    ProgressionDef { name: "Minor Lament (i-iv-v-i)", numerals: &["i", "iv", "v", "i"] },
    ProgressionDef { name: "Secondary Dominant Walk (I-V7/V-V-I)", numerals: &["I", "V7/V", "V", "I"] },
    ProgressionDef { name: "Leading-Tone Cadence (ii-vii°-I)", numerals: &["ii", "vii°", "I"] },
];

pub static COMMON_OTHER_CHORDS: &[&str] = &[
    "V7/V", "V7/ii", "V7/vi", "V7/IV", "V7/iii", "vii°", "Isus4", "Vsus4", "V7", "ii7", "Imaj7",
];

/// A progression resolved against a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProgression {
    pub name: String,
    pub chords: Vec<Chord>,
}

/// Everything the chord player shows for one key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProgressions {
    pub progressions: Vec<ResolvedProgression>,
    pub other_chords: Vec<Chord>,
}

impl ResolvedProgressions {
    /// First chord with this display name, other chords first
    pub fn find_chord(&self, name: &str) -> Option<&Chord> {
        self.other_chords
            .iter()
            .chain(self.progressions.iter().flat_map(|p| p.chords.iter()))
            .find(|c| c.name == name)
    }

    pub fn progression(&self, name: &str) -> Option<&ResolvedProgression> {
        self.progressions.iter().find(|p| p.name == name)
    }
}

/// Resolve descriptors in order, dropping any that do not apply to `key`
fn resolve_all<'a>(key: &Key, descriptors: impl IntoIterator<Item = &'a str>) -> Vec<Chord> {
    descriptors
        .into_iter()
        .filter_map(|d| match resolve_descriptor(key, d) {
            Ok(chord) => Some(chord),
            Err(e) => {
                debug!(key = key.name, "Skipping descriptor: {}", e);
                None
            }
        })
        .collect()
}

/// Resolve caller-supplied definitions against a key
pub fn resolve_library(
    key: &Key,
    progressions: &[ProgressionDef],
    other_chords: &[&str],
) -> ResolvedProgressions {
    let progressions = progressions
        .iter()
        .filter_map(|def| {
            let chords = resolve_all(key, def.numerals.iter().copied());
            if chords.is_empty() {
                return None;
            }
            Some(ResolvedProgression { name: def.name.to_string(), chords })
        })
        .collect();

    ResolvedProgressions {
        progressions,
        other_chords: resolve_all(key, other_chords.iter().copied()),
    }
}

/// Resolve the built-in library for a key name
pub fn resolve_progressions(key_name: &str) -> Result<ResolvedProgressions> {
    let key = find_key(key_name)?;
    Ok(resolve_library(key, TYPICAL_PROGRESSIONS, COMMON_OTHER_CHORDS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarmonyError;
    use crate::keys::list_keys;
    use crate::pitch::PitchClass::*;

    #[test]
    fn test_pop_progression_in_c() {
        let resolved = resolve_progressions("C Major").unwrap();
        let pop = resolved.progression("Pop Progression (I-V-vi-IV)").unwrap();
        let names: Vec<_> = pop.chords.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C", "G", "Am", "F"]);
        assert_eq!(pop.chords[2].notes, vec![A, C, E]);
    }

    #[test]
    fn test_other_chords_in_c() {
        let resolved = resolve_progressions("C Major").unwrap();
        let d7 = resolved.find_chord("D7").unwrap();
        assert_eq!(d7.notes, vec![D, FSharp, A, C]);
        let dim = resolved.find_chord("B°").unwrap();
        assert_eq!(dim.notes, vec![B, D, F]);
        assert_eq!(resolved.other_chords.len(), COMMON_OTHER_CHORDS.len());
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            resolve_progressions("Q Major"),
            Err(HarmonyError::UnknownKey("Q Major".into()))
        );
    }

    #[test]
    fn test_unresolved_descriptors_are_omitted() {
        static DEFS: &[ProgressionDef] = &[
            ProgressionDef { name: "Three of four", numerals: &["I", "bogus", "V", "vi"] },
            ProgressionDef { name: "Nothing valid", numerals: &["X", "V7/q"] },
        ];
        let key = find_key("C Major").unwrap();
        let resolved = resolve_library(key, DEFS, &["V7/V", "nope"]);

        assert_eq!(resolved.progressions.len(), 1);
        let chords = &resolved.progressions[0].chords;
        assert_eq!(chords.len(), 3);
        assert_eq!(chords[1].name, "G");
        assert_eq!(resolved.other_chords.len(), 1);
    }

    #[test]
    fn test_every_key_resolves_every_progression() {
        for name in list_keys() {
            let resolved = resolve_progressions(name).unwrap();
            assert_eq!(resolved.progressions.len(), TYPICAL_PROGRESSIONS.len(), "{name}");
            for (def, prog) in TYPICAL_PROGRESSIONS.iter().zip(&resolved.progressions) {
                assert_eq!(prog.chords.len(), def.numerals.len(), "{name}: {}", def.name);
            }
        }
    }

    #[test]
    fn test_find_chord_by_name() {
        let resolved = resolve_progressions("G Major").unwrap();
        assert_eq!(resolved.find_chord("G").unwrap().notes, vec![G, B, D]);
        assert!(resolved.find_chord("Zm").is_none());
    }
}

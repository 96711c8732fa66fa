//! Key table: supported keys, their diatonic scales, and display spelling
//!
//! Interval arithmetic always happens on the 12-symbol chromatic sequence
//! (tonic index + mode intervals). The per-key spelling table is consulted only
//! when a pitch class has to be shown to the user.

use serde::{Deserialize, Serialize};

use crate::error::{HarmonyError, Result};
use crate::pitch::{PitchClass, Spelling};

/// Key mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    /// Natural minor
    Minor,
}

impl Mode {
    /// Scale intervals (semitones from tonic)
    pub fn intervals(&self) -> &'static [u8; 7] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
        }
    }
}

/// A supported key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub name: &'static str,
    pub tonic: PitchClass,
    pub mode: Mode,
    /// Diatonic spelling in scale-degree order
    pub spelling: [&'static str; 7],
}

impl Key {
    /// The 7 diatonic pitch classes, index 0 = tonic
    pub fn scale(&self) -> [PitchClass; 7] {
        self.mode.intervals().map(|i| self.tonic.transpose(i as i32))
    }

    /// Root pitch class of a scale degree (1-based)
    pub fn degree_root(&self, degree: u8) -> Option<PitchClass> {
        let idx = (degree as usize).checked_sub(1)?;
        self.scale().get(idx).copied()
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        self.scale().contains(&pc)
    }

    /// Accidental preference for non-diatonic pitch classes
    pub fn accidentals(&self) -> Spelling {
        let has_flats = self.spelling.iter().any(|s| s.len() > 1 && s.ends_with('b'));
        if has_flats { Spelling::Flats } else { Spelling::Sharps }
    }

    /// Display name of a pitch class in this key
    pub fn spell(&self, pc: PitchClass) -> &'static str {
        match self.scale().iter().position(|&p| p == pc) {
            Some(idx) => self.spelling[idx],
            None => pc.spelled(self.accidentals()),
        }
    }
}

macro_rules! key {
    ($name:literal, $tonic:ident, $mode:ident, [$($note:literal),+ $(,)?]) => {
        Key {
            name: $name,
            tonic: PitchClass::$tonic,
            mode: Mode::$mode,
            spelling: [$($note),+],
        }
    };
}

/// Every supported key, in menu order
pub static KEYS: [Key; 30] = [
    key!("C Major", C, Major, ["C", "D", "E", "F", "G", "A", "B"]),
    key!("G Major", G, Major, ["G", "A", "B", "C", "D", "E", "F#"]),
    key!("D Major", D, Major, ["D", "E", "F#", "G", "A", "B", "C#"]),
    key!("A Major", A, Major, ["A", "B", "C#", "D", "E", "F#", "G#"]),
    key!("E Major", E, Major, ["E", "F#", "G#", "A", "B", "C#", "D#"]),
    key!("B Major", B, Major, ["B", "C#", "D#", "E", "F#", "G#", "A#"]),
    key!("F# Major", FSharp, Major, ["F#", "G#", "A#", "B", "C#", "D#", "E#"]),
    key!("C# Major", CSharp, Major, ["C#", "D#", "E#", "F#", "G#", "A#", "B#"]),
    key!("A Minor", A, Minor, ["A", "B", "C", "D", "E", "F", "G"]),
    key!("E Minor", E, Minor, ["E", "F#", "G", "A", "B", "C", "D"]),
    key!("B Minor", B, Minor, ["B", "C#", "D", "E", "F#", "G", "A"]),
    key!("F# Minor", FSharp, Minor, ["F#", "G#", "A", "B", "C#", "D", "E"]),
    key!("C# Minor", CSharp, Minor, ["C#", "D#", "E", "F#", "G#", "A", "B"]),
    key!("G# Minor", GSharp, Minor, ["G#", "A#", "B", "C#", "D#", "E", "F#"]),
    key!("D# Minor", DSharp, Minor, ["D#", "E#", "F#", "G#", "A#", "B", "C#"]),
    key!("A# Minor", ASharp, Minor, ["A#", "B#", "C#", "D#", "E#", "F#", "G#"]),
    key!("F Major", F, Major, ["F", "G", "A", "Bb", "C", "D", "E"]),
    key!("Bb Major", ASharp, Major, ["Bb", "C", "D", "Eb", "F", "G", "A"]),
    key!("Eb Major", DSharp, Major, ["Eb", "F", "G", "Ab", "Bb", "C", "D"]),
    key!("Ab Major", GSharp, Major, ["Ab", "Bb", "C", "Db", "Eb", "F", "G"]),
    key!("Db Major", CSharp, Major, ["Db", "Eb", "F", "Gb", "Ab", "Bb", "C"]),
    key!("Gb Major", FSharp, Major, ["Gb", "Ab", "Bb", "Cb", "Db", "Eb", "F"]),
    key!("Cb Major", B, Major, ["Cb", "Db", "Eb", "Fb", "Gb", "Ab", "Bb"]),
    key!("D Minor", D, Minor, ["D", "E", "F", "G", "A", "Bb", "C"]),
    key!("G Minor", G, Minor, ["G", "A", "Bb", "C", "D", "Eb", "F"]),
    key!("C Minor", C, Minor, ["C", "D", "Eb", "F", "G", "Ab", "Bb"]),
    key!("F Minor", F, Minor, ["F", "G", "Ab", "Bb", "C", "Db", "Eb"]),
    key!("Bb Minor", ASharp, Minor, ["Bb", "C", "Db", "Eb", "F", "Gb", "Ab"]),
    key!("Eb Minor", DSharp, Minor, ["Eb", "F", "Gb", "Ab", "Bb", "Cb", "Db"]),
    key!("Ab Minor", GSharp, Minor, ["Ab", "Bb", "Cb", "Db", "Eb", "Fb", "Gb"]),
];

/// Names of every supported key
pub fn list_keys() -> Vec<&'static str> {
    KEYS.iter().map(|k| k.name).collect()
}

/// Look up a key by name (case-insensitive, surrounding whitespace ignored)
pub fn find_key(name: &str) -> Result<&'static Key> {
    let wanted = name.trim();
    KEYS.iter()
        .find(|k| k.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| HarmonyError::UnknownKey(name.to_string()))
}

/// The diatonic scale of a key
pub fn scale_of(name: &str) -> Result<[PitchClass; 7]> {
    find_key(name).map(Key::scale)
}

/// The diatonic scale of a key, spelled for display
pub fn display_scale_of(name: &str) -> Result<[&'static str; 7]> {
    find_key(name).map(|k| k.spelling)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_scale_has_seven_distinct_notes() {
        for name in list_keys() {
            let scale = scale_of(name).unwrap();
            let distinct: HashSet<_> = scale.iter().collect();
            assert_eq!(distinct.len(), 7, "{name}");
        }
    }

    #[test]
    fn test_spelling_matches_chromatic_scale() {
        for key in &KEYS {
            let spelled: Vec<PitchClass> = key.spelling.iter().map(|s| s.parse().unwrap()).collect();
            assert_eq!(spelled, key.scale().to_vec(), "{}", key.name);
        }
    }

    #[test]
    fn test_key_names_unique() {
        let names: HashSet<_> = list_keys().into_iter().collect();
        assert_eq!(names.len(), KEYS.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(find_key("c major").unwrap().name, "C Major");
        assert_eq!(find_key("  Eb Major ").unwrap().name, "Eb Major");
        assert_eq!(find_key("H Major"), Err(HarmonyError::UnknownKey("H Major".into())));
    }

    #[test]
    fn test_c_major_and_a_minor_scales() {
        use PitchClass::*;
        assert_eq!(scale_of("C Major").unwrap(), [C, D, E, F, G, A, B]);
        assert_eq!(scale_of("A Minor").unwrap(), [A, B, C, D, E, F, G]);
        assert_eq!(scale_of("Eb Major").unwrap(), [DSharp, F, G, GSharp, ASharp, C, D]);
    }

    #[test]
    fn test_spell_uses_key_spelling() {
        let f = find_key("F Major").unwrap();
        assert_eq!(f.spell(PitchClass::ASharp), "Bb");
        // Non-diatonic notes follow the key's accidentals
        assert_eq!(f.spell(PitchClass::CSharp), "Db");
        let g = find_key("G Major").unwrap();
        assert_eq!(g.spell(PitchClass::CSharp), "C#");
        let fsharp = find_key("F# Major").unwrap();
        assert_eq!(fsharp.spell(PitchClass::F), "E#");
    }

    #[test]
    fn test_display_scale() {
        assert_eq!(display_scale_of("Bb Major").unwrap(), ["Bb", "C", "D", "Eb", "F", "G", "A"]);
        assert!(display_scale_of("Z Minor").is_err());
    }
}

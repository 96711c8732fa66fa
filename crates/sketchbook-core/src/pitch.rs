//! Pitch classes and absolute (octave-qualified) notes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarmonyError, Result};

/// One of the 12 chromatic pitch classes, always stored with sharp identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

/// Accidental preference for pitch classes that have no diatonic spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Spelling {
    Sharps,
    Flats,
}

impl PitchClass {
    /// Chromatic order, index 0 = C
    pub const ALL: [PitchClass; 12] = [
        Self::C, Self::CSharp, Self::D, Self::DSharp, Self::E, Self::F,
        Self::FSharp, Self::G, Self::GSharp, Self::A, Self::ASharp, Self::B,
    ];

    /// Chromatic index (C = 0 .. B = 11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Pitch class at a chromatic index, wrapping modulo 12
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Move by a number of semitones, wrapping modulo 12
    pub fn transpose(self, semitones: i32) -> Self {
        Self::from_index(self.index() as i32 + semitones)
    }

    pub fn sharp_name(self) -> &'static str {
        SHARP_NAMES[self.index() as usize]
    }

    pub fn flat_name(self) -> &'static str {
        FLAT_NAMES[self.index() as usize]
    }

    pub fn spelled(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Sharps => self.sharp_name(),
            Spelling::Flats => self.flat_name(),
        }
    }

    /// True for the black keys of a piano
    pub fn is_accidental(self) -> bool {
        matches!(self, Self::CSharp | Self::DSharp | Self::FSharp | Self::GSharp | Self::ASharp)
    }

    /// Parse a letter plus accidentals from the front of `s`.
    /// Returns the pitch class and the number of bytes consumed.
    fn parse_prefix(s: &str) -> Option<(Self, usize)> {
        let mut chars = s.char_indices();
        let (_, letter) = chars.next()?;
        let base: i32 = match letter.to_ascii_uppercase() {
            'C' => 0,
            'D' => 2,
            'E' => 4,
            'F' => 5,
            'G' => 7,
            'A' => 9,
            'B' => 11,
            _ => return None,
        };

        let mut offset = 0;
        let mut consumed = letter.len_utf8();
        for (pos, c) in chars {
            match c {
                '#' | '♯' => offset += 1,
                'b' | '♭' => offset -= 1,
                _ => break,
            }
            consumed = pos + c.len_utf8();
        }

        Some((Self::from_index(base + offset), consumed))
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sharp_name())
    }
}

impl FromStr for PitchClass {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match Self::parse_prefix(trimmed) {
            Some((pc, consumed)) if consumed == trimmed.len() => Ok(pc),
            _ => Err(HarmonyError::InvalidNote(s.to_string())),
        }
    }
}

impl TryFrom<String> for PitchClass {
    type Error = HarmonyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PitchClass> for &'static str {
    fn from(pc: PitchClass) -> Self {
        pc.sharp_name()
    }
}

/// A pitch class at an absolute octave, e.g. `C#4`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayableNote {
    pub pitch: PitchClass,
    pub octave: i32,
}

impl PlayableNote {
    pub fn new(pitch: PitchClass, octave: i32) -> Self {
        Self { pitch, octave }
    }

    /// Semitone number with C4 = 60; may fall outside the MIDI range
    pub fn semitone(&self) -> i32 {
        (self.octave + 1) * 12 + self.pitch.index() as i32
    }

    /// MIDI note number, if the note is inside 0..=127
    pub fn to_midi(&self) -> Option<u8> {
        let semitone = (i64::from(self.octave) + 1) * 12 + self.pitch.index() as i64;
        u8::try_from(semitone).ok().filter(|n| *n <= 127)
    }

    pub fn from_midi(note: u8) -> Self {
        Self {
            pitch: PitchClass::from_index(note as i32),
            octave: note as i32 / 12 - 1,
        }
    }
}

impl fmt::Display for PlayableNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch, self.octave)
    }
}

impl FromStr for PlayableNote {
    type Err = HarmonyError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || HarmonyError::InvalidNote(s.to_string());
        let (pitch, consumed) = PitchClass::parse_prefix(trimmed).ok_or_else(invalid)?;
        let octave = trimmed[consumed..].parse::<i32>().map_err(|_| invalid())?;

        // "Cb4" sounds as B3 and "B#3" as C4
        let letter_octave_shift = match trimmed.as_bytes()[0].to_ascii_uppercase() {
            b'C' if pitch == PitchClass::B => -1,
            b'B' if pitch == PitchClass::C => 1,
            _ => 0,
        };

        let octave = octave.checked_add(letter_octave_shift).ok_or_else(invalid)?;
        Ok(Self::new(pitch, octave))
    }
}

impl TryFrom<String> for PlayableNote {
    type Error = HarmonyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<PlayableNote> for String {
    fn from(note: PlayableNote) -> Self {
        note.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sharps_and_flats() {
        assert_eq!("C#".parse::<PitchClass>().unwrap(), PitchClass::CSharp);
        assert_eq!("Db".parse::<PitchClass>().unwrap(), PitchClass::CSharp);
        assert_eq!("Bb".parse::<PitchClass>().unwrap(), PitchClass::ASharp);
        assert_eq!("bb".parse::<PitchClass>().unwrap(), PitchClass::ASharp);
        assert_eq!("f#".parse::<PitchClass>().unwrap(), PitchClass::FSharp);
        // Enharmonics across the B/C and E/F boundaries
        assert_eq!("Cb".parse::<PitchClass>().unwrap(), PitchClass::B);
        assert_eq!("E#".parse::<PitchClass>().unwrap(), PitchClass::F);
        assert_eq!("Fb".parse::<PitchClass>().unwrap(), PitchClass::E);
        assert_eq!("B#".parse::<PitchClass>().unwrap(), PitchClass::C);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("H".parse::<PitchClass>().is_err());
        assert!("".parse::<PitchClass>().is_err());
        assert!("C4".parse::<PitchClass>().is_err());
        assert!("Cm".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_transpose_wraps() {
        assert_eq!(PitchClass::A.transpose(3), PitchClass::C);
        assert_eq!(PitchClass::C.transpose(-1), PitchClass::B);
        assert_eq!(PitchClass::G.transpose(7), PitchClass::D);
        assert_eq!(PitchClass::from_index(25), PitchClass::CSharp);
    }

    #[test]
    fn test_spelling() {
        assert_eq!(PitchClass::DSharp.spelled(Spelling::Sharps), "D#");
        assert_eq!(PitchClass::DSharp.spelled(Spelling::Flats), "Eb");
        assert_eq!(PitchClass::E.spelled(Spelling::Flats), "E");
    }

    #[test]
    fn test_playable_note_display_and_parse() {
        let note = PlayableNote::new(PitchClass::CSharp, 4);
        assert_eq!(note.to_string(), "C#4");
        assert_eq!("C#4".parse::<PlayableNote>().unwrap(), note);
        assert_eq!("Db4".parse::<PlayableNote>().unwrap(), note);
        assert_eq!("Cb4".parse::<PlayableNote>().unwrap(), PlayableNote::new(PitchClass::B, 3));
        assert!("C#".parse::<PlayableNote>().is_err());
        assert!("X4".parse::<PlayableNote>().is_err());
    }

    #[test]
    fn test_octave_shift_overflow_is_invalid() {
        assert_eq!(
            "B#2147483647".parse::<PlayableNote>(),
            Err(HarmonyError::InvalidNote("B#2147483647".to_string()))
        );
        assert!("Cb-2147483648".parse::<PlayableNote>().is_err());
        let highest = "B#2147483646".parse::<PlayableNote>().unwrap();
        assert_eq!(highest, PlayableNote::new(PitchClass::C, i32::MAX));
        assert_eq!(highest.to_midi(), None);
    }

    #[test]
    fn test_midi_conversion() {
        assert_eq!(PlayableNote::new(PitchClass::C, 4).to_midi(), Some(60));
        assert_eq!(PlayableNote::new(PitchClass::A, 4).to_midi(), Some(69));
        assert_eq!(PlayableNote::new(PitchClass::C, -2).to_midi(), None);
        assert_eq!(PlayableNote::from_midi(61), PlayableNote::new(PitchClass::CSharp, 4));
    }

    #[test]
    fn test_serde_uses_note_names() {
        let json = serde_json::to_string(&PitchClass::FSharp).unwrap();
        assert_eq!(json, "\"F#\"");
        let pc: PitchClass = serde_json::from_str("\"Gb\"").unwrap();
        assert_eq!(pc, PitchClass::FSharp);
        let note: PlayableNote = serde_json::from_str("\"A#3\"").unwrap();
        assert_eq!(note, PlayableNote::new(PitchClass::ASharp, 3));
    }
}

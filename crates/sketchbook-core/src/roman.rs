//! Roman-numeral descriptors and their resolution to concrete chords
//!
//! Grammar accepted:
//! - `I`..`VII` with case giving quality (`IV` major, `vi` minor), `vii` in
//!   either case or any numeral followed by `°` is diminished
//! - optional suffix after the numeral: `7`, `maj7`, `sus2`, `sus4`; any
//!   other trailing text keeps the numeral's triad
//! - secondary dominants `<X>/<target>`: always the dominant seventh a fifth
//!   above the target degree, whatever `<X>` says

use crate::chord::{Chord, ChordQuality};
use crate::error::{HarmonyError, Result};
use crate::keys::Key;

const DIMINISHED_MARK: char = '°';

/// Scale degree (1..=7) of a Roman numeral, case-insensitive
pub fn roman_degree(numeral: &str) -> Option<u8> {
    match numeral.to_ascii_lowercase().as_str() {
        "i" => Some(1),
        "ii" => Some(2),
        "iii" => Some(3),
        "iv" => Some(4),
        "v" => Some(5),
        "vi" => Some(6),
        "vii" => Some(7),
        _ => None,
    }
}

/// A parsed descriptor, independent of any key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// Chord built on a scale degree of the key
    Diatonic { degree: u8, quality: ChordQuality },
    /// Dominant seventh of another scale degree (`V7/V`)
    Secondary { target: u8 },
}

impl Descriptor {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        match token.split_once('/') {
            Some((_, target)) => Self::parse_secondary(target.trim()),
            None => Self::parse_diatonic(token),
        }
    }

    fn parse_secondary(target: &str) -> Option<Self> {
        let target = roman_degree(target.trim_end_matches(DIMINISHED_MARK))?;
        Some(Self::Secondary { target })
    }

    fn parse_diatonic(token: &str) -> Option<Self> {
        let split = token
            .find(|c: char| !matches!(c, 'i' | 'I' | 'v' | 'V'))
            .unwrap_or(token.len());
        let (numeral, rest) = token.split_at(split);
        let degree = roman_degree(numeral)?;

        let (diminished, suffix) = match rest.strip_prefix(DIMINISHED_MARK) {
            Some(after) => (true, after),
            None => (degree == 7, rest),
        };

        let triad = if diminished {
            ChordQuality::Diminished
        } else if numeral.chars().all(|c| c.is_ascii_uppercase()) {
            ChordQuality::Major
        } else if numeral.chars().all(|c| c.is_ascii_lowercase()) {
            ChordQuality::Minor
        } else {
            return None;
        };

        let quality = match (suffix, triad) {
            ("", q) => q,
            ("7", ChordQuality::Major) => ChordQuality::Dominant7,
            ("7", ChordQuality::Minor) => ChordQuality::Minor7,
            ("7", ChordQuality::Diminished) => ChordQuality::HalfDiminished7,
            ("maj7", ChordQuality::Major) => ChordQuality::Major7,
            ("sus2", ChordQuality::Major | ChordQuality::Minor) => ChordQuality::Sus2,
            ("sus4", ChordQuality::Major | ChordQuality::Minor) => ChordQuality::Sus4,
            (_, q) => q,
        };

        Some(Self::Diatonic { degree, quality })
    }

    /// Build the concrete chord in `key`
    pub fn resolve(&self, key: &Key) -> Option<Chord> {
        match *self {
            Self::Diatonic { degree, quality } => {
                let root = key.degree_root(degree)?;
                Some(Chord::build(root, quality, key))
            }
            Self::Secondary { target } => {
                let target_root = key.degree_root(target)?;
                Some(Chord::build(target_root.transpose(7), ChordQuality::Dominant7, key))
            }
        }
    }
}

/// Resolve a single descriptor in `key`
pub fn resolve_descriptor(key: &Key, descriptor: &str) -> Result<Chord> {
    Descriptor::parse(descriptor)
        .and_then(|d| d.resolve(key))
        .ok_or_else(|| HarmonyError::UnresolvedDescriptor(descriptor.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::find_key;
    use crate::pitch::PitchClass::{self, *};

    fn resolve(key: &str, descriptor: &str) -> Chord {
        resolve_descriptor(find_key(key).unwrap(), descriptor).unwrap()
    }

    fn notes(key: &str, descriptor: &str) -> Vec<PitchClass> {
        resolve(key, descriptor).notes
    }

    #[test]
    fn test_c_major_diatonic_chords() {
        assert_eq!(notes("C Major", "I"), vec![C, E, G]);
        assert_eq!(notes("C Major", "IV"), vec![F, A, C]);
        assert_eq!(notes("C Major", "V"), vec![G, B, D]);
        assert_eq!(notes("C Major", "vi"), vec![A, C, E]);
        assert_eq!(notes("C Major", "ii"), vec![D, F, A]);
        assert_eq!(notes("C Major", "iii"), vec![E, G, B]);
        assert_eq!(notes("C Major", "vii°"), vec![B, D, F]);
    }

    #[test]
    fn test_chord_names() {
        assert_eq!(resolve("C Major", "I").name, "C");
        assert_eq!(resolve("C Major", "vi").name, "Am");
        assert_eq!(resolve("C Major", "ii").name, "Dm");
        assert_eq!(resolve("C Major", "vii°").name, "B°");
        assert_eq!(resolve("Bb Major", "IV").name, "Eb");
    }

    #[test]
    fn test_vii_is_diminished_in_any_case() {
        assert_eq!(notes("C Major", "vii"), vec![B, D, F]);
        assert_eq!(notes("C Major", "VII"), vec![B, D, F]);
    }

    #[test]
    fn test_diminished_fifth_spelled_in_key() {
        let f = find_key("F Major").unwrap();
        let chord = resolve_descriptor(f, "vii°").unwrap();
        assert_eq!(chord.spelled_notes(f), vec!["E", "G", "Bb"]);
    }

    #[test]
    fn test_secondary_dominants() {
        let chord = resolve("C Major", "V7/V");
        assert_eq!(chord.name, "D7");
        assert_eq!(chord.notes, vec![D, FSharp, A, C]);
        assert_eq!(notes("C Major", "V7/vi"), vec![E, GSharp, B, D]);
        assert_eq!(notes("C Major", "V7/ii"), vec![A, CSharp, E, G]);
    }

    #[test]
    fn test_secondary_prefix_is_ignored() {
        for d in ["V/V", "ii/V", "V9/V", "vii°/V"] {
            assert_eq!(notes("C Major", d), vec![D, FSharp, A, C], "{d:?}");
        }
        assert_eq!(resolve("C Major", "V/V").name, "D7");
    }

    #[test]
    fn test_secondary_dominant_name_follows_key_accidentals() {
        assert_eq!(resolve("F Major", "V7/IV").name, "F7");
        assert_eq!(resolve("Eb Major", "V7/vi").name, "G7");
        assert_eq!(resolve("Ab Major", "V7/ii").name, "F7");
    }

    #[test]
    fn test_wraps_past_b() {
        // vi in C is A-C-E: C and E wrap below A chromatically
        assert_eq!(notes("C Major", "vi"), vec![A, C, E]);
        // V7/V in A: B-D#-F#-A
        assert_eq!(notes("A Major", "V7/V"), vec![B, DSharp, FSharp, A]);
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(notes("C Major", "Isus4"), vec![C, F, G]);
        assert_eq!(resolve("C Major", "Isus4").name, "Csus4");
        assert_eq!(notes("C Major", "V7"), vec![G, B, D, F]);
        assert_eq!(resolve("C Major", "ii7").name, "Dm7");
        assert_eq!(resolve("C Major", "Imaj7").notes, vec![C, E, G, B]);
        assert_eq!(resolve("C Major", "vii7").name, "Bm7b5");
    }

    #[test]
    fn test_unknown_suffix_keeps_triad() {
        assert_eq!(resolve("C Major", "I9").name, "C");
        assert_eq!(notes("C Major", "I9"), vec![C, E, G]);
        assert_eq!(notes("C Major", "Imaj9"), vec![C, E, G]);
        assert_eq!(notes("C Major", "ii(add9)"), vec![D, F, A]);
        assert_eq!(resolve("C Major", "viimaj7").name, "B°");
        assert_eq!(notes("C Major", "vii°sus4"), vec![B, D, F]);
    }

    #[test]
    fn test_minor_numerals() {
        assert_eq!(resolve("A Minor", "i").name, "Am");
        assert_eq!(notes("A Minor", "iv"), vec![D, F, A]);
        assert_eq!(resolve("A Minor", "III").name, "C");
    }

    #[test]
    fn test_unresolvable_descriptors() {
        let key = find_key("C Major").unwrap();
        for bad in ["", "X", "IIII", "VIV", "Vi", "V7/x", "V7/", "/"] {
            assert_eq!(
                resolve_descriptor(key, bad),
                Err(HarmonyError::UnresolvedDescriptor(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let key = find_key("D Major").unwrap();
        for d in ["I", "ii", "V7/V", "vii°", "Isus4"] {
            assert_eq!(resolve_descriptor(key, d), resolve_descriptor(key, d));
        }
    }
}

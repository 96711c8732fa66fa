//! Octave normalization: close voicing of a chord above a reference octave

use crate::chord::Chord;
use crate::error::{HarmonyError, Result};
use crate::pitch::PlayableNote;

pub const MIN_OCTAVE: i32 = 0;
pub const MAX_OCTAVE: i32 = 8;

pub fn clamp_octave(octave: i32) -> i32 {
    octave.clamp(MIN_OCTAVE, MAX_OCTAVE)
}

/// Assign absolute octaves to a chord's notes.
///
/// Notes whose chromatic index is below the root's have wrapped past B and are
/// placed in the octave above `reference_octave`; the rest stay in it.
pub fn voice_chord(chord: &Chord, reference_octave: i32) -> Result<Vec<PlayableNote>> {
    let root = chord
        .root()
        .ok_or_else(|| HarmonyError::InvalidChord(format!("{}: no notes", chord.name)))?;
    let root_index = root.index();

    Ok(chord
        .notes
        .iter()
        .map(|&pc| {
            let octave = if pc.index() < root_index { reference_octave + 1 } else { reference_octave };
            PlayableNote::new(pc, octave)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::list_keys;
    use crate::pitch::PitchClass::*;
    use crate::progressions::resolve_progressions;

    fn names(notes: &[PlayableNote]) -> Vec<String> {
        notes.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_wrap() {
        let chord = Chord { name: "C".into(), notes: vec![C, E, G] };
        assert_eq!(names(&voice_chord(&chord, 4).unwrap()), vec!["C4", "E4", "G4"]);
    }

    #[test]
    fn test_wrap_past_b() {
        let chord = Chord { name: "Am".into(), notes: vec![A, C, E] };
        assert_eq!(names(&voice_chord(&chord, 4).unwrap()), vec!["A4", "C5", "E5"]);
    }

    #[test]
    fn test_seventh_chord_wrap() {
        let chord = Chord { name: "D7".into(), notes: vec![D, FSharp, A, C] };
        assert_eq!(names(&voice_chord(&chord, 3).unwrap()), vec!["D3", "F#3", "A3", "C4"]);
    }

    #[test]
    fn test_empty_chord_is_invalid() {
        let chord = Chord { name: "Empty".into(), notes: vec![] };
        assert!(matches!(voice_chord(&chord, 4), Err(HarmonyError::InvalidChord(_))));
    }

    #[test]
    fn test_every_resolved_chord_ascends_from_root() {
        for key in list_keys() {
            let resolved = resolve_progressions(key).unwrap();
            let chords = resolved
                .progressions
                .iter()
                .flat_map(|p| p.chords.iter())
                .chain(resolved.other_chords.iter());
            for chord in chords {
                let voiced = voice_chord(chord, 4).unwrap();
                let root = voiced[0].semitone();
                for pair in voiced.windows(2) {
                    assert!(pair[0].semitone() <= pair[1].semitone(), "{key}: {}", chord.name);
                }
                assert!(voiced.iter().all(|n| n.semitone() >= root), "{key}: {}", chord.name);
            }
        }
    }

    #[test]
    fn test_clamp_octave() {
        assert_eq!(clamp_octave(-3), 0);
        assert_eq!(clamp_octave(4), 4);
        assert_eq!(clamp_octave(12), 8);
    }
}

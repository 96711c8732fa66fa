//! Computer-keyboard mapping and on-screen piano layout

use crate::keys::Key;
use crate::pitch::{PitchClass, PlayableNote};

/// (key, pitch class, octave offset above the base octave)
pub const KEYBOARD_MAPPING: [(char, PitchClass, i32); 17] = [
    ('a', PitchClass::C, 0),
    ('w', PitchClass::CSharp, 0),
    ('s', PitchClass::D, 0),
    ('e', PitchClass::DSharp, 0),
    ('d', PitchClass::E, 0),
    ('f', PitchClass::F, 0),
    ('t', PitchClass::FSharp, 0),
    ('g', PitchClass::G, 0),
    ('y', PitchClass::GSharp, 0),
    ('h', PitchClass::A, 0),
    ('u', PitchClass::ASharp, 0),
    ('j', PitchClass::B, 0),
    ('k', PitchClass::C, 1),
    ('o', PitchClass::CSharp, 1),
    ('l', PitchClass::D, 1),
    ('p', PitchClass::DSharp, 1),
    (';', PitchClass::E, 1),
];

/// Number of keys drawn on the on-screen piano (two octaves plus the top C)
pub const PIANO_KEY_COUNT: usize = 25;

/// Note triggered by a computer key at `base_octave`
pub fn note_for_key(key: char, base_octave: i32) -> Option<PlayableNote> {
    let key = key.to_ascii_lowercase();
    KEYBOARD_MAPPING
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|&(_, pc, offset)| PlayableNote::new(pc, base_octave + offset))
}

/// Notes of the on-screen piano, starting at C of `octave`
pub fn keyboard_range(octave: i32) -> Vec<PlayableNote> {
    let start = PlayableNote::new(PitchClass::C, octave).semitone();
    (0..PIANO_KEY_COUNT as i32)
        .map(|i| {
            let semitone = start + i;
            PlayableNote::new(PitchClass::from_index(semitone), semitone.div_euclid(12) - 1)
        })
        .collect()
}

/// Label for a piano key: the key's own spelling when the note is diatonic,
/// otherwise the sharp name
pub fn key_label(pc: PitchClass, key: Option<&Key>) -> &'static str {
    match key {
        Some(k) if k.contains(pc) => k.spell(pc),
        _ => pc.sharp_name(),
    }
}

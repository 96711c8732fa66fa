//! On-screen piano with mouse and QWERTY input

use std::collections::{HashMap, HashSet};

use egui::{Align2, Color32, FontId, Key as InputKey, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, Vec2};
use sketchbook_core::{key_label, keyboard_range, note_for_key, Key, PlayableNote, KEYBOARD_MAPPING};

const WHITE_KEY: Color32 = Color32::from_rgb(240, 238, 230);
const WHITE_KEY_DIM: Color32 = Color32::from_rgb(170, 168, 160);
const BLACK_KEY: Color32 = Color32::from_rgb(30, 30, 34);
const BLACK_KEY_DIM: Color32 = Color32::from_rgb(70, 70, 76);
const KEY_LIT: Color32 = Color32::from_rgb(140, 200, 240);
const KEY_BORDER: Color32 = Color32::from_rgb(20, 20, 24);
const LABEL_DARK: Color32 = Color32::from_rgb(60, 60, 66);
const LABEL_LIGHT: Color32 = Color32::from_rgb(210, 210, 215);

const PIANO_HEIGHT: f32 = 180.0;
const BLACK_KEY_WIDTH: f32 = 0.6;
const BLACK_KEY_HEIGHT: f32 = 0.62;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PianoAction {
    NoteOn(PlayableNote),
    NoteOff(PlayableNote),
}

/// Input key for a mapped character
fn input_key(c: char) -> Option<InputKey> {
    Some(match c {
        'a' => InputKey::A,
        'w' => InputKey::W,
        's' => InputKey::S,
        'e' => InputKey::E,
        'd' => InputKey::D,
        'f' => InputKey::F,
        't' => InputKey::T,
        'g' => InputKey::G,
        'y' => InputKey::Y,
        'h' => InputKey::H,
        'u' => InputKey::U,
        'j' => InputKey::J,
        'k' => InputKey::K,
        'o' => InputKey::O,
        'l' => InputKey::L,
        'p' => InputKey::P,
        ';' => InputKey::Semicolon,
        _ => return None,
    })
}

struct KeyShape {
    note: PlayableNote,
    rect: Rect,
    black: bool,
}

pub struct PianoPanel {
    pressed_keys: HashMap<InputKey, PlayableNote>,
    mouse_note: Option<PlayableNote>,
}

impl PianoPanel {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashMap::new(),
            mouse_note: None,
        }
    }

    /// Release everything currently held by this panel
    pub fn release_all(&mut self) -> Vec<PianoAction> {
        let mut actions: Vec<PianoAction> =
            self.pressed_keys.drain().map(|(_, note)| PianoAction::NoteOff(note)).collect();
        if let Some(note) = self.mouse_note.take() {
            actions.push(PianoAction::NoteOff(note));
        }
        actions
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        octave: i32,
        key: Option<&Key>,
        lit: &HashSet<PlayableNote>,
        accept_keyboard: bool,
    ) -> Vec<PianoAction> {
        let mut actions = if accept_keyboard {
            self.handle_keyboard_input(ui, octave)
        } else {
            self.release_keyboard()
        };

        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(Vec2::new(width, PIANO_HEIGHT), Sense::click_and_drag());
        let shapes = layout_keys(response.rect, octave);

        // Mouse glissando: moving while held retriggers on the new key
        let hovered = if response.is_pointer_button_down_on() {
            response.interact_pointer_pos().and_then(|pos| hit_test(&shapes, pos))
        } else {
            None
        };
        if hovered != self.mouse_note {
            if let Some(old) = self.mouse_note.take() {
                actions.push(PianoAction::NoteOff(old));
            }
            if let Some(new) = hovered {
                actions.push(PianoAction::NoteOn(new));
            }
            self.mouse_note = hovered;
        }

        let held: HashSet<PlayableNote> = self.pressed_keys.values().copied().chain(self.mouse_note).collect();

        // White keys underneath, black keys on top
        for shape in shapes.iter().filter(|s| !s.black).chain(shapes.iter().filter(|s| s.black)) {
            let in_key = key.is_none_or(|k| k.contains(shape.note.pitch));
            let fill = match (lit.contains(&shape.note) || held.contains(&shape.note), shape.black, in_key) {
                (true, _, _) => KEY_LIT,
                (false, false, true) => WHITE_KEY,
                (false, false, false) => WHITE_KEY_DIM,
                (false, true, true) => BLACK_KEY,
                (false, true, false) => BLACK_KEY_DIM,
            };
            painter.rect_filled(shape.rect, 3.0, fill);
            painter.rect_stroke(shape.rect, 3.0, Stroke::new(1.0, KEY_BORDER), StrokeKind::Inside);

            let text_color = if shape.black { LABEL_LIGHT } else { LABEL_DARK };
            let bottom = Pos2::new(shape.rect.center().x, shape.rect.bottom() - 6.0);
            painter.text(
                bottom,
                Align2::CENTER_BOTTOM,
                key_label(shape.note.pitch, key),
                FontId::proportional(if shape.black { 10.0 } else { 12.0 }),
                text_color,
            );
            if let Some(c) = qwerty_char(shape.note, octave) {
                painter.text(
                    bottom - Vec2::new(0.0, 16.0),
                    Align2::CENTER_BOTTOM,
                    c.to_ascii_uppercase(),
                    FontId::monospace(9.0),
                    text_color.gamma_multiply(0.6),
                );
            }
        }

        actions
    }

    /// Computer-keyboard → note legend
    pub fn legend_ui(&self, ui: &mut Ui, octave: i32, key: Option<&Key>) {
        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 10.0;
            for &(c, pc, offset) in KEYBOARD_MAPPING.iter() {
                ui.monospace(format!("{} \u{2192} {}{}", c.to_ascii_uppercase(), key_label(pc, key), octave + offset));
            }
        });
    }

    fn handle_keyboard_input(&mut self, ui: &Ui, octave: i32) -> Vec<PianoAction> {
        let mut actions = Vec::new();

        // Leave Ctrl/Cmd combos to the app
        if ui.input(|i| i.modifiers.ctrl || i.modifiers.mac_cmd) {
            return actions;
        }

        for &(c, _, _) in KEYBOARD_MAPPING.iter() {
            let (Some(key), Some(note)) = (input_key(c), note_for_key(c, octave)) else {
                continue;
            };
            let is_pressed = ui.input(|inp| inp.key_down(key));
            let was_pressed = self.pressed_keys.contains_key(&key);

            if is_pressed && !was_pressed {
                self.pressed_keys.insert(key, note);
                actions.push(PianoAction::NoteOn(note));
                continue;
            }
            if !is_pressed && was_pressed {
                // Release the note that was started, even if the octave moved since
                let sent = self.pressed_keys.remove(&key).unwrap_or(note);
                actions.push(PianoAction::NoteOff(sent));
            }
        }

        actions
    }

    fn release_keyboard(&mut self) -> Vec<PianoAction> {
        self.pressed_keys.drain().map(|(_, note)| PianoAction::NoteOff(note)).collect()
    }
}

fn qwerty_char(note: PlayableNote, octave: i32) -> Option<char> {
    KEYBOARD_MAPPING
        .iter()
        .find(|&&(_, pc, offset)| pc == note.pitch && octave + offset == note.octave)
        .map(|&(c, _, _)| c)
}

fn layout_keys(rect: Rect, octave: i32) -> Vec<KeyShape> {
    let notes = keyboard_range(octave);
    let white_count = notes.iter().filter(|n| !n.pitch.is_accidental()).count().max(1);
    let white_w = rect.width() / white_count as f32;

    let mut shapes = Vec::with_capacity(notes.len());
    let mut white_index = 0usize;
    for note in notes {
        if note.pitch.is_accidental() {
            // Centered on the boundary after the previous white key
            let x = rect.left() + white_index as f32 * white_w - white_w * BLACK_KEY_WIDTH / 2.0;
            shapes.push(KeyShape {
                note,
                rect: Rect::from_min_size(
                    Pos2::new(x, rect.top()),
                    Vec2::new(white_w * BLACK_KEY_WIDTH, rect.height() * BLACK_KEY_HEIGHT),
                ),
                black: true,
            });
        } else {
            let x = rect.left() + white_index as f32 * white_w;
            shapes.push(KeyShape {
                note,
                rect: Rect::from_min_size(Pos2::new(x, rect.top()), Vec2::new(white_w, rect.height())),
                black: false,
            });
            white_index += 1;
        }
    }
    shapes
}

fn hit_test(shapes: &[KeyShape], pos: Pos2) -> Option<PlayableNote> {
    shapes
        .iter()
        .filter(|s| s.black)
        .chain(shapes.iter().filter(|s| !s.black))
        .find(|s| s.rect.contains(pos))
        .map(|s| s.note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchbook_core::PitchClass;

    fn piano_rect() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(750.0, PIANO_HEIGHT))
    }

    #[test]
    fn test_every_mapped_char_has_input_key() {
        for &(c, _, _) in KEYBOARD_MAPPING.iter() {
            assert!(input_key(c).is_some(), "no input key for {c:?}");
        }
    }

    #[test]
    fn test_layout_has_fifteen_white_keys() {
        let shapes = layout_keys(piano_rect(), 4);
        assert_eq!(shapes.len(), 25);
        assert_eq!(shapes.iter().filter(|s| !s.black).count(), 15);
        assert_eq!(shapes[0].rect.left(), 0.0);
    }

    #[test]
    fn test_hit_test_prefers_black_keys() {
        let shapes = layout_keys(piano_rect(), 4);
        // Boundary between C4 and D4, near the top: C#4
        let c_sharp = hit_test(&shapes, Pos2::new(50.0, 10.0));
        assert_eq!(c_sharp, Some(PlayableNote::new(PitchClass::CSharp, 4)));
        // Same x near the bottom falls through to the white key
        let white = hit_test(&shapes, Pos2::new(45.0, PIANO_HEIGHT - 5.0));
        assert_eq!(white, Some(PlayableNote::new(PitchClass::C, 4)));
    }

    #[test]
    fn test_qwerty_char_follows_octave() {
        assert_eq!(qwerty_char(PlayableNote::new(PitchClass::C, 3), 3), Some('a'));
        assert_eq!(qwerty_char(PlayableNote::new(PitchClass::C, 4), 3), Some('k'));
        assert_eq!(qwerty_char(PlayableNote::new(PitchClass::F, 4), 3), None);
    }
}

//! Progression selector and chord buttons

use egui::{Color32, RichText, Ui};
use sketchbook_core::{Chord, HarmonySuggestion, Key, ResolvedProgressions};

pub enum ChordPlayerAction {
    None,
    PlayChord(Chord),
    ClearSuggestion,
}

pub struct ChordPlayerPanel {
    selected_progression: Option<String>,
}

impl ChordPlayerPanel {
    pub fn new(library: &ResolvedProgressions) -> Self {
        let mut panel = Self { selected_progression: None };
        panel.reset(library);
        panel
    }

    /// Select the first progression of a freshly resolved library
    pub fn reset(&mut self, library: &ResolvedProgressions) {
        self.selected_progression = library.progressions.first().map(|p| p.name.clone());
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        library: &ResolvedProgressions,
        key: &Key,
        suggestion: Option<(&HarmonySuggestion, &Key)>,
    ) -> ChordPlayerAction {
        let mut action = ChordPlayerAction::None;

        ui.horizontal(|ui| {
            ui.label(RichText::new("Progression").strong());
            let selected_text = self.selected_progression.as_deref().unwrap_or("None");
            egui::ComboBox::from_id_salt("progression_select")
                .selected_text(selected_text)
                .width(200.0)
                .show_ui(ui, |ui| {
                    for prog in &library.progressions {
                        let is_selected = self.selected_progression.as_deref() == Some(prog.name.as_str());
                        if ui.selectable_label(is_selected, &prog.name).clicked() {
                            self.selected_progression = Some(prog.name.clone());
                        }
                    }
                });
        });

        let chords = self
            .selected_progression
            .as_deref()
            .and_then(|name| library.progression(name))
            .map(|p| p.chords.as_slice())
            .unwrap_or_default();
        if let Some(chord) = chord_row(ui, chords, key) {
            action = ChordPlayerAction::PlayChord(chord);
        }

        ui.add_space(4.0);
        ui.label(RichText::new("Other chords").strong());
        if let Some(chord) = chord_row(ui, &library.other_chords, key) {
            action = ChordPlayerAction::PlayChord(chord);
        }

        if let Some((suggestion, suggestion_key)) = suggestion {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("AI progression").strong().color(Color32::from_rgb(140, 200, 240)));
                if ui.small_button("Clear").on_hover_text("Clear suggestion").clicked() {
                    action = ChordPlayerAction::ClearSuggestion;
                }
            });
            if let Some(chord) = chord_row(ui, &suggestion.chord_progression, suggestion_key) {
                action = ChordPlayerAction::PlayChord(chord);
            }
        }

        action
    }
}

/// One button per chord; returns the clicked chord
fn chord_row(ui: &mut Ui, chords: &[Chord], key: &Key) -> Option<Chord> {
    let mut clicked = None;
    ui.horizontal_wrapped(|ui| {
        if chords.is_empty() {
            ui.label(RichText::new("No chords").color(Color32::GRAY));
        }
        for chord in chords {
            let btn = ui.add(egui::Button::new(RichText::new(&chord.name).size(16.0)).min_size(egui::vec2(48.0, 32.0)));
            if btn.clicked() {
                clicked = Some(chord.clone());
            }
            btn.on_hover_text(chord.spelled_notes(key).join(" "));
        }
    });
    clicked
}

//! AI harmony helper form and result cards

use egui::{Color32, RichText, Ui};
use sketchbook_core::{list_keys, Chord, HarmonyRequest, HarmonySuggestion, Instrument, Key};

pub enum HarmonyHelperAction {
    None,
    Suggest(HarmonyRequest),
    PlayChord(Chord),
}

pub struct HarmonyHelperPanel {
    instrument: Instrument,
    key: &'static str,
}

impl HarmonyHelperPanel {
    pub fn new(instrument: Instrument, key: &'static str) -> Self {
        Self { instrument, key }
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        pending: bool,
        suggestion: Option<(&HarmonySuggestion, &Key)>,
    ) -> HarmonyHelperAction {
        let mut action = HarmonyHelperAction::None;

        ui.heading("Harmony Helper");
        ui.horizontal(|ui| {
            ui.label("Instrument:");
            egui::ComboBox::from_id_salt("ai_instrument")
                .selected_text(self.instrument.label())
                .show_ui(ui, |ui| {
                    for inst in Instrument::ALL {
                        ui.selectable_value(&mut self.instrument, inst, inst.label());
                    }
                });

            ui.label("Key:");
            egui::ComboBox::from_id_salt("ai_key")
                .selected_text(self.key)
                .height(400.0)
                .show_ui(ui, |ui| {
                    for name in list_keys() {
                        ui.selectable_value(&mut self.key, name, name);
                    }
                });

            if pending {
                ui.add_enabled(false, egui::Button::new("Suggesting..."));
                ui.spinner();
            } else if ui.button("Suggest Harmony").clicked() {
                action = HarmonyHelperAction::Suggest(HarmonyRequest {
                    instrument: self.instrument,
                    key: self.key.to_string(),
                });
            }
        });

        // Notes are spelled in the key the progression was requested for
        let Some((suggestion, requested_key)) = suggestion else {
            return action;
        };

        ui.add_space(6.0);
        ui.label(RichText::new("Suggested progression").strong());
        ui.horizontal_wrapped(|ui| {
            for chord in &suggestion.chord_progression {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        if ui.button(RichText::new(&chord.name).size(16.0)).clicked() {
                            action = HarmonyHelperAction::PlayChord(chord.clone());
                        }
                        ui.label(
                            RichText::new(chord.spelled_notes(requested_key).join(" "))
                                .small()
                                .color(Color32::GRAY),
                        );
                    });
                });
            }
        });

        if !suggestion.harmony_suggestions.is_empty() {
            ui.add_space(6.0);
            ui.label(RichText::new("Harmony suggestions").strong());
            ui.label(&suggestion.harmony_suggestions);
        }

        action
    }
}

//! Instrument, octave, key and record controls with the active scale

use egui::{Color32, RichText, Ui};
use sketchbook_core::{list_keys, Instrument, Key, MAX_OCTAVE, MIN_OCTAVE};

/// Actions that can be triggered from the control bar
pub enum ControlsAction {
    None,
    SetInstrument(Instrument),
    OctaveDown,
    OctaveUp,
    SetKey(&'static str),
    ToggleRecord,
}

pub struct ControlsPanel;

impl ControlsPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(
        &mut self,
        ui: &mut Ui,
        instrument: Instrument,
        octave: i32,
        key: &Key,
        recording: bool,
    ) -> ControlsAction {
        let mut action = ControlsAction::None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;

            ui.label("Instrument:");
            let mut selected = instrument;
            egui::ComboBox::from_id_salt("instrument_select")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for inst in Instrument::ALL {
                        ui.selectable_value(&mut selected, inst, inst.label());
                    }
                });
            if selected != instrument {
                action = ControlsAction::SetInstrument(selected);
            }

            ui.separator();

            ui.label("Octave:");
            if ui.add_enabled(octave > MIN_OCTAVE, egui::Button::new("\u{2212}")).clicked() {
                action = ControlsAction::OctaveDown;
            }
            ui.monospace(octave.to_string());
            if ui.add_enabled(octave < MAX_OCTAVE, egui::Button::new("+")).clicked() {
                action = ControlsAction::OctaveUp;
            }

            ui.separator();

            ui.label("Key:");
            egui::ComboBox::from_id_salt("key_select")
                .selected_text(key.name)
                .height(400.0)
                .show_ui(ui, |ui| {
                    for name in list_keys() {
                        if ui.selectable_label(name == key.name, name).clicked() && name != key.name {
                            action = ControlsAction::SetKey(name);
                        }
                    }
                });

            ui.separator();

            let rec_color = if recording {
                Color32::from_rgb(255, 50, 50)
            } else {
                Color32::from_gray(150)
            };
            let rec_btn = ui.button(RichText::new("\u{23FA} Sketch").color(rec_color));
            if rec_btn.clicked() {
                action = ControlsAction::ToggleRecord;
            }
            rec_btn.on_hover_text(if recording { "Stop recording to the sketchbook" } else { "Record to the sketchbook" });
        });

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{} scale:", key.name)).strong());
            for name in key.spelling {
                ui.monospace(name);
            }
        });

        action
    }
}

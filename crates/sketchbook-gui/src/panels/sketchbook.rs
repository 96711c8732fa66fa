//! Sketchbook transcript view

use egui::{Color32, RichText, Ui};
use sketchbook_core::{EntryId, EntryKind, RowId, Sketchbook, TranscriptEntry};

pub enum SketchbookAction {
    None,
    PlayEntry(TranscriptEntry),
    ClearEntry { row: RowId, entry: EntryId },
    AddRow,
    ClearAll,
}

const NOTE_CHIP: Color32 = Color32::from_rgb(60, 90, 120);
const CHORD_CHIP: Color32 = Color32::from_rgb(110, 85, 40);

pub struct SketchbookPanel;

impl SketchbookPanel {
    pub fn new() -> Self {
        Self
    }

    pub fn ui(&mut self, ui: &mut Ui, book: &Sketchbook) -> SketchbookAction {
        let mut action = SketchbookAction::None;

        ui.horizontal(|ui| {
            ui.heading("Sketchbook");
            if !book.is_enabled() {
                ui.label(RichText::new("(paused)").color(Color32::GRAY));
            }
        });
        ui.horizontal(|ui| {
            if ui.button("+ Row").clicked() {
                action = SketchbookAction::AddRow;
            }
            if ui.add_enabled(!book.is_empty() || book.rows().len() > 1, egui::Button::new("Clear all")).clicked() {
                action = SketchbookAction::ClearAll;
            }
        });
        ui.separator();

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            for (i, row) in book.rows().iter().enumerate() {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new(format!("{:>2}", i + 1)).monospace().color(Color32::GRAY));
                    if row.entries.is_empty() {
                        ui.label(RichText::new("empty").italics().color(Color32::DARK_GRAY));
                    }
                    for entry in &row.entries {
                        let fill = match entry.kind {
                            EntryKind::Note => NOTE_CHIP,
                            EntryKind::Chord => CHORD_CHIP,
                        };
                        let chip = ui.add(egui::Button::new(RichText::new(&entry.content).color(Color32::WHITE)).fill(fill));
                        if chip.clicked() {
                            action = SketchbookAction::PlayEntry(entry.clone());
                        }
                        if chip.secondary_clicked() {
                            action = SketchbookAction::ClearEntry { row: row.id, entry: entry.id };
                        }
                        chip.on_hover_text("Click to replay, right-click to remove");
                    }
                });
            }
        });

        action
    }
}

//! Main application state

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use eframe::CreationContext;
use egui::{Color32, Context, RichText};
use sketchbook_core::keys::KEYS;
use sketchbook_core::{
    clamp_octave, find_key, resolve_progressions, voice_chord, Chord, EntryKind, HarmonyRequest,
    HarmonySuggestion, Instrument, Key, PlayableNote, ResolvedProgressions, Sketchbook,
    TranscriptEntry,
};
use sketchbook_services::{
    default_device_info, AudioEngine, AudioEngineError, OllamaClient, SuggestError, SuggestionWorker,
};

use crate::config::{load_config, save_config, AppConfig};
use crate::panels::{
    ChordPlayerAction, ChordPlayerPanel, ControlsAction, ControlsPanel, HarmonyHelperAction,
    HarmonyHelperPanel, PianoAction, PianoPanel, SketchbookAction, SketchbookPanel,
};

const CHORD_DURATION: Duration = Duration::from_secs(1);
/// An eighth note at 120 BPM
const REPLAY_NOTE_DURATION: Duration = Duration::from_millis(250);
const NOTE_HIGHLIGHT: Duration = Duration::from_millis(500);
const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, PartialEq, Eq)]
enum ToastLevel {
    Info,
    Error,
}

struct Toast {
    message: String,
    level: ToastLevel,
    expires: Instant,
}

type PendingSuggestion = Receiver<Result<HarmonySuggestion, SuggestError>>;

/// Chord to replay for a sketchbook entry: the AI progression wins over the library
fn lookup_chord<'a>(
    suggestion: Option<&'a HarmonySuggestion>,
    library: &'a ResolvedProgressions,
    name: &str,
) -> Option<&'a Chord> {
    suggestion
        .and_then(|s| s.find_chord(name))
        .or_else(|| library.find_chord(name))
}

/// Key an AI progression is spelled in: the one it was requested for
fn requested_key(request: &HarmonyRequest, fallback: &'static Key) -> &'static Key {
    find_key(&request.key).unwrap_or(fallback)
}

pub struct SketchbookApp {
    engine: AudioEngine,
    audio_enabled: bool,
    device_label: String,
    config: AppConfig,

    instrument: Instrument,
    octave: i32,
    key: &'static Key,
    library: ResolvedProgressions,
    sketchbook: Sketchbook,

    ai_suggestion: Option<HarmonySuggestion>,
    ai_key: &'static Key,
    pending_suggestion: Option<PendingSuggestion>,
    pending_key: &'static Key,

    // Notes sounding from the piano, and timed highlights from chords/replay
    held_notes: HashSet<PlayableNote>,
    lit_notes: Vec<(PlayableNote, Instant)>,
    toasts: Vec<Toast>,

    // Panels
    controls_panel: ControlsPanel,
    chord_player_panel: ChordPlayerPanel,
    piano_panel: PianoPanel,
    sketchbook_panel: SketchbookPanel,
    harmony_helper_panel: HarmonyHelperPanel,
}

impl SketchbookApp {
    pub fn new(_cc: &CreationContext<'_>) -> Self {
        let config = load_config();
        let engine = AudioEngine::new(config.audio.instrument, config.audio.sample_rate);
        let device_label = match default_device_info() {
            Ok(info) => format!("Output: {} ({} Hz)", info.name, info.format.sample_rate),
            Err(e) => e.to_string(),
        };

        let key = find_key(&config.audio.key).unwrap_or(&KEYS[0]);
        let library = resolve_progressions(key.name).unwrap_or_else(|e| {
            tracing::error!("Failed to resolve progressions for {}: {}", key.name, e);
            ResolvedProgressions::default()
        });

        let mut sketchbook = Sketchbook::new();
        sketchbook.set_enabled(config.sketchbook.record);

        Self {
            engine,
            audio_enabled: false,
            device_label,
            instrument: config.audio.instrument,
            octave: clamp_octave(config.audio.octave),
            key,
            chord_player_panel: ChordPlayerPanel::new(&library),
            library,
            sketchbook,
            ai_suggestion: None,
            ai_key: key,
            pending_suggestion: None,
            pending_key: key,
            held_notes: HashSet::new(),
            lit_notes: Vec::new(),
            toasts: Vec::new(),
            controls_panel: ControlsPanel::new(),
            piano_panel: PianoPanel::new(),
            sketchbook_panel: SketchbookPanel::new(),
            harmony_helper_panel: HarmonyHelperPanel::new(config.audio.instrument, key.name),
            config,
        }
    }

    fn notify(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push(Toast {
            message: message.into(),
            level,
            expires: Instant::now() + TOAST_DURATION,
        });
    }

    fn report(&mut self, context: &str, err: AudioEngineError) {
        tracing::warn!("{}: {}", context, err);
        self.notify(ToastLevel::Error, format!("{context}: {err}"));
    }

    fn enable_audio(&mut self) {
        match self.engine.start() {
            Ok(()) | Err(AudioEngineError::AlreadyRunning) => self.audio_enabled = true,
            Err(e) => self.report("Could not start audio", e),
        }
    }

    fn light(&mut self, notes: &[PlayableNote], duration: Duration) {
        let until = Instant::now() + duration;
        self.lit_notes.extend(notes.iter().map(|&n| (n, until)));
    }

    fn set_key(&mut self, name: &str) {
        let key = match find_key(name) {
            Ok(k) => k,
            Err(e) => {
                self.notify(ToastLevel::Error, e.to_string());
                return;
            }
        };
        match resolve_progressions(key.name) {
            Ok(library) => {
                self.key = key;
                self.library = library;
                self.chord_player_panel.reset(&self.library);
                tracing::info!("Key changed to {}", key.name);
            }
            Err(e) => self.notify(ToastLevel::Error, e.to_string()),
        }
    }

    fn set_octave(&mut self, octave: i32) {
        self.octave = clamp_octave(octave);
    }

    /// Voice and sound a chord at the current octave
    fn play_chord(&mut self, chord: &Chord, record: bool) {
        let notes = match voice_chord(chord, self.octave) {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!("Cannot voice {}: {}", chord.name, e);
                return;
            }
        };
        if record {
            self.sketchbook.record(chord.name.clone(), EntryKind::Chord);
        }
        if let Err(e) = self.engine.play_chord(&notes, CHORD_DURATION) {
            self.report("Chord playback failed", e);
            return;
        }
        self.light(&notes, CHORD_DURATION);
    }

    fn replay_entry(&mut self, entry: &TranscriptEntry) {
        match entry.kind {
            EntryKind::Note => {
                let Ok(note) = entry.content.parse::<PlayableNote>() else {
                    tracing::warn!("Unreadable sketchbook note: {}", entry.content);
                    return;
                };
                match self.engine.play_note_with_duration(&note, REPLAY_NOTE_DURATION) {
                    Ok(()) => self.light(&[note], NOTE_HIGHLIGHT),
                    Err(e) => self.report("Note playback failed", e),
                }
            }
            EntryKind::Chord => {
                let chord = lookup_chord(self.ai_suggestion.as_ref(), &self.library, &entry.content).cloned();
                match chord {
                    Some(chord) => self.play_chord(&chord, false),
                    None => tracing::debug!("No chord named {} in the current key", entry.content),
                }
            }
        }
    }

    fn request_suggestion(&mut self, request: HarmonyRequest) {
        if self.pending_suggestion.is_some() {
            return;
        }
        self.pending_key = requested_key(&request, self.key);
        let client = OllamaClient::new(self.config.ai.clone());
        self.pending_suggestion = Some(SuggestionWorker::spawn(client, request));
    }

    fn poll_suggestion(&mut self) {
        let Some(rx) = &self.pending_suggestion else { return };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(SuggestError::Transport("worker exited".into())),
        };
        self.pending_suggestion = None;

        match result {
            Ok(suggestion) => {
                self.notify(ToastLevel::Info, format!("{} chords suggested", suggestion.chord_progression.len()));
                self.ai_suggestion = Some(suggestion);
                self.ai_key = self.pending_key;
            }
            Err(e) => self.notify(ToastLevel::Error, format!("Error getting suggestions: {e}")),
        }
    }

    fn handle_controls_action(&mut self, action: ControlsAction) {
        match action {
            ControlsAction::SetInstrument(instrument) => {
                self.instrument = instrument;
                self.engine.set_instrument(instrument);
                self.held_notes.clear();
            }
            ControlsAction::OctaveDown => self.set_octave(self.octave - 1),
            ControlsAction::OctaveUp => self.set_octave(self.octave + 1),
            ControlsAction::SetKey(name) => self.set_key(name),
            ControlsAction::ToggleRecord => {
                let enabled = !self.sketchbook.is_enabled();
                self.sketchbook.set_enabled(enabled);
            }
            ControlsAction::None => {}
        }
    }

    fn handle_chord_player_action(&mut self, action: ChordPlayerAction) {
        match action {
            ChordPlayerAction::PlayChord(chord) => self.play_chord(&chord, true),
            ChordPlayerAction::ClearSuggestion => self.ai_suggestion = None,
            ChordPlayerAction::None => {}
        }
    }

    fn handle_piano_actions(&mut self, actions: Vec<PianoAction>) {
        for action in actions {
            match action {
                PianoAction::NoteOn(note) => {
                    if let Err(e) = self.engine.play_note(&note) {
                        self.report("Note playback failed", e);
                        continue;
                    }
                    self.held_notes.insert(note);
                    self.sketchbook.record(note.to_string(), EntryKind::Note);
                }
                PianoAction::NoteOff(note) => {
                    self.held_notes.remove(&note);
                    if let Err(e) = self.engine.stop_note(&note) {
                        tracing::debug!("Note off for {} ignored: {}", note, e);
                    }
                }
            }
        }
    }

    fn handle_sketchbook_action(&mut self, action: SketchbookAction) {
        match action {
            SketchbookAction::PlayEntry(entry) => self.replay_entry(&entry),
            SketchbookAction::ClearEntry { row, entry } => {
                self.sketchbook.clear_entry(row, entry);
            }
            SketchbookAction::AddRow => {
                self.sketchbook.add_row();
            }
            SketchbookAction::ClearAll => self.sketchbook.clear_all(),
            SketchbookAction::None => {}
        }
    }

    fn handle_harmony_helper_action(&mut self, action: HarmonyHelperAction) {
        match action {
            HarmonyHelperAction::Suggest(request) => self.request_suggestion(request),
            HarmonyHelperAction::PlayChord(chord) => self.play_chord(&chord, true),
            HarmonyHelperAction::None => {}
        }
    }

    fn welcome_ui(&mut self, ctx: &Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading(RichText::new("Keyboard Sketchbook").size(32.0));
                ui.add_space(8.0);
                ui.label("Explore harmonies, play chords, and sketch ideas. Enable audio to begin.");
                ui.add_space(16.0);
                if ui.button(RichText::new("Enable Audio").size(18.0)).clicked() {
                    self.enable_audio();
                }
                ui.add_space(8.0);
                ui.label(RichText::new(&self.device_label).small().color(Color32::GRAY));
            });
        });
    }

    fn toasts_ui(&mut self, ctx: &Context) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let color = match toast.level {
                            ToastLevel::Info => Color32::from_rgb(140, 200, 240),
                            ToastLevel::Error => Color32::from_rgb(255, 110, 110),
                        };
                        ui.label(RichText::new(&toast.message).color(color));
                    });
                }
            });
    }

    fn current_config(&self) -> AppConfig {
        let mut config = self.config.clone();
        config.audio.instrument = self.instrument;
        config.audio.octave = self.octave;
        config.audio.key = self.key.name.to_string();
        config.sketchbook.record = self.sketchbook.is_enabled();
        config
    }
}

impl eframe::App for SketchbookApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_suggestion();

        if !self.audio_enabled {
            self.welcome_ui(ctx);
            self.toasts_ui(ctx);
            return;
        }

        // 1. Header
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Keyboard Sketchbook");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let muted = self.engine.is_muted();
                    let label = if muted { "\u{1F507}" } else { "\u{1F50A}" };
                    let btn = ui.button(RichText::new(label).size(18.0));
                    if btn.clicked() {
                        self.engine.toggle_mute();
                    }
                    btn.on_hover_text(if muted { "Unmute" } else { "Mute" });
                    if let Some(info) = self.engine.output_info() {
                        ui.label(RichText::new(&info.name).small().color(Color32::GRAY));
                    }
                });
            });
        });

        // 2. Controls
        let controls_action = egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.controls_panel.ui(ui, self.instrument, self.octave, self.key, self.sketchbook.is_enabled())
        }).inner;
        self.handle_controls_action(controls_action);

        // 3. Sketchbook on the right
        let sketchbook_action = egui::SidePanel::right("sketchbook")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.sketchbook_panel.ui(ui, &self.sketchbook))
            .inner;
        self.handle_sketchbook_action(sketchbook_action);

        // 4. Chord player, piano, legend, harmony helper
        let accept_keyboard = ctx.memory(|m| m.focused().is_none());
        let now = Instant::now();
        self.lit_notes.retain(|(_, until)| *until > now);
        let lit: HashSet<PlayableNote> = self.lit_notes.iter().map(|(n, _)| *n).chain(self.held_notes.iter().copied()).collect();

        let (chord_action, piano_actions, helper_action) = egui::CentralPanel::default().show(ctx, |ui| {
            let chord_action = self.chord_player_panel.ui(
                ui,
                &self.library,
                self.key,
                self.ai_suggestion.as_ref().map(|s| (s, self.ai_key)),
            );
            ui.separator();

            let piano_actions = self.piano_panel.ui(ui, self.octave, Some(self.key), &lit, accept_keyboard);
            ui.add_space(4.0);
            self.piano_panel.legend_ui(ui, self.octave, Some(self.key));
            ui.separator();

            let helper_action = self.harmony_helper_panel.ui(
                ui,
                self.pending_suggestion.is_some(),
                self.ai_suggestion.as_ref().map(|s| (s, self.ai_key)),
            );
            (chord_action, piano_actions, helper_action)
        }).inner;

        self.handle_chord_player_action(chord_action);
        self.handle_piano_actions(piano_actions);
        self.handle_harmony_helper_action(helper_action);

        self.toasts_ui(ctx);

        if !self.lit_notes.is_empty() || self.pending_suggestion.is_some() || !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let released = self.piano_panel.release_all();
        self.handle_piano_actions(released);
        save_config(&self.current_config());
        let _ = self.engine.stop();
    }
}

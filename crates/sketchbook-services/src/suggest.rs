//! AI harmony suggestions from a local Ollama server

use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use serde::{Deserialize, Serialize};
use sketchbook_core::{Chord, HarmonyRequest, HarmonySuggestion};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Server returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Malformed suggestion: {0}")]
    Decode(String),
    #[error("Suggestion contained no playable chords")]
    EmptyProgression,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SuggestedChord {
    name: String,
    notes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionPayload {
    chord_progression: Vec<SuggestedChord>,
    #[serde(default)]
    harmony_suggestions: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub fn build_prompt(request: &HarmonyRequest) -> String {
    format!(
        "You are an expert in sacred music composition.\n\
         \n\
         Suggest a chord progression and harmonies that fit the selected instrument and key.\n\
         \n\
         Instrument: {instrument}\n\
         Key: {key}\n\
         \n\
         Reply with a single JSON object with two fields. \"chordProgression\" is an array of \
         objects, one per chord, each with a \"name\" and the individual \"notes\" without octave \
         numbers, for example [{{\"name\": \"C\", \"notes\": [\"C\", \"E\", \"G\"]}}, \
         {{\"name\": \"G\", \"notes\": [\"G\", \"B\", \"D\"]}}]. \"harmonySuggestions\" is a string \
         with complementary harmony advice.",
        instrument = request.instrument.name(),
        key = request.key,
    )
}

/// Decode model output into a suggestion. Chords with unreadable notes are
/// dropped; an empty result is an error.
pub fn parse_suggestion(text: &str) -> Result<HarmonySuggestion, SuggestError> {
    let body = json_object(text).ok_or_else(|| SuggestError::Decode("no JSON object in reply".into()))?;
    let payload: SuggestionPayload =
        serde_json::from_str(body).map_err(|e| SuggestError::Decode(e.to_string()))?;

    let chord_progression: Vec<Chord> = payload
        .chord_progression
        .into_iter()
        .filter_map(|c| match Chord::from_note_names(&c.name, &c.notes) {
            Ok(chord) => Some(chord),
            Err(e) => {
                warn!(chord = %c.name, error = %e, "Dropping suggested chord");
                None
            }
        })
        .collect();

    if chord_progression.is_empty() {
        return Err(SuggestError::EmptyProgression);
    }

    Ok(HarmonySuggestion {
        chord_progression,
        harmony_suggestions: payload.harmony_suggestions,
    })
}

/// Outermost `{...}` span, tolerating code fences or chatter around it
fn json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub struct OllamaClient {
    config: SuggestConfig,
}

impl OllamaClient {
    pub fn new(config: SuggestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    /// Blocking request; run it off the UI thread
    pub fn suggest(&self, request: &HarmonyRequest) -> Result<HarmonySuggestion, SuggestError> {
        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        info!(%url, model = %self.config.model, key = %request.key, "Requesting harmony suggestion");

        let body = GenerateRequest {
            model: &self.config.model,
            prompt: build_prompt(request),
            stream: false,
            format: "json",
        };

        let response = ureq::post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(status, resp) => SuggestError::Http {
                    status,
                    message: resp.into_string().unwrap_or_default(),
                },
                ureq::Error::Transport(t) => SuggestError::Transport(t.to_string()),
            })?;

        let generated: GenerateResponse = response
            .into_json()
            .map_err(|e| SuggestError::Decode(e.to_string()))?;

        let suggestion = parse_suggestion(&generated.response)?;
        info!(chords = suggestion.chord_progression.len(), "Harmony suggestion received");
        Ok(suggestion)
    }
}

/// Runs one suggestion request on a background thread
pub struct SuggestionWorker;

impl SuggestionWorker {
    /// The receiver yields exactly one result
    pub fn spawn(client: OllamaClient, request: HarmonyRequest) -> Receiver<Result<HarmonySuggestion, SuggestError>> {
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let result = client.suggest(&request);
            if let Err(e) = &result {
                warn!(error = %e, "Harmony suggestion failed");
            }
            let _ = tx.send(result);
        });
        rx
    }
}

//! App config persistence

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sketchbook_core::{clamp_octave, find_key, Instrument};
use sketchbook_services::SuggestConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub sketchbook: SketchbookConfig,
    #[serde(default)]
    pub ai: SuggestConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub instrument: Instrument,
    pub octave: i32,
    pub key: String,
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            instrument: Instrument::Piano,
            octave: 4,
            key: "C Major".to_string(),
            sample_rate: 44100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchbookConfig {
    pub record: bool,
}

impl Default for SketchbookConfig {
    fn default() -> Self {
        Self { record: true }
    }
}

impl AppConfig {
    /// Replace out-of-range values with something playable
    fn sanitized(mut self) -> Self {
        self.audio.octave = clamp_octave(self.audio.octave);
        if find_key(&self.audio.key).is_err() {
            self.audio.key = AudioConfig::default().key;
        }
        self
    }
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyboard-sketchbook")
        .join("config.toml")
}

/// Parse config text; anything unreadable falls back to defaults
pub fn parse_config(text: &str) -> AppConfig {
    toml::from_str::<AppConfig>(text).unwrap_or_default().sanitized()
}

pub fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .map(|s| parse_config(&s))
        .unwrap_or_default()
}

pub fn save_config(config: &AppConfig) {
    let path = config_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(s) = toml::to_string_pretty(config) else { return };
    if let Err(e) = std::fs::write(&path, s) {
        tracing::warn!("Failed to save config to {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.audio.octave, 4);
        assert!(config.sketchbook.record);
        assert_eq!(config.ai.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            "[audio]\ninstrument = \"organ\"\n\n[ai]\nmodel = \"mistral\"\n",
        );
        assert_eq!(config.audio.instrument, Instrument::Organ);
        assert_eq!(config.audio.octave, 4);
        assert_eq!(config.ai.model, "mistral");
        assert_eq!(config.ai.timeout_secs, SuggestConfig::default().timeout_secs);
    }

    #[test]
    fn test_invalid_values_are_sanitized() {
        let config = parse_config("[audio]\noctave = 12\nkey = \"H Major\"\n");
        assert_eq!(config.audio.octave, 8);
        assert_eq!(config.audio.key, "C Major");
    }

    #[test]
    fn test_garbage_is_default() {
        assert_eq!(parse_config("not = [valid"), AppConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::default();
        config.audio.instrument = Instrument::Strings;
        config.audio.key = "Eb Major".into();
        config.sketchbook.record = false;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(parse_config(&text), config);
    }
}

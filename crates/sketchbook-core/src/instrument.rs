//! Playable instrument presets

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Piano,
    Organ,
    Strings,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Self::Piano, Self::Organ, Self::Strings];

    /// Identifier used in config files and AI prompts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Piano => "piano",
            Self::Organ => "organ",
            Self::Strings => "strings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Piano => "Piano",
            Self::Organ => "Organ",
            Self::Strings => "Strings",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match() {
        for inst in Instrument::ALL {
            let json = serde_json::to_string(&inst).unwrap();
            assert_eq!(json, format!("\"{}\"", inst.name()));
        }
    }
}

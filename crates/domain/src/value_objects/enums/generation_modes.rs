use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The four fixed generation styles sellers can request for a product photo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    MainWhite,
    Lifestyle,
    FeatureCallout,
    Packaging,
}

impl GenerationMode {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "main_white" => Some(GenerationMode::MainWhite),
            "lifestyle" => Some(GenerationMode::Lifestyle),
            "feature_callout" => Some(GenerationMode::FeatureCallout),
            "packaging" => Some(GenerationMode::Packaging),
            _ => None,
        }
    }
}

impl Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            GenerationMode::MainWhite => "main_white",
            GenerationMode::Lifestyle => "lifestyle",
            GenerationMode::FeatureCallout => "feature_callout",
            GenerationMode::Packaging => "packaging",
        };
        write!(f, "{}", mode)
    }
}

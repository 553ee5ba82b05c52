use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::enums::generation_modes::GenerationMode;

/// Free-text fields a seller may attach to a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerationInputs {
    pub product_description: String,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub brand_tone: Option<String>,
    #[serde(default)]
    pub scene: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Audit record of exactly what was sent to the image API. Persisted on the
/// job at enqueue time and copied onto the output asset on success; immutable
/// once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptPayload {
    pub mode: GenerationMode,
    pub template_id: String,
    pub prompt_version: String,
    pub inputs: GenerationInputs,
    pub sanitized_inputs: GenerationInputs,
    pub constraints: Vec<String>,
    pub compliance_warnings: Vec<String>,
    pub compliance_overrides: Vec<String>,
    pub built_at: DateTime<Utc>,
}

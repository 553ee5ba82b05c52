use chrono::Utc;

use domain::value_objects::{
    enums::generation_modes::GenerationMode,
    prompts::{GenerationInputs, PromptPayload},
};

pub const PROMPT_VERSION: &str = "v1";

/// Prompt text plus the audit payload that is persisted verbatim, first on
/// the job and then on the output asset.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub prompt: String,
    pub payload: PromptPayload,
}

/// Pure function: deterministic for identical inputs aside from the embedded
/// build timestamp. Sanitization annotates, it never blocks a generation.
pub fn build_prompt(mode: GenerationMode, inputs: &GenerationInputs) -> BuiltPrompt {
    let denylist = denylist(mode);
    let mut compliance_warnings = Vec::new();
    let mut compliance_overrides = Vec::new();

    let sanitized = GenerationInputs {
        product_description: sanitize_field(
            "product_description",
            &inputs.product_description,
            &denylist,
            &mut compliance_warnings,
        ),
        product_category: inputs.product_category.as_deref().map(|value| {
            sanitize_field("product_category", value, &denylist, &mut compliance_warnings)
        }),
        brand_tone: inputs
            .brand_tone
            .as_deref()
            .map(|value| sanitize_field("brand_tone", value, &denylist, &mut compliance_warnings)),
        scene: inputs
            .scene
            .as_deref()
            .map(|value| sanitize_field("scene", value, &denylist, &mut compliance_warnings)),
        constraints: sanitize_constraints(&inputs.constraints, &denylist, &mut compliance_overrides),
    };

    let mut constraints: Vec<String> = sanitized.constraints.clone();
    constraints.extend(mode_constraints(mode).iter().map(|c| c.to_string()));

    let prompt = render(mode, &sanitized, &constraints);

    BuiltPrompt {
        prompt,
        payload: PromptPayload {
            mode,
            template_id: template_id(mode).to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            inputs: inputs.clone(),
            sanitized_inputs: sanitized,
            constraints,
            compliance_warnings,
            compliance_overrides,
            built_at: Utc::now(),
        },
    }
}

fn template_id(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::MainWhite => "main_white_v1",
        GenerationMode::Lifestyle => "lifestyle_v1",
        GenerationMode::FeatureCallout => "feature_callout_v1",
        GenerationMode::Packaging => "packaging_v1",
    }
}

fn render(mode: GenerationMode, inputs: &GenerationInputs, constraints: &[String]) -> String {
    let mut prompt = match mode {
        GenerationMode::MainWhite => format!(
            "Professional e-commerce product photo of {}. Place the product on a seamless \
             pure white background with soft, even studio lighting.",
            inputs.product_description
        ),
        GenerationMode::Lifestyle => format!(
            "Lifestyle marketing photo of {} shown in use in a natural, aspirational setting.",
            inputs.product_description
        ),
        GenerationMode::FeatureCallout => format!(
            "Feature-callout marketing image of {} with short labels pointing at its key \
             visible features.",
            inputs.product_description
        ),
        GenerationMode::Packaging => format!(
            "Studio photograph of the retail packaging of {}, straight on, with the artwork \
             sharp and readable.",
            inputs.product_description
        ),
    };

    if let Some(category) = inputs.product_category.as_deref() {
        prompt.push_str(&format!(" Product category: {}.", category));
    }
    if let Some(tone) = inputs.brand_tone.as_deref() {
        prompt.push_str(&format!(" Brand tone: {}.", tone));
    }
    if let Some(scene) = inputs.scene.as_deref() {
        prompt.push_str(&format!(" Scene: {}.", scene));
    }

    if !constraints.is_empty() {
        prompt.push_str(" Constraints: ");
        prompt.push_str(&constraints.join("; "));
        prompt.push('.');
    }

    prompt
}

/// Fixed compliance constraints appended per mode, after any user constraints.
fn mode_constraints(mode: GenerationMode) -> &'static [&'static str] {
    match mode {
        GenerationMode::MainWhite => &[
            "pure white background",
            "no extraneous text or watermarks",
            "no props or accessories",
            "product centered and fully in frame",
        ],
        GenerationMode::Lifestyle => &[
            "no invented accessories or add-ons",
            "product stays the focal point",
            "realistic lighting and shadows",
            "no on-image text",
        ],
        GenerationMode::FeatureCallout => &[
            "callouts describe visible product features only",
            "no fabricated specifications or measurements",
            "legible sans-serif callout text",
            "at most four callouts",
        ],
        GenerationMode::Packaging => &[
            "packaging artwork faithful to the uploaded product",
            "no certification seals or badges absent from the original packaging",
            "no regulatory or health claims",
            "clean studio lighting",
        ],
    }
}

/// Unverifiable claims that must not reach the image model verbatim. The base
/// list applies to every mode; badge/seal wording is extra-sensitive where the
/// output renders text or artwork.
fn denylist(mode: GenerationMode) -> Vec<&'static str> {
    let mut terms = vec![
        "usda organic",
        "fda approved",
        "fda approval",
        "fda-approved",
        "certified",
        "certification",
        "clinically proven",
        "award-winning",
        "doctor recommended",
        "#1 rated",
    ];

    if matches!(mode, GenerationMode::Packaging | GenerationMode::FeatureCallout) {
        terms.extend(["official seal", "approval badge", "approval stamp", "regulatory mark"]);
    }

    terms
}

fn sanitize_field(
    field: &str,
    value: &str,
    denylist: &[&str],
    compliance_warnings: &mut Vec<String>,
) -> String {
    let mut sanitized = value.to_string();

    for term in denylist {
        // Ascii-lowercase keeps byte offsets aligned with the original text.
        while let Some(position) = sanitized.to_ascii_lowercase().find(term) {
            sanitized.replace_range(position..position + term.len(), "");
            compliance_warnings.push(format!(
                "removed unverifiable claim \"{}\" from {}",
                term, field
            ));
        }
    }

    sanitized.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sanitize_constraints(
    constraints: &[String],
    denylist: &[&str],
    compliance_overrides: &mut Vec<String>,
) -> Vec<String> {
    constraints
        .iter()
        .map(|constraint| {
            let lowered = constraint.to_ascii_lowercase();
            if denylist.iter().any(|term| lowered.contains(term)) {
                compliance_overrides.push(format!(
                    "constraint \"{}\" overridden: unverifiable claims are not rendered",
                    constraint
                ));
                "keep only claims and marks present on the original product".to_string()
            } else {
                constraint.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(description: &str) -> GenerationInputs {
        GenerationInputs {
            product_description: description.to_string(),
            ..GenerationInputs::default()
        }
    }

    #[test]
    fn main_white_prompt_carries_background_and_text_constraints() {
        let built = build_prompt(GenerationMode::MainWhite, &inputs("wireless headphones"));

        assert!(built.prompt.contains("wireless headphones"));
        assert!(built.prompt.contains("pure white background"));
        assert!(built.prompt.contains("no extraneous text"));
        assert!(built.prompt.contains("no props"));

        assert_eq!(built.payload.mode, GenerationMode::MainWhite);
        assert_eq!(built.payload.template_id, "main_white_v1");
        assert!(!built.payload.constraints.is_empty());
        assert!(built.payload.compliance_warnings.is_empty());
    }

    #[test]
    fn packaging_flags_fake_certification_language() {
        let request = GenerationInputs {
            product_description: "USDA organic certified coffee with FDA approval".to_string(),
            constraints: vec!["show certification seals".to_string()],
            ..GenerationInputs::default()
        };

        let built = build_prompt(GenerationMode::Packaging, &request);

        assert!(!built.payload.compliance_warnings.is_empty());
        assert!(!built.payload.compliance_overrides.is_empty());

        let lowered = built.prompt.to_ascii_lowercase();
        assert!(!lowered.contains("usda organic"));
        assert!(!lowered.contains("fda approval"));
        assert!(!lowered.contains("show certification seals"));

        // The raw inputs stay in the audit payload for reproducibility.
        assert!(built.payload.inputs.product_description.contains("USDA organic"));
        assert!(
            built
                .payload
                .sanitized_inputs
                .product_description
                .contains("coffee")
        );
    }

    #[test]
    fn lifestyle_forbids_invented_accessories() {
        let built = build_prompt(GenerationMode::Lifestyle, &inputs("enamel teapot"));

        assert!(built.prompt.contains("no invented accessories"));
        assert_eq!(built.payload.prompt_version, PROMPT_VERSION);
    }

    #[test]
    fn user_constraints_survive_when_compliant() {
        let request = GenerationInputs {
            product_description: "walnut desk organizer".to_string(),
            constraints: vec!["keep the brand logo visible".to_string()],
            ..GenerationInputs::default()
        };

        let built = build_prompt(GenerationMode::MainWhite, &request);

        assert!(built.prompt.contains("keep the brand logo visible"));
        assert!(built.payload.compliance_overrides.is_empty());
    }
}

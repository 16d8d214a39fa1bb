//! Generation variants.
//!
//! A variant is one way of answering a prompt: a model paired with a sampling
//! configuration. The set of variants is fixed for a run and shared by every task.

use crate::config::ProviderSettings;
use crate::provider::{GenerationRequest, SamplingConfig};
use serde::{Deserialize, Serialize};

/// Behavioural character of a variant; drives the justification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCharacter {
    Balanced,
    Strict,
    Creative,
}

impl VariantCharacter {
    /// Human-readable reason used when this character wins a competition
    pub fn label(&self) -> &'static str {
        match self {
            VariantCharacter::Strict => "strict, consistent code generation",
            VariantCharacter::Creative => "innovative approach and code structure",
            VariantCharacter::Balanced => "balanced implementation",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            VariantCharacter::Balanced => "normal",
            VariantCharacter::Strict => "strict",
            VariantCharacter::Creative => "creative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub model: String,
    pub sampling: SamplingConfig,
    pub character: VariantCharacter,
}

impl Variant {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        sampling: SamplingConfig,
        character: VariantCharacter,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            sampling,
            character,
        }
    }

    /// Build the outbound request for `prompt` under this variant
    pub fn request(&self, prompt: &str) -> GenerationRequest {
        GenerationRequest::new(self.model.clone(), prompt, self.sampling)
    }
}

/// One model under the three sampling modes: normal, strict, creative
pub fn sampling_modes(model: &str) -> Vec<Variant> {
    [
        (VariantCharacter::Balanced, SamplingConfig::balanced()),
        (VariantCharacter::Strict, SamplingConfig::strict()),
        (VariantCharacter::Creative, SamplingConfig::creative()),
    ]
    .into_iter()
    .map(|(character, sampling)| {
        Variant::new(
            format!("{} ({})", model, character.suffix()),
            model,
            sampling,
            character,
        )
    })
    .collect()
}

/// One balanced variant per named model, in the given order
pub fn from_models<S: AsRef<str>>(models: &[S]) -> Vec<Variant> {
    models
        .iter()
        .map(|model| {
            let model = model.as_ref().trim();
            Variant::new(
                model,
                model,
                SamplingConfig::balanced(),
                VariantCharacter::Balanced,
            )
        })
        .collect()
}

/// Resolve the variant set for a run.
///
/// Explicit models take precedence; otherwise the base model (or the pro model when
/// `pro` is set) runs under every sampling mode.
pub fn plan_variants(settings: &ProviderSettings, models: &[String], pro: bool) -> Vec<Variant> {
    let named: Vec<&str> = models
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if !named.is_empty() {
        return from_models(&named);
    }
    let model = if pro {
        &settings.pro_model
    } else {
        &settings.model
    };
    sampling_modes(model)
}

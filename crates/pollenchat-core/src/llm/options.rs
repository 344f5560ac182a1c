use crate::constants::{defaults, limits, models};
use crate::error::ChatError;
use serde::{Deserialize, Serialize};

/// Request parameters forwarded to the text endpoint as query parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: String,
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
            max_tokens: Some(defaults::MAX_TOKENS),
        }
    }
}

impl CompletionOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Reject options the endpoint would not accept. Runs before any network call.
    pub fn validate(&self) -> Result<(), ChatError> {
        if !(limits::MIN_TEMPERATURE..=limits::MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ChatError::validation(format!(
                "temperature must be between {} and {}, got {}",
                limits::MIN_TEMPERATURE,
                limits::MAX_TEMPERATURE,
                self.temperature
            )));
        }

        if let Some(max_tokens) = self.max_tokens {
            if !(limits::MIN_MAX_TOKENS..=limits::MAX_MAX_TOKENS).contains(&max_tokens) {
                return Err(ChatError::validation(format!(
                    "max_tokens must be between {} and {}, got {}",
                    limits::MIN_MAX_TOKENS,
                    limits::MAX_MAX_TOKENS,
                    max_tokens
                )));
            }
        }

        if self.model.trim().is_empty() {
            return Err(ChatError::validation("model must not be empty"));
        }
        if !available_models().contains(&self.model.as_str()) {
            return Err(ChatError::validation(format!(
                "unsupported model: {}",
                self.model
            )));
        }

        Ok(())
    }

    /// Query parameters in the order the endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("model", self.model.clone()),
            ("temperature", self.temperature.to_string()),
        ];
        if let Some(max_tokens) = self.max_tokens {
            pairs.push(("max_tokens", max_tokens.to_string()));
        }
        pairs
    }
}

pub fn available_models() -> Vec<&'static str> {
    models::CATALOGUE.iter().map(|(id, _)| *id).collect()
}

/// Human-readable model name; unknown models are shown as-is.
pub fn model_display_name(model: &str) -> &str {
    models::CATALOGUE
        .iter()
        .find(|(id, _)| *id == model)
        .map(|(_, name)| *name)
        .unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let options = CompletionOptions::default();
        assert_eq!(options.model, "openai");
        assert_eq!(options.temperature, 0.7);
        assert_eq!(options.max_tokens, Some(1000));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let too_hot = CompletionOptions::default().with_temperature(1.5);
        assert!(matches!(too_hot.validate(), Err(ChatError::Validation(_))));

        let too_cold = CompletionOptions::default().with_temperature(-0.1);
        assert!(matches!(too_cold.validate(), Err(ChatError::Validation(_))));

        let edge = CompletionOptions::default().with_temperature(1.0);
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_max_tokens_bounds() {
        let zero = CompletionOptions::default().with_max_tokens(Some(0));
        assert!(zero.validate().is_err());

        let huge = CompletionOptions::default().with_max_tokens(Some(4001));
        assert!(huge.validate().is_err());

        let max = CompletionOptions::default().with_max_tokens(Some(4000));
        assert!(max.validate().is_ok());

        let unset = CompletionOptions::default().with_max_tokens(None);
        assert!(unset.validate().is_ok());
    }

    #[test]
    fn test_unknown_model_rejected() {
        let options = CompletionOptions::default().with_model("gpt-17");
        let err = options.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-17"));
    }

    #[test]
    fn test_query_pairs_skip_unset_max_tokens() {
        let options = CompletionOptions::default().with_max_tokens(None);
        let pairs = options.query_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("temperature", "0.7".to_string()));
    }

    #[test]
    fn test_model_display_name() {
        assert_eq!(model_display_name("claude"), "Anthropic Claude");
        assert_eq!(model_display_name("mystery"), "mystery");
    }
}

use std::sync::Arc;

use serde_json::Value;

use super::ai_service::{AIService, CompletionRequest};
use super::nutrition_parser::{extract_json_object, normalize};
use crate::config::EstimatorConfig;
use crate::errors::EstimateError;
use crate::models::{EstimationRequest, EstimationResult};

pub struct CalorieEstimator {
    config: EstimatorConfig,
    ai: Arc<dyn AIService>,
}

impl CalorieEstimator {
    pub fn new(config: EstimatorConfig, ai: Arc<dyn AIService>) -> Self {
        Self { config, ai }
    }

    /// Estimate calories and macros for a free-text food description.
    ///
    /// One upstream call per request, no retries, no caching. The credential is
    /// checked before the input so a misconfigured service reports that first.
    pub async fn estimate(
        &self,
        request: &EstimationRequest,
    ) -> Result<EstimationResult, EstimateError> {
        let api_key = self.api_key()?;
        let food_description = validate_description(request)?;

        let completion = CompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            prompt: build_prompt(&food_description),
        };

        log::info!("🍽️ Estimating calories for: '{}'", food_description);

        let reply = self.ai.complete(api_key, &completion).await.map_err(|e| {
            log::error!("❌ AI provider call failed: {:#}", e);
            EstimateError::internal(format!("{:#}", e))
        })?;

        log::debug!("💬 Model response: {}", reply);

        let result = parse_reply(&reply, &food_description)?;
        log::info!(
            "✅ Estimated {} kcal ({} confidence) for '{}'",
            result.calories,
            result.confidence,
            food_description
        );

        Ok(result)
    }

    /// `FailedPrecondition` when no credential is configured.
    pub fn ensure_configured(&self) -> Result<(), EstimateError> {
        self.api_key().map(|_| ())
    }

    fn api_key(&self) -> Result<&str, EstimateError> {
        match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => {
                log::error!("❌ {} API key not configured", self.config.provider);
                Err(EstimateError::failed_precondition(format!(
                    "{} API key not configured",
                    self.config.provider
                )))
            }
        }
    }
}

/// Returns the trimmed description or `InvalidArgument`.
fn validate_description(request: &EstimationRequest) -> Result<String, EstimateError> {
    let description = match &request.food_description {
        Some(Value::String(s)) => s.trim(),
        _ => {
            return Err(EstimateError::invalid_argument(
                "Food description is required and must be a string",
            ))
        }
    };

    if description.is_empty() {
        return Err(EstimateError::invalid_argument("Food description cannot be empty"));
    }

    Ok(description.to_string())
}

fn parse_reply(reply: &str, food_description: &str) -> Result<EstimationResult, EstimateError> {
    let object = extract_json_object(reply).ok_or_else(|| {
        log::warn!("⚠️ No JSON object found in model response");
        EstimateError::internal("could not parse JSON from response")
    })?;

    normalize(&object, food_description)
}

pub fn build_prompt(food_description: &str) -> String {
    format!(
        r#"You are a nutrition expert. Analyze the following food description and provide a detailed calorie estimate.

Food description: "{food_description}"

Important guidelines:
- If portion sizes are not specified, assume standard/typical portions
- Be realistic and conservative with estimates
- If the description is vague, make reasonable assumptions
- Consider typical preparation methods (e.g., grilled, fried, baked)

Return your response in this exact JSON format (valid JSON only, no markdown, no other text):
{{
  "calories": <total calories as a number>,
  "confidence": "<low, medium, or high>",
  "breakdown": {{
    "protein": <grams of protein>,
    "carbs": <grams of carbohydrates>,
    "fat": <grams of fat>
  }},
  "description": "<normalized description with estimated portion sizes>",
  "items": [
    {{"item": "<food item with portion>", "calories": <calories for this item>}}
  ]
}}"#
    )
}

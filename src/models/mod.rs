use serde::{Deserialize, Serialize};

/// Caller input for a single estimation, as received.
///
/// `food_description` is kept as a raw JSON value so that a missing or
/// non-string field reaches the estimator and is rejected there.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EstimationRequest {
    #[serde(rename = "foodDescription", default)]
    pub food_description: Option<serde_json::Value>,
}

impl EstimationRequest {
    pub fn new(food_description: impl Into<String>) -> Self {
        Self {
            food_description: Some(serde_json::Value::String(food_description.into())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl Confidence {
    pub fn from_string(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

/// Macronutrients in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub item: String,
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub calories: u64,
    pub description: String,
    pub breakdown: MacroBreakdown,
    pub confidence: Confidence,
    pub items: Vec<FoodItem>,
}

/// `{ "success": true, "data": ... }`
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope {
    pub success: bool,
    pub data: EstimationResult,
}

impl SuccessEnvelope {
    pub fn new(data: EstimationResult) -> Self {
        Self { success: true, data }
    }
}

/// Callable-function clients expect the envelope nested under `result`.
#[derive(Debug, Serialize)]
pub struct CallableEnvelope {
    pub result: SuccessEnvelope,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

use serde_json::{Map, Value};

use crate::errors::EstimateError;
use crate::models::{Confidence, EstimationResult, FoodItem, MacroBreakdown};

/// Find the first balanced `{...}` in a model reply that parses as a JSON object.
///
/// Models like to wrap their answer in prose or markdown fences, so every `{`
/// is tried as a starting point, left to right.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| {
            let len = balanced_len(&text[start..])?;
            match serde_json::from_str::<Value>(&text[start..start + len]) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        })
}

/// Byte length of the brace-balanced prefix of `text`, which starts with `{`.
/// Braces inside string literals do not count.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Turn the loosely-typed model output into an `EstimationResult`.
///
/// `calories` is the only required field; everything else falls back.
pub fn normalize(
    reply: &Map<String, Value>,
    fallback_description: &str,
) -> Result<EstimationResult, EstimateError> {
    let calories = reply
        .get("calories")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| {
            log::warn!("⚠️ Model reply has no usable calories field: {:?}", reply.get("calories"));
            EstimateError::internal("invalid response format")
        })?;

    let description = reply
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(fallback_description)
        .to_string();

    let breakdown = match reply.get("breakdown") {
        Some(Value::Object(macros)) => MacroBreakdown {
            protein: grams(macros, "protein"),
            carbs: grams(macros, "carbs"),
            fat: grams(macros, "fat"),
        },
        _ => MacroBreakdown::default(),
    };

    let confidence = reply
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::from_string)
        .unwrap_or_default();

    let items = match reply.get("items") {
        Some(Value::Array(entries)) => entries.iter().filter_map(food_item).collect(),
        _ => Vec::new(),
    };

    Ok(EstimationResult {
        calories: calories.round() as u64,
        description,
        breakdown,
        confidence,
        items,
    })
}

fn grams(macros: &Map<String, Value>, key: &str) -> f64 {
    macros
        .get(key)
        .and_then(Value::as_f64)
        .filter(|g| *g >= 0.0)
        .unwrap_or(0.0)
}

fn food_item(entry: &Value) -> Option<FoodItem> {
    Some(FoodItem {
        item: entry.get("item")?.as_str()?.to_string(),
        calories: entry.get("calories")?.as_f64()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(json: &str) -> Map<String, Value> {
        match serde_json::from_str(json).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_extract_from_markdown_fence() {
        let reply = "Here you go:\n```json\n{\"calories\": 450.7, \"confidence\": \"high\"}\n```";
        let map = extract_json_object(reply).unwrap();

        assert_eq!(map["calories"], 450.7);
        assert_eq!(map["confidence"], "high");
    }

    #[test]
    fn test_extract_nested_object() {
        let reply = r#"{"calories": 300, "breakdown": {"protein": 10, "carbs": 20, "fat": 5}} trailing {"x": 1}"#;
        let map = extract_json_object(reply).unwrap();

        assert_eq!(map["calories"], 300);
        assert_eq!(map["breakdown"]["fat"], 5);
        assert!(!map.contains_key("x"));
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let reply = r#"Result: {"calories": 120, "description": "toast with {jam} \"and\" butter}"}"#;
        let map = extract_json_object(reply).unwrap();

        assert_eq!(map["calories"], 120);
        assert_eq!(map["description"], "toast with {jam} \"and\" butter}");
    }

    #[test]
    fn test_extract_skips_unparsable_candidate() {
        let reply = r#"Using {portion sizes} as typical: {"calories": 80}"#;
        let map = extract_json_object(reply).unwrap();

        assert_eq!(map["calories"], 80);
    }

    #[test]
    fn test_extract_none() {
        assert!(extract_json_object("I cannot estimate that.").is_none());
        assert!(extract_json_object("{\"calories\": 100").is_none());
        assert!(extract_json_object("").is_none());
    }

    #[test]
    fn test_normalize_full_reply() {
        let reply = object(
            r#"{"calories": 450.7, "confidence": "high",
                "breakdown": {"protein": 30, "carbs": 40, "fat": 15},
                "description": "grilled chicken breast, 6oz",
                "items": [{"item": "chicken breast 6oz", "calories": 450}]}"#,
        );
        let result = normalize(&reply, "chicken").unwrap();

        assert_eq!(result.calories, 451);
        assert_eq!(result.description, "grilled chicken breast, 6oz");
        assert_eq!(result.confidence, Confidence::High);
        assert_eq!(result.breakdown, MacroBreakdown { protein: 30.0, carbs: 40.0, fat: 15.0 });
        assert_eq!(
            result.items,
            vec![FoodItem { item: "chicken breast 6oz".to_string(), calories: 450.0 }]
        );
    }

    #[test]
    fn test_normalize_fallbacks() {
        let reply = object(r#"{"calories": 250}"#);
        let result = normalize(&reply, "a slice of pizza").unwrap();

        assert_eq!(result.calories, 250);
        assert_eq!(result.description, "a slice of pizza");
        assert_eq!(result.breakdown, MacroBreakdown::default());
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_normalize_lenient_fields() {
        let reply = object(
            r#"{"calories": 99.4, "confidence": "certain", "description": "  ",
                "breakdown": {"protein": "lots", "carbs": -3, "fat": 2.5},
                "items": [{"item": "apple"}, {"item": "banana", "calories": 105}, "pear"]}"#,
        );
        let result = normalize(&reply, "fruit").unwrap();

        assert_eq!(result.calories, 99);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.description, "fruit");
        assert_eq!(result.breakdown, MacroBreakdown { protein: 0.0, carbs: 0.0, fat: 2.5 });
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].item, "banana");
    }

    #[test]
    fn test_normalize_accepts_zero_calories() {
        let reply = object(r#"{"calories": 0, "description": "black coffee"}"#);
        let result = normalize(&reply, "coffee").unwrap();

        assert_eq!(result.calories, 0);
    }

    #[test]
    fn test_normalize_rejects_missing_or_bad_calories() {
        for json in [
            r#"{"confidence": "high"}"#,
            r#"{"calories": "450"}"#,
            r#"{"calories": null}"#,
            r#"{"calories": -20}"#,
        ] {
            let err = normalize(&object(json), "x").unwrap_err();
            assert_eq!(err, EstimateError::internal("invalid response format"), "{}", json);
        }
    }
}

//! Result aggregation: turns the heterogeneous scan-complete payload into
//! one normalized [`InferenceResult`].

use crate::gateway::ScanCompletePayload;
use crate::models::{InferenceResult, Nutrition, Prediction};

/// Build a normalized result from a raw analyze payload.
///
/// Returns `None` when the payload carries nothing recognizable (no
/// predictions and no top-level food name); the caller treats that as an
/// unrecognized-result failure. Missing nutrition fields default to zero,
/// since partial nutrition data is still useful output.
pub fn build_result(payload: &ScanCompletePayload) -> Option<InferenceResult> {
    let mut ranked: Vec<(String, f64, Option<f64>)> = payload
        .predictions
        .iter()
        .map(|p| {
            let confidence = p
                .confidence
                .or_else(|| p.percentage.map(|pct| pct / 100.0))
                .unwrap_or(0.0);
            (p.food_name.clone(), confidence, p.percentage)
        })
        .collect();

    // Backends are supposed to send these ranked already; don't trust it.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (food_name, confidence, top_percentage) = match ranked.first() {
        Some((name, conf, pct)) => (name.clone(), *conf, *pct),
        None => {
            let name = payload.food_name.clone()?;
            (name, payload.confidence.unwrap_or(0.0), payload.percentage)
        }
    };

    let predictions = ranked
        .into_iter()
        .map(|(name, conf, pct)| Prediction {
            food_name: name,
            percentage: pct.unwrap_or_else(|| display_percentage(conf)),
        })
        .collect();

    Some(InferenceResult {
        percentage: top_percentage.unwrap_or_else(|| display_percentage(confidence)),
        food_name,
        confidence,
        weight_g: payload.weight.unwrap_or(0.0),
        nutrition: nutrition_from_map(&payload.nutrition),
        predictions,
    })
}

/// confidence x 100, rounded to one decimal.
fn display_percentage(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 10.0
}

fn nutrition_from_map(map: &serde_json::Map<String, serde_json::Value>) -> Nutrition {
    let field = |keys: &[&str]| -> f64 {
        keys.iter()
            .find_map(|key| map.get(*key).and_then(serde_json::Value::as_f64))
            .unwrap_or(0.0)
    };

    Nutrition {
        calorie: field(&["calorie"]),
        protein: field(&["protein"]),
        carb: field(&["carb", "carbohydrate"]),
        fat: field(&["fat"]),
        sugar: field(&["sugar"]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RawPrediction;

    fn payload(predictions: Vec<RawPrediction>) -> ScanCompletePayload {
        ScanCompletePayload {
            status: "success".to_string(),
            food_name: None,
            confidence: None,
            percentage: None,
            weight: None,
            nutrition: serde_json::Map::new(),
            predictions,
            bmi: None,
            timestamp: None,
        }
    }

    fn prediction(food_name: &str, confidence: f64) -> RawPrediction {
        RawPrediction {
            food_name: food_name.to_string(),
            confidence: Some(confidence),
            percentage: None,
        }
    }

    #[test]
    fn top_prediction_defines_food_and_percentage() {
        let result = build_result(&payload(vec![
            prediction("Elma", 0.92),
            prediction("Armut", 0.05),
        ]))
        .unwrap();

        assert_eq!(result.food_name, "Elma");
        assert_eq!(result.percentage, 92.0);
        assert_eq!(result.predictions[1].food_name, "Armut");
    }

    #[test]
    fn unsorted_predictions_are_reranked_by_confidence() {
        let result = build_result(&payload(vec![
            prediction("Armut", 0.05),
            prediction("Elma", 0.92),
            prediction("Kiraz", 0.03),
        ]))
        .unwrap();

        assert_eq!(result.food_name, "Elma");
        assert_eq!(result.confidence, 0.92);
        let names: Vec<&str> = result
            .predictions
            .iter()
            .map(|p| p.food_name.as_str())
            .collect();
        assert_eq!(names, ["Elma", "Armut", "Kiraz"]);
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let result = build_result(&payload(vec![prediction("Corba", 0.8765)])).unwrap();
        assert_eq!(result.percentage, 87.7);
    }

    #[test]
    fn percentage_only_predictions_still_rank() {
        let result = build_result(&payload(vec![
            RawPrediction {
                food_name: "Pilav".to_string(),
                confidence: None,
                percentage: Some(12.0),
            },
            RawPrediction {
                food_name: "Makarna".to_string(),
                confidence: None,
                percentage: Some(81.5),
            },
        ]))
        .unwrap();

        assert_eq!(result.food_name, "Makarna");
        assert_eq!(result.percentage, 81.5);
    }

    #[test]
    fn missing_nutrition_fields_default_to_zero() {
        let mut p = payload(vec![prediction("Elma", 0.9)]);
        p.nutrition
            .insert("calorie".to_string(), serde_json::json!(52.0));
        p.nutrition
            .insert("protein".to_string(), serde_json::json!(0.3));

        let result = build_result(&p).unwrap();
        assert_eq!(result.nutrition.calorie, 52.0);
        assert_eq!(result.nutrition.protein, 0.3);
        assert_eq!(result.nutrition.carb, 0.0);
        assert_eq!(result.nutrition.fat, 0.0);
        assert_eq!(result.nutrition.sugar, 0.0);
    }

    #[test]
    fn empty_payload_yields_no_result() {
        assert!(build_result(&payload(Vec::new())).is_none());
    }

    #[test]
    fn top_level_food_name_is_a_fallback_when_predictions_are_absent() {
        let mut p = payload(Vec::new());
        p.food_name = Some("Elma".to_string());
        p.confidence = Some(0.75);

        let result = build_result(&p).unwrap();
        assert_eq!(result.food_name, "Elma");
        assert_eq!(result.percentage, 75.0);
        assert!(result.predictions.is_empty());
    }
}

use serde::{Deserialize, Serialize};

/// Nutrition snapshot for a recognized food at the measured weight.
/// Fields the backend omits default to zero; partial data is still useful
/// output, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    #[serde(default)]
    pub calorie: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default, alias = "carbohydrate")]
    pub carb: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub sugar: f64,
}

/// One ranked candidate from the inference model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub food_name: String,
    /// Display percentage, 0-100, one decimal.
    pub percentage: f64,
}

/// Normalized outcome of a completed scan: the top match plus the full
/// ranked candidate list and the nutrition snapshot for the top match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    pub food_name: String,
    /// Model certainty, 0-1.
    pub confidence: f64,
    /// confidence x 100, rounded to one decimal for display.
    pub percentage: f64,
    /// Gross weight reported by the backend for this scan, in grams.
    pub weight_g: f64,
    pub nutrition: Nutrition,
    /// Ranked descending by confidence; the first element defines
    /// `food_name` and `confidence`.
    pub predictions: Vec<Prediction>,
}

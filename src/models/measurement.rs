use serde::{Deserialize, Serialize};

use super::Nutrition;

/// Measurement record posted to the backend once a session completes.
/// Immutable once written; field names follow the backend wire contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMeasurement {
    pub user_id: i64,
    pub food_name: String,
    /// Weight in grams as recorded at capture time.
    pub weight: f64,
    pub nutrition: Nutrition,
    /// BMI block computed by the backend for the selected profile, passed
    /// through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_data: Option<serde_json::Value>,
}

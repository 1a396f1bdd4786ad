//! Wire payloads for the device backend's JSON API.

use serde::Deserialize;

use crate::models::{Plate, Profile};

#[derive(Debug, Deserialize)]
pub(crate) struct WeightReading {
    pub weight: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileList {
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlateList {
    pub plates: Vec<Plate>,
}

/// One ranked candidate as the backend reports it. Older backend revisions
/// send `food` instead of `food_name` and `percentage` instead of raw
/// `confidence`; the aggregator reconciles both shapes.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPrediction {
    #[serde(alias = "food")]
    pub food_name: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
}

/// Raw response of `POST /api/scan-complete`. Everything beyond `status`
/// is optional on the wire; the aggregator decides what is usable.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanCompletePayload {
    pub status: String,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub nutrition: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub predictions: Vec<RawPrediction>,
    #[serde(default)]
    pub bmi: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ScanCompletePayload {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub scale_mode: Option<String>,
    #[serde(default)]
    pub camera_mode: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

use serde::{Deserialize, Serialize};

/// A known plate whose empty weight the backend subtracts when computing
/// net food weight. Optional: a session may run with no plate at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plate {
    pub id: i64,
    pub name: String,
    /// Empty-plate (tare) weight in grams.
    pub weight: f64,
}

/// Payload for registering a new plate with the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlate {
    pub name: String,
    pub weight: f64,
}

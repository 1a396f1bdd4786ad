use serde::{Deserialize, Serialize};

/// A kiosk user profile, owned by the backend profile service.
/// The controller only ever reads the currently selected one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub gender: String,
    /// Height in centimeters.
    pub height: i64,
    /// Body weight in kilograms.
    pub weight: i64,
}

/// Payload for creating or updating a profile via the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub gender: String,
    pub height: i64,
    pub weight: i64,
}

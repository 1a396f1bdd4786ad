//! Session-scoped shared state: the one record both the UI and the scan
//! session state machine look at.
//!
//! Replacement is atomic per field family. Readers always see either the old
//! value or the fully-updated new one; nothing is mutated in place while a
//! reader could observe it mid-update.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::models::{InferenceResult, Plate, Profile};
use crate::utils::lock_unpoisoned;

/// Point-in-time copy of the shared record. Cheap to clone and hand to the
/// UI layer.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSnapshot {
    pub selected_profile: Option<Profile>,
    pub selected_plate: Option<Plate>,
    /// Most recent reconciled weight in grams.
    pub current_weight_g: f64,
    pub last_result: Option<InferenceResult>,
}

/// Shared mutable record behind accessor methods. Written by the state
/// machine and by explicit user selections; read by everyone.
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<KioskSnapshot>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> KioskSnapshot {
        lock_unpoisoned(&self.inner).clone()
    }

    pub fn selected_profile(&self) -> Option<Profile> {
        lock_unpoisoned(&self.inner).selected_profile.clone()
    }

    pub fn selected_plate(&self) -> Option<Plate> {
        lock_unpoisoned(&self.inner).selected_plate.clone()
    }

    pub fn select_profile(&self, profile: Option<Profile>) {
        lock_unpoisoned(&self.inner).selected_profile = profile;
    }

    pub fn select_plate(&self, plate: Option<Plate>) {
        lock_unpoisoned(&self.inner).selected_plate = plate;
    }

    pub(crate) fn set_current_weight(&self, grams: f64) {
        lock_unpoisoned(&self.inner).current_weight_g = grams;
    }

    pub(crate) fn set_last_result(&self, result: InferenceResult) {
        lock_unpoisoned(&self.inner).last_result = Some(result);
    }

    pub fn clear_last_result(&self) {
        lock_unpoisoned(&self.inner).last_result = None;
    }
}

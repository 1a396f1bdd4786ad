//! Scan session controller for the NutriKiosk smart food scale.
//!
//! The kiosk UI embeds this crate and drives it through four surfaces:
//! [`WeightTelemetryClient`] for the live weight signal,
//! [`ScanController`] for the tare -> measure -> capture -> analyze
//! workflow, [`SharedState`] for the record the UI observes, and
//! [`HttpDeviceGateway`] for direct profile/plate/actuator calls.

mod actuators;
mod aggregate;
mod config;
mod gateway;
mod models;
mod session;
mod state;
mod telemetry;
mod utils;

pub use actuators::{LedColor, SoundCue};
pub use aggregate::build_result;
pub use config::KioskConfig;
pub use gateway::{
    DeviceBackend, GatewayError, HealthStatus, HttpDeviceGateway, RawPrediction,
    ScanCompletePayload,
};
pub use models::{
    InferenceResult, NewMeasurement, NewPlate, NewProfile, Nutrition, Plate, Prediction, Profile,
    WeightSample, WeightSource,
};
pub use session::{FailReason, ScanController, ScanError, ScanHandle, ScanPhase, ScanSession};
pub use state::{KioskSnapshot, SharedState};
pub use telemetry::{WeightSubscription, WeightTelemetryClient};

/// Initialize logging (reads RUST_LOG env var). Safe to call more than
/// once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .try_init();
}

/// Wire the telemetry client's accepted samples into shared state so the
/// UI's weight readout follows the reconciled signal. Keep the returned
/// subscription alive for as long as the readout should update.
pub fn bind_weight_to_state(
    telemetry: &WeightTelemetryClient,
    shared: &SharedState,
) -> WeightSubscription {
    let shared = shared.clone();
    telemetry.subscribe(move |sample| shared.set_current_weight(sample.grams))
}

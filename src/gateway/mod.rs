mod error;
mod http;
mod types;

use async_trait::async_trait;

use crate::actuators::{LedColor, SoundCue};
use crate::models::NewMeasurement;

pub use error::GatewayError;
pub use http::HttpDeviceGateway;
pub use types::{HealthStatus, RawPrediction, ScanCompletePayload};

/// The remote operations the scan session state machine drives. Kept as a
/// trait so workflow tests can substitute a scripted backend; the real
/// implementation is [`HttpDeviceGateway`].
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    /// Read the current raw scale weight in grams.
    async fn fetch_weight(&self) -> Result<f64, GatewayError>;

    /// Trigger the camera and return the captured JPEG bytes.
    async fn capture_image(&self) -> Result<Vec<u8>, GatewayError>;

    /// Run inference on the backend's latest capture. The plate id is
    /// passed through unmodified; net-of-tare arithmetic happens on the
    /// backend, never here.
    async fn scan_complete(&self, plate_id: Option<i64>)
        -> Result<ScanCompletePayload, GatewayError>;

    /// Persist a completed measurement.
    async fn save_measurement(&self, measurement: &NewMeasurement) -> Result<(), GatewayError>;

    /// Set the LED ring color. Fire-and-forget at the call sites.
    async fn set_led(&self, color: LedColor) -> Result<(), GatewayError>;

    /// Play a sound cue. Fire-and-forget at the call sites.
    async fn play_sound(&self, cue: SoundCue) -> Result<(), GatewayError>;
}

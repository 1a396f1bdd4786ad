use std::time::Duration;

/// Tunable parameters for the controller. The defaults match the kiosk
/// deployment, where the device backend runs on the same machine; tests
/// shrink the delays.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Base URL of the device backend's HTTP API.
    pub base_url: String,
    /// URL of the live weight WebSocket stream.
    pub ws_weight_url: String,
    /// Timeout for weight/profile/plate/actuator calls.
    pub control_timeout: Duration,
    /// Timeout for capture and analyze calls. Inference is slow.
    pub inference_timeout: Duration,
    /// Cadence of the polling fallback for the weight signal.
    pub poll_interval: Duration,
    /// Fixed delay between stream reconnect attempts.
    pub stream_reconnect_delay: Duration,
    /// Consecutive failed reconnects before the degraded flag is raised.
    pub max_stream_reconnect_attempts: u32,
    /// Minimum settle time in Measuring before capture, to ride out
    /// transient spikes in the weight signal.
    pub settle_delay: Duration,
    /// Minimum weight on the scale before a session may start at all.
    pub min_scan_weight_g: f64,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            ws_weight_url: "ws://127.0.0.1:8000/ws/weight".to_string(),
            control_timeout: Duration::from_secs(10),
            inference_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            stream_reconnect_delay: Duration::from_secs(2),
            max_stream_reconnect_attempts: 5,
            settle_delay: Duration::from_secs(1),
            min_scan_weight_g: 10.0,
        }
    }
}

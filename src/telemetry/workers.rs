//! The two telemetry worker loops: the WebSocket stream listener with
//! reconnect, and the fixed-cadence polling fallback.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::gateway::DeviceBackend;
use crate::models::{WeightSample, WeightSource};

use super::client::TelemetryHub;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

#[derive(Debug, Deserialize)]
struct WeightFrame {
    weight: f64,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum PumpOutcome {
    Cancelled,
    Disconnected,
}

/// Persistent stream connection with fixed-delay reconnect. Failures never
/// reach subscribers; after `max_attempts` consecutive failures the degraded
/// flag is latched until the next successful connect. The loop keeps
/// retrying past the cap, the poll path runs independently either way.
pub(super) async fn stream_loop(
    ws_url: String,
    hub: Arc<TelemetryHub>,
    reconnect_delay: Duration,
    max_attempts: u32,
    cancel: CancellationToken,
) {
    let mut consecutive_failures: u32 = 0;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        match connect_async(ws_url.as_str()).await {
            Ok((mut ws, _)) => {
                consecutive_failures = 0;
                hub.set_degraded(false);
                log_info!("weight stream connected: {ws_url}");

                match pump_messages(&mut ws, &hub, &cancel).await {
                    PumpOutcome::Cancelled => {
                        let _ = ws.close(None).await;
                        break;
                    }
                    PumpOutcome::Disconnected => {
                        log_warn!("weight stream disconnected");
                    }
                }
            }
            Err(err) => {
                log_warn!("weight stream connect failed: {err}");
            }
        }

        consecutive_failures = consecutive_failures.saturating_add(1);
        if consecutive_failures >= max_attempts {
            hub.set_degraded(true);
            log_warn!(
                "weight stream down after {consecutive_failures} attempts, telemetry degraded (poll fallback active)"
            );
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(reconnect_delay) => {}
        }
    }

    log_info!("weight stream loop shutting down");
}

async fn pump_messages(
    ws: &mut WsStream,
    hub: &TelemetryHub,
    cancel: &CancellationToken,
) -> PumpOutcome {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return PumpOutcome::Cancelled,
            msg = ws.next() => {
                let Some(msg) = msg else {
                    return PumpOutcome::Disconnected;
                };
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<WeightFrame>(text.as_str()) {
                        Ok(frame) if frame.weight >= 0.0 => {
                            hub.accept(WeightSample::now(frame.weight, WeightSource::Stream));
                        }
                        Ok(frame) => {
                            log_warn!("scale stream reported negative weight {}", frame.weight);
                        }
                        Err(err) => {
                            log_warn!("unparseable weight frame: {err}");
                        }
                    },
                    Ok(Message::Close(_)) => return PumpOutcome::Disconnected,
                    // Pings are answered by the library; binary frames are not
                    // part of the weight contract.
                    Ok(_) => {}
                    Err(err) => {
                        log_warn!("weight stream read error: {err}");
                        return PumpOutcome::Disconnected;
                    }
                }
            }
        }
    }
}

/// Fixed-cadence pull of the same quantity, purely as a fallback for when
/// the stream is down. Individual poll failures are logged and skipped,
/// never surfaced; the loop retries indefinitely.
pub(super) async fn poll_loop(
    backend: Arc<dyn DeviceBackend>,
    hub: Arc<TelemetryHub>,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match backend.fetch_weight().await {
                    Ok(grams) if grams >= 0.0 => {
                        hub.accept(WeightSample::now(grams, WeightSource::Poll));
                    }
                    Ok(grams) => {
                        log_warn!("scale poll reported negative weight {grams}");
                    }
                    Err(err) => {
                        log_info!("weight poll failed, skipping tick: {err}");
                    }
                }
            }
        }
    }

    log_info!("weight poll loop shutting down");
}

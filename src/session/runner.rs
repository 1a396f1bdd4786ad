//! The session driver task: walks one `ScanSession` through the workflow,
//! phase by phase, publishing a snapshot on every transition.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::actuators::{self, LedColor, SoundCue};
use crate::aggregate;
use crate::gateway::{DeviceBackend, GatewayError};
use crate::models::{NewMeasurement, Plate};
use crate::state::SharedState;
use crate::telemetry::WeightTelemetryClient;

use super::state::{FailReason, ScanPhase, ScanSession};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// The user's answer to the tare prompt.
#[derive(Debug, Clone)]
pub(super) enum TareChoice {
    Plate(Plate),
    Skip,
}

pub(super) struct ScanRunner {
    pub backend: Arc<dyn DeviceBackend>,
    pub telemetry: Arc<WeightTelemetryClient>,
    pub shared: SharedState,
    pub settle_delay: Duration,
    pub session: ScanSession,
    pub updates: watch::Sender<ScanSession>,
    pub tare_rx: watch::Receiver<Option<TareChoice>>,
    pub cancel: CancellationToken,
}

enum TareStep {
    Choice(TareChoice),
    Cancelled,
}

pub(super) async fn run_scan(mut r: ScanRunner) {
    let cancel = r.cancel.clone();
    log_info!(
        "scan session {} started in phase {}",
        r.session.id,
        r.session.phase.as_str()
    );

    // Tare: block until the user selects a plate or explicitly skips.
    if r.session.phase == ScanPhase::Tare {
        let step = loop {
            if let Some(choice) = r.tare_rx.borrow_and_update().clone() {
                break TareStep::Choice(choice);
            }
            tokio::select! {
                _ = cancel.cancelled() => break TareStep::Cancelled,
                changed = r.tare_rx.changed() => {
                    if changed.is_err() {
                        break TareStep::Cancelled;
                    }
                }
            }
        };

        match step {
            TareStep::Cancelled => {
                finish_cancelled(&mut r);
                return;
            }
            TareStep::Choice(TareChoice::Plate(plate)) => {
                log_info!(
                    "session {}: plate '{}' selected ({}g tare)",
                    r.session.id,
                    plate.name,
                    plate.weight
                );
                r.session.plate_id = Some(plate.id);
            }
            TareStep::Choice(TareChoice::Skip) => {
                r.session.plate_id = None;
            }
        }
        transition(&mut r, ScanPhase::Measuring);
    }

    // Measuring: ride out transient spikes, then record the raw reading.
    // No weight gating happens here; the only gate is at session start.
    let settled = tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(r.settle_delay) => true,
    };
    if !settled {
        finish_cancelled(&mut r);
        return;
    }
    r.session.weight_at_capture = r.telemetry.current_weight().map(|s| s.grams);

    transition(&mut r, ScanPhase::Capturing);
    actuators::play_cue(&r.backend, SoundCue::Beep);

    // Cancellation is cooperative: an in-flight call runs to completion,
    // then its result is discarded and no further transition happens.
    let capture = r.backend.capture_image().await;
    if cancel.is_cancelled() {
        finish_cancelled(&mut r);
        return;
    }
    let image = match capture {
        Ok(bytes) => bytes,
        Err(err) => {
            log_warn!("session {}: capture failed: {err}", r.session.id);
            finish_failed(&mut r, fail_reason(&err));
            return;
        }
    };
    log_info!("session {}: captured image ({} bytes)", r.session.id, image.len());

    transition(&mut r, ScanPhase::Analyzing);

    let analyze = r.backend.scan_complete(r.session.plate_id).await;
    if cancel.is_cancelled() {
        // Late success arrives after cancellation: discard it without
        // touching shared state.
        finish_cancelled(&mut r);
        return;
    }
    let payload = match analyze {
        Ok(payload) => payload,
        Err(err) => {
            log_warn!("session {}: analyze failed: {err}", r.session.id);
            finish_failed(&mut r, fail_reason(&err));
            return;
        }
    };

    if !payload.is_success() {
        log_info!(
            "session {}: backend reported status '{}'",
            r.session.id,
            payload.status
        );
        finish_failed(&mut r, FailReason::Unrecognized);
        return;
    }
    let Some(result) = aggregate::build_result(&payload) else {
        finish_failed(&mut r, FailReason::Unrecognized);
        return;
    };

    r.shared.set_last_result(result.clone());
    transition(&mut r, ScanPhase::Complete);
    actuators::signal_led(&r.backend, LedColor::Green);
    actuators::play_cue(&r.backend, SoundCue::Success);

    // The session is already complete from the user's point of view; a
    // persistence failure is logged, never surfaced. With no weight reading
    // at all, skip the save rather than write a zero-gram record.
    if let Some(weight) = r.session.weight_at_capture.or(payload.weight) {
        let measurement = NewMeasurement {
            user_id: r.session.profile_id,
            food_name: result.food_name.clone(),
            weight,
            nutrition: result.nutrition.clone(),
            bmi_data: payload.bmi.clone(),
        };
        if let Err(err) = r.backend.save_measurement(&measurement).await {
            log_error!("session {}: measurement save failed: {err}", r.session.id);
        }
    } else {
        log_warn!(
            "session {}: no weight reading, skipping measurement save",
            r.session.id
        );
    }

    log_info!(
        "scan session {} complete: {} ({}%)",
        r.session.id,
        result.food_name,
        result.percentage
    );
}

fn fail_reason(err: &GatewayError) -> FailReason {
    match err {
        GatewayError::Server(_) => FailReason::Server,
        _ => FailReason::Transport,
    }
}

fn transition(r: &mut ScanRunner, next: ScanPhase) {
    let target = next.as_str();
    if r.session.advance(next) {
        publish(r);
    } else {
        log_warn!(
            "session {}: refused transition {} -> {}",
            r.session.id,
            r.session.phase.as_str(),
            target
        );
    }
}

fn finish_cancelled(r: &mut ScanRunner) {
    if r.session.advance(ScanPhase::Cancelled) {
        publish(r);
        log_info!("scan session {} cancelled", r.session.id);
    }
}

fn finish_failed(r: &mut ScanRunner, reason: FailReason) {
    actuators::signal_led(&r.backend, LedColor::Red);
    actuators::play_cue(&r.backend, SoundCue::Warning);
    if r.session.advance(ScanPhase::Failed(reason)) {
        publish(r);
        log_warn!("scan session {} failed: {reason:?}", r.session.id);
    }
}

fn publish(r: &ScanRunner) {
    // Send only fails when every receiver is gone; the session still has
    // to run to its terminal phase for side effects.
    let _ = r.updates.send(r.session.clone());
}

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::KioskConfig;
use crate::gateway::DeviceBackend;
use crate::models::Plate;
use crate::state::SharedState;
use crate::telemetry::WeightTelemetryClient;

use super::runner::{run_scan, ScanRunner, TareChoice};
use super::state::ScanSession;
use super::ScanError;

/// Observer handle for one session: its id plus a watch channel that
/// receives a snapshot on every phase change.
#[derive(Debug)]
pub struct ScanHandle {
    pub id: Uuid,
    pub updates: watch::Receiver<ScanSession>,
}

struct ActiveScan {
    id: Uuid,
    cancel: CancellationToken,
    tare_tx: watch::Sender<Option<TareChoice>>,
    handle: JoinHandle<()>,
}

/// Owns the scan workflow. Exactly one session may be active at a time;
/// starting a new one implicitly cancels any prior active session.
pub struct ScanController {
    backend: Arc<dyn DeviceBackend>,
    telemetry: Arc<WeightTelemetryClient>,
    shared: SharedState,
    settle_delay: Duration,
    min_scan_weight_g: f64,
    active: Mutex<Option<ActiveScan>>,
}

impl ScanController {
    pub fn new(
        backend: Arc<dyn DeviceBackend>,
        telemetry: Arc<WeightTelemetryClient>,
        shared: SharedState,
        config: &KioskConfig,
    ) -> Self {
        Self {
            backend,
            telemetry,
            shared,
            settle_delay: config.settle_delay,
            min_scan_weight_g: config.min_scan_weight_g,
            active: Mutex::new(None),
        }
    }

    /// Start a new scan session.
    ///
    /// Preconditions checked here, before any session object exists: a
    /// profile must be selected and the latest weight reading must be at or
    /// above the scan minimum. Violations are validation errors, not
    /// session failures.
    pub async fn start_scan(&self) -> Result<ScanHandle, ScanError> {
        let profile = self
            .shared
            .selected_profile()
            .ok_or(ScanError::NoProfileSelected)?;

        let grams = self
            .telemetry
            .current_weight()
            .map(|sample| sample.grams)
            .unwrap_or(0.0);
        if grams < self.min_scan_weight_g {
            return Err(ScanError::WeightBelowMinimum {
                grams,
                min: self.min_scan_weight_g,
            });
        }

        let mut active = self.active.lock().await;
        if let Some(previous) = active.take() {
            // No queuing: the old session is cancelled cooperatively and
            // its task discards whatever is still in flight.
            info!("cancelling session {} for a new scan", previous.id);
            previous.cancel.cancel();
        }

        let plate = self.shared.selected_plate();
        let session = ScanSession::new(profile.id, plate.map(|p| p.id));
        let (updates_tx, updates_rx) = watch::channel(session.clone());
        let (tare_tx, tare_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_scan(ScanRunner {
            backend: Arc::clone(&self.backend),
            telemetry: Arc::clone(&self.telemetry),
            shared: self.shared.clone(),
            settle_delay: self.settle_delay,
            session: session.clone(),
            updates: updates_tx,
            tare_rx,
            cancel: cancel.clone(),
        }));

        *active = Some(ActiveScan {
            id: session.id,
            cancel,
            tare_tx,
            handle,
        });

        Ok(ScanHandle {
            id: session.id,
            updates: updates_rx,
        })
    }

    /// Resolve the tare prompt with a plate. Also records the selection in
    /// shared state for subsequent sessions.
    pub async fn choose_plate(&self, plate: Plate) {
        self.shared.select_plate(Some(plate.clone()));
        if let Some(active) = self.active.lock().await.as_ref() {
            let _ = active.tare_tx.send(Some(TareChoice::Plate(plate)));
        }
    }

    /// Resolve the tare prompt without a plate.
    pub async fn skip_tare(&self) {
        if let Some(active) = self.active.lock().await.as_ref() {
            let _ = active.tare_tx.send(Some(TareChoice::Skip));
        }
    }

    /// Cancel the given session if it is the active one. Cooperative: an
    /// in-flight backend call finishes, then its result is discarded.
    pub async fn cancel(&self, session_id: Uuid) -> Result<(), ScanError> {
        let mut active = self.active.lock().await;
        let is_active = active
            .as_ref()
            .map(|current| current.id == session_id)
            .unwrap_or(false);
        if !is_active {
            return Err(ScanError::SessionNotActive(session_id));
        }
        if let Some(current) = active.take() {
            current.cancel.cancel();
        }
        Ok(())
    }

    pub async fn active_session_id(&self) -> Option<Uuid> {
        self.active.lock().await.as_ref().map(|active| active.id)
    }

    /// Cancel whatever is running and wait for its task to wind down.
    pub async fn shutdown(&self) {
        let taken = self.active.lock().await.take();
        if let Some(active) = taken {
            active.cancel.cancel();
            if let Err(err) = active.handle.await {
                log::error!("scan task for session {} failed to join: {err}", active.id);
            }
        }
    }
}

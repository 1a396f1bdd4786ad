use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::KioskConfig;
use crate::gateway::DeviceBackend;
use crate::models::{WeightSample, WeightSource};

use super::workers::{poll_loop, stream_loop};

type WeightHandler = Box<dyn Fn(&WeightSample) + Send + 'static>;

struct Subscriber {
    id: u64,
    handler: WeightHandler,
}

/// Shared core of the telemetry client: the reconciled latest sample and
/// the subscriber registry. Both worker loops feed it.
pub(super) struct TelemetryHub {
    latest: Mutex<Option<WeightSample>>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    degraded: AtomicBool,
}

impl TelemetryHub {
    fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
            degraded: AtomicBool::new(false),
        }
    }

    /// Reconcile an inbound sample. Last-timestamp-wins regardless of
    /// source: a sample older than the currently held one is dropped, never
    /// applied. On acceptance, subscribers run synchronously in
    /// registration order.
    pub(super) fn accept(&self, sample: WeightSample) {
        let mut latest = crate::utils::lock_unpoisoned(&self.latest);
        if let Some(held) = latest.as_ref() {
            if sample.recorded_at < held.recorded_at {
                return;
            }
        }
        *latest = Some(sample);

        // Fan out while still holding `latest`, otherwise a racing source
        // could slip a fresher sample between the recency check and the
        // delivery and subscribers would see them out of order. Handlers
        // must not call back into the hub.
        let subscribers = crate::utils::lock_unpoisoned(&self.subscribers);
        for subscriber in subscribers.iter() {
            (subscriber.handler)(&sample);
        }
    }

    pub(super) fn set_degraded(&self, degraded: bool) {
        self.degraded.store(degraded, Ordering::Relaxed);
    }

    fn unsubscribe(&self, id: u64) {
        let mut subscribers = crate::utils::lock_unpoisoned(&self.subscribers);
        subscribers.retain(|s| s.id != id);
    }
}

/// Handle returned by [`WeightTelemetryClient::subscribe`]. Dropping it (or
/// calling [`unsubscribe`](Self::unsubscribe)) removes the handler.
pub struct WeightSubscription {
    id: u64,
    hub: Arc<TelemetryHub>,
}

impl WeightSubscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for WeightSubscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id);
    }
}

/// Maintains the best-known current weight from two uncoordinated sources:
/// the live WebSocket stream and a 1s polling fallback. Runs for the
/// lifetime of any screen that displays live weight.
pub struct WeightTelemetryClient {
    hub: Arc<TelemetryHub>,
    config: KioskConfig,
    cancel: CancellationToken,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WeightTelemetryClient {
    pub fn new(config: KioskConfig) -> Self {
        Self {
            hub: Arc::new(TelemetryHub::new()),
            config,
            cancel: CancellationToken::new(),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Spawn the stream and poll workers. Idempotent: calling it while the
    /// workers run is a no-op.
    pub fn start(&self, backend: Arc<dyn DeviceBackend>) {
        let mut workers = crate::utils::lock_unpoisoned(&self.workers);
        if !workers.is_empty() {
            return;
        }

        info!("starting weight telemetry ({})", self.config.ws_weight_url);

        workers.push(tokio::spawn(stream_loop(
            self.config.ws_weight_url.clone(),
            Arc::clone(&self.hub),
            self.config.stream_reconnect_delay,
            self.config.max_stream_reconnect_attempts,
            self.cancel.clone(),
        )));
        workers.push(tokio::spawn(poll_loop(
            backend,
            Arc::clone(&self.hub),
            self.config.poll_interval,
            self.cancel.clone(),
        )));
    }

    /// Stop both workers and wait for them to wind down.
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = crate::utils::lock_unpoisoned(&self.workers);
            workers.drain(..).collect()
        };
        for handle in handles {
            handle.await.context("telemetry worker failed to join")?;
        }
        Ok(())
    }

    /// The most recent reconciled sample, if any reading has arrived yet.
    pub fn current_weight(&self) -> Option<WeightSample> {
        *crate::utils::lock_unpoisoned(&self.hub.latest)
    }

    /// True while the stream has been down past the reconnect cap. The poll
    /// path keeps running regardless; this is informational, never fatal.
    pub fn is_degraded(&self) -> bool {
        self.hub.degraded.load(Ordering::Relaxed)
    }

    /// Register a handler invoked synchronously for every accepted sample,
    /// in registration order.
    pub fn subscribe<F>(&self, handler: F) -> WeightSubscription
    where
        F: Fn(&WeightSample) + Send + 'static,
    {
        let id = self.hub.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut subscribers = crate::utils::lock_unpoisoned(&self.hub.subscribers);
            subscribers.push(Subscriber {
                id,
                handler: Box::new(handler),
            });
        }
        WeightSubscription {
            id,
            hub: Arc::clone(&self.hub),
        }
    }

    /// Feed a sample through reconciliation. Worker loops call this; tests
    /// use it to script the scale.
    pub(crate) fn ingest(&self, grams: f64, source: WeightSource) {
        self.hub.accept(WeightSample::now(grams, source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    fn client() -> WeightTelemetryClient {
        WeightTelemetryClient::new(KioskConfig::default())
    }

    #[test]
    fn latest_sample_wins_by_timestamp_not_source() {
        let client = client();
        let now = Instant::now();

        client.hub.accept(WeightSample {
            grams: 100.0,
            source: WeightSource::Poll,
            recorded_at: now,
        });
        client.hub.accept(WeightSample {
            grams: 150.0,
            source: WeightSource::Stream,
            recorded_at: now + Duration::from_millis(5),
        });

        let held = client.current_weight().unwrap();
        assert_eq!(held.grams, 150.0);
        assert_eq!(held.source, WeightSource::Stream);
    }

    #[test]
    fn stale_sample_is_dropped() {
        let client = client();
        let now = Instant::now();

        client.hub.accept(WeightSample {
            grams: 150.0,
            source: WeightSource::Stream,
            recorded_at: now + Duration::from_millis(5),
        });
        client.hub.accept(WeightSample {
            grams: 100.0,
            source: WeightSource::Poll,
            recorded_at: now,
        });

        assert_eq!(client.current_weight().unwrap().grams, 150.0);
    }

    #[test]
    fn stale_sample_does_not_reach_subscribers() {
        let client = client();
        let delivered = Arc::new(AtomicUsize::new(0));
        let delivered_clone = Arc::clone(&delivered);
        let _sub = client.subscribe(move |_| {
            delivered_clone.fetch_add(1, Ordering::SeqCst);
        });

        let now = Instant::now();
        client.hub.accept(WeightSample {
            grams: 150.0,
            source: WeightSource::Stream,
            recorded_at: now + Duration::from_millis(5),
        });
        client.hub.accept(WeightSample {
            grams: 100.0,
            source: WeightSource::Poll,
            recorded_at: now,
        });

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let client = client();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_a = Arc::clone(&order);
        let _sub_a = client.subscribe(move |_| order_a.lock().unwrap().push("a"));
        let order_b = Arc::clone(&order);
        let _sub_b = client.subscribe(move |_| order_b.lock().unwrap().push("b"));

        client.ingest(42.0, WeightSource::Stream);

        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn dropped_subscription_stops_delivery() {
        let client = client();
        let delivered = Arc::new(AtomicUsize::new(0));

        let delivered_clone = Arc::clone(&delivered);
        let sub = client.subscribe(move |_| {
            delivered_clone.fetch_add(1, Ordering::SeqCst);
        });

        client.ingest(10.0, WeightSource::Poll);
        sub.unsubscribe();
        client.ingest(20.0, WeightSource::Poll);

        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn racing_sources_never_deliver_out_of_timestamp_order() {
        let client = client();
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let delivered_clone = Arc::clone(&delivered);
        let _sub = client.subscribe(move |sample| {
            delivered_clone.lock().unwrap().push(sample.recorded_at);
        });

        let base = Instant::now();
        let writer = |hub: Arc<TelemetryHub>, source: WeightSource| {
            move || {
                for i in 0..1000u64 {
                    hub.accept(WeightSample {
                        grams: i as f64,
                        source,
                        recorded_at: base + Duration::from_nanos(i),
                    });
                }
            }
        };
        let stream = std::thread::spawn(writer(Arc::clone(&client.hub), WeightSource::Stream));
        let poll = std::thread::spawn(writer(Arc::clone(&client.hub), WeightSource::Poll));
        stream.join().unwrap();
        poll.join().unwrap();

        // Equal timestamps are accepted in either order; only a strictly
        // older sample after a fresher one is a violation.
        let delivered = delivered.lock().unwrap();
        assert!(delivered.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn degraded_flag_round_trips() {
        let client = client();
        assert!(!client.is_degraded());
        client.hub.set_degraded(true);
        assert!(client.is_degraded());
        client.hub.set_degraded(false);
        assert!(!client.is_degraded());
    }
}

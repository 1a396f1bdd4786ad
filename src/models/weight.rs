use std::time::Instant;

/// Where a weight reading came from. The stream is the primary path; the
/// poll path exists as a fallback when the stream is down. Neither source
/// outranks the other: reconciliation is purely last-timestamp-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightSource {
    Stream,
    Poll,
}

/// One reading from the physical scale, stamped with a monotonic timestamp
/// at the moment it was received.
#[derive(Debug, Clone, Copy)]
pub struct WeightSample {
    /// Raw reading in grams, never negative.
    pub grams: f64,
    pub source: WeightSource,
    pub recorded_at: Instant,
}

impl WeightSample {
    pub fn now(grams: f64, source: WeightSource) -> Self {
        Self {
            grams,
            source,
            recorded_at: Instant::now(),
        }
    }
}

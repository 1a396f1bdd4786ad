mod client;
mod workers;

pub use client::{WeightSubscription, WeightTelemetryClient};

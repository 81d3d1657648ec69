use metrics::{counter, histogram};
use std::time::Instant;

use crate::services::quota_gate::{DenyReason, Feature};

pub struct MetricsService;

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    pub fn record_generation(&self, feature: Feature) {
        counter!("generations_total", "feature" => feature.as_str()).increment(1);
    }

    pub fn record_denial(&self, feature: Feature, reason: DenyReason) {
        counter!(
            "quota_denials_total",
            "feature" => feature.as_str(),
            "reason" => reason.as_str()
        )
        .increment(1);
    }

    pub fn record_provider_failure(&self, feature: Feature) {
        counter!("provider_failures_total", "feature" => feature.as_str()).increment(1);
    }

    pub fn record_persistence_failure(&self) {
        counter!("persistence_failures_total").increment(1);
    }

    pub fn record_error(&self, error_type: &'static str) {
        counter!("errors_total", "type" => error_type).increment(1);
    }
}

pub struct RequestTimer {
    start: Instant,
    endpoint: String,
}

impl RequestTimer {
    pub fn new(endpoint: String) -> Self {
        Self {
            start: Instant::now(),
            endpoint,
        }
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        histogram!("request_duration_seconds", "endpoint" => self.endpoint.clone())
            .record(duration.as_secs_f64());
    }
}

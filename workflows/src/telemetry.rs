use metrics::{counter, histogram};
use orion_core::types::RequestType;
use std::time::Instant;

pub struct Telemetry;

impl Telemetry {
    pub fn record_journal_save(outcome: &'static str) {
        counter!("orion_journal_saves_total", "outcome" => outcome).increment(1);
    }

    pub fn record_reflection(outcome: &'static str) {
        counter!("orion_reflections_total", "outcome" => outcome).increment(1);
    }

    pub fn record_evaluation(outcome: &'static str) {
        counter!("orion_evaluations_total", "outcome" => outcome).increment(1);
    }

    pub fn record_generation_latency(request_type: RequestType, duration_ms: f64) {
        histogram!("orion_generation_duration_ms", "request_type" => request_type.to_string())
            .record(duration_ms);
    }
}

pub struct GenerationTimer {
    start: Instant,
    request_type: RequestType
}

impl GenerationTimer {
    pub fn new(request_type: RequestType) -> Self {
        Self {
            start: Instant::now(),
            request_type
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed().as_millis() as f64;
        Telemetry::record_generation_latency(self.request_type, duration);
    }
}

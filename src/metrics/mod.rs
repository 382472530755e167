// Metrics module
// Prometheus counters and the per-reply JSONL log

mod logger;
mod safety;
mod types;

pub use logger::MetricsLogger;
pub use safety::SafetyMetrics;
pub use types::RequestMetric;

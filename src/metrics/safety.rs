// Prometheus counters for the /metrics endpoint

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::crisis::RiskLevel;

/// Counters owned by one registry, so tests can build isolated instances
#[derive(Clone)]
pub struct SafetyMetrics {
    registry: Registry,
    classifications: IntCounterVec,
    replies: IntCounterVec,
    sos_events: IntCounterVec,
    provider_failures: IntCounter,
}

impl SafetyMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let classifications = IntCounterVec::new(
            Opts::new(
                "recovery_coach_classifications_total",
                "Messages classified, by risk level",
            ),
            &["risk_level"],
        )?;
        let replies = IntCounterVec::new(
            Opts::new("recovery_coach_replies_total", "Replies sent, by source"),
            &["source"],
        )?;
        let sos_events = IntCounterVec::new(
            Opts::new("recovery_coach_sos_events_total", "SOS events recorded"),
            &["level", "source"],
        )?;
        let provider_failures = IntCounter::new(
            "recovery_coach_provider_failures_total",
            "Text-generation calls that fell back to the static reply",
        )?;

        registry.register(Box::new(classifications.clone()))?;
        registry.register(Box::new(replies.clone()))?;
        registry.register(Box::new(sos_events.clone()))?;
        registry.register(Box::new(provider_failures.clone()))?;

        Ok(Self {
            registry,
            classifications,
            replies,
            sos_events,
            provider_failures,
        })
    }

    pub fn record_classification(&self, risk_level: RiskLevel) {
        self.classifications
            .with_label_values(&[risk_level.as_str()])
            .inc();
    }

    pub fn record_reply(&self, source: &str) {
        self.replies.with_label_values(&[source]).inc();
    }

    pub fn record_sos_event(&self, level: &str, source: &str) {
        self.sos_events.with_label_values(&[level, source]).inc();
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.inc();
    }

    pub fn provider_failures(&self) -> u64 {
        self.provider_failures.get()
    }

    /// Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}

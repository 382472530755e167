// Metrics data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crisis::{RiskLevel, SuggestedAction};

/// One reply, as written to the metrics log
///
/// Holds a hash of the message rather than its text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMetric {
    pub timestamp: DateTime<Utc>,
    pub message_hash: String,
    pub risk_level: RiskLevel,
    pub suggested_action: SuggestedAction,
    pub matched_phrase_count: usize,
    /// Where the reply came from (e.g., "crisis_template", "provider")
    pub reply_source: String,
    pub response_time_ms: u64,
}

impl RequestMetric {
    pub fn new(
        message_hash: String,
        risk_level: RiskLevel,
        suggested_action: SuggestedAction,
        matched_phrase_count: usize,
        reply_source: String,
        response_time_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            message_hash,
            risk_level,
            suggested_action,
            matched_phrase_count,
            reply_source,
            response_time_ms,
        }
    }
}

// Safety event records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crisis::ClassificationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SosSource {
    /// Raised by the user from the SOS screen
    Manual,
    /// Raised by the message classifier
    Detector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SosLevel {
    Urge,
    Crisis,
}

impl SosLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SosLevel::Urge => "urge",
            SosLevel::Crisis => "crisis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosEvent {
    pub id: Uuid,
    pub user_id: String,
    pub source: SosSource,
    pub level: SosLevel,
    pub triggered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_phrases: Vec<String>,
}

impl SosEvent {
    /// An SOS raised by the user
    pub fn manual(user_id: impl Into<String>, level: SosLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            source: SosSource::Manual,
            level,
            triggered_at: Utc::now(),
            resolution: None,
            matched_phrases: Vec::new(),
        }
    }

    /// The event to record for a classification, if it needs follow-up
    ///
    /// Crisis wins over urge when both were detected.
    pub fn from_classification(
        user_id: impl Into<String>,
        result: &ClassificationResult,
    ) -> Option<Self> {
        let (level, resolution) = if result.is_crisis {
            (SosLevel::Crisis, "crisis_detected")
        } else if result.is_urge {
            (SosLevel::Urge, "urge_detected")
        } else {
            return None;
        };

        Some(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            source: SosSource::Detector,
            level,
            triggered_at: Utc::now(),
            resolution: Some(resolution.to_string()),
            matched_phrases: result.matched_phrases.clone(),
        })
    }
}

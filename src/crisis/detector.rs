// Crisis and urge detector

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::lexicon::{PhraseCategory, TriggerLexicon};

/// Discrete risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Crisis,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Crisis => "crisis",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handling hint attached to a classification
///
/// `None` serializes as an empty string, meaning no special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestedAction {
    #[serde(rename = "")]
    None,
    #[serde(rename = "general_support")]
    GeneralSupport,
    #[serde(rename = "urge_support")]
    UrgeSupport,
    #[serde(rename = "immediate_crisis_support")]
    ImmediateCrisisSupport,
}

impl SuggestedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::None => "",
            SuggestedAction::GeneralSupport => "general_support",
            SuggestedAction::UrgeSupport => "urge_support",
            SuggestedAction::ImmediateCrisisSupport => "immediate_crisis_support",
        }
    }
}

/// Outcome of classifying one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_crisis: bool,
    pub is_urge: bool,
    pub risk_level: RiskLevel,
    /// Crisis matches in lexicon order, followed by urge matches
    pub matched_phrases: Vec<String>,
    pub suggested_action: SuggestedAction,
}

impl ClassificationResult {
    /// Whether callers should record this classification as a safety event
    pub fn needs_follow_up(&self) -> bool {
        self.is_crisis || self.is_urge
    }
}

#[derive(Debug, Clone)]
pub struct CrisisDetector {
    lexicon: Arc<TriggerLexicon>,
}

impl CrisisDetector {
    pub fn new(lexicon: TriggerLexicon) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    /// Load trigger phrases from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let lexicon = TriggerLexicon::load_from_file(path)?;
        tracing::info!(
            path = %path.display(),
            phrases = lexicon.phrase_count(),
            "Loaded custom trigger lexicon"
        );
        Ok(Self::new(lexicon))
    }

    /// Classify a message by case-insensitive substring search
    ///
    /// There is no tokenization, stemming or negation handling: a phrase
    /// embedded inside a longer word still matches, and "I do not want to
    /// hurt myself" is still a crisis. Crisis outranks urge when both occur.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let normalized = text.to_lowercase();

        let crisis = self.collect(PhraseCategory::CRISIS, &normalized);
        let urge = self.collect(PhraseCategory::URGE, &normalized);

        let is_crisis = !crisis.is_empty();
        let is_urge = !urge.is_empty();

        let (risk_level, suggested_action) = if is_crisis {
            (RiskLevel::Crisis, SuggestedAction::ImmediateCrisisSupport)
        } else if is_urge {
            (RiskLevel::High, SuggestedAction::UrgeSupport)
        } else if self.any_match(PhraseCategory::DISTRESS, &normalized) {
            (RiskLevel::Medium, SuggestedAction::GeneralSupport)
        } else {
            (RiskLevel::Low, SuggestedAction::None)
        };

        if is_crisis {
            tracing::warn!(phrases = ?crisis, "Crisis detected");
        } else if is_urge {
            tracing::warn!(phrases = ?urge, "Urge detected");
        }

        let mut matched_phrases = crisis;
        matched_phrases.extend(urge);

        ClassificationResult {
            is_crisis,
            is_urge,
            risk_level,
            matched_phrases,
            suggested_action,
        }
    }

    /// Detect if the message contains any crisis phrase
    pub fn detect_crisis(&self, text: &str) -> bool {
        self.any_match(PhraseCategory::CRISIS, &text.to_lowercase())
    }

    pub fn lexicon(&self) -> &TriggerLexicon {
        &self.lexicon
    }

    fn collect(&self, category: &str, normalized: &str) -> Vec<String> {
        self.lexicon
            .category(category)
            .map(|c| c.matches(normalized).map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn any_match(&self, category: &str, normalized: &str) -> bool {
        self.lexicon
            .category(category)
            .map(|c| c.matches(normalized).next().is_some())
            .unwrap_or(false)
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        Self::new(TriggerLexicon::default())
    }
}

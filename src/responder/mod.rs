// Response selection
//
// Maps a classification to a fixed safety reply, or defers to general
// reply generation (the text-generation provider or the template catalog).

mod delay;
mod templates;

pub use delay::{NoDelay, RandomDelay, ThinkingDelay};
pub use templates::{ConversationLength, EmotionTag, ReplyContext, TemplateCatalog, TopicTag};

use crate::crisis::{ClassificationResult, RiskLevel};

/// Fixed reply for crisis-level messages. Never personalised or varied.
pub const CRISIS_SUPPORT_MESSAGE: &str = "I'm really concerned about what you're sharing. \
If you're thinking about harming yourself, please reach out for immediate help right now. \
You can call a crisis helpline or emergency services. \
You're not alone, and there are people who want to help you through this.";

/// Fixed grounding reply for urge-level messages
pub const URGE_SUPPORT_MESSAGE: &str = "I can hear that you're having strong urges right now. \
That's really tough, and I'm glad you reached out. \
Let's try a quick grounding technique: take 5 deep breaths, then tell me what you're feeling in this moment. \
We can work through this together.";

/// Select the fixed reply for a classification
///
/// Returns `None` when no rule applies and the caller should fall through to
/// general reply generation.
pub fn select_response(result: &ClassificationResult) -> Option<&'static str> {
    match result.risk_level {
        RiskLevel::Crisis => Some(CRISIS_SUPPORT_MESSAGE),
        RiskLevel::High => Some(URGE_SUPPORT_MESSAGE),
        RiskLevel::Medium | RiskLevel::Low => None,
    }
}

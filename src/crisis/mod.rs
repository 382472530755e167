// Crisis module
// Message risk classification and crisis resources

mod detector;
mod helplines;
mod lexicon;

pub use detector::{ClassificationResult, CrisisDetector, RiskLevel, SuggestedAction};
pub use helplines::{helplines_for, Helpline, DEFAULT_COUNTRY};
pub use lexicon::{PhraseCategory, TriggerLexicon, CRISIS_PHRASES, DISTRESS_PHRASES, URGE_PHRASES};

// Trigger phrase lexicon

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Self-harm and suicidal ideation phrases, in match-report order
pub const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "end it all",
    "not worth living",
    "want to die",
    "suicide",
    "hurt myself",
    "no point",
    "give up",
    "hopeless",
    "worthless",
];

/// Gambling urge phrases, in match-report order
pub const URGE_PHRASES: &[&str] = &[
    "want to bet",
    "need to gamble",
    "place a bet",
    "play slots",
    "go to casino",
    "online gambling",
    "just one more",
    "can't stop",
    "gambling urge",
    "betting urge",
];

/// Phrases that raise an otherwise quiet message to medium risk
pub const DISTRESS_PHRASES: &[&str] = &["struggling", "difficult"];

static BUILTIN: Lazy<TriggerLexicon> = Lazy::new(|| TriggerLexicon {
    categories: vec![
        PhraseCategory::new(PhraseCategory::CRISIS, CRISIS_PHRASES),
        PhraseCategory::new(PhraseCategory::URGE, URGE_PHRASES),
        PhraseCategory::new(PhraseCategory::DISTRESS, DISTRESS_PHRASES),
    ],
});

/// A named set of lowercase phrases
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhraseCategory {
    pub name: String,
    pub phrases: Vec<String>,
}

impl PhraseCategory {
    pub const CRISIS: &'static str = "crisis";
    pub const URGE: &'static str = "urge";
    pub const DISTRESS: &'static str = "distress";

    fn new<S: AsRef<str>>(name: &str, phrases: &[S]) -> Self {
        Self {
            name: name.to_string(),
            phrases: phrases
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Phrases that occur in `normalized`, in category order
    pub fn matches<'a>(&'a self, normalized: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.phrases
            .iter()
            .map(String::as_str)
            .filter(move |phrase| normalized.contains(phrase))
    }
}

/// Ordered phrase categories used by the classifier
///
/// Immutable once built. The built-in lexicon is initialised lazily and
/// shared for the life of the process; custom lexicons can be loaded from a
/// JSON file with `crisis`, `urge` and optional `distress` arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerLexicon {
    categories: Vec<PhraseCategory>,
}

/// On-disk lexicon format
#[derive(Debug, Deserialize)]
struct LexiconFile {
    crisis: Vec<String>,
    urge: Vec<String>,
    #[serde(default)]
    distress: Option<Vec<String>>,
}

impl TriggerLexicon {
    /// The compiled-in lexicon
    pub fn builtin() -> &'static TriggerLexicon {
        &BUILTIN
    }

    /// Load a lexicon from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("Invalid lexicon file: {}", path.display()))
    }

    /// Parse a lexicon from its JSON representation
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: LexiconFile =
            serde_json::from_str(contents).context("Failed to parse lexicon JSON")?;

        let crisis = PhraseCategory::new(PhraseCategory::CRISIS, file.crisis.as_slice());
        let urge = PhraseCategory::new(PhraseCategory::URGE, file.urge.as_slice());

        if crisis.phrases.is_empty() {
            bail!("Lexicon must define at least one crisis phrase");
        }
        if urge.phrases.is_empty() {
            bail!("Lexicon must define at least one urge phrase");
        }

        let distress = match file.distress {
            Some(phrases) => PhraseCategory::new(PhraseCategory::DISTRESS, phrases.as_slice()),
            None => PhraseCategory::new(PhraseCategory::DISTRESS, DISTRESS_PHRASES),
        };

        Ok(Self {
            categories: vec![crisis, urge, distress],
        })
    }

    /// Look up a category by name
    pub fn category(&self, name: &str) -> Option<&PhraseCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// All categories in lexicon order
    pub fn categories(&self) -> &[PhraseCategory] {
        &self.categories
    }

    /// Total number of phrases across every category
    pub fn phrase_count(&self) -> usize {
        self.categories.iter().map(|c| c.phrases.len()).sum()
    }
}

impl Default for TriggerLexicon {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_category_order() {
        let names: Vec<&str> = TriggerLexicon::builtin()
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["crisis", "urge", "distress"]);
    }

    #[test]
    fn test_builtin_phrases_are_lowercase() {
        for category in TriggerLexicon::builtin().categories() {
            for phrase in &category.phrases {
                assert_eq!(phrase, &phrase.to_lowercase());
            }
        }
        assert_eq!(TriggerLexicon::builtin().phrase_count(), 22);
    }

    #[test]
    fn test_from_json_lowercases_and_defaults_distress() {
        let lexicon = TriggerLexicon::from_json(
            r#"{"crisis": ["End It All"], "urge": [" Play Slots ", ""]}"#,
        )
        .unwrap();

        assert_eq!(lexicon.category("crisis").unwrap().phrases, vec!["end it all"]);
        assert_eq!(lexicon.category("urge").unwrap().phrases, vec!["play slots"]);
        assert_eq!(
            lexicon.category("distress").unwrap().phrases,
            vec!["struggling", "difficult"]
        );
    }

    #[test]
    fn test_from_json_rejects_empty_crisis() {
        let result = TriggerLexicon::from_json(r#"{"crisis": [], "urge": ["bet"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"crisis": ["hopeless"], "urge": ["bet"], "distress": ["rough day"]}}"#
        )
        .unwrap();

        let lexicon = TriggerLexicon::load_from_file(file.path()).unwrap();
        assert_eq!(lexicon.phrase_count(), 3);
        assert_eq!(lexicon.category("distress").unwrap().phrases, vec!["rough day"]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = TriggerLexicon::load_from_file(Path::new("/nonexistent/lexicon.json"));
        assert!(result.is_err());
    }
}

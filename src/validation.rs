//! Answer word checks applied before a submission is accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Outcome of validating one answer item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl WordCheck {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn rejected(reason: &str) -> Self {
        Self {
            valid: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Decides whether a typed answer counts as a real word or phrase.
pub trait WordValidator: Send + Sync {
    fn validate(&self, text: &str) -> WordCheck;
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary {0} contains no words")]
    Empty(PathBuf),
}

/// Two-letter answers that are fine in a party game
const ALLOWED_SHORT_WORDS: &[&str] = &[
    "tv", "ok", "hi", "no", "go", "up", "ax", "ox", "pi", "dj", "pc", "uk", "us", "eu", "un", "ai",
    "vr", "ar",
];

/// Names and brands a plain word list tends to miss
const EXTRA_WORDS: &[&str] = &[
    "spain", "france", "germany", "italy", "japan", "china", "india", "brazil", "mexico", "canada",
    "london", "paris", "rome", "tokyo", "berlin", "madrid", "sydney", "pizza", "pasta", "sushi",
    "ramen", "tacos", "burrito", "lasagna", "hummus", "falafel", "kimchi", "tofu", "google",
    "netflix", "spotify", "amazon", "iphone", "android", "xbox", "nintendo", "pokemon",
    "minecraft", "batman", "superman", "spiderman", "elsa", "shrek", "pikachu", "mario", "yoda",
    "einstein", "newton", "darwin", "mozart", "picasso", "wifi", "usb", "dvd", "bye", "yes", "hey",
    "wow",
];

const MIN_ANSWER_CHARS: usize = 3;

/// Word list backed validator.
///
/// Without a dictionary only the structural rules run: empty input and
/// too-short answers are refused, everything else passes.
#[derive(Debug, Clone, Default)]
pub struct DictionaryValidator {
    words: Option<HashSet<String>>,
}

impl DictionaryValidator {
    /// Structural checks only
    pub fn structural() -> Self {
        Self { words: None }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: HashSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| w.chars().count() >= 2)
            .collect();
        set.extend(EXTRA_WORDS.iter().map(|w| w.to_string()));
        Self { words: Some(set) }
    }

    /// Load a newline-separated word list.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if contents.trim().is_empty() {
            return Err(DictionaryError::Empty(path.to_path_buf()));
        }

        let validator = Self::from_words(contents.lines());
        tracing::info!(
            "Dictionary loaded from {}: {} words",
            path.display(),
            validator.word_count()
        );
        Ok(validator)
    }

    pub fn word_count(&self) -> usize {
        self.words.as_ref().map_or(0, HashSet::len)
    }

    fn knows(&self, word: &str) -> bool {
        self.words.as_ref().is_some_and(|w| w.contains(word))
    }
}

fn is_brand_code(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_alphanumeric())
        && text.chars().any(|c| c.is_ascii_alphabetic())
        && text.chars().any(|c| c.is_ascii_digit())
}

impl WordValidator for DictionaryValidator {
    fn validate(&self, text: &str) -> WordCheck {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return WordCheck::rejected("Empty input");
        }

        // 3M, 7up, WD40
        if is_brand_code(trimmed) {
            return WordCheck::ok();
        }

        let lower = trimmed.to_lowercase();
        let len = lower.chars().count();
        if len == 2 && ALLOWED_SHORT_WORDS.contains(&lower.as_str()) {
            return WordCheck::ok();
        }
        if len < MIN_ANSWER_CHARS {
            return WordCheck::rejected("Too short (min 3 characters)");
        }

        let words: Vec<String> = lower
            .split(|c: char| c.is_whitespace() || c == '-')
            .map(|w| w.replace(['\'', '\u{2019}'], ""))
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return WordCheck::rejected("No valid words");
        }

        if self.words.is_none() {
            return WordCheck::ok();
        }

        // short connectors and plain numbers do not count either way
        let substantial: Vec<&String> = words
            .iter()
            .filter(|w| w.chars().count() > 2 && !w.chars().all(|c| c.is_ascii_digit()))
            .collect();

        if words.len() == 1 || substantial.len() == 1 {
            let main = substantial.first().copied().unwrap_or(&words[0]);
            return if self.knows(main) {
                WordCheck::ok()
            } else {
                WordCheck::rejected("Word not recognized")
            };
        }

        if substantial.iter().any(|w| self.knows(w)) {
            WordCheck::ok()
        } else {
            WordCheck::rejected("No recognized words")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn dictionary() -> DictionaryValidator {
        DictionaryValidator::from_words(["apple", "ice", "cream", "york", "new", "cat"])
    }

    #[test]
    fn test_structural_rules() {
        let validator = DictionaryValidator::structural();
        assert_eq!(validator.validate("   "), WordCheck::rejected("Empty input"));
        assert_eq!(
            validator.validate("zq"),
            WordCheck::rejected("Too short (min 3 characters)")
        );
        assert!(validator.validate("TV").valid);
        assert!(validator.validate("3M").valid);
        assert!(validator.validate("qwzx").valid);
    }

    #[test]
    fn test_dictionary_single_words() {
        let validator = dictionary();
        assert!(validator.validate("Apple").valid);
        assert!(validator.validate("pizza").valid);
        assert_eq!(
            validator.validate("blorptastic"),
            WordCheck::rejected("Word not recognized")
        );
    }

    #[test]
    fn test_dictionary_phrases() {
        let validator = dictionary();
        assert!(validator.validate("New York").valid);
        assert!(validator.validate("ice-cream").valid);
        assert!(validator.validate("a cat").valid);
        assert_eq!(
            validator.validate("glorp blorp"),
            WordCheck::rejected("No recognized words")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Banana\nkiwi\n\nx").unwrap();

        let validator = DictionaryValidator::load(file.path()).unwrap();
        assert!(validator.validate("banana").valid);
        assert!(validator.validate("KIWI").valid);
        assert!(!validator.validate("mango").valid);
    }

    #[test]
    fn test_load_errors() {
        let missing = DictionaryValidator::load("/definitely/not/here.txt");
        assert!(matches!(missing, Err(DictionaryError::Io { .. })));

        let empty = tempfile::NamedTempFile::new().unwrap();
        let result = DictionaryValidator::load(empty.path());
        assert!(matches!(result, Err(DictionaryError::Empty(_))));
    }
}

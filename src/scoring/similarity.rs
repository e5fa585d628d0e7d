//! Fuzzy answer equivalence: edit distance, suffix stemming and the
//! combined "same answer" check used for clustering.

use super::text::normalize_answer;

/// Suffixes tried in order; the first match wins.
const SUFFIXES: &[&str] = &[
    "ization", "isation", "fulness", "ousness", "iveness", "ically", "lessly", "edness", "ation",
    "ition", "ening", "ingly", "ously", "fully", "able", "ible", "ness", "ment", "less", "ings",
    "tion", "ally", "edly", "erly", "ward", "ing", "est", "ies", "ied", "ful", "ous", "ive", "ess",
    "ers", "ery", "ens", "ant", "ent", "ism", "ist", "ity", "ify", "ise", "ize", "ure", "ory", "ed",
    "er", "es", "en", "ly", "al", "s",
];

/// Shortest stem a suffix may leave behind.
const MIN_STEM_CHARS: usize = 3;

/// Classic insert/delete/substitute edit distance, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Strip the first matching English suffix, keeping at least three chars.
pub fn stem(word: &str) -> String {
    let len = word.chars().count();
    for suffix in SUFFIXES {
        if word.ends_with(suffix) && len >= suffix.len() + MIN_STEM_CHARS {
            return word[..word.len() - suffix.len()].to_string();
        }
    }
    word.to_string()
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// `runn` -> `run`, `bigg` -> `big`.
fn collapse_double_consonant(stem: &str) -> &str {
    let mut tail = stem.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(before)) if last == before && is_consonant(last) => {
            &stem[..stem.len() - last.len_utf8()]
        }
        _ => stem,
    }
}

/// True when both words reduce to the same stem, or one word is the
/// other's stem.
pub fn has_same_stem(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let stem_a = stem(&a);
    let stem_b = stem(&b);

    if stem_a == stem_b || a == stem_b || b == stem_a {
        return true;
    }

    collapse_double_consonant(&stem_a) == collapse_double_consonant(&stem_b)
}

/// Edits allowed between two answers, scaled by the shorter one.
fn typo_tolerance(shorter_len: usize) -> usize {
    match shorter_len {
        0..=2 => 0,
        3..=4 => 1,
        5..=7 => 2,
        _ => 3,
    }
}

/// An answer reduced once to everything the similarity check compares, so
/// clustering many entries does not redo the text work for every pair.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    normalized: String,
    chars: Vec<char>,
    stem: String,
    collapsed: String,
}

impl AnswerKey {
    pub fn new(raw: &str) -> Self {
        let normalized = normalize_answer(raw);
        let stem = stem(&normalized);
        let collapsed = collapse_double_consonant(&stem).to_string();
        Self {
            chars: normalized.chars().collect(),
            normalized,
            stem,
            collapsed,
        }
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Whether both answers should count as the same idea.
    pub fn matches(&self, other: &AnswerKey) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if self.normalized == other.normalized
            || self.stem == other.stem
            || self.normalized == other.stem
            || other.normalized == self.stem
            || self.collapsed == other.collapsed
        {
            return true;
        }

        let len_a = self.chars.len();
        let len_b = other.chars.len();
        let tolerance = typo_tolerance(len_a.min(len_b));
        if tolerance == 0 || len_a.abs_diff(len_b) > tolerance {
            return false;
        }

        levenshtein_chars(&self.chars, &other.chars) <= tolerance
    }
}

/// Whether two raw answers should count as the same idea.
pub fn is_similar(a: &str, b: &str) -> bool {
    AnswerKey::new(a).matches(&AnswerKey::new(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("pizza", "pizza"), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn test_stem() {
        assert_eq!(stem("spoons"), "spoon");
        assert_eq!(stem("walking"), "walk");
        assert_eq!(stem("running"), "runn");
        assert_eq!(stem("bigger"), "bigg");
        assert_eq!(stem("boxes"), "box");
        assert_eq!(stem("dishes"), "dish");
        assert_eq!(stem("faster"), "fast");
        assert_eq!(stem("happiness"), "happi");
        assert_eq!(stem("cat"), "cat");
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("bed"), "bed");
    }

    #[test]
    fn test_has_same_stem() {
        assert!(has_same_stem("spoon", "spoons"));
        assert!(has_same_stem("walk", "walking"));
        assert!(has_same_stem("walked", "walking"));
        assert!(has_same_stem("run", "running"));
        assert!(has_same_stem("Box", "boxes"));
        assert!(!has_same_stem("cat", "dog"));
        assert!(!has_same_stem("", "cat"));
        assert!(!has_same_stem("cat", "  "));
    }

    #[test]
    fn test_is_similar_matches() {
        let pairs = [
            ("cat", "bat"),
            ("dog", "dig"),
            ("pizza", "piza"),
            ("banana", "bananna"),
            ("spoon", "spoons"),
            ("box", "boxes"),
            ("walk", "walked"),
            ("run", "running"),
            ("The Beatles", "beatles"),
        ];
        for (a, b) in pairs {
            assert!(is_similar(a, b), "{a} ~ {b}");
            assert!(is_similar(b, a), "{b} ~ {a}");
        }
    }

    #[test]
    fn test_is_similar_rejects() {
        let pairs = [
            ("cat", "elephant"),
            ("pizza", "hamburger"),
            ("hi", "helicopter"),
            ("", "cat"),
            ("cat", ""),
            ("", ""),
        ];
        for (a, b) in pairs {
            assert!(!is_similar(a, b), "{a} !~ {b}");
        }
    }

    #[test]
    fn test_answer_key_agrees_with_stem_check() {
        for (a, b) in [("walked", "walking"), ("bigger", "big"), ("cat", "dog")] {
            let keyed = AnswerKey::new(a).matches(&AnswerKey::new(b));
            assert_eq!(keyed, has_same_stem(a, b) || levenshtein(a, b) <= 1, "{a} / {b}");
        }
        assert_eq!(AnswerKey::new("  The   Beatles ").normalized(), "beatles");
        assert!(AnswerKey::new(" ").is_empty());
    }

    #[test]
    fn test_is_similar_reflexive() {
        for word in ["apple", "ox", "New York", "strawberries"] {
            assert!(is_similar(word, word));
        }
    }
}

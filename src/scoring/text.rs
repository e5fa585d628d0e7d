//! Answer text handling: normalization and multi-entry splitting.

use std::collections::HashSet;

const ARTICLES: &[&str] = &["the", "a", "an"];

fn is_article(word: &str) -> bool {
    ARTICLES.contains(&word)
}

/// Canonical comparison form of an answer.
///
/// Lowercases, trims, collapses whitespace runs and drops one leading
/// article. The article is kept when the rest would itself start with an
/// article so that normalizing twice gives the same result.
pub fn normalize_answer(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let rest = match words.as_slice() {
        [first, second, ..] if is_article(first) && !is_article(second) => &words[1..],
        _ => &words[..],
    };

    rest.join(" ")
}

/// Split one submission into its individual entries.
///
/// Items are separated by commas, semicolons or newlines. Blank items are
/// dropped, and repeats (ignoring case) keep only their first spelling.
pub fn parse_multiple_entries(raw: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries = Vec::new();

    for item in raw.split([',', ';', '\n']) {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if !seen.insert(item.to_lowercase()) {
            continue;
        }
        entries.push(item.to_string());
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_answer("  Pizza  "), "pizza");
        assert_eq!(normalize_answer("ICE   cream"), "ice cream");
        assert_eq!(normalize_answer(""), "");
        assert_eq!(normalize_answer("   "), "");
    }

    #[test]
    fn test_normalize_strips_leading_article() {
        assert_eq!(normalize_answer("The Beatles"), "beatles");
        assert_eq!(normalize_answer("an apple"), "apple");
        assert_eq!(normalize_answer("a cat"), "cat");
        // a lone article is the answer itself
        assert_eq!(normalize_answer("the"), "the");
        // only the leading word counts
        assert_eq!(normalize_answer("catch the ball"), "catch the ball");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "The Beatles",
            "the the cat",
            "A an apple",
            "  an   Orange ",
            "a",
            "Theater",
        ] {
            let once = normalize_answer(input);
            assert_eq!(normalize_answer(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_parse_multiple_entries() {
        assert_eq!(
            parse_multiple_entries("apple, banana; cherry\ndate"),
            vec!["apple", "banana", "cherry", "date"]
        );
        assert_eq!(parse_multiple_entries("Red, red, RED"), vec!["Red"]);
        assert_eq!(parse_multiple_entries(" , ;\n "), Vec::<String>::new());
        assert_eq!(parse_multiple_entries(""), Vec::<String>::new());
        assert_eq!(parse_multiple_entries("single"), vec!["single"]);
    }
}

use std::collections::HashSet;

/// Tokens too common to carry retail meaning.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "it", "to", "and", "or", "for", "on", "in", "my", "i", "how", "do",
    "can", "what", "want", "need",
];

/// Fixed domain synonym table. Expansion is additive: expanded terms join the
/// original tokens, they never replace them.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("hang", &["hanging", "hooks", "strips", "anchors"]),
    ("picture", &["hanging", "frame", "hooks"]),
    ("mirror", &["hanging", "heavy-duty", "anchors"]),
    ("damage", &["no-damage", "rental-friendly", "command"]),
    ("rental", &["no-damage", "rental-friendly", "removable"]),
    ("drill", &["anchors", "drilling-required", "screws"]),
    ("heavy", &["heavy-duty", "anchors", "toggle"]),
    ("drywall", &["drywall", "anchors", "monkey"]),
    ("concrete", &["concrete", "masonry", "tapcon"]),
];

/// Extracts deduplicated search terms from an utterance: lowercase, strip
/// punctuation, drop stop words and tokens of length <= 2, then expand via
/// the synonym table. An empty result is valid and means browse mode.
pub fn extract_search_terms(query: &str) -> Vec<String> {
    let words = tokenize(query);

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    for word in &words {
        if seen.insert(word.clone()) {
            terms.push(word.clone());
        }
    }
    for word in &words {
        if let Some((_, expansions)) = SYNONYMS.iter().find(|(key, _)| key == word) {
            for expansion in *expansions {
                if seen.insert((*expansion).to_string()) {
                    terms.push((*expansion).to_string());
                }
            }
        }
    }
    terms
}

fn tokenize(query: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(query.len());
    for character in query.chars() {
        if character.is_alphanumeric() || character == '_' {
            for lowered in character.to_lowercase() {
                sanitized.push(lowered);
            }
        } else if character.is_whitespace() {
            sanitized.push(' ');
        }
        // Other punctuation is removed outright, not turned into a separator.
    }

    sanitized
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_search_terms;

    #[test]
    fn drops_stop_words_and_short_tokens() {
        let terms = extract_search_terms("How do I fix my TV?");
        assert_eq!(terms, vec!["fix"]);
    }

    #[test]
    fn expansion_is_additive() {
        let terms = extract_search_terms("hang something");
        assert_eq!(terms[0], "hang");
        for expansion in ["hanging", "hooks", "strips", "anchors"] {
            assert!(terms.contains(&expansion.to_string()), "missing {expansion}");
        }
        assert!(terms.contains(&"something".to_string()));
    }

    #[test]
    fn expanded_terms_are_deduplicated() {
        // "hang" and "picture" both expand to "hanging" and "hooks".
        let terms = extract_search_terms("hang a picture");
        let hanging = terms.iter().filter(|term| *term == "hanging").count();
        assert_eq!(hanging, 1);
    }

    #[test]
    fn punctuation_is_removed_not_split() {
        let terms = extract_search_terms("rental-friendly");
        assert_eq!(terms, vec!["rentalfriendly"]);
    }

    #[test]
    fn empty_utterance_yields_no_terms() {
        assert!(extract_search_terms("").is_empty());
        assert!(extract_search_terms("to do it").is_empty());
    }
}

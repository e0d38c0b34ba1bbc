// Word tokenization and case normalization.
//
// A token is a run of alphanumeric characters with embedded apostrophes or
// hyphens ("don't", "pour-over"). Everything else is a boundary. Tokens are
// lowercased here; stemming happens later and only for non-common tokens.

use regex_lite::Regex;

/// The word pattern shared by all documents of a request.
pub fn word_regex() -> Regex {
    // A token starts alphanumeric; ' and - may appear inside.
    Regex::new(r"[A-Za-z0-9][A-Za-z0-9'\-]*").expect("word pattern is a fixed literal")
}

/// Split one field's text into lowercased tokens.
pub fn tokenize(text: &str, word: &Regex) -> Vec<String> {
    word.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

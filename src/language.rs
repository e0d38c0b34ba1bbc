// Shared linguistic resources: Snowball stemmer + stop-word set per language.
//
// One bundle is built per language before any request runs and shared across
// all concurrent pipeline instances behind an Arc. Nothing here is mutated
// after construction, so concurrent reads need no locking.

use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use stop_words::LANGUAGE;

use crate::error::ClusterError;

/// Read-only stemmer + stop-word bundle for one language.
pub struct LinguisticResources {
    stemmer: Stemmer,
    stop_words: HashSet<String>,
}

impl std::fmt::Debug for LinguisticResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinguisticResources")
            .field("stop_words", &self.stop_words)
            .finish_non_exhaustive()
    }
}

impl LinguisticResources {
    /// Build the bundle for a language tag ("en", "english", "de", ...).
    ///
    /// Only the primary subtag is considered, so "en-US" selects English.
    /// Returns `UnsupportedLanguage` when either the stemmer or the stop
    /// list is unavailable for the tag.
    pub fn for_language(tag: &str) -> Result<Self, ClusterError> {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_lowercase();

        let (algorithm, stop_language) = match primary.as_str() {
            "en" | "english" => (Algorithm::English, LANGUAGE::English),
            "da" | "danish" => (Algorithm::Danish, LANGUAGE::Danish),
            "nl" | "dutch" => (Algorithm::Dutch, LANGUAGE::Dutch),
            "fi" | "finnish" => (Algorithm::Finnish, LANGUAGE::Finnish),
            "fr" | "french" => (Algorithm::French, LANGUAGE::French),
            "de" | "german" => (Algorithm::German, LANGUAGE::German),
            "hu" | "hungarian" => (Algorithm::Hungarian, LANGUAGE::Hungarian),
            "it" | "italian" => (Algorithm::Italian, LANGUAGE::Italian),
            "no" | "norwegian" => (Algorithm::Norwegian, LANGUAGE::Norwegian),
            "pt" | "portuguese" => (Algorithm::Portuguese, LANGUAGE::Portuguese),
            "ro" | "romanian" => (Algorithm::Romanian, LANGUAGE::Romanian),
            "ru" | "russian" => (Algorithm::Russian, LANGUAGE::Russian),
            "es" | "spanish" => (Algorithm::Spanish, LANGUAGE::Spanish),
            "sv" | "swedish" => (Algorithm::Swedish, LANGUAGE::Swedish),
            "tr" | "turkish" => (Algorithm::Turkish, LANGUAGE::Turkish),
            _ => return Err(ClusterError::UnsupportedLanguage(tag.to_string())),
        };

        let stop_words = stop_words::get(stop_language)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();

        Ok(Self {
            stemmer: Stemmer::create(algorithm),
            stop_words,
        })
    }

    /// Whether a lowercased token is on the stop list.
    pub fn is_stop_word(&self, lower: &str) -> bool {
        self.stop_words.contains(lower)
    }

    /// Stem a lowercased token.
    pub fn stem(&self, lower: &str) -> String {
        self.stemmer.stem(lower).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_stop_words() {
        let res = LinguisticResources::for_language("en").unwrap();
        assert!(res.is_stop_word("the"));
        assert!(res.is_stop_word("and"));
        assert!(!res.is_stop_word("coffee"));
    }

    #[test]
    fn test_english_stemming() {
        let res = LinguisticResources::for_language("english").unwrap();
        assert_eq!(res.stem("brewing"), res.stem("brews"));
        assert_eq!(res.stem("clusters"), res.stem("clustering"));
    }

    #[test]
    fn test_regional_subtag_ignored() {
        assert!(LinguisticResources::for_language("en-US").is_ok());
        assert!(LinguisticResources::for_language("de_AT").is_ok());
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = LinguisticResources::for_language("tlh").unwrap_err();
        assert!(matches!(err, ClusterError::UnsupportedLanguage(_)));
    }
}

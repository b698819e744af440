//! English text preprocessing pipeline

use rust_stemmers::{Algorithm, Stemmer};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use super::lemmatizer::lemmatize_noun;
use super::stopwords::is_stopword;
use crate::domain::analysis::TextPreprocessor;
use crate::domain::DomainError;

/// Default token-count floor
pub const DEFAULT_MINIMUM_WORDS_PER_TEXT: usize = 10;

/// Tokens shorter than this are dropped after stemming
const MIN_TOKEN_CHARS: usize = 3;

/// Lowercases, strips punctuation, tokenizes, drops stopwords and
/// non-alphabetic tokens, then lemmatizes and Snowball-stems what remains.
///
/// Both the raw and the filtered token counts must exceed `minimum_words`.
pub struct EnglishPreprocessor {
    minimum_words: usize,
    stemmer: Stemmer,
}

impl std::fmt::Debug for EnglishPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnglishPreprocessor")
            .field("minimum_words", &self.minimum_words)
            .finish()
    }
}

impl Default for EnglishPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_WORDS_PER_TEXT)
    }
}

impl EnglishPreprocessor {
    pub fn new(minimum_words: usize) -> Self {
        Self {
            minimum_words,
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    fn normalize(text: &str) -> String {
        text.chars()
            .filter(|c| !(c.is_ascii_punctuation() && *c != '-'))
            .flat_map(char::to_lowercase)
            .collect()
    }

    fn reduce(&self, token: &str) -> Option<String> {
        if is_stopword(token) || !token.chars().all(char::is_alphabetic) {
            return None;
        }

        let stemmed = self.stemmer.stem(&lemmatize_noun(token)).into_owned();
        (stemmed.chars().count() >= MIN_TOKEN_CHARS).then_some(stemmed)
    }
}

impl TextPreprocessor for EnglishPreprocessor {
    fn preprocess(&self, text: &str) -> Result<Vec<String>, DomainError> {
        let normalized = Self::normalize(text);
        if normalized.trim().is_empty() {
            return Err(DomainError::preprocessing(
                "Text is either empty or in an unknown encoding",
            ));
        }

        let tokens: Vec<&str> = normalized.unicode_words().collect();
        if tokens.len() <= self.minimum_words {
            return Err(DomainError::preprocessing("Too small text"));
        }

        let reduced: Vec<String> = tokens.iter().filter_map(|token| self.reduce(token)).collect();
        debug!(
            raw = tokens.len(),
            kept = reduced.len(),
            "Text preprocessed"
        );

        if reduced.len() <= self.minimum_words {
            return Err(DomainError::preprocessing(
                "Too small text after preprocessing",
            ));
        }

        Ok(reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABSTRACT: &str = "Recurrent neural networks model long sequences. We train \
        networks on large corpora of scientific abstracts, compare attention mechanisms \
        with convolutional architectures, and report improvements in translation quality \
        across several benchmark datasets in 2019.";

    fn preprocessor() -> EnglishPreprocessor {
        EnglishPreprocessor::default()
    }

    fn message(result: Result<Vec<String>, DomainError>) -> String {
        match result {
            Err(DomainError::Preprocessing { message }) => message,
            other => panic!("expected a preprocessing error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(
            message(preprocessor().preprocess("   ")),
            "Text is either empty or in an unknown encoding"
        );
        assert_eq!(
            message(preprocessor().preprocess("?!.,;")),
            "Text is either empty or in an unknown encoding"
        );
    }

    #[test]
    fn test_too_small_text() {
        assert_eq!(
            message(preprocessor().preprocess("Neural networks learn quickly.")),
            "Too small text"
        );
    }

    #[test]
    fn test_too_small_after_filtering() {
        // twelve tokens, seven of them stopwords or numbers
        let text = "The network and the model of it in 2019 learn representations quickly";
        assert_eq!(
            message(preprocessor().preprocess(text)),
            "Too small text after preprocessing"
        );
    }

    #[test]
    fn test_tokens_are_filtered_and_stemmed() {
        let tokens = preprocessor().preprocess(ABSTRACT).unwrap();

        assert!(tokens.len() > DEFAULT_MINIMUM_WORDS_PER_TEXT);
        assert!(tokens.contains(&"network".to_string()));
        assert!(tokens.contains(&"sequenc".to_string()));
        assert!(!tokens.iter().any(|t| t == "the" || t == "2019" || t == "we"));
        assert!(tokens.iter().all(|t| t.chars().count() >= MIN_TOKEN_CHARS));
    }

    #[test]
    fn test_minimum_words_is_configurable() {
        let lenient = EnglishPreprocessor::new(2);
        let tokens = lenient.preprocess("Neural networks learn quickly.").unwrap();
        assert_eq!(tokens, vec!["neural", "network", "learn", "quick"]);
    }
}

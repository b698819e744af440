//! Text analysis infrastructure - English preprocessing

mod lemmatizer;
mod preprocessor;
mod stopwords;

pub use preprocessor::{EnglishPreprocessor, DEFAULT_MINIMUM_WORDS_PER_TEXT};

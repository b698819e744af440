//! Text preprocessing contract

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Turns raw text into the token sequence a model was trained on
#[cfg_attr(test, automock)]
pub trait TextPreprocessor: Send + Sync {
    /// Fails with [`DomainError::Preprocessing`] when the text carries too
    /// little content to be scored
    fn preprocess(&self, text: &str) -> Result<Vec<String>, DomainError>;
}

//! Error types for vimvox
//!
//! Configuration errors are fatal when a vocabulary is loaded. Everything else
//! fails the current utterance only.

use thiserror::Error;

/// Failure reported by an injection backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InjectionError {
    #[error("Keyboard error: {0}")]
    Keyboard(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// Errors raised while loading a grammar or interpreting an utterance
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    /// A spoken identifier style has no registered transform
    #[error("Unknown identifier format: {0}")]
    UnknownFormat(String),

    /// A vocabulary table is malformed or references something that does not exist
    #[error("Vocabulary configuration error: {0}")]
    VocabularyConfig(String),

    /// The input-injection layer failed; never retried
    #[error(transparent)]
    Injection(#[from] InjectionError),

    /// A phrase was handed to the segmenter that the active vocabulary does not know
    #[error("Unrecognized {category} phrase: '{phrase}'")]
    UnrecognizedPhrase { category: &'static str, phrase: String },

    /// A spoken count resolved to a value outside its range
    #[error("Invalid count: {0}")]
    InvalidCount(String),

    /// More digits were spoken than the resolver accepts
    #[error("Count '{spoken}' exceeds {max_digits} digit(s)")]
    CountTooLong { spoken: String, max_digits: usize },

    /// The macro command was spoken without naming a register
    #[error("Macro invocation needs a register")]
    MissingRegister,

    /// An utterance had more top-level elements than allowed
    #[error("Utterance has {count} elements (max {max})")]
    UtteranceTooLong { count: usize, max: usize },
}

impl GrammarError {
    /// Configuration errors stop a grammar from loading at all
    pub fn is_fatal(&self) -> bool {
        matches!(self, GrammarError::VocabularyConfig(_))
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        GrammarError::VocabularyConfig(msg.into())
    }

    pub(crate) fn unrecognized(category: &'static str, phrase: impl Into<String>) -> Self {
        GrammarError::UnrecognizedPhrase {
            category,
            phrase: phrase.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(GrammarError::config("bad key").is_fatal());
        assert!(!GrammarError::UnknownFormat("wiggle".into()).is_fatal());
        assert!(!GrammarError::MissingRegister.is_fatal());
        assert!(!GrammarError::from(InjectionError::Keyboard("gone".into())).is_fatal());
    }

    #[test]
    fn test_messages() {
        let err = GrammarError::unrecognized("motion", "sideways");
        assert_eq!(err.to_string(), "Unrecognized motion phrase: 'sideways'");

        let err = GrammarError::CountTooLong {
            spoken: "1234".into(),
            max_digits: 3,
        };
        assert_eq!(err.to_string(), "Count '1234' exceeds 3 digit(s)");
    }
}

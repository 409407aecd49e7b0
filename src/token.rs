//! Segmented utterance tokens

use std::fmt;

use crate::action::Action;

/// One replayable unit of an utterance
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Executed immediately, after any pending insertions are flushed
    Command(Action),
    /// Buffered with neighbouring insertions; `mode_entry` only counts on the first of a run
    Insertion {
        mode_entry: Option<Action>,
        payload: Action,
    },
}

impl Token {
    pub fn command(action: Action) -> Self {
        Token::Command(action)
    }

    pub fn insertion(mode_entry: Option<Action>, payload: Action) -> Self {
        Token::Insertion {
            mode_entry,
            payload,
        }
    }

    /// An insertion that enters no mode and types nothing
    pub fn null_insertion() -> Self {
        Token::Insertion {
            mode_entry: None,
            payload: Action::Nothing,
        }
    }

    pub fn is_insertion(&self) -> bool {
        matches!(self, Token::Insertion { .. })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Command(action) => write!(f, "command({})", action),
            Token::Insertion {
                mode_entry: Some(entry),
                payload,
            } => write!(f, "insertion[{}]({})", entry, payload),
            Token::Insertion {
                mode_entry: None,
                payload,
            } => write!(f, "insertion({})", payload),
        }
    }
}

/// Segmenter output: ordered tokens plus the optional trailing literal
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SegmentedUtterance {
    pub tokens: Vec<Token>,
    pub literal: Option<Token>,
}

impl SegmentedUtterance {
    pub fn len(&self) -> usize {
        self.tokens.len() + usize::from(self.literal.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The replay order: every token, then the literal
    pub fn into_tokens(self) -> Vec<Token> {
        let mut tokens = self.tokens;
        tokens.extend(self.literal);
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_goes_last() {
        let segmented = SegmentedUtterance {
            tokens: vec![Token::command(Action::text("dd"))],
            literal: Some(Token::insertion(None, Action::text("foo_bar"))),
        };
        assert_eq!(segmented.len(), 2);
        let tokens = segmented.into_tokens();
        assert!(!tokens[0].is_insertion());
        assert_eq!(tokens[1].to_string(), "insertion(foo_bar)");
    }

    #[test]
    fn test_null_insertion() {
        assert_eq!(
            Token::null_insertion(),
            Token::Insertion {
                mode_entry: None,
                payload: Action::Nothing
            }
        );
        assert!(SegmentedUtterance::default().is_empty());
    }
}

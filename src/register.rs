//! Register names and the spoken letter alphabet

use std::fmt;

use crate::error::{GrammarError, Result};

/// Spoken letter alphabet (NATO, plus a few easier-to-recognize alternates)
pub const LETTERS: &[(&str, char)] = &[
    ("alpha", 'a'),
    ("bravo", 'b'),
    ("charlie", 'c'),
    ("delta", 'd'),
    ("echo", 'e'),
    ("foxtrot", 'f'),
    ("golf", 'g'),
    ("hotel", 'h'),
    ("india", 'i'),
    ("indigo", 'i'),
    ("juliet", 'j'),
    ("kilo", 'k'),
    ("lima", 'l'),
    ("mike", 'm'),
    ("mango", 'm'),
    ("november", 'n'),
    ("oscar", 'o'),
    ("papa", 'p'),
    ("poppa", 'p'),
    ("quebec", 'q'),
    ("quiche", 'q'),
    ("romeo", 'r'),
    ("sierra", 's'),
    ("tango", 't'),
    ("uniform", 'u'),
    ("victor", 'v'),
    ("whiskey", 'w'),
    ("x-ray", 'x'),
    ("xray", 'x'),
    ("yankee", 'y'),
    ("zulu", 'z'),
];

/// Letter for a spoken word from the builtin alphabet, or a bare letter ("q")
pub fn letter_for_word(word: &str) -> Option<char> {
    if let Some(&(_, c)) = LETTERS.iter().find(|(w, _)| *w == word) {
        return Some(c);
    }
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
        _ => None,
    }
}

/// A named editor register (a..z)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Register(char);

impl Register {
    pub fn new(letter: char) -> Option<Self> {
        letter.is_ascii_lowercase().then_some(Register(letter))
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Register selection prefix (`'a`)
    pub fn selection_prefix(self) -> String {
        format!("'{}", self.0)
    }

    /// Macro invocation prefix (`@a`)
    pub fn macro_prefix(self) -> String {
        format!("@{}", self.0)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve a spoken letter into a register using `lookup` for the letter table
pub fn resolve_register(word: &str, lookup: impl Fn(&str) -> Option<char>) -> Result<Register> {
    lookup(word)
        .and_then(|c| Register::new(c.to_ascii_lowercase()))
        .ok_or_else(|| GrammarError::unrecognized("register", word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters() {
        assert_eq!(letter_for_word("quebec"), Some('q'));
        assert_eq!(letter_for_word("x-ray"), Some('x'));
        assert_eq!(letter_for_word("Q"), Some('q'));
        assert_eq!(letter_for_word("7"), None);
        assert_eq!(letter_for_word("banana"), None);
    }

    #[test]
    fn test_prefixes() {
        let reg = resolve_register("quebec", letter_for_word).unwrap();
        assert_eq!(reg.letter(), 'q');
        assert_eq!(reg.selection_prefix(), "'q");
        assert_eq!(reg.macro_prefix(), "@q");
    }

    #[test]
    fn test_unknown_register() {
        let err = resolve_register("banana", letter_for_word).unwrap_err();
        assert_eq!(err, GrammarError::unrecognized("register", "banana"));
        assert!(Register::new('1').is_none());
    }
}

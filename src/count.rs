//! Spoken repetition counts
//!
//! Counts are spoken digit by digit ("one two" is 12) and bounded by a maximum
//! number of digits. Several grammar positions ask for a resolver of the same
//! length, so resolvers are memoized per length in [`CountResolvers`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{GrammarError, Result};

/// Value of a single spoken digit ("seven" or "7")
pub fn digit_value(word: &str) -> Option<u32> {
    match word {
        "zero" => Some(0),
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        _ => None,
    }
}

/// Whether a word can be part of a spoken count
pub fn is_count_word(word: &str) -> bool {
    digit_value(word).is_some() || (!word.is_empty() && word.chars().all(|c| c.is_ascii_digit()))
}

/// Spoken digit word for a digit, used to build `dig <digit>` phrases
pub const DIGIT_WORDS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Parses a run of digit words into a positive integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResolver {
    max_digits: usize,
    default: u32,
}

impl CountResolver {
    pub fn new(max_digits: usize, default: u32) -> Self {
        Self { max_digits, default }
    }

    pub fn max_digits(&self) -> usize {
        self.max_digits
    }

    /// Resolve spoken digits; no words gives the default count
    pub fn resolve<S: AsRef<str>>(&self, words: &[S]) -> Result<u32> {
        if words.is_empty() {
            return Ok(self.default);
        }

        let mut digits = String::new();
        for word in words {
            let word = word.as_ref();
            match digit_value(word) {
                Some(d) => digits.push(char::from(b'0' + d as u8)),
                None if is_count_word(word) => digits.push_str(word),
                None => return Err(GrammarError::unrecognized("count", word)),
            }
        }

        let spoken_text = || {
            words
                .iter()
                .map(|w| w.as_ref())
                .collect::<Vec<_>>()
                .join(" ")
        };

        if digits.len() > self.max_digits {
            return Err(GrammarError::CountTooLong {
                spoken: spoken_text(),
                max_digits: self.max_digits,
            });
        }

        match digits.parse::<u32>() {
            Ok(0) | Err(_) => Err(GrammarError::InvalidCount(spoken_text())),
            Ok(n) => Ok(n),
        }
    }
}

/// Memoizing factory: one shared resolver per digit length
#[derive(Debug)]
pub struct CountResolvers {
    default: u32,
    cached: Mutex<HashMap<usize, Arc<CountResolver>>>,
}

impl Default for CountResolvers {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CountResolvers {
    pub fn new(default: u32) -> Self {
        Self {
            default,
            cached: Mutex::new(HashMap::new()),
        }
    }

    /// Get the resolver for `max_digits`, building it on first use
    pub fn get(&self, max_digits: usize) -> Arc<CountResolver> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        cached
            .entry(max_digits)
            .or_insert_with(|| {
                tracing::trace!(max_digits, "Building count resolver");
                Arc::new(CountResolver::new(max_digits, self.default))
            })
            .clone()
    }

    /// Number of distinct resolvers built so far
    pub fn len(&self) -> usize {
        self.cached.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse a whole number word such as "seven", "twenty" or "50"
pub fn parse_number_word(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>() {
        return Some(n);
    }
    match s {
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        "thirteen" => Some(13),
        "fourteen" => Some(14),
        "fifteen" => Some(15),
        "sixteen" => Some(16),
        "seventeen" => Some(17),
        "eighteen" => Some(18),
        "nineteen" => Some(19),
        "twenty" => Some(20),
        "thirty" => Some(30),
        "forty" => Some(40),
        "fifty" => Some(50),
        _ => digit_value(s),
    }
}

/// Parse a number phrase ("seven", "twenty three", "42"), returning the value
/// and how many words it used
pub fn parse_number_phrase<S: AsRef<str>>(words: &[S]) -> Option<(u32, usize)> {
    let first = parse_number_word(words.first()?.as_ref())?;
    if first >= 20 && first % 10 == 0 && first < 100 {
        if let Some(unit) = words.get(1).and_then(|w| digit_value(w.as_ref())) {
            if unit > 0 {
                return Some((first + unit, 2));
            }
        }
    }
    Some((first, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_digits() {
        let resolver = CountResolver::new(3, 1);
        assert_eq!(resolver.resolve(&["one", "two"]).unwrap(), 12);
        assert_eq!(resolver.resolve(&["nine", "zero", "nine"]).unwrap(), 909);
        assert_eq!(resolver.resolve(&["4"]).unwrap(), 4);
        assert_eq!(resolver.resolve(&["1", "five"]).unwrap(), 15);
    }

    #[test]
    fn test_absent_count_is_default() {
        let resolver = CountResolver::new(3, 1);
        let empty: [&str; 0] = [];
        assert_eq!(resolver.resolve(&empty).unwrap(), 1);
        assert_eq!(CountResolver::new(3, 5).resolve(&empty).unwrap(), 5);
    }

    #[test]
    fn test_too_many_digits() {
        let resolver = CountResolver::new(3, 1);
        let err = resolver.resolve(&["one", "two", "three", "four"]).unwrap_err();
        assert_eq!(
            err,
            GrammarError::CountTooLong {
                spoken: "one two three four".into(),
                max_digits: 3
            }
        );
        assert!(resolver.resolve(&["1234"]).is_err());
    }

    #[test]
    fn test_zero_and_garbage() {
        let resolver = CountResolver::new(3, 1);
        assert!(matches!(
            resolver.resolve(&["zero"]),
            Err(GrammarError::InvalidCount(_))
        ));
        assert!(matches!(
            resolver.resolve(&["zero", "zero"]),
            Err(GrammarError::InvalidCount(_))
        ));
        assert!(matches!(
            resolver.resolve(&["lots"]),
            Err(GrammarError::UnrecognizedPhrase { category: "count", .. })
        ));
    }

    #[test]
    fn test_resolvers_are_shared_per_length() {
        let resolvers = CountResolvers::new(1);
        assert!(resolvers.is_empty());
        let a = resolvers.get(3);
        let b = resolvers.get(3);
        assert!(Arc::ptr_eq(&a, &b));
        let c = resolvers.get(2);
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.max_digits(), 2);
        assert_eq!(resolvers.len(), 2);
    }

    #[test]
    fn test_number_words() {
        assert_eq!(parse_number_word("seven"), Some(7));
        assert_eq!(parse_number_word("fifty"), Some(50));
        assert_eq!(parse_number_word("42"), Some(42));
        assert_eq!(parse_number_word("lots"), None);
        assert_eq!(parse_number_phrase(&["twenty", "three", "left"]), Some((23, 2)));
        assert_eq!(parse_number_phrase(&["twelve", "left"]), Some((12, 1)));
        assert_eq!(parse_number_phrase(&["left"]), None);
    }
}

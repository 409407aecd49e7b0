//! Identifier formatting for dictated words
//!
//! A spoken identifier is `[upper | natural] <style> <words...>`. The case
//! mode is applied to every word first, then the style's join function runs on
//! the result. Styles live in a registry keyed by name so new ones can be added
//! without touching dispatch.
//!
//! Note the ordering matters: `upper camel foo bar` uppercases both words and
//! then camel-joins them, giving `FOOBAR`.

use std::collections::BTreeMap;

use crate::error::{GrammarError, Result};

/// Case transformation applied to each word before joining
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CaseMode {
    #[default]
    Lower,  // hello world
    Upper,  // HELLO WORLD
    Natural, // as dictated
}

impl CaseMode {
    /// Parse the optional leading case word
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "upper" => Some(CaseMode::Upper),
            "natural" => Some(CaseMode::Natural),
            _ => None,
        }
    }

    fn apply(self, word: &str) -> String {
        match self {
            CaseMode::Lower => word.to_lowercase(),
            CaseMode::Upper => word.to_uppercase(),
            CaseMode::Natural => word.to_string(),
        }
    }
}

/// A join style: dictated words in, one identifier out
pub type JoinFn = fn(&[String]) -> String;

/// Uppercase the first letter of a word, leaving the rest alone
fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Uppercase the first letter and lowercase the rest
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

fn join_with(words: &[String], sep: &str) -> String {
    words.join(sep)
}

fn format_jumble(words: &[String]) -> String {
    words.concat()
}

fn format_score(words: &[String]) -> String {
    join_with(words, "_")
}

fn format_snakeword(words: &[String]) -> String {
    match words.split_first() {
        None => String::new(),
        Some((first, [])) => upper_first(first),
        Some((first, rest)) => format!("{}_{}", upper_first(first), format_score(rest)),
    }
}

fn format_acronym(words: &[String]) -> String {
    words.iter().map(|w| w.to_uppercase()).collect()
}

fn format_camel(words: &[String]) -> String {
    match words.split_first() {
        None => String::new(),
        Some((first, rest)) => {
            let mut result = first.clone();
            for word in rest {
                result.push_str(&upper_first(word));
            }
            result
        }
    }
}

fn format_proper(words: &[String]) -> String {
    words.iter().map(|w| capitalize(w)).collect()
}

fn format_relpath(words: &[String]) -> String {
    join_with(words, "/")
}

fn format_abspath(words: &[String]) -> String {
    format!("/{}", format_relpath(words))
}

fn format_scoperesolve(words: &[String]) -> String {
    join_with(words, "::")
}

fn format_dotword(words: &[String]) -> String {
    join_with(words, ".")
}

fn format_dashword(words: &[String]) -> String {
    join_with(words, "-")
}

fn format_natword(words: &[String]) -> String {
    join_with(words, " ")
}

fn format_lowercase(words: &[String]) -> String {
    words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join(" ")
}

fn format_uppercase(words: &[String]) -> String {
    words.iter().map(|w| w.to_uppercase()).collect::<Vec<_>>().join(" ")
}

fn format_stringsequence(words: &[String]) -> String {
    format!("'{}'", words.join("', '"))
}

fn format_superstringsequence(words: &[String]) -> String {
    format!("\"{}\"", words.join("\", \""))
}

fn format_commasequence(words: &[String]) -> String {
    join_with(words, ", ")
}

fn format_broodingnarrative(_words: &[String]) -> String {
    String::new()
}

fn format_sentence(words: &[String]) -> String {
    match words.split_first() {
        None => String::new(),
        Some((first, rest)) => {
            let mut parts = vec![capitalize(first)];
            parts.extend(rest.iter().cloned());
            parts.join(" ")
        }
    }
}

/// Normalize a spoken style name: "rel-path" / "rel path" -> "relpath"
pub fn style_key(spoken: &str) -> String {
    spoken
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Registry of join styles keyed by normalized name
#[derive(Clone, Debug)]
pub struct FormatRegistry {
    styles: BTreeMap<String, JoinFn>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FormatRegistry {
    pub fn empty() -> Self {
        Self {
            styles: BTreeMap::new(),
        }
    }

    /// All styles used by the bundled grammars
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("jumble", format_jumble);
        registry.register("score", format_score);
        registry.register("eelword", format_score);
        registry.register("snakeword", format_snakeword);
        registry.register("acronym", format_acronym);
        registry.register("camel", format_camel);
        registry.register("proper", format_proper);
        registry.register("relpath", format_relpath);
        registry.register("abspath", format_abspath);
        registry.register("scoperesolve", format_scoperesolve);
        registry.register("dotword", format_dotword);
        registry.register("dashword", format_dashword);
        registry.register("natword", format_natword);
        registry.register("lowercase", format_lowercase);
        registry.register("uppercase", format_uppercase);
        registry.register("stringsequence", format_stringsequence);
        registry.register("superstringsequence", format_superstringsequence);
        registry.register("commasequence", format_commasequence);
        registry.register("broodingnarrative", format_broodingnarrative);
        registry.register("sentence", format_sentence);
        registry
    }

    /// Add or replace a style
    pub fn register(&mut self, name: &str, join: JoinFn) {
        self.styles.insert(style_key(name), join);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.styles.contains_key(&style_key(name))
    }

    pub fn get(&self, name: &str) -> Result<JoinFn> {
        self.styles
            .get(&style_key(name))
            .copied()
            .ok_or_else(|| GrammarError::UnknownFormat(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

/// Drop a `\pronunciation` suffix and hyphens from a dictated word
fn clean_word(word: &str) -> String {
    let spelled = word.split('\\').next().unwrap_or_default();
    spelled.replace('-', "")
}

/// Turns dictated words into identifiers
#[derive(Clone, Debug, Default)]
pub struct IdentifierFormatter {
    registry: FormatRegistry,
}

impl IdentifierFormatter {
    pub fn new(registry: FormatRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    /// Format `words` with the named style after applying `case` to each word
    pub fn format<S: AsRef<str>>(&self, case: CaseMode, style: &str, words: &[S]) -> Result<String> {
        let join = self.registry.get(style)?;
        let words: Vec<String> = words
            .iter()
            .map(|w| clean_word(&case.apply(w.as_ref())))
            .filter(|w| !w.is_empty())
            .collect();
        Ok(join(&words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(case: CaseMode, style: &str, words: &[&str]) -> String {
        IdentifierFormatter::default()
            .format(case, style, words)
            .unwrap()
    }

    #[test]
    fn test_basic_styles() {
        let words = ["foo", "bar", "baz"];
        assert_eq!(fmt(CaseMode::Lower, "score", &words), "foo_bar_baz");
        assert_eq!(fmt(CaseMode::Lower, "camel", &words), "fooBarBaz");
        assert_eq!(fmt(CaseMode::Lower, "proper", &words), "FooBarBaz");
        assert_eq!(fmt(CaseMode::Lower, "dotword", &words), "foo.bar.baz");
        assert_eq!(fmt(CaseMode::Lower, "dashword", &words), "foo-bar-baz");
        assert_eq!(fmt(CaseMode::Lower, "jumble", &words), "foobarbaz");
        assert_eq!(fmt(CaseMode::Lower, "natword", &words), "foo bar baz");
        assert_eq!(fmt(CaseMode::Lower, "scope-resolve", &words), "foo::bar::baz");
        assert_eq!(fmt(CaseMode::Lower, "rel-path", &words), "foo/bar/baz");
        assert_eq!(fmt(CaseMode::Lower, "abs-path", &words), "/foo/bar/baz");
        assert_eq!(fmt(CaseMode::Lower, "snakeword", &words), "Foo_bar_baz");
        assert_eq!(fmt(CaseMode::Lower, "acronym", &words), "FOOBARBAZ");
        assert_eq!(fmt(CaseMode::Lower, "sentence", &words), "Foo bar baz");
        assert_eq!(fmt(CaseMode::Lower, "string-sequence", &words), "'foo', 'bar', 'baz'");
        assert_eq!(
            fmt(CaseMode::Lower, "superstring-sequence", &words),
            "\"foo\", \"bar\", \"baz\""
        );
        assert_eq!(fmt(CaseMode::Lower, "comma-sequence", &words), "foo, bar, baz");
        assert_eq!(fmt(CaseMode::Lower, "brooding-narrative", &words), "");
    }

    #[test]
    fn test_upper_is_applied_before_camel() {
        assert_eq!(fmt(CaseMode::Upper, "camel", &["foo", "bar"]), "FOOBAR");
        // proper capitalizes, which lowers the tail again
        assert_eq!(fmt(CaseMode::Upper, "proper", &["foo", "bar"]), "FooBar");
        assert_eq!(fmt(CaseMode::Upper, "score", &["foo", "bar"]), "FOO_BAR");
    }

    #[test]
    fn test_case_modes() {
        assert_eq!(fmt(CaseMode::Lower, "natword", &["Hello", "World"]), "hello world");
        assert_eq!(fmt(CaseMode::Natural, "natword", &["Hello", "iPhone"]), "Hello iPhone");
        assert_eq!(fmt(CaseMode::Natural, "camel", &["get", "URL"]), "getURL");
        assert_eq!(CaseMode::from_word("Upper"), Some(CaseMode::Upper));
        assert_eq!(CaseMode::from_word("natural"), Some(CaseMode::Natural));
        assert_eq!(CaseMode::from_word("camel"), None);
    }

    #[test]
    fn test_single_word_styles() {
        assert_eq!(fmt(CaseMode::Lower, "snakeword", &["foo"]), "Foo");
        assert_eq!(fmt(CaseMode::Lower, "camel", &["foo"]), "foo");
        assert_eq!(fmt(CaseMode::Lower, "string-sequence", &["foo"]), "'foo'");
    }

    #[test]
    fn test_empty_word_list_never_fails() {
        let formatter = IdentifierFormatter::default();
        let none: [&str; 0] = [];
        for name in formatter.registry().names() {
            let out = formatter.format(CaseMode::Lower, name, &none).unwrap();
            let expected = match name {
                "abspath" => "/",
                "stringsequence" => "''",
                "superstringsequence" => "\"\"",
                _ => "",
            };
            assert_eq!(out, expected, "style {}", name);
        }
    }

    #[test]
    fn test_words_are_cleaned() {
        assert_eq!(fmt(CaseMode::Lower, "score", &["x-ray", "Foo\\foo"]), "xray_foo");
        assert_eq!(fmt(CaseMode::Lower, "camel", &["\\silent", "bar"]), "bar");
    }

    #[test]
    fn test_unknown_style() {
        let err = IdentifierFormatter::default()
            .format(CaseMode::Lower, "wiggle", &["a"])
            .unwrap_err();
        assert_eq!(err, GrammarError::UnknownFormat("wiggle".to_string()));
    }

    #[test]
    fn test_registry_is_extensible() {
        fn reversed(words: &[String]) -> String {
            words.iter().rev().cloned().collect::<Vec<_>>().join("")
        }
        let mut registry = FormatRegistry::builtin();
        assert!(!registry.contains("backwards"));
        registry.register("backwards", reversed);
        let formatter = IdentifierFormatter::new(registry);
        assert_eq!(
            formatter.format(CaseMode::Lower, "backwards", &["a", "b"]).unwrap(),
            "ba"
        );
    }
}

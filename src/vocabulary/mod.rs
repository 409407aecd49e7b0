//! Spoken vocabulary tables
//!
//! A [`Vocabulary`] is plain data: phrase -> action tables for every grammar
//! category. Tables are declared through [`VocabularyBuilder`] with spoken
//! patterns and key specifications as strings; `build()` expands every
//! pattern, parses every action and checks cross references, so a broken
//! table fails at load time and never mid-utterance.

pub mod rstudio;
pub mod vim;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::action::Action;
use crate::count::DIGIT_WORDS;
use crate::error::{GrammarError, Result};
use crate::format::{style_key, FormatRegistry};
use crate::pattern;
use crate::register::letter_for_word;

/// Phrases that always control Ex mode and cannot be Ex commands
pub const EX_ACCEPT: &str = "kay";
pub const EX_CANCEL: &str = "cancel";
pub const EX_ENTER: &str = "execute";

/// An action as written in a table, parsed when the vocabulary is built
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionSpec {
    Keys(String),
    Text(String),
    Seq(Vec<ActionSpec>),
}

/// Key specification, e.g. `keys("escape, escape, d, d")`
pub fn keys(spec: &str) -> ActionSpec {
    ActionSpec::Keys(spec.to_string())
}

/// Literal text
pub fn text(s: &str) -> ActionSpec {
    ActionSpec::Text(s.to_string())
}

impl ActionSpec {
    pub fn then(self, next: ActionSpec) -> ActionSpec {
        match self {
            ActionSpec::Seq(mut parts) => {
                parts.push(next);
                ActionSpec::Seq(parts)
            }
            first => ActionSpec::Seq(vec![first, next]),
        }
    }

    fn parse(&self) -> Result<Action> {
        match self {
            ActionSpec::Keys(spec) => Action::keys(spec),
            ActionSpec::Text(t) => Ok(Action::text(t.as_str())),
            ActionSpec::Seq(parts) => parts
                .iter()
                .try_fold(Action::Nothing, |acc, part| Ok(acc.then(part.parse()?))),
        }
    }
}

/// Whether a key insertion takes a spoken count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountSlot {
    None,
    Optional,
    Required,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub action: Action,
    pub count: CountSlot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandEntry {
    Action(Action),
    /// Replays the macro in the spoken register
    Macro,
}

/// How an operator renders when applied to itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelfApplication {
    /// `op count op`, e.g. `c1c`
    Doubled,
    /// tComment style: `gcc` for one line, `gc{n-1}j` for more
    LineComment,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperatorEntry {
    pub text: String,
    pub self_application: SelfApplication,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExEntry {
    pub action: Action,
    /// Takes a leading number (`[<n>] left`)
    pub counted: bool,
}

/// Builtin vocabulary variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// vim inside a word processor window
    #[default]
    Vim,
    /// RStudio with vim keybindings
    Rstudio,
}

impl Variant {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "vim" => Some(Variant::Vim),
            "rstudio" => Some(Variant::Rstudio),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Vim => "vim",
            Variant::Rstudio => "rstudio",
        }
    }

    /// Builder preloaded with this variant's tables
    pub fn builder(self, options: &VariantOptions) -> VocabularyBuilder {
        match self {
            Variant::Vim => vim::builder(options),
            Variant::Rstudio => rstudio::builder(options),
        }
    }
}

/// Knobs shared by the builtin variants
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantOptions {
    /// Key that starts EasyMotion motions (pressed twice)
    pub easymotion_leader: String,
}

impl Default for VariantOptions {
    fn default() -> Self {
        Self {
            easymotion_leader: "comma".to_string(),
        }
    }
}

/// Lowercase a spoken word and strip surrounding punctuation ("P." -> "p")
pub fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '"' | '\''))
        .to_lowercase()
}

/// Normalize every word of a phrase and rejoin with single spaces
pub fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

type Table<V> = BTreeMap<String, V>;

/// Immutable, validated vocabulary
#[derive(Clone, Debug)]
pub struct Vocabulary {
    name: String,
    formats: FormatRegistry,
    insert_modes: Table<Action>,
    key_insertions: Table<KeyEntry>,
    arithmetic: Table<Action>,
    spelling: Table<String>,
    custom: Table<Action>,
    motions: Table<Action>,
    uncounted_motions: Table<Action>,
    parameter_motions: Table<char>,
    operators: Table<OperatorEntry>,
    commands: Table<CommandEntry>,
    letters: Table<char>,
    styles: Table<String>,
    ex_commands: Table<ExEntry>,
    chaos_operator: Option<String>,
    run_exit: Option<Action>,
    max_phrase_words: usize,
}

impl Vocabulary {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn insert_mode(&self, phrase: &str) -> Option<&Action> {
        self.insert_modes.get(phrase)
    }

    pub fn key_insertion(&self, phrase: &str) -> Option<&KeyEntry> {
        self.key_insertions.get(phrase)
    }

    pub fn arithmetic(&self, phrase: &str) -> Option<&Action> {
        self.arithmetic.get(phrase)
    }

    pub fn spelling(&self, phrase: &str) -> Option<&str> {
        self.spelling.get(phrase).map(String::as_str)
    }

    pub fn custom(&self, phrase: &str) -> Option<&Action> {
        self.custom.get(phrase)
    }

    pub fn motion(&self, phrase: &str) -> Option<&Action> {
        self.motions.get(phrase)
    }

    pub fn uncounted_motion(&self, phrase: &str) -> Option<&Action> {
        self.uncounted_motions.get(phrase)
    }

    pub fn parameter_motion(&self, phrase: &str) -> Option<char> {
        self.parameter_motions.get(phrase).copied()
    }

    pub fn operator(&self, phrase: &str) -> Option<&OperatorEntry> {
        self.operators.get(phrase)
    }

    pub fn command(&self, phrase: &str) -> Option<&CommandEntry> {
        self.commands.get(phrase)
    }

    /// Letter for a spoken letter word, else the builtin alphabet or a bare letter
    pub fn letter(&self, word: &str) -> Option<char> {
        self.letters
            .get(word)
            .copied()
            .or_else(|| letter_for_word(word))
    }

    /// Registry key for a spoken identifier style
    pub fn style(&self, phrase: &str) -> Option<&str> {
        self.styles.get(phrase).map(String::as_str)
    }

    /// Spoken style phrases with the format each one selects
    pub fn styles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.styles.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn ex_command(&self, phrase: &str) -> Option<&ExEntry> {
        self.ex_commands.get(phrase)
    }

    /// Operator whose commands are followed by a settling pair of null insertions
    pub fn chaos_operator(&self) -> Option<&str> {
        self.chaos_operator.as_deref()
    }

    /// Keys pressed after every flushed insertion run
    pub fn run_exit(&self) -> Option<&Action> {
        self.run_exit.as_ref()
    }

    /// Longest phrase in any table, in words
    pub fn max_phrase_words(&self) -> usize {
        self.max_phrase_words
    }

    /// Total number of spoken phrases across all tables
    pub fn phrase_count(&self) -> usize {
        self.insert_modes.len()
            + self.key_insertions.len()
            + self.arithmetic.len()
            + self.spelling.len()
            + self.custom.len()
            + self.motions.len()
            + self.uncounted_motions.len()
            + self.parameter_motions.len()
            + self.operators.len()
            + self.commands.len()
            + self.styles.len()
            + self.ex_commands.len()
    }
}

/// Collects table declarations; everything is checked in [`build`](Self::build)
#[derive(Clone, Debug)]
pub struct VocabularyBuilder {
    name: String,
    formats: FormatRegistry,
    insert_modes: Vec<(String, ActionSpec)>,
    key_insertions: Vec<(String, ActionSpec, CountSlot)>,
    arithmetic: Vec<(String, ActionSpec)>,
    custom: Vec<(String, ActionSpec)>,
    motions: Vec<(String, ActionSpec)>,
    uncounted_motions: Vec<(String, ActionSpec)>,
    parameter_motions: Vec<(String, char)>,
    operators: Vec<(String, String, SelfApplication)>,
    commands: Vec<(String, Option<ActionSpec>)>,
    letters: Vec<(String, char)>,
    styles: Vec<String>,
    ex_commands: Vec<(String, ActionSpec, bool)>,
    chaos_operator: Option<String>,
    run_exit: Option<ActionSpec>,
}

impl VocabularyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            formats: FormatRegistry::builtin(),
            insert_modes: Vec::new(),
            key_insertions: Vec::new(),
            arithmetic: Vec::new(),
            custom: Vec::new(),
            motions: Vec::new(),
            uncounted_motions: Vec::new(),
            parameter_motions: Vec::new(),
            operators: Vec::new(),
            commands: Vec::new(),
            letters: Vec::new(),
            styles: Vec::new(),
            ex_commands: Vec::new(),
            chaos_operator: None,
            run_exit: None,
        }
    }

    pub fn formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn insert_mode(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.insert_modes.push((pattern.to_string(), action));
        self
    }

    pub fn key_insertion(mut self, pattern: &str, action: ActionSpec, count: CountSlot) -> Self {
        self.key_insertions.push((pattern.to_string(), action, count));
        self
    }

    pub fn arithmetic(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.arithmetic.push((pattern.to_string(), action));
        self
    }

    /// User-defined insertion
    pub fn custom(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.custom.push((pattern.to_string(), action));
        self
    }

    pub fn motion(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.motions.push((pattern.to_string(), action));
        self
    }

    pub fn uncounted_motion(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.uncounted_motions.push((pattern.to_string(), action));
        self
    }

    /// Motion that takes a letter argument (`phytic <letter>` -> `f<letter>`)
    pub fn parameter_motion(mut self, pattern: &str, key: char) -> Self {
        self.parameter_motions.push((pattern.to_string(), key));
        self
    }

    pub fn operator(mut self, pattern: &str, text: &str, self_application: SelfApplication) -> Self {
        self.operators
            .push((pattern.to_string(), text.to_string(), self_application));
        self
    }

    pub fn command(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.commands.push((pattern.to_string(), Some(action)));
        self
    }

    /// The macro sentinel: `reg <letter> <pattern>` replays that register
    pub fn macro_command(mut self, pattern: &str) -> Self {
        self.commands.push((pattern.to_string(), None));
        self
    }

    pub fn letter(mut self, pattern: &str, letter: char) -> Self {
        self.letters.push((pattern.to_string(), letter));
        self
    }

    pub fn letters(mut self, table: &[(&str, char)]) -> Self {
        self.letters
            .extend(table.iter().map(|(w, c)| (w.to_string(), *c)));
        self
    }

    /// Enable an identifier style; each spoken form selects the format of the same name
    pub fn style(mut self, pattern: &str) -> Self {
        self.styles.push(pattern.to_string());
        self
    }

    pub fn ex_command(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.ex_commands.push((pattern.to_string(), action, false));
        self
    }

    /// Ex command preceded by an optional number, bound to the `%(count)d` slot
    pub fn ex_counted(mut self, pattern: &str, action: ActionSpec) -> Self {
        self.ex_commands.push((pattern.to_string(), action, true));
        self
    }

    pub fn chaos_operator(mut self, name: &str) -> Self {
        self.chaos_operator = Some(name.to_string());
        self
    }

    pub fn run_exit(mut self, action: ActionSpec) -> Self {
        self.run_exit = Some(action);
        self
    }

    /// Expand, parse and cross-check every table
    pub fn build(self) -> Result<Vocabulary> {
        let mut max_words = 1;
        let mut phrases = |table: &str, pattern: &str| -> Result<Vec<String>> {
            let expanded = pattern::expand(pattern)
                .map_err(|e| GrammarError::config(format!("{} table: {}", table, detail(&e))))?;
            let normalized: Vec<String> = expanded.iter().map(|p| normalize_phrase(p)).collect();
            for phrase in &normalized {
                if phrase.is_empty() {
                    return Err(GrammarError::config(format!(
                        "{} table: pattern '{}' has no words",
                        table, pattern
                    )));
                }
                max_words = max_words.max(phrase.split(' ').count());
            }
            Ok(normalized)
        };

        let mut insert_modes = Table::new();
        for (pattern, spec) in &self.insert_modes {
            let action = parse_spec("insert mode", pattern, spec)?;
            for phrase in phrases("insert mode", pattern)? {
                insert_modes.insert(phrase, action.clone());
            }
        }

        let mut key_insertions = Table::new();
        for (pattern, spec, count) in &self.key_insertions {
            let action = parse_spec("key insertion", pattern, spec)?;
            match (count, action.uses_count()) {
                (CountSlot::None, true) => {
                    return Err(GrammarError::config(format!(
                        "key insertion '{}' uses a count but takes none",
                        pattern
                    )));
                }
                (CountSlot::Optional | CountSlot::Required, false) => {
                    return Err(GrammarError::config(format!(
                        "key insertion '{}' takes a count but never uses it",
                        pattern
                    )));
                }
                _ => {}
            }
            for phrase in phrases("key insertion", pattern)? {
                key_insertions.insert(
                    phrase,
                    KeyEntry {
                        action: action.clone(),
                        count: *count,
                    },
                );
            }
        }

        let arithmetic = action_table("arithmetic", &self.arithmetic, &mut phrases)?;
        let custom = action_table("custom insertion", &self.custom, &mut phrases)?;
        let motions = action_table("motion", &self.motions, &mut phrases)?;
        let uncounted_motions =
            action_table("uncounted motion", &self.uncounted_motions, &mut phrases)?;

        let mut parameter_motions = Table::new();
        for (pattern, key) in &self.parameter_motions {
            for phrase in phrases("parameter motion", pattern)? {
                parameter_motions.insert(phrase, *key);
            }
        }

        let mut operators = Table::new();
        for (pattern, op_text, self_application) in &self.operators {
            for phrase in phrases("operator", pattern)? {
                operators.insert(
                    phrase,
                    OperatorEntry {
                        text: op_text.clone(),
                        self_application: *self_application,
                    },
                );
            }
        }

        let mut commands = Table::new();
        for (pattern, spec) in &self.commands {
            let entry = match spec {
                Some(spec) => CommandEntry::Action(parse_spec("command", pattern, spec)?),
                None => CommandEntry::Macro,
            };
            for phrase in phrases("command", pattern)? {
                commands.insert(phrase, entry.clone());
            }
        }

        let mut letters = Table::new();
        for (pattern, letter) in &self.letters {
            if !letter.is_ascii_alphabetic() {
                return Err(GrammarError::config(format!(
                    "letter '{}' maps to non-letter '{}'",
                    pattern, letter
                )));
            }
            for phrase in phrases("letter", pattern)? {
                letters.insert(phrase, letter.to_ascii_lowercase());
            }
        }

        let mut styles = Table::new();
        for pattern in &self.styles {
            for phrase in phrases("style", pattern)? {
                let key = style_key(&phrase);
                if !self.formats.contains(&key) {
                    return Err(GrammarError::config(format!(
                        "identifier style '{}' has no registered format",
                        phrase
                    )));
                }
                styles.insert(phrase, key);
            }
        }

        let mut ex_commands = Table::new();
        for (pattern, spec, counted) in &self.ex_commands {
            let action = parse_spec("ex command", pattern, spec)?;
            if *counted && !action.uses_count() {
                return Err(GrammarError::config(format!(
                    "ex command '{}' takes a count but never uses it",
                    pattern
                )));
            }
            for phrase in phrases("ex command", pattern)? {
                if phrase == EX_ACCEPT || phrase == EX_CANCEL {
                    return Err(GrammarError::config(format!(
                        "ex command '{}' shadows a reserved phrase",
                        phrase
                    )));
                }
                ex_commands.insert(
                    phrase,
                    ExEntry {
                        action: action.clone(),
                        counted: *counted,
                    },
                );
            }
        }

        // Spelling derives from the letter table plus `dig <digit>`
        let mut spelling: Table<String> = letters
            .iter()
            .map(|(phrase, c)| (phrase.clone(), c.to_string()))
            .collect();
        for (digit, word) in DIGIT_WORDS.iter().enumerate() {
            spelling.insert(format!("dig {}", word), digit.to_string());
        }
        max_words = max_words.max(2);

        let chaos_operator = match self.chaos_operator {
            Some(name) => {
                let name = normalize_phrase(&name);
                if !operators.contains_key(&name) {
                    return Err(GrammarError::config(format!(
                        "self-settling operator '{}' is not a registered operator",
                        name
                    )));
                }
                Some(name)
            }
            None => None,
        };

        let run_exit = match &self.run_exit {
            Some(spec) => Some(parse_spec("run exit", "", spec)?),
            None => None,
        };

        let vocabulary = Vocabulary {
            name: self.name,
            formats: self.formats,
            insert_modes,
            key_insertions,
            arithmetic,
            spelling,
            custom,
            motions,
            uncounted_motions,
            parameter_motions,
            operators,
            commands,
            letters,
            styles,
            ex_commands,
            chaos_operator,
            run_exit,
            max_phrase_words: max_words,
        };
        tracing::debug!(
            vocabulary = %vocabulary.name,
            phrases = vocabulary.phrase_count(),
            "Vocabulary built"
        );
        Ok(vocabulary)
    }
}

/// Message of a config error without the variant prefix
fn detail(err: &GrammarError) -> String {
    match err {
        GrammarError::VocabularyConfig(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn parse_spec(table: &str, pattern: &str, spec: &ActionSpec) -> Result<Action> {
    spec.parse().map_err(|e| {
        GrammarError::config(format!("{} '{}': {}", table, pattern, detail(&e)))
    })
}

fn action_table(
    table: &str,
    entries: &[(String, ActionSpec)],
    phrases: &mut impl FnMut(&str, &str) -> Result<Vec<String>>,
) -> Result<Table<Action>> {
    let mut out = Table::new();
    for (pattern, spec) in entries {
        let action = parse_spec(table, pattern, spec)?;
        for phrase in phrases(table, pattern)? {
            out.insert(phrase, action.clone());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> VocabularyBuilder {
        VocabularyBuilder::new("test")
            .operator("chaos", "c", SelfApplication::Doubled)
            .chaos_operator("chaos")
    }

    #[test]
    fn test_builds_tables_from_patterns() {
        let vocab = minimal()
            .motion("(lope | yope)", text("w"))
            .command("visual line", keys("s-v"))
            .macro_command("ripple")
            .style("(rel-path | rel path)")
            .letters(&[("alpha", 'a')])
            .build()
            .unwrap();

        assert_eq!(vocab.motion("lope"), Some(&Action::text("w")));
        assert_eq!(vocab.motion("yope"), Some(&Action::text("w")));
        assert!(matches!(vocab.command("visual line"), Some(CommandEntry::Action(_))));
        assert_eq!(vocab.command("ripple"), Some(&CommandEntry::Macro));
        assert_eq!(vocab.style("rel path"), Some("relpath"));
        assert_eq!(vocab.style("rel-path"), Some("relpath"));
        assert_eq!(vocab.spelling("alpha"), Some("a"));
        assert_eq!(vocab.spelling("dig seven"), Some("7"));
        assert_eq!(vocab.letter("alpha"), Some('a'));
        assert_eq!(vocab.letter("q"), Some('q'));
        assert_eq!(vocab.max_phrase_words(), 2);
    }

    #[test]
    fn test_letters_fall_back_to_the_alphabet() {
        let vocab = minimal().letters(&[("arch", 'a')]).build().unwrap();
        assert_eq!(vocab.letter("arch"), Some('a'));
        assert_eq!(vocab.letter("bravo"), Some('b'));
        assert_eq!(vocab.letter("Z"), Some('z'));
        assert_eq!(vocab.letter("lope"), None);
    }

    #[test]
    fn test_phrases_are_normalized() {
        let vocab = minimal()
            .ex_command("P. W. D.", text("pwd "))
            .ex_command("set file format UNIX", text("set fileformat=unix "))
            .build()
            .unwrap();
        assert!(vocab.ex_command("p w d").is_some());
        assert!(vocab.ex_command("set file format unix").is_some());
        assert_eq!(normalize_word("Hello,"), "hello");
    }

    #[test]
    fn test_bad_key_spec_is_fatal() {
        let err = minimal()
            .command("broken", keys("escape, wibble"))
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_chaos_operator_must_exist() {
        let err = VocabularyBuilder::new("test")
            .chaos_operator("chaos")
            .build()
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unknown_style_is_fatal() {
        let err = minimal().style("wiggle word").build().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("wiggle word"));
    }

    #[test]
    fn test_count_slots_are_checked() {
        assert!(minimal()
            .key_insertion("ace", keys("space:%(count)d"), CountSlot::None)
            .build()
            .is_err());
        assert!(minimal()
            .key_insertion("ack", keys("escape"), CountSlot::Optional)
            .build()
            .is_err());
        assert!(minimal()
            .key_insertion("ace", keys("space:%(count)d"), CountSlot::Optional)
            .build()
            .is_ok());
        assert!(minimal()
            .ex_counted("left", keys("left"))
            .build()
            .is_err());
    }

    #[test]
    fn test_reserved_ex_phrases() {
        assert!(minimal().ex_command("kay", text("x")).build().is_err());
        assert!(minimal().ex_command("(cancel | quit)", text("x")).build().is_err());
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!(Variant::parse("RStudio"), Some(Variant::Rstudio));
        assert_eq!(Variant::parse("vim"), Some(Variant::Vim));
        assert_eq!(Variant::parse("emacs"), None);
        assert_eq!(Variant::default().name(), "vim");
    }
}

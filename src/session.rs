//! Grammar session
//!
//! Owns everything one active vocabulary needs at dispatch time: the
//! formatter, the count-resolver cache and the executor. Activating builds
//! the context, deactivating drops it; nothing lives at module level.
//!
//! The session also runs the Ex-mode sub-grammar. `execute` presses `:` and
//! switches to Ex mode, where utterances come from the Ex table until `kay`
//! (enter) or `cancel` (escape) returns to normal mode.

use std::sync::Arc;

use crate::action::{Action, KeyCode, KeyStroke};
use crate::count::{parse_number_phrase, CountResolvers};
use crate::error::{GrammarError, Result};
use crate::executor::{ExecutionReport, Executor};
use crate::format::IdentifierFormatter;
use crate::inject::Injector;
use crate::matcher::PhraseMatcher;
use crate::segmenter::{Segmenter, DEFAULT_MAX_ELEMENTS};
use crate::token::SegmentedUtterance;
use crate::tree::Utterance;
use crate::vocabulary::{normalize_word, Vocabulary, EX_ACCEPT, EX_CANCEL, EX_ENTER};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub max_elements: usize,
    pub count_digits: usize,
    pub default_count: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_elements: DEFAULT_MAX_ELEMENTS,
            count_digits: 3,
            default_count: 1,
        }
    }
}

/// Which sub-grammar the next utterance goes to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Ex,
}

/// Largest count an Ex command takes
pub const EX_MAX_COUNT: u32 = 50;

fn click(key: KeyCode) -> Action {
    Action::Keys(vec![KeyStroke::click(key)])
}

pub struct GrammarSession {
    vocabulary: Arc<Vocabulary>,
    formatter: IdentifierFormatter,
    counts: CountResolvers,
    executor: Executor,
    settings: SessionSettings,
    mode: Mode,
}

impl GrammarSession {
    pub fn activate(vocabulary: Arc<Vocabulary>, settings: SessionSettings) -> Self {
        tracing::info!(
            vocabulary = vocabulary.name(),
            phrases = vocabulary.phrase_count(),
            "Grammar session active"
        );
        Self {
            formatter: IdentifierFormatter::new(vocabulary.formats().clone()),
            counts: CountResolvers::new(settings.default_count),
            executor: Executor::new(vocabulary.run_exit().cloned()),
            vocabulary,
            settings,
            mode: Mode::Normal,
        }
    }

    /// Swap in a reloaded vocabulary, keeping the current mode
    pub fn reactivate(self, vocabulary: Arc<Vocabulary>, settings: SessionSettings) -> Self {
        let mode = self.mode;
        self.deactivate();
        Self {
            mode,
            ..Self::activate(vocabulary, settings)
        }
    }

    pub fn deactivate(self) {
        tracing::info!(vocabulary = self.vocabulary.name(), "Grammar session closed");
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn segmenter(&self) -> Segmenter<'_> {
        Segmenter::new(&self.vocabulary, &self.formatter, &self.counts)
            .max_elements(self.settings.max_elements)
            .count_digits(self.settings.count_digits)
    }

    /// Match and segment a normal-mode transcript without injecting anything
    pub fn interpret(&self, transcript: &str) -> Result<SegmentedUtterance> {
        let utterance = PhraseMatcher::new(&self.vocabulary).parse(transcript);
        self.segmenter().segment(&utterance)
    }

    /// Segment and replay an already matched utterance
    pub fn handle_utterance<I: Injector + ?Sized>(
        &self,
        utterance: &Utterance,
        injector: &mut I,
    ) -> Result<ExecutionReport> {
        let segmented = self.segmenter().segment(utterance)?;
        tracing::debug!(tokens = segmented.len(), "Segmented utterance");
        self.executor.execute(segmented.into_tokens(), injector)
    }

    /// Interpret one recognized transcript and inject the result
    pub fn handle_transcript<I: Injector + ?Sized>(
        &mut self,
        transcript: &str,
        injector: &mut I,
    ) -> Result<ExecutionReport> {
        tracing::debug!(transcript, mode = ?self.mode, "Handling transcript");
        let result = self.dispatch(transcript, injector);
        if let Err(e) = &result {
            tracing::warn!(transcript, "Utterance failed: {}", e);
        }
        result
    }

    fn dispatch<I: Injector + ?Sized>(&mut self, transcript: &str, injector: &mut I) -> Result<ExecutionReport> {
        let words: Vec<String> = transcript
            .split_whitespace()
            .map(normalize_word)
            .filter(|w| !w.is_empty())
            .collect();

        match self.mode {
            Mode::Ex => self.ex_utterance(&words, injector),
            Mode::Normal if words.first().map(String::as_str) == Some(EX_ENTER) => {
                click(KeyCode::Char(':')).perform(injector)?;
                self.mode = Mode::Ex;
                tracing::debug!("Entered Ex mode");
                let mut report = ExecutionReport {
                    commands: 1,
                    ..Default::default()
                };
                if words.len() > 1 {
                    report.commands += self.ex_utterance(&words[1..], injector)?.commands;
                }
                Ok(report)
            }
            Mode::Normal => {
                let utterance = PhraseMatcher::new(&self.vocabulary).parse(transcript);
                self.handle_utterance(&utterance, injector)
            }
        }
    }

    fn ex_utterance<I: Injector + ?Sized>(&mut self, words: &[String], injector: &mut I) -> Result<ExecutionReport> {
        let (body, accept) = match words.split_last() {
            Some((last, rest)) if last == EX_ACCEPT => (rest, true),
            _ => (words, false),
        };

        let mut commands = 0;
        if body.len() == 1 && body[0] == EX_CANCEL {
            click(KeyCode::Escape).perform(injector)?;
            self.mode = Mode::Normal;
            return Ok(ExecutionReport {
                commands: 1,
                ..Default::default()
            });
        }
        if !body.is_empty() {
            self.ex_action(body)?.perform(injector)?;
            commands += 1;
        }
        if accept {
            click(KeyCode::Enter).perform(injector)?;
            self.mode = Mode::Normal;
            commands += 1;
        }
        Ok(ExecutionReport {
            commands,
            ..Default::default()
        })
    }

    /// `[<number>] <ex command>`
    fn ex_action(&self, words: &[String]) -> Result<Action> {
        let (count, rest) = match parse_number_phrase(words) {
            Some((n, used)) if used < words.len() => (Some(n), &words[used..]),
            _ => (None, words),
        };
        if let Some(n) = count.filter(|n| !(1..=EX_MAX_COUNT).contains(n)) {
            return Err(GrammarError::InvalidCount(format!(
                "Ex count {} is outside 1..={}",
                n, EX_MAX_COUNT
            )));
        }
        let phrase = rest.join(" ");
        let entry = self
            .vocabulary
            .ex_command(&phrase)
            .ok_or_else(|| GrammarError::unrecognized("ex command", phrase.as_str()))?;

        match (entry.counted, count) {
            (true, n) => Ok(entry.action.bind_count(n.unwrap_or(self.settings.default_count))),
            (false, None) => Ok(entry.action.clone()),
            (false, Some(_)) => Err(GrammarError::InvalidCount(format!("'{}' takes no count", phrase))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inject::RecordingInjector;
    use crate::vocabulary::{Variant, VariantOptions};

    fn session(variant: Variant) -> GrammarSession {
        let vocab = variant.builder(&VariantOptions::default()).build().unwrap();
        GrammarSession::activate(Arc::new(vocab), SessionSettings::default())
    }

    fn calls(session: &mut GrammarSession, transcript: &str) -> Vec<String> {
        let mut rec = RecordingInjector::new();
        session.handle_transcript(transcript, &mut rec).unwrap();
        rec.calls
    }

    #[test]
    fn test_normal_mode_transcript() {
        let mut s = session(Variant::Vim);
        assert_eq!(calls(&mut s, "three reg quebec ripple"), vec!["text:3@q"]);
        assert_eq!(
            calls(&mut s, "inns hello world"),
            vec!["key:ix1", "text:hello world", "key:escapex2"]
        );
    }

    #[test]
    fn test_ex_mode_round_trip() {
        let mut s = session(Variant::Vim);
        assert_eq!(calls(&mut s, "execute"), vec!["key:colonx1"]);
        assert_eq!(s.mode(), Mode::Ex);

        assert_eq!(calls(&mut s, "write file"), vec!["text:w "]);
        assert_eq!(calls(&mut s, "three left"), vec!["key:leftx3"]);
        assert_eq!(calls(&mut s, "twenty two right"), vec!["key:rightx22"]);
        assert_eq!(s.mode(), Mode::Ex);

        assert_eq!(calls(&mut s, "kay"), vec!["key:enterx1"]);
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn test_ex_mode_inline_and_cancel() {
        let mut s = session(Variant::Vim);
        assert_eq!(
            calls(&mut s, "execute quit kay"),
            vec!["key:colonx1", "text:q ", "key:enterx1"]
        );
        assert_eq!(s.mode(), Mode::Normal);

        calls(&mut s, "execute");
        assert_eq!(calls(&mut s, "cancel"), vec!["key:escapex1"]);
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn test_ex_mode_errors_keep_session_usable() {
        let mut s = session(Variant::Vim);
        calls(&mut s, "execute");
        let mut rec = RecordingInjector::new();
        let err = s.handle_transcript("frobnicate", &mut rec).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::UnrecognizedPhrase { category: "ex command", .. }
        ));
        assert!(matches!(
            s.handle_transcript("three quit", &mut rec),
            Err(GrammarError::InvalidCount(_))
        ));
        assert!(rec.calls.is_empty());
        assert_eq!(s.mode(), Mode::Ex);
        assert_eq!(calls(&mut s, "quit"), vec!["text:q "]);
    }

    #[test]
    fn test_ex_counts_are_bounded() {
        let mut s = session(Variant::Vim);
        calls(&mut s, "execute");
        let mut rec = RecordingInjector::new();
        for transcript in ["zero left", "999 right", "51 left"] {
            assert!(
                matches!(
                    s.handle_transcript(transcript, &mut rec),
                    Err(GrammarError::InvalidCount(_))
                ),
                "{transcript}"
            );
        }
        assert!(rec.calls.is_empty());
        assert_eq!(s.mode(), Mode::Ex);
        assert_eq!(calls(&mut s, "fifty left"), vec!["key:leftx50"]);
    }

    #[test]
    fn test_reactivate_keeps_ex_mode() {
        let mut s = session(Variant::Vim);
        calls(&mut s, "execute");

        let vocab = Variant::Vim.builder(&VariantOptions::default()).build().unwrap();
        let mut s = s.reactivate(Arc::new(vocab), SessionSettings::default());
        assert_eq!(s.mode(), Mode::Ex);
        assert_eq!(calls(&mut s, "kay"), vec!["key:enterx1"]);
        assert_eq!(s.mode(), Mode::Normal);
    }

    #[test]
    fn test_failed_utterance_does_not_poison_the_next() {
        let mut s = session(Variant::Vim);
        let mut rec = RecordingInjector::new();
        assert_eq!(
            s.handle_transcript("ripple", &mut rec),
            Err(GrammarError::MissingRegister)
        );
        assert!(rec.calls.is_empty());
        assert_eq!(calls(&mut s, "undo"), vec!["key:ux1"]);
    }

    #[test]
    fn test_interpret_does_not_inject() {
        let s = session(Variant::Rstudio);
        let segmented = s.interpret("goose four two").unwrap();
        assert_eq!(segmented.len(), 1);
        s.deactivate();
    }
}

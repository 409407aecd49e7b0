//! Insertion-buffer executor
//!
//! Replays tokens in spoken order. Insertions accumulate in a pending run;
//! a command (or the end of the list) flushes the run first: the run's mode
//! entry once, every payload in order, then the optional run exit keys.
//!
//! Injection failures propagate immediately and are never retried: replaying
//! keystrokes is not idempotent. The pending run is local to one call, so a
//! failed utterance leaves nothing behind for the next one.

use crate::action::Action;
use crate::error::Result;
use crate::inject::Injector;
use crate::token::Token;

/// What one replay did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Non-empty insertion runs flushed
    pub flushes: usize,
    pub commands: usize,
    pub insertions: usize,
}

#[derive(Default)]
struct PendingRun {
    mode_entry: Option<Action>,
    payloads: Vec<Action>,
}

impl PendingRun {
    fn push(&mut self, mode_entry: Option<Action>, payload: Action) {
        if self.payloads.is_empty() {
            self.mode_entry = mode_entry;
        }
        self.payloads.push(payload);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Executor {
    run_exit: Option<Action>,
}

impl Executor {
    pub fn new(run_exit: Option<Action>) -> Self {
        Self { run_exit }
    }

    fn flush<I: Injector + ?Sized>(
        &self,
        run: &mut PendingRun,
        injector: &mut I,
        report: &mut ExecutionReport,
    ) -> Result<()> {
        if run.payloads.is_empty() {
            return Ok(());
        }
        let PendingRun {
            mode_entry,
            payloads,
        } = std::mem::take(run);

        tracing::trace!(insertions = payloads.len(), "Flushing insertion run");
        if let Some(entry) = mode_entry {
            entry.perform(injector)?;
        }
        for payload in &payloads {
            payload.perform(injector)?;
        }
        if let Some(exit) = &self.run_exit {
            exit.perform(injector)?;
        }
        report.flushes += 1;
        Ok(())
    }

    /// Replay `tokens` against `injector`
    pub fn execute<I, T>(&self, tokens: T, injector: &mut I) -> Result<ExecutionReport>
    where
        I: Injector + ?Sized,
        T: IntoIterator<Item = Token>,
    {
        let mut report = ExecutionReport::default();
        let mut run = PendingRun::default();

        for token in tokens {
            match token {
                Token::Insertion {
                    mode_entry,
                    payload,
                } => {
                    run.push(mode_entry, payload);
                    report.insertions += 1;
                }
                Token::Command(action) => {
                    self.flush(&mut run, injector, &mut report)?;
                    action.perform(injector)?;
                    report.commands += 1;
                }
            }
        }
        self.flush(&mut run, injector, &mut report)?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::KeyStroke;
    use crate::error::{GrammarError, InjectionError};
    use crate::inject::RecordingInjector;

    fn ins(entry: Option<&str>, text: &str) -> Token {
        Token::insertion(
            entry.map(|e| Action::keys(e).unwrap()),
            Action::text(text),
        )
    }

    fn cmd(text: &str) -> Token {
        Token::command(Action::text(text))
    }

    fn run(executor: &Executor, tokens: Vec<Token>) -> (ExecutionReport, Vec<String>) {
        let mut rec = RecordingInjector::new();
        let report = executor.execute(tokens, &mut rec).unwrap();
        (report, rec.calls)
    }

    #[test]
    fn test_empty_input_does_nothing() {
        let (report, calls) = run(&Executor::default(), Vec::new());
        assert_eq!(report, ExecutionReport::default());
        assert!(calls.is_empty());
    }

    #[test]
    fn test_insertions_only_flush_once() {
        let tokens = vec![ins(None, "a"), ins(None, "b"), ins(None, "c")];
        let (report, calls) = run(&Executor::default(), tokens);
        assert_eq!(report.flushes, 1);
        assert_eq!(report.insertions, 3);
        assert_eq!(calls, vec!["text:a", "text:b", "text:c"]);
    }

    #[test]
    fn test_spoken_order_is_kept() {
        let tokens = vec![
            ins(None, "a"),
            cmd("X"),
            ins(None, "b"),
            ins(None, "c"),
            cmd("Y"),
            cmd("Z"),
            ins(None, "d"),
        ];
        let (report, calls) = run(&Executor::default(), tokens);
        assert_eq!(
            calls,
            vec!["text:a", "text:X", "text:b", "text:c", "text:Y", "text:Z", "text:d"]
        );
        assert_eq!(
            report,
            ExecutionReport {
                flushes: 3,
                commands: 3,
                insertions: 4
            }
        );
    }

    #[test]
    fn test_mode_entry_once_per_run_from_first_token() {
        let tokens = vec![
            ins(Some("i"), "a"),
            ins(Some("o"), "b"),
            cmd("X"),
            ins(None, "c"),
            ins(Some("a"), "d"),
        ];
        let (_, calls) = run(&Executor::default(), tokens);
        assert_eq!(
            calls,
            vec![
                "key:ix1", "text:a", "text:b", "text:X",
                // first token of the second run has no entry, so none runs
                "text:c", "text:d",
            ]
        );
    }

    #[test]
    fn test_run_exit_after_each_run() {
        let executor = Executor::new(Some(Action::keys("escape:2").unwrap()));
        let tokens = vec![ins(Some("i"), "a"), cmd("X"), cmd("Y"), ins(None, "b")];
        let (_, calls) = run(&executor, tokens);
        assert_eq!(
            calls,
            vec![
                "key:ix1",
                "text:a",
                "key:escapex2",
                "text:X",
                "text:Y",
                "text:b",
                "key:escapex2",
            ]
        );
    }

    #[test]
    fn test_null_pair_after_command() {
        let executor = Executor::new(Some(Action::keys("escape:2").unwrap()));
        let tokens = vec![
            cmd("c1c"),
            Token::null_insertion(),
            Token::null_insertion(),
        ];
        let (report, calls) = run(&executor, tokens);
        assert_eq!(calls, vec!["text:c1c", "key:escapex2"]);
        assert_eq!(report.flushes, 1);
    }

    #[test]
    fn test_every_mix_keeps_order_and_flushes_per_run() {
        let executor = Executor::new(Some(Action::keys("escape:2").unwrap()));
        for len in 1..=6 {
            for mask in 0u32..(1 << len) {
                // bit set = command
                let is_command: Vec<bool> = (0..len).map(|i| mask & (1 << i) != 0).collect();
                let mut tokens = Vec::new();
                let mut expected = Vec::new();
                let mut runs = 0;
                for (i, &command) in is_command.iter().enumerate() {
                    let run_start = !command && (i == 0 || is_command[i - 1]);
                    if command {
                        tokens.push(cmd(&format!("c{i}")));
                        expected.push(format!("text:c{i}"));
                        continue;
                    }
                    if run_start {
                        runs += 1;
                        expected.push("key:ix1".to_string());
                    }
                    tokens.push(ins(Some("i"), &format!("t{i}")));
                    expected.push(format!("text:t{i}"));
                    if i + 1 == len || is_command[i + 1] {
                        expected.push("key:escapex2".to_string());
                    }
                }
                let commands = is_command.iter().filter(|&&c| c).count();

                let (report, calls) = run(&executor, tokens);
                assert_eq!(calls, expected, "mask {mask:0len$b}");
                assert_eq!(
                    report,
                    ExecutionReport {
                        flushes: runs,
                        commands,
                        insertions: len - commands,
                    },
                    "mask {mask:0len$b}"
                );
                if commands == 0 {
                    assert_eq!(report.flushes, 1);
                }
            }
        }
    }

    struct FailingInjector {
        calls: usize,
    }

    impl Injector for FailingInjector {
        fn send_key(&mut self, _stroke: &KeyStroke, _repeat: u32) -> std::result::Result<(), InjectionError> {
            self.calls += 1;
            Err(InjectionError::Keyboard("display gone".into()))
        }

        fn insert_text(&mut self, _text: &str) -> std::result::Result<(), InjectionError> {
            self.calls += 1;
            Ok(())
        }
    }

    #[test]
    fn test_injection_failure_propagates_without_retry() {
        let tokens = vec![ins(None, "a"), Token::command(Action::keys("u").unwrap()), ins(None, "b")];
        let mut injector = FailingInjector { calls: 0 };
        let err = Executor::default().execute(tokens, &mut injector).unwrap_err();
        assert_eq!(
            err,
            GrammarError::Injection(InjectionError::Keyboard("display gone".into()))
        );
        // "a" typed, "u" attempted once, "b" never reached
        assert_eq!(injector.calls, 2);
    }
}

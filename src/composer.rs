//! Command composition
//!
//! Renders `[<count>] [reg <letter>] <command>` into one command token, in the
//! order count, register prefix, command. The macro sentinel turns the register
//! into `@<letter>` and contributes no text of its own.
//!
//! When the self-settling operator (`chaos`) is applied to itself, the
//! command is followed by two null insertions. Flushing them as a run gives
//! the editor a no-op trip through insert mode (the run exit keys) after `c`
//! has started one. With a motion it composes like any other operator.

use crate::action::Action;
use crate::count::CountResolvers;
use crate::error::{GrammarError, Result};
use crate::register::{resolve_register, Register};
use crate::token::Token;
use crate::tree::{CommandBody, CommandPhrase, CountedMotion, MotionPhrase, SpokenCount};
use crate::vocabulary::{CommandEntry, SelfApplication, Vocabulary};

pub struct CommandComposer<'a> {
    vocabulary: &'a Vocabulary,
    counts: &'a CountResolvers,
    count_digits: usize,
}

impl<'a> CommandComposer<'a> {
    pub fn new(vocabulary: &'a Vocabulary, counts: &'a CountResolvers, count_digits: usize) -> Self {
        Self {
            vocabulary,
            counts,
            count_digits,
        }
    }

    /// Spoken count rendered as a decimal prefix, if one was spoken
    fn count_prefix(&self, spoken: Option<&SpokenCount>) -> Result<Option<String>> {
        match spoken {
            Some(words) if !words.is_empty() => {
                let n = self.counts.get(self.count_digits).resolve(words.as_slice())?;
                Ok(Some(n.to_string()))
            }
            _ => Ok(None),
        }
    }

    fn resolve_count(&self, spoken: Option<&SpokenCount>) -> Result<u32> {
        self.counts
            .get(self.count_digits)
            .resolve(spoken.map(Vec::as_slice).unwrap_or_default())
    }

    fn render_motion(&self, motion: &MotionPhrase) -> Result<Action> {
        match motion {
            MotionPhrase::Counted { count, motion } => {
                let action = match motion {
                    CountedMotion::Primitive(name) => self
                        .vocabulary
                        .motion(name)
                        .cloned()
                        .ok_or_else(|| GrammarError::unrecognized("motion", name.as_str()))?,
                    CountedMotion::Parameterized { motion, letter } => {
                        let key = self
                            .vocabulary
                            .parameter_motion(motion)
                            .ok_or_else(|| GrammarError::unrecognized("motion", motion.as_str()))?;
                        let letter = self
                            .vocabulary
                            .letter(letter)
                            .ok_or_else(|| GrammarError::unrecognized("letter", letter.as_str()))?;
                        Action::text(format!("{}{}", key, letter))
                    }
                };
                Ok(match self.count_prefix(count.as_ref())? {
                    Some(prefix) => Action::text(prefix).then(action),
                    None => action,
                })
            }
            MotionPhrase::Uncounted(name) => self
                .vocabulary
                .uncounted_motion(name)
                .cloned()
                .ok_or_else(|| GrammarError::unrecognized("motion", name.as_str())),
        }
    }

    /// Render the command body; `None` means the macro sentinel
    fn render_body(&self, body: &CommandBody) -> Result<Option<Action>> {
        match body {
            CommandBody::Primitive(name) => match self.vocabulary.command(name) {
                Some(CommandEntry::Action(action)) => Ok(Some(action.clone())),
                Some(CommandEntry::Macro) => Ok(None),
                None => Err(GrammarError::unrecognized("command", name.as_str())),
            },
            CommandBody::OperatorMotion { operator, motion } => {
                let motion = self.render_motion(motion)?;
                let Some(operator) = operator else {
                    return Ok(Some(motion));
                };
                let entry = self
                    .vocabulary
                    .operator(&operator.name)
                    .ok_or_else(|| GrammarError::unrecognized("operator", operator.name.as_str()))?;
                let prefix = self.count_prefix(operator.count.as_ref())?.unwrap_or_default();
                Ok(Some(Action::text(format!("{}{}", prefix, entry.text)).then(motion)))
            }
            CommandBody::OperatorSelf { operator, count } => {
                let entry = self
                    .vocabulary
                    .operator(operator)
                    .ok_or_else(|| GrammarError::unrecognized("operator", operator.as_str()))?;
                let n = self.resolve_count(count.as_ref())?;
                let rendered = match entry.self_application {
                    SelfApplication::Doubled => format!("{}{}{}", entry.text, n, entry.text),
                    SelfApplication::LineComment if n == 1 => format!("{}c", entry.text),
                    SelfApplication::LineComment => format!("{}{}j", entry.text, n - 1),
                };
                Ok(Some(Action::text(rendered)))
            }
        }
    }

    fn settles_chaos(&self, body: &CommandBody) -> bool {
        match (body, self.vocabulary.chaos_operator()) {
            (CommandBody::OperatorSelf { operator, .. }, Some(chaos)) => operator == chaos,
            _ => false,
        }
    }

    /// Compose one command phrase into its tokens
    pub fn compose(&self, phrase: &CommandPhrase) -> Result<Vec<Token>> {
        let body = self.render_body(&phrase.body)?;
        let register = phrase
            .register
            .as_deref()
            .map(|word| resolve_register(word, |w| self.vocabulary.letter(w)))
            .transpose()?;

        let mut prefix = self.count_prefix(phrase.count.as_ref())?.unwrap_or_default();
        let action = match (register, body) {
            (Some(reg), None) => {
                prefix.push_str(&reg.macro_prefix());
                Action::text(prefix)
            }
            (None, None) => return Err(GrammarError::MissingRegister),
            (register, Some(body)) => {
                if let Some(reg) = register.map(Register::selection_prefix) {
                    prefix.push_str(&reg);
                }
                if prefix.is_empty() {
                    body
                } else {
                    Action::text(prefix).then(body)
                }
            }
        };

        let mut tokens = vec![Token::command(action)];
        if self.settles_chaos(&phrase.body) {
            tokens.push(Token::null_insertion());
            tokens.push(Token::null_insertion());
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{OperatorPhrase, SpokenCount};
    use crate::vocabulary::{Variant, VariantOptions};

    fn vim() -> Vocabulary {
        Variant::Vim.builder(&VariantOptions::default()).build().unwrap()
    }

    fn render(phrase: CommandPhrase) -> Result<Vec<String>> {
        let vocab = vim();
        let counts = CountResolvers::default();
        let composer = CommandComposer::new(&vocab, &counts, 3);
        Ok(composer
            .compose(&phrase)?
            .iter()
            .map(|t| match t {
                Token::Command(a) => a.to_string(),
                other => other.to_string(),
            })
            .collect())
    }

    fn spoken(s: &str) -> SpokenCount {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_macro_with_register() {
        let phrase = CommandPhrase::primitive("ripple").with_register("quebec");
        assert_eq!(render(phrase).unwrap(), vec!["@q"]);

        let phrase = CommandPhrase::primitive("ripple")
            .with_register("quebec")
            .with_count("three");
        assert_eq!(render(phrase).unwrap(), vec!["3@q"]);
    }

    #[test]
    fn test_macro_without_register() {
        let err = render(CommandPhrase::primitive("ripple")).unwrap_err();
        assert_eq!(err, GrammarError::MissingRegister);
    }

    #[test]
    fn test_count_then_register_then_command() {
        let phrase = CommandPhrase::primitive("post")
            .with_register("alpha")
            .with_count("one two");
        assert_eq!(render(phrase).unwrap(), vec!["12'a<p>"]);
        assert_eq!(render(CommandPhrase::primitive("dello")).unwrap(), vec!["daw"]);
    }

    #[test]
    fn test_operator_with_motion() {
        let phrase = CommandPhrase::new(CommandBody::OperatorMotion {
            operator: Some(OperatorPhrase {
                count: Some(spoken("two")),
                name: "swap case".into(),
            }),
            motion: MotionPhrase::Counted {
                count: Some(spoken("three")),
                motion: CountedMotion::Primitive("yope".into()),
            },
        });
        assert_eq!(render(phrase).unwrap(), vec!["2g~3w"]);

        let phrase = CommandPhrase::new(CommandBody::OperatorMotion {
            operator: None,
            motion: MotionPhrase::Counted {
                count: None,
                motion: CountedMotion::Parameterized {
                    motion: "phytic".into(),
                    letter: "x-ray".into(),
                },
            },
        });
        assert_eq!(render(phrase).unwrap(), vec!["fx"]);

        let phrase = CommandPhrase::new(CommandBody::OperatorMotion {
            operator: Some(OperatorPhrase {
                count: None,
                name: "format text".into(),
            }),
            motion: MotionPhrase::Uncounted("tect".into()),
        });
        assert_eq!(render(phrase).unwrap(), vec!["gq%"]);
    }

    #[test]
    fn test_operator_self_application() {
        assert_eq!(
            render(CommandPhrase::operator_self("uppercase", Some("four"))).unwrap(),
            vec!["gU4gU"]
        );
        assert_eq!(
            render(CommandPhrase::operator_self("comm nop", None)).unwrap(),
            vec!["gcc"]
        );
        assert_eq!(
            render(CommandPhrase::operator_self("comm nop", Some("five"))).unwrap(),
            vec!["gc4j"]
        );
    }

    #[test]
    fn test_chaos_self_application_adds_null_pair() {
        let vocab = vim();
        let counts = CountResolvers::default();
        let composer = CommandComposer::new(&vocab, &counts, 3);
        let tokens = composer
            .compose(&CommandPhrase::operator_self("chaos", None))
            .unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::command(Action::text("c1c")),
                Token::null_insertion(),
                Token::null_insertion(),
            ]
        );

        let tokens = composer
            .compose(&CommandPhrase::operator_motion(Some("chaos"), "inner yope"))
            .unwrap();
        assert_eq!(tokens, vec![Token::command(Action::text("c").then(Action::text("iw")))]);

        let tokens = composer
            .compose(&CommandPhrase::operator_motion(Some("swap case"), "yope"))
            .unwrap();
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(
            render(CommandPhrase::primitive("frobnicate")),
            Err(GrammarError::UnrecognizedPhrase { category: "command", .. })
        ));
        assert!(matches!(
            render(CommandPhrase::primitive("undo").with_register("banana")),
            Err(GrammarError::UnrecognizedPhrase { category: "register", .. })
        ));
        assert!(matches!(
            render(CommandPhrase::primitive("undo").with_count("one two three four")),
            Err(GrammarError::CountTooLong { .. })
        ));
    }
}

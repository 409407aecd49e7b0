//! vimvox - speak to vim.
//!
//! A recognized utterance such as `three reg quebec ripple inns hello world`
//! mixes normal-mode commands with text to insert. vimvox matches it against a
//! vocabulary, segments it into command and insertion tokens, and replays the
//! tokens through an [`Injector`] so that consecutive insertions share one trip
//! through insert mode.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vimvox::{GrammarSession, RecordingInjector, SessionSettings, Variant, VariantOptions};
//!
//! let vocabulary = Variant::Vim.builder(&VariantOptions::default()).build()?;
//! let mut session = GrammarSession::activate(Arc::new(vocabulary), SessionSettings::default());
//! let mut injector = RecordingInjector::new();
//! session.handle_transcript("three reg quebec ripple", &mut injector)?;
//! assert_eq!(injector.calls, vec!["text:3@q"]);
//! # Ok::<(), vimvox::GrammarError>(())
//! ```

pub mod action;
pub mod composer;
pub mod config;
pub mod count;
pub mod error;
pub mod executor;
pub mod format;
pub mod inject;
pub mod matcher;
pub mod pattern;
pub mod register;
pub mod segmenter;
pub mod session;
pub mod token;
pub mod tree;
pub mod vocabulary;

pub use action::{Action, KeyStroke};
pub use config::Config;
pub use error::{GrammarError, InjectionError, Result};
pub use executor::{ExecutionReport, Executor};
pub use format::{CaseMode, FormatRegistry, IdentifierFormatter};
pub use inject::{EnigoInjector, InputMethod, Injector, LoggingInjector, RecordingInjector};
pub use matcher::PhraseMatcher;
pub use segmenter::Segmenter;
pub use session::{GrammarSession, Mode, SessionSettings};
pub use token::{SegmentedUtterance, Token};
pub use tree::Utterance;
pub use vocabulary::{Variant, VariantOptions, Vocabulary, VocabularyBuilder};

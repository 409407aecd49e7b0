use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use clap::Parser;
use notify::{recommended_watcher, RecursiveMode, Watcher};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vimvox::{
    Config, EnigoInjector, GrammarError, GrammarSession, Injector, LoggingInjector, SessionSettings, Variant,
    Vocabulary,
};

#[derive(Parser)]
#[command(name = "vimvox", version, about = "Speak to vim: compound voice commands become keystrokes")]
struct Cli {
    /// Config file (default: search the usual locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Builtin vocabulary: vim or rstudio
    #[arg(long)]
    variant: Option<String>,

    /// Print what would be injected instead of typing it
    #[arg(long)]
    dry_run: bool,

    /// List spoken identifier styles and exit
    #[arg(long)]
    list_formats: bool,

    /// Utterances to run; read from stdin when empty
    phrases: Vec<String>,
}

/// Everything a reload replaces
struct Grammar {
    vocabulary: Arc<Vocabulary>,
    settings: SessionSettings,
}

impl Grammar {
    fn load(config: &Config, variant: Option<Variant>) -> Result<Self> {
        let config = match variant {
            Some(variant) => Config {
                variant,
                ..config.clone()
            },
            None => config.clone(),
        };
        Ok(Self {
            vocabulary: Arc::new(config.vocabulary()?),
            settings: config.session_settings(),
        })
    }
}

fn watch_config(path: PathBuf, config: Config, grammar: Arc<ArcSwap<Grammar>>, variant: Option<Variant>) {
    std::thread::spawn(move || {
        let mut current = config;
        let (tx, rx) = std::sync::mpsc::channel();
        let mut watcher = match recommended_watcher(tx) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create config watcher: {}", e);
                return;
            }
        };
        if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
            error!("Failed to watch config file: {}", e);
            return;
        }
        info!("Watching config for changes: {:?}", path);

        for event in rx.into_iter().flatten() {
            if !event.kind.is_modify() {
                continue;
            }
            std::thread::sleep(Duration::from_millis(100));
            let config = match Config::load_from(&path) {
                Ok(config) if config == current => {
                    debug!("Config unchanged, skipping reload");
                    continue;
                }
                Ok(config) => config,
                Err(e) => {
                    error!("Config reload failed, keeping previous vocabulary: {:#}", e);
                    continue;
                }
            };
            match Grammar::load(&config, variant) {
                Ok(new_grammar) => {
                    info!(
                        phrases = new_grammar.vocabulary.phrase_count(),
                        "Config reloaded"
                    );
                    grammar.store(Arc::new(new_grammar));
                    current = config;
                }
                Err(e) => error!("Config reload failed, keeping previous vocabulary: {:#}", e),
            }
        }
    });
}

/// Re-activate the session if a reload published a new vocabulary
fn refresh(session: GrammarSession, grammar: &ArcSwap<Grammar>) -> GrammarSession {
    let current = grammar.load();
    if Arc::ptr_eq(&current.vocabulary, session.vocabulary()) && current.settings == session.settings() {
        return session;
    }
    session.reactivate(current.vocabulary.clone(), current.settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = Config::load(cli.config.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let variant = match cli.variant.as_deref() {
        Some(name) => Some(
            Variant::parse(name).with_context(|| format!("Unknown variant '{}'", name))?,
        ),
        None => None,
    };

    let grammar = Grammar::load(&config, variant)?;
    info!(
        vocabulary = grammar.vocabulary.name(),
        config = ?config_path,
        "vimvox v{}",
        env!("CARGO_PKG_VERSION")
    );

    if cli.list_formats {
        for (spoken, format) in grammar.vocabulary.styles() {
            println!("{:<24} {}", spoken, format);
        }
        return Ok(());
    }

    let grammar = Arc::new(ArcSwap::from_pointee(grammar));
    if let Some(path) = config_path {
        watch_config(path, config.clone(), grammar.clone(), variant);
    }

    let mut injector: Box<dyn Injector> = if cli.dry_run {
        Box::new(LoggingInjector)
    } else {
        Box::new(
            EnigoInjector::new(config.input_method, config.key_delay_ms)
                .context("Failed to start keyboard injection")?,
        )
    };

    let current = grammar.load_full();
    let mut session = GrammarSession::activate(current.vocabulary.clone(), current.settings);

    let mut run = |session: GrammarSession, transcript: &str| -> GrammarSession {
        let mut session = refresh(session, &grammar);
        if transcript.trim().is_empty() {
            return session;
        }
        match session.handle_transcript(transcript, injector.as_mut()) {
            Ok(report) => {
                debug!(
                    commands = report.commands,
                    insertions = report.insertions,
                    flushes = report.flushes,
                    "Utterance done"
                );
            }
            Err(GrammarError::Injection(_)) => warn!("Injection failed, utterance abandoned"),
            Err(_) => {}
        }
        session
    };

    if cli.phrases.is_empty() {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            session = run(session, &line);
        }
    } else {
        for phrase in &cli.phrases {
            session = run(session, phrase);
        }
    }

    session.deactivate();
    Ok(())
}

//! End-to-end: transcript in, recorded injector calls out

use std::sync::Arc;

use vimvox::{
    Config, GrammarError, GrammarSession, Mode, RecordingInjector, SessionSettings, Variant,
    VariantOptions,
};

fn session(variant: Variant) -> GrammarSession {
    let vocabulary = variant.builder(&VariantOptions::default()).build().unwrap();
    GrammarSession::activate(Arc::new(vocabulary), SessionSettings::default())
}

fn run(session: &mut GrammarSession, transcript: &str) -> Vec<String> {
    let mut injector = RecordingInjector::new();
    session.handle_transcript(transcript, &mut injector).unwrap();
    injector.calls
}

#[test]
fn commands_split_insertion_runs() {
    let mut s = session(Variant::Vim);
    assert_eq!(
        run(&mut s, "inns hello dell syn world"),
        vec![
            "key:ix1",
            "text:hello",
            "key:escapex2",
            "key:dx1",
            "key:ax1",
            "text:world",
            "key:escapex2",
        ]
    );
}

#[test]
fn macro_replays_named_register() {
    let mut s = session(Variant::Vim);
    assert_eq!(run(&mut s, "reg quebec ripple"), vec!["text:@q"]);
    assert_eq!(run(&mut s, "two reg alpha ripple"), vec!["text:2@a"]);

    let mut injector = RecordingInjector::new();
    assert_eq!(
        s.handle_transcript("two ripple", &mut injector),
        Err(GrammarError::MissingRegister)
    );
    assert!(injector.calls.is_empty());
}

#[test]
fn chaos_settles_through_insert_mode() {
    let mut s = session(Variant::Vim);
    assert_eq!(run(&mut s, "chaos chaos"), vec!["text:c1c", "key:escapex2"]);

    // no run exit keys in rstudio, so the null pair injects nothing
    let mut s = session(Variant::Rstudio);
    assert_eq!(run(&mut s, "chaos chaos"), vec!["text:c1c"]);
}

#[test]
fn identifiers_and_literals() {
    let mut s = session(Variant::Vim);
    assert_eq!(
        run(&mut s, "camel foo bar"),
        vec!["text:fooBar", "key:escapex2"]
    );
    assert_eq!(
        run(&mut s, "undo literal score dell yank"),
        vec!["key:ux1", "text:dell_yank", "key:escapex2"]
    );
}

#[test]
fn rstudio_key_insertions_take_counts() {
    let mut s = session(Variant::Rstudio);
    assert_eq!(run(&mut s, "ace three"), vec!["key:spacex3"]);
    assert_eq!(run(&mut s, "ack"), vec!["key:escapex1"]);
}

#[test]
fn failures_inject_nothing() {
    let mut s = session(Variant::Vim);
    let mut injector = RecordingInjector::new();

    let eleven = vec!["undo"; 11].join(" ");
    assert_eq!(
        s.handle_transcript(&eleven, &mut injector),
        Err(GrammarError::UtteranceTooLong { count: 11, max: 10 })
    );
    assert!(matches!(
        s.handle_transcript("one two three four undo", &mut injector),
        Err(GrammarError::CountTooLong { .. })
    ));
    assert!(injector.calls.is_empty());

    // the session is still usable
    assert_eq!(run(&mut s, "undo"), vec!["key:ux1"]);
}

#[test]
fn ex_mode_from_normal_mode() {
    let mut s = session(Variant::Vim);
    assert_eq!(run(&mut s, "execute"), vec!["key:colonx1"]);
    assert_eq!(s.mode(), Mode::Ex);
    assert_eq!(run(&mut s, "turbo quit kay"), vec!["text:q! ", "key:enterx1"]);
    assert_eq!(s.mode(), Mode::Normal);
}

#[test]
fn configured_insertions_are_spoken() {
    let config = Config::parse(
        r#"
[insertions]
"my email" = "me@example.com"
"#,
    )
    .unwrap();
    let vocabulary = config.vocabulary().unwrap();
    let mut s = GrammarSession::activate(Arc::new(vocabulary), config.session_settings());
    assert_eq!(
        run(&mut s, "syn my email"),
        vec!["key:ax1", "text:me@example.com", "key:escapex2"]
    );
}

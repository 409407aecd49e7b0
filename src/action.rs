//! Keystroke and text actions
//!
//! Vocabulary tables describe what a phrase does with a small key
//! specification language:
//! - `escape, escape, d, d`  - click keys in order
//! - `c-z/25:3`              - ctrl+z, pause 25 hundredths, three times
//! - `backspace:%(count)d`   - repeat taken from the spoken count
//! - `ctrl:down`             - hold a key until a later `ctrl:up`
//!
//! Specifications are parsed when the vocabulary is built, so a typo in a key
//! name stops the grammar from loading instead of failing mid-utterance.

use std::fmt;

use crate::error::{GrammarError, InjectionError, Result};
use crate::inject::Injector;

/// Placeholder for the spoken count inside text actions
pub const COUNT_PLACEHOLDER: &str = "{count}";

const COUNT_REPEAT: &str = "%(count)d";

/// Modifier held while a key is clicked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modifier {
    Control,
    Shift,
    Alt,
    Super,
}

impl Modifier {
    fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'c' => Some(Modifier::Control),
            's' => Some(Modifier::Shift),
            'a' => Some(Modifier::Alt),
            'w' => Some(Modifier::Super),
            _ => None,
        }
    }

    fn flag(self) -> char {
        match self {
            Modifier::Control => 'c',
            Modifier::Shift => 's',
            Modifier::Alt => 'a',
            Modifier::Super => 'w',
        }
    }
}

/// A key on the keyboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
    Control,
    Shift,
    Alt,
    Char(char),
}

/// Named printable characters; names win over the bare character when rendering
const NAMED_CHARS: &[(&str, char)] = &[
    ("lparen", '('),
    ("rparen", ')'),
    ("lbracket", '['),
    ("rbracket", ']'),
    ("lbrace", '{'),
    ("rbrace", '}'),
    ("langle", '<'),
    ("rangle", '>'),
    ("squote", '\''),
    ("dquote", '"'),
    ("comma", ','),
    ("percent", '%'),
    ("hash", '#'),
    ("equals", '='),
    ("colon", ':'),
    ("minus", '-'),
    ("slash", '/'),
    ("backslash", '\\'),
    ("dot", '.'),
    ("plus", '+'),
    ("caret", '^'),
    ("bang", '!'),
    ("at", '@'),
];

/// Parse a key name (e.g. "escape", "pgup", "lparen", "x")
pub fn parse_key_name(name: &str) -> Option<KeyCode> {
    let key = match name {
        "escape" | "esc" => KeyCode::Escape,
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Space,
        "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        "ctrl" | "control" => KeyCode::Control,
        "shift" => KeyCode::Shift,
        "alt" => KeyCode::Alt,
        _ => {
            if let Some(&(_, c)) = NAMED_CHARS.iter().find(|(n, _)| *n == name) {
                return Some(KeyCode::Char(c));
            }
            if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=12).contains(&n).then_some(KeyCode::F(n));
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_graphic() => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(key)
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyCode::Escape => "escape",
            KeyCode::Enter => "enter",
            KeyCode::Tab => "tab",
            KeyCode::Space => "space",
            KeyCode::Backspace => "backspace",
            KeyCode::Delete => "del",
            KeyCode::Up => "up",
            KeyCode::Down => "down",
            KeyCode::Left => "left",
            KeyCode::Right => "right",
            KeyCode::Home => "home",
            KeyCode::End => "end",
            KeyCode::PageUp => "pgup",
            KeyCode::PageDown => "pgdown",
            KeyCode::Control => "ctrl",
            KeyCode::Shift => "shift",
            KeyCode::Alt => "alt",
            KeyCode::F(n) => return write!(f, "f{}", n),
            KeyCode::Char(c) => {
                return match NAMED_CHARS.iter().find(|(_, nc)| nc == c) {
                    Some((n, _)) => f.write_str(n),
                    None => write!(f, "{}", c),
                };
            }
        };
        f.write_str(name)
    }
}

/// How many times a clicked key fires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Times(u32),
    /// Filled in from the spoken count during segmentation
    Count,
}

/// What happens to the key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Press {
    Click(Repeat),
    Down,
    Up,
}

/// One comma-separated element of a key specification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyStroke {
    pub modifiers: Vec<Modifier>,
    pub key: KeyCode,
    pub press: Press,
    /// Pause after each press, in hundredths of a second
    pub pause_cs: u32,
}

impl KeyStroke {
    pub fn click(key: KeyCode) -> Self {
        Self {
            modifiers: Vec::new(),
            key,
            press: Press::Click(Repeat::Times(1)),
            pause_cs: 0,
        }
    }

    /// Modifiers and key without pause or repeat (`c-v`, `ctrl:down`)
    pub fn combo(&self) -> String {
        let mut out: String = self.modifiers.iter().map(|m| m.flag()).collect();
        if !out.is_empty() {
            out.push('-');
        }
        out.push_str(&self.key.to_string());
        match self.press {
            Press::Down => out.push_str(":down"),
            Press::Up => out.push_str(":up"),
            Press::Click(_) => {}
        }
        out
    }

    /// Parse a single stroke such as `cs-tab/25:%(count)d`
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(GrammarError::config("empty key stroke"));
        }

        let (head, tail) = match spec.split_once(':') {
            Some((h, t)) => (h, Some(t.trim())),
            None => (spec, None),
        };
        let (key_part, pause) = match head.split_once('/') {
            Some((k, p)) => (k, Some(p)),
            None => (head, None),
        };

        let (modifiers, key_name) = match key_part.split_once('-') {
            Some((flags, name)) if !flags.is_empty() => {
                let mut modifiers = Vec::new();
                for flag in flags.chars() {
                    let m = Modifier::from_flag(flag).ok_or_else(|| {
                        GrammarError::config(format!("unknown modifier '{}' in '{}'", flag, spec))
                    })?;
                    modifiers.push(m);
                }
                (modifiers, name)
            }
            _ => (Vec::new(), key_part),
        };

        let key = parse_key_name(key_name.trim())
            .ok_or_else(|| GrammarError::config(format!("unknown key '{}' in '{}'", key_name, spec)))?;

        let pause_cs = match pause {
            Some(p) => p
                .trim()
                .parse::<u32>()
                .map_err(|_| GrammarError::config(format!("bad pause '{}' in '{}'", p, spec)))?,
            None => 0,
        };

        let press = match tail {
            None => Press::Click(Repeat::Times(1)),
            Some("down") => Press::Down,
            Some("up") => Press::Up,
            Some(COUNT_REPEAT) => Press::Click(Repeat::Count),
            Some(n) => Press::Click(Repeat::Times(n.parse::<u32>().map_err(|_| {
                GrammarError::config(format!("bad repeat '{}' in '{}'", n, spec))
            })?)),
        };

        Ok(Self {
            modifiers,
            key,
            press,
            pause_cs,
        })
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.modifiers.is_empty() {
            for m in &self.modifiers {
                write!(f, "{}", m.flag())?;
            }
            f.write_str("-")?;
        }
        write!(f, "{}", self.key)?;
        if self.pause_cs > 0 {
            write!(f, "/{}", self.pause_cs)?;
        }
        match self.press {
            Press::Click(Repeat::Times(1)) => Ok(()),
            Press::Click(Repeat::Times(n)) => write!(f, ":{}", n),
            Press::Click(Repeat::Count) => write!(f, ":{}", COUNT_REPEAT),
            Press::Down => f.write_str(":down"),
            Press::Up => f.write_str(":up"),
        }
    }
}

/// Something a phrase does when executed
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Action {
    Keys(Vec<KeyStroke>),
    Text(String),
    Sequence(Vec<Action>),
    /// Does nothing; executing it makes no injector call
    #[default]
    Nothing,
}

impl Action {
    /// Parse a full key specification (`escape, escape, d, d`)
    pub fn keys(spec: &str) -> Result<Self> {
        let strokes = spec
            .split(',')
            .map(KeyStroke::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Action::Keys(strokes))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Action::Text(text.into())
    }

    /// Append another action, flattening sequences
    pub fn then(self, next: Action) -> Action {
        let mut parts = match self {
            Action::Nothing => return next,
            Action::Sequence(parts) => parts,
            other => vec![other],
        };
        match next {
            Action::Nothing => {}
            Action::Sequence(more) => parts.extend(more),
            other => parts.push(other),
        }
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Action::Sequence(parts)
        }
    }

    /// Repeat this action `times` times in a row
    pub fn repeated(self, times: u32) -> Action {
        match times {
            0 => Action::Nothing,
            1 => self,
            n => Action::Sequence((0..n).map(|_| self.clone()).collect()),
        }
    }

    /// Whether this action has a slot for the spoken count
    pub fn uses_count(&self) -> bool {
        match self {
            Action::Keys(strokes) => strokes
                .iter()
                .any(|s| s.press == Press::Click(Repeat::Count)),
            Action::Text(text) => text.contains(COUNT_PLACEHOLDER),
            Action::Sequence(parts) => parts.iter().any(Action::uses_count),
            Action::Nothing => false,
        }
    }

    /// Replace count slots with a resolved count
    pub fn bind_count(&self, count: u32) -> Action {
        match self {
            Action::Keys(strokes) => Action::Keys(
                strokes
                    .iter()
                    .map(|s| {
                        let mut s = s.clone();
                        if s.press == Press::Click(Repeat::Count) {
                            s.press = Press::Click(Repeat::Times(count));
                        }
                        s
                    })
                    .collect(),
            ),
            Action::Text(text) => Action::Text(text.replace(COUNT_PLACEHOLDER, &count.to_string())),
            Action::Sequence(parts) => {
                Action::Sequence(parts.iter().map(|p| p.bind_count(count)).collect())
            }
            Action::Nothing => Action::Nothing,
        }
    }

    /// Run the action against an injection backend
    pub fn perform<I: Injector + ?Sized>(&self, injector: &mut I) -> std::result::Result<(), InjectionError> {
        match self {
            Action::Keys(strokes) => {
                for stroke in strokes {
                    let repeat = match stroke.press {
                        Press::Click(Repeat::Times(n)) => n,
                        Press::Click(Repeat::Count) => {
                            tracing::debug!("Unbound count in '{}', pressing once", stroke);
                            1
                        }
                        Press::Down | Press::Up => 1,
                    };
                    injector.send_key(stroke, repeat)?;
                }
                Ok(())
            }
            Action::Text(text) => {
                if text.is_empty() {
                    return Ok(());
                }
                injector.insert_text(text)
            }
            Action::Sequence(parts) => {
                for part in parts {
                    part.perform(injector)?;
                }
                Ok(())
            }
            Action::Nothing => Ok(()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Keys(strokes) => {
                for stroke in strokes {
                    write!(f, "<{}>", stroke)?;
                }
                Ok(())
            }
            Action::Text(text) => f.write_str(text),
            Action::Sequence(parts) => {
                for part in parts {
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
            Action::Nothing => Ok(()),
        }
    }
}

//! Input injection backends
//!
//! The executor only ever calls two primitives: send a key stroke with a
//! repeat count, and insert literal text. Backends:
//! - **EnigoInjector**: real keyboard events through enigo, with text typed
//!   directly or pasted through the clipboard
//! - **RecordingInjector**: remembers every call (tests, dry runs)
//! - **LoggingInjector**: prints every call instead of touching the OS

use arboard::Clipboard;
use enigo::{Direction, Enigo, Key as EnigoKey, Keyboard, Settings};
use serde::Deserialize;
use std::thread;
use std::time::Duration;

use crate::action::{KeyCode, KeyStroke, Modifier, Press};
use crate::error::InjectionError;

/// The effect boundary: everything vimvox does to the outside world goes through here
pub trait Injector {
    /// Send one key stroke (with its modifiers) `repeat` times
    fn send_key(&mut self, stroke: &KeyStroke, repeat: u32) -> Result<(), InjectionError>;

    /// Insert literal text at the cursor
    fn insert_text(&mut self, text: &str) -> Result<(), InjectionError>;
}

/// How text gets into the focused application
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    /// Emulate keypresses for each character
    #[default]
    Direct,
    /// Copy to clipboard, then paste with Cmd/Ctrl+V
    Clipboard,
}

fn to_enigo_key(key: KeyCode) -> EnigoKey {
    match key {
        KeyCode::Escape => EnigoKey::Escape,
        KeyCode::Enter => EnigoKey::Return,
        KeyCode::Tab => EnigoKey::Tab,
        KeyCode::Space => EnigoKey::Space,
        KeyCode::Backspace => EnigoKey::Backspace,
        KeyCode::Delete => EnigoKey::Delete,
        KeyCode::Up => EnigoKey::UpArrow,
        KeyCode::Down => EnigoKey::DownArrow,
        KeyCode::Left => EnigoKey::LeftArrow,
        KeyCode::Right => EnigoKey::RightArrow,
        KeyCode::Home => EnigoKey::Home,
        KeyCode::End => EnigoKey::End,
        KeyCode::PageUp => EnigoKey::PageUp,
        KeyCode::PageDown => EnigoKey::PageDown,
        KeyCode::Control => EnigoKey::Control,
        KeyCode::Shift => EnigoKey::Shift,
        KeyCode::Alt => EnigoKey::Alt,
        KeyCode::F(n) => match n {
            1 => EnigoKey::F1,
            2 => EnigoKey::F2,
            3 => EnigoKey::F3,
            4 => EnigoKey::F4,
            5 => EnigoKey::F5,
            6 => EnigoKey::F6,
            7 => EnigoKey::F7,
            8 => EnigoKey::F8,
            9 => EnigoKey::F9,
            10 => EnigoKey::F10,
            11 => EnigoKey::F11,
            _ => EnigoKey::F12,
        },
        KeyCode::Char(c) => EnigoKey::Unicode(c),
    }
}

fn to_enigo_modifier(modifier: Modifier) -> EnigoKey {
    match modifier {
        Modifier::Control => EnigoKey::Control,
        Modifier::Shift => EnigoKey::Shift,
        Modifier::Alt => EnigoKey::Alt,
        Modifier::Super => EnigoKey::Meta,
    }
}

fn keyboard_error(context: &str, e: impl std::fmt::Display) -> InjectionError {
    InjectionError::Keyboard(format!("{}: {}", context, e))
}

/// Whether a failed paste left the target untouched, so typing the text is safe.
/// Clipboard errors happen before the paste keys; keyboard errors may come after.
fn nothing_sent(err: &InjectionError) -> bool {
    matches!(err, InjectionError::Clipboard(_))
}

/// Keyboard injection through enigo
pub struct EnigoInjector {
    enigo: Enigo,
    clipboard: Option<Clipboard>,
    method: InputMethod,
    key_delay: Duration,
}

impl EnigoInjector {
    pub fn new(method: InputMethod, key_delay_ms: u64) -> Result<Self, InjectionError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| keyboard_error("Failed to initialize Enigo", e))?;

        let clipboard = match method {
            InputMethod::Direct => None,
            InputMethod::Clipboard => match Clipboard::new() {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!("Clipboard unavailable ({}), typing text directly", e);
                    None
                }
            },
        };

        Ok(Self {
            enigo,
            clipboard,
            method,
            key_delay: Duration::from_millis(key_delay_ms),
        })
    }

    /// Get the platform-specific paste modifier (Cmd on macOS, Ctrl elsewhere)
    fn paste_modifier() -> EnigoKey {
        #[cfg(target_os = "macos")]
        {
            EnigoKey::Meta
        }
        #[cfg(not(target_os = "macos"))]
        {
            EnigoKey::Control
        }
    }

    fn click_with_modifiers(&mut self, modifiers: &[EnigoKey], key: EnigoKey) -> Result<(), InjectionError> {
        for modifier in modifiers {
            self.enigo
                .key(modifier.clone(), Direction::Press)
                .map_err(|e| keyboard_error("Failed to press modifier", e))?;
        }

        let result = self
            .enigo
            .key(key, Direction::Click)
            .map_err(|e| keyboard_error("Failed to click key", e));

        // Release even if the click failed so no modifier stays stuck
        for modifier in modifiers.iter().rev() {
            self.enigo
                .key(modifier.clone(), Direction::Release)
                .map_err(|e| keyboard_error("Failed to release modifier", e))?;
        }

        result
    }

    fn type_direct(&mut self, text: &str) -> Result<(), InjectionError> {
        self.enigo
            .text(text)
            .map_err(|e| keyboard_error("Failed to type text", e))
    }

    fn type_via_clipboard(&mut self, text: &str) -> Result<(), InjectionError> {
        let Some(clipboard) = self.clipboard.as_mut() else {
            return Err(InjectionError::Clipboard("no clipboard".to_string()));
        };

        let old_content = clipboard.get_text().ok();
        clipboard
            .set_text(text)
            .map_err(|e| InjectionError::Clipboard(format!("Failed to set clipboard: {}", e)))?;

        thread::sleep(Duration::from_millis(50));
        let pasted = self.click_with_modifiers(&[Self::paste_modifier()], EnigoKey::Unicode('v'));
        thread::sleep(Duration::from_millis(100));

        // Restore old clipboard content (best effort)
        if let (Some(old), Some(clipboard)) = (old_content, self.clipboard.as_mut()) {
            let _ = clipboard.set_text(old);
        }

        pasted
    }
}

impl Injector for EnigoInjector {
    fn send_key(&mut self, stroke: &KeyStroke, repeat: u32) -> Result<(), InjectionError> {
        let key = to_enigo_key(stroke.key);
        let modifiers: Vec<EnigoKey> = stroke.modifiers.iter().map(|m| to_enigo_modifier(*m)).collect();
        let pause = Duration::from_millis(stroke.pause_cs as u64 * 10);

        match stroke.press {
            Press::Down => self
                .enigo
                .key(key, Direction::Press)
                .map_err(|e| keyboard_error("Failed to hold key", e))?,
            Press::Up => self
                .enigo
                .key(key, Direction::Release)
                .map_err(|e| keyboard_error("Failed to release key", e))?,
            Press::Click(_) => {
                for _ in 0..repeat {
                    self.click_with_modifiers(&modifiers, key.clone())?;
                    if !pause.is_zero() {
                        thread::sleep(pause);
                    }
                }
            }
        }

        if !self.key_delay.is_zero() {
            thread::sleep(self.key_delay);
        }
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), InjectionError> {
        match self.method {
            InputMethod::Direct => self.type_direct(text),
            InputMethod::Clipboard => match self.type_via_clipboard(text) {
                Err(e) if nothing_sent(&e) => {
                    tracing::warn!("Clipboard method failed: {}, trying direct", e);
                    self.type_direct(text)
                }
                result => result,
            },
        }
    }
}

/// Records every primitive call as a string (`key:<stroke>xN` / `text:<text>`)
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pub calls: Vec<String>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Injector for RecordingInjector {
    fn send_key(&mut self, stroke: &KeyStroke, repeat: u32) -> Result<(), InjectionError> {
        self.calls.push(format!("key:{}x{}", stroke.combo(), repeat));
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), InjectionError> {
        self.calls.push(format!("text:{}", text));
        Ok(())
    }
}

/// Prints what would be injected; used by `--dry-run`
#[derive(Debug, Default)]
pub struct LoggingInjector;

impl Injector for LoggingInjector {
    fn send_key(&mut self, stroke: &KeyStroke, repeat: u32) -> Result<(), InjectionError> {
        tracing::debug!(stroke = %stroke, repeat, "send_key");
        println!("key  {} x{}", stroke.combo(), repeat);
        Ok(())
    }

    fn insert_text(&mut self, text: &str) -> Result<(), InjectionError> {
        tracing::debug!(text, "insert_text");
        println!("text {:?}", text);
        Ok(())
    }
}

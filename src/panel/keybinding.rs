//! Key bindings
//!
//! A binding is a set of key definitions plus an action. Leaf panels resolve
//! bindings in two passes around their widget: `overrides` bindings get first
//! refusal, the rest only see keys the widget left unclaimed.

use super::Update;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt;
use std::rc::Rc;

/// One accepted key chord. `KeyCode::Char` carries the literal character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDef {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyDef {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Exact match on code and modifiers. For characters SHIFT is already
    /// folded into the character itself (terminals report `G` with SHIFT set),
    /// so it is ignored on both sides.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.code != event.code {
            return false;
        }
        match self.code {
            KeyCode::Char(_) => {
                self.modifiers.difference(KeyModifiers::SHIFT)
                    == event.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => self.modifiers == event.modifiers,
        }
    }

    /// Human label for help bars, e.g. `C-n`, `Tab`, `q`
    pub fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            other => format!("{other:?}"),
        };
        let mut prefix = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            prefix.push_str("C-");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            prefix.push_str("M-");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) && !matches!(self.code, KeyCode::Char(_)) {
            prefix.push_str("S-");
        }
        format!("{prefix}{key}")
    }
}

impl From<KeyCode> for KeyDef {
    fn from(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

/// What a binding does when it fires
pub type Action = Rc<dyn Fn() -> Update>;

#[derive(Clone)]
pub struct KeyBinding {
    pub keys: Vec<KeyDef>,
    pub enabled: bool,
    /// Resolved before the inner widget sees the key
    pub overrides: bool,
    pub short_help: String,
    pub long_help: String,
    action: Option<Action>,
}

impl KeyBinding {
    pub fn new(keys: impl IntoIterator<Item = KeyDef>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            enabled: true,
            overrides: false,
            short_help: String::new(),
            long_help: String::new(),
            action: None,
        }
    }

    pub fn key(key: impl Into<KeyDef>) -> Self {
        Self::new([key.into()])
    }

    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_help(mut self, short: impl Into<String>, long: impl Into<String>) -> Self {
        self.short_help = short.into();
        self.long_help = long.into();
        self
    }

    pub fn on(mut self, action: impl Fn() -> Update + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn set_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    /// A binding without keys can never fire
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.keys.is_empty()
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.is_enabled() && self.keys.iter().any(|k| k.matches(event))
    }

    pub fn action(&self) -> Option<Action> {
        self.action.clone()
    }

    /// Run the action; a binding without one does nothing
    pub fn fire(&self) -> Update {
        self.action.as_ref().map(|f| f()).unwrap_or_default()
    }

    /// `C-n/C-p next panel`
    pub fn help_label(&self) -> String {
        let keys: Vec<String> = self.keys.iter().map(|k| k.label()).collect();
        if self.short_help.is_empty() {
            keys.join("/")
        } else {
            format!("{} {}", keys.join("/"), self.short_help)
        }
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("keys", &self.keys)
            .field("enabled", &self.enabled)
            .field("overrides", &self.overrides)
            .field("short_help", &self.short_help)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::Msg;
    use std::cell::Cell;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn matches_code_and_modifiers_exactly() {
        let kb = KeyBinding::key(KeyDef::ctrl('n'));
        assert!(kb.matches(&press(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert!(!kb.matches(&press(KeyCode::Char('n'), KeyModifiers::NONE)));
        assert!(!kb.matches(&press(KeyCode::Char('m'), KeyModifiers::CONTROL)));
        assert!(!kb.matches(&press(
            KeyCode::Char('n'),
            KeyModifiers::CONTROL | KeyModifiers::ALT
        )));
    }

    #[test]
    fn literal_character_must_match() {
        let kb = KeyBinding::key(KeyDef::char('q'));
        assert!(kb.matches(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!kb.matches(&press(KeyCode::Char('Q'), KeyModifiers::NONE)));
    }

    #[test]
    fn uppercase_characters_match_with_shift_reported() {
        let kb = KeyBinding::key(KeyDef::char('G'));
        assert!(kb.matches(&press(KeyCode::Char('G'), KeyModifiers::SHIFT)));
        assert!(kb.matches(&press(KeyCode::Char('G'), KeyModifiers::NONE)));
        assert!(!kb.matches(&press(KeyCode::Char('g'), KeyModifiers::SHIFT)));
        assert!(!kb.matches(&press(
            KeyCode::Char('G'),
            KeyModifiers::SHIFT | KeyModifiers::CONTROL
        )));

        // SHIFT still counts for non-character keys
        let tab = KeyBinding::key(KeyCode::Tab);
        assert!(!tab.matches(&press(KeyCode::Tab, KeyModifiers::SHIFT)));
    }

    #[test]
    fn keyless_or_disabled_bindings_never_match() {
        let empty = KeyBinding::new([]);
        assert!(!empty.is_enabled());
        assert!(!empty.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));

        let off = KeyBinding::key(KeyCode::Enter).disabled();
        assert!(!off.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn fire_runs_the_action() {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let kb = KeyBinding::key(KeyCode::Tab).on(move || {
            seen.set(seen.get() + 1);
            Update::up(Msg::Quit)
        });

        let update = kb.fire();
        assert_eq!(count.get(), 1);
        assert!(matches!(update.up.as_slice(), [Msg::Quit]));

        let silent = KeyBinding::key(KeyCode::Tab);
        assert!(silent.fire().is_empty());
    }

    #[test]
    fn labels_for_help() {
        assert_eq!(KeyDef::ctrl('n').label(), "C-n");
        assert_eq!(KeyDef::from(KeyCode::Tab).label(), "Tab");
        assert_eq!(KeyDef::char(' ').label(), "Space");
        let kb = KeyBinding::new([KeyDef::ctrl('n'), KeyDef::ctrl('p')]).with_help("move", "");
        assert_eq!(kb.help_label(), "C-n/C-p move");
    }
}

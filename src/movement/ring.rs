//! Tab focus ring: cycle focus through panels in insertion order

use crate::panel::{KeyBinding, KeyDef, PanelHandle, Update};
use crossterm::event::KeyCode;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct FocusRing {
    panels: Rc<RefCell<Vec<PanelHandle>>>,
    key: KeyDef,
}

impl Default for FocusRing {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusRing {
    pub fn new() -> Self {
        Self::with_key(KeyDef::from(KeyCode::Tab))
    }

    pub fn with_key(key: KeyDef) -> Self {
        Self {
            panels: Rc::new(RefCell::new(Vec::new())),
            key,
        }
    }

    /// Add `panel` and return the binding that moves focus on from it
    ///
    /// The binding resolves by identity, so removing other panels later keeps
    /// it pointing at the right successor.
    pub fn add(&self, panel: &PanelHandle) -> KeyBinding {
        self.panels.borrow_mut().push(panel.clone());
        let ring = self.clone();
        let from = panel.clone();
        KeyBinding::key(self.key)
            .with_help("next panel", "Move focus to the next panel")
            .on(move || match ring.next_after(&from) {
                Some(next) => Update::up(next.focus_request()),
                None => Update::none(),
            })
    }

    /// Add `panel` and install its binding directly
    pub fn attach(&self, panel: &PanelHandle) {
        panel.add_key_binding(self.add(panel));
    }

    pub fn remove(&self, panel: &PanelHandle) {
        self.panels.borrow_mut().retain(|p| p != panel);
    }

    pub fn len(&self) -> usize {
        self.panels.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.borrow().is_empty()
    }

    /// Successor of `panel`, wrapping; `None` once `panel` left the ring
    pub fn next_after(&self, panel: &PanelHandle) -> Option<PanelHandle> {
        let panels = self.panels.borrow();
        let index = panels.iter().position(|p| p == panel)?;
        panels.get((index + 1) % panels.len()).cloned()
    }
}

//! Shared panel identity
//!
//! Movement graphs and focus rings are built after the tree is assembled and
//! must keep pointing at the same panel when paths are reassigned. A
//! [`PanelHandle`] is that identity: the leaf and every graph node hold clones
//! of the same `Rc`, so the graph reads live paths and hidden-tab flags and can
//! install bindings the leaf resolves on its next key.

use super::keybinding::KeyBinding;
use crate::msg::{Msg, Path};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct Inner {
    id: u64,
    name: String,
    path: RefCell<Path>,
    hidden_in_tab: Cell<bool>,
    focused: Cell<bool>,
    bindings: RefCell<Vec<KeyBinding>>,
}

#[derive(Clone)]
pub struct PanelHandle(Rc<Inner>);

impl PanelHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Rc::new(Inner {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            path: RefCell::new(Vec::new()),
            hidden_in_tab: Cell::new(false),
            focused: Cell::new(false),
            bindings: RefCell::new(Vec::new()),
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn path(&self) -> Path {
        self.0.path.borrow().clone()
    }

    pub(crate) fn set_path(&self, path: &[usize]) {
        let mut current = self.0.path.borrow_mut();
        current.clear();
        current.extend_from_slice(path);
    }

    /// Whether a stacked ancestor currently shows another tab
    pub fn is_hidden_in_tab(&self) -> bool {
        self.0.hidden_in_tab.get()
    }

    pub(crate) fn set_hidden_in_tab(&self, hidden: bool) {
        self.0.hidden_in_tab.set(hidden);
    }

    pub fn is_focused(&self) -> bool {
        self.0.focused.get()
    }

    pub(crate) fn set_focused(&self, focused: bool) {
        self.0.focused.set(focused);
    }

    pub fn add_key_binding(&self, binding: KeyBinding) {
        self.0.bindings.borrow_mut().push(binding);
    }

    /// Drop every binding whose first key equals `binding`'s
    pub fn remove_key_binding(&self, binding: &KeyBinding) {
        self.0
            .bindings
            .borrow_mut()
            .retain(|kb| kb.keys.first() != binding.keys.first());
    }

    /// Snapshot of the bindings, safe to iterate while actions run
    pub fn key_bindings(&self) -> Vec<KeyBinding> {
        self.0.bindings.borrow().clone()
    }

    /// A `Self` focus request for this panel's current path
    pub fn focus_request(&self) -> Msg {
        Msg::focus(self.path())
    }
}

impl PartialEq for PanelHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for PanelHandle {}

impl Hash for PanelHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandle")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("path", &*self.0.path.borrow())
            .field("hidden_in_tab", &self.0.hidden_in_tab.get())
            .finish()
    }
}

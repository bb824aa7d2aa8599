//! Messages exchanged between panels, ancestors and the root controller
//!
//! Every value flowing through the panel tree is a [`Msg`]. The routing layer
//! never inspects application data: widgets wrap their own messages in a
//! [`Payload`] and the tree only looks at the envelope.
//!
//! # Message families
//!
//! ```text
//! Request          → root controller only (focus requests, help text, unused keys, quit)
//! FocusPropagated  → along the live focus chain (raw keys)
//! Routed           → one node, addressed by path
//! Broadcast        → every node in the subtree
//! Untyped          → not recognised by the routing layer
//! ```
//!
//! See [`classify`] for the mapping from message to family.

mod classify;
mod command;

pub use classify::{classify, Handling};
pub use command::{Command, Task};

use crossterm::event::KeyEvent;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Position of a node from the root: child indices, outermost first.
/// The root's path is empty.
pub type Path = Vec<usize>;

/// Relation between a focus request and the panel that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Focus exactly the requested path
    Itself,
    Up,
    Down,
    Left,
    Right,
}

impl Relation {
    /// Whether this relation must be resolved geometrically by an ancestor
    pub fn is_directional(self) -> bool {
        !matches!(self, Relation::Itself)
    }
}

/// Ask the root to move focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub path: Path,
    pub relation: Relation,
}

impl FocusRequest {
    /// Request focus for exactly `path`
    pub fn to(path: Path) -> Self {
        Self {
            path,
            relation: Relation::Itself,
        }
    }

    /// Request focus for the neighbour of `path` in `relation` direction
    pub fn towards(path: Path, relation: Relation) -> Self {
        Self { path, relation }
    }
}

/// Grant focus to the node at `path` (broadcast when the path is empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusGrant {
    pub path: Path,
}

/// A raw key event inside the routing protocol
///
/// Clones share a single claim flag: whichever consumer calls
/// [`KeyMsg::claim`] first owns the key, every later claim fails.
#[derive(Clone)]
pub struct KeyMsg {
    pub event: KeyEvent,
    /// Monotonic id assigned by the root when the key arrived
    pub id: u64,
    pub received_at: Instant,
    used: Arc<AtomicBool>,
}

impl KeyMsg {
    /// Wrap a raw key event with a fresh, unclaimed flag
    pub fn new(event: KeyEvent, id: u64) -> Self {
        Self {
            event,
            id,
            received_at: Instant::now(),
            used: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Claim the key. Returns `true` only for the first claimant.
    pub fn claim(&self) -> bool {
        self.used
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::Acquire)
    }
}

impl fmt::Debug for KeyMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMsg")
            .field("code", &self.event.code)
            .field("modifiers", &self.event.modifiers)
            .field("id", &self.id)
            .field("used", &self.is_used())
            .finish()
    }
}

/// Opaque application data carried through the tree
#[derive(Clone)]
pub struct Payload(Arc<dyn Any + Send + Sync>);

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Payload(..)")
    }
}

/// Every message understood by the panel tree
#[derive(Debug, Clone)]
pub enum Msg {
    // ── Requests (root only) ────────────────────────────────────────────────
    /// A panel wants focus moved
    FocusRequest(FocusRequest),
    /// The focused panel's contextual help text
    ContextualHelp(String),
    /// A key travelled the focus chain without being claimed
    KeyUnused(KeyMsg),
    /// Stop the event loop
    Quit,

    // ── Focus propagated ────────────────────────────────────────────────────
    Key(KeyMsg),

    // ── Routed or broadcast, depending on the carried path ──────────────────
    FocusGrant(FocusGrant),
    /// Offer a key to the local shortcuts below `path`
    LocalShortcut { path: Path, key: KeyMsg },

    // ── Routed ──────────────────────────────────────────────────────────────
    /// Application message addressed to the panel at `path`
    Routed { path: Path, payload: Payload },

    // ── Broadcast ───────────────────────────────────────────────────────────
    FocusRevoke,
    /// Offer an unclaimed key to every panel's global shortcut
    GlobalShortcut(KeyMsg),
    /// Ask the stacked container named `container` to show tab `index`
    SelectTab { container: String, index: usize },
    /// A stacked container switched tabs
    TabSelected { container: String, index: usize },
    /// Help text of the newly focused panel, for status displays
    HelpText(String),
    /// Application message for every panel
    Broadcast(Payload),

    // ── Untyped ─────────────────────────────────────────────────────────────
    Custom(Payload),
}

impl Msg {
    /// Shorthand for a `Self` focus request
    pub fn focus(path: Path) -> Self {
        Msg::FocusRequest(FocusRequest::to(path))
    }

    pub fn custom<T: Any + Send + Sync>(value: T) -> Self {
        Msg::Custom(Payload::new(value))
    }

    /// Application payload, if this message carries one
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Msg::Routed { payload, .. } | Msg::Broadcast(payload) | Msg::Custom(payload) => {
                Some(payload)
            }
            _ => None,
        }
    }

    /// Short variant name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::FocusRequest(_) => "FocusRequest",
            Msg::ContextualHelp(_) => "ContextualHelp",
            Msg::KeyUnused(_) => "KeyUnused",
            Msg::Quit => "Quit",
            Msg::Key(_) => "Key",
            Msg::FocusGrant(_) => "FocusGrant",
            Msg::LocalShortcut { .. } => "LocalShortcut",
            Msg::Routed { .. } => "Routed",
            Msg::FocusRevoke => "FocusRevoke",
            Msg::GlobalShortcut(_) => "GlobalShortcut",
            Msg::SelectTab { .. } => "SelectTab",
            Msg::TabSelected { .. } => "TabSelected",
            Msg::HelpText(_) => "HelpText",
            Msg::Broadcast(_) => "Broadcast",
            Msg::Custom(_) => "Custom",
        }
    }
}

//! Panel tree
//!
//! A tree of rectangular nodes. Containers arrange children horizontally,
//! vertically or stacked (tabs); leaf panels wrap a [`Widget`].
//!
//! # Architecture
//!
//! ```text
//!                      Root controller
//!                            │  Msg ▼        ▲ Update.up
//!                  ┌─────────────────────────────┐
//!                  │  Container []  (vertical)   │
//!                  └─────────────────────────────┘
//!                      │                   │
//!              ┌──────────────┐   ┌──────────────────┐
//!              │ Panel [0]    │   │ Container [1]    │
//!              │  └ Widget    │   │  (stacked)       │
//!              └──────────────┘   └──────────────────┘
//!                                    │            │
//!                              Panel [1,0]   Panel [1,1]
//! ```
//!
//! Messages travel down by [`classify`](crate::msg::classify) category.
//! Answers travel up as [`Update::up`]: each container may rewrite them (for
//! example resolving a directional focus request into a sibling's path)
//! before they reach the root. Deferred work travels as [`Update::cmds`].
//!
//! # Capabilities
//!
//! - [`Node`] - everything the tree and the root need from a node
//! - [`Widget`] - the content a leaf panel draws and updates
//! - [`PanelHandle`] - stable identity shared with movement graphs

mod container;
mod handle;
mod keybinding;
mod leaf;
mod style;
mod widget;

#[cfg(test)]
mod tests;

pub use container::{Container, FocusMode};
pub use handle::PanelHandle;
pub use keybinding::{Action, KeyBinding, KeyDef};
pub use leaf::{Movement, Panel};
pub use style::{truncate_to_width, PanelStyle};
pub use widget::{RenderContext, Widget};

use crate::msg::{Command, Msg};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// Result of handling a message: answers for the parent plus deferred work
#[derive(Debug, Default)]
pub struct Update {
    /// Messages for the parent, eventually the root
    pub up: Vec<Msg>,
    pub cmds: Vec<Command>,
}

impl Update {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn up(msg: Msg) -> Self {
        Self {
            up: vec![msg],
            cmds: Vec::new(),
        }
    }

    pub fn cmd(cmd: Command) -> Self {
        Self {
            up: Vec::new(),
            cmds: vec![cmd],
        }
    }

    pub fn with_up(mut self, msg: Msg) -> Self {
        self.up.push(msg);
        self
    }

    pub fn with_cmd(mut self, cmd: Command) -> Self {
        self.cmds.push(cmd);
        self
    }

    pub fn merge(&mut self, other: Update) {
        self.up.extend(other.up);
        self.cmds.extend(other.cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.cmds.is_empty()
    }
}

/// A node of the panel tree
///
/// The tree is owned and mutated by a single control task; implementations
/// are free to hold `Rc`/`RefCell` state.
pub trait Node {
    fn name(&self) -> &str;

    /// Position from the root; empty for the root
    fn path(&self) -> &[usize];

    /// Assign this node's path and recurse with `path + [i]`
    fn set_path(&mut self, path: &[usize]);

    /// Initialise children first, then validate this node's own layout
    fn init(&mut self) -> anyhow::Result<Update>;

    fn handle_message(&mut self, msg: &Msg) -> Update;

    /// Take ownership of `area` and lay out children inside it
    fn handle_size(&mut self, area: Rect) -> Update;

    /// Draw into `buf` if anything changed (or `force`); returns whether it did
    fn draw(&mut self, buf: &mut Buffer, force: bool) -> bool;

    /// Holds focus itself or has a focused descendant
    fn is_focused(&self) -> bool;

    /// A stacked ancestor is showing another tab
    fn set_hidden_in_tab(&mut self, hidden: bool);

    /// Region from the last [`Node::handle_size`]
    fn area(&self) -> Rect;

    /// Append the handles of every leaf below this node, in tree order
    fn collect_handles(&self, out: &mut Vec<PanelHandle>);
}

/// Child path `parent + [index]`
pub(crate) fn child_path(parent: &[usize], index: usize) -> Vec<usize> {
    let mut path = Vec::with_capacity(parent.len() + 1);
    path.extend_from_slice(parent);
    path.push(index);
    path
}

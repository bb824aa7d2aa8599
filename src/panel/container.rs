//! Container node: arranges children and routes messages between them
//!
//! # Routing
//!
//! ```text
//! Request          → dropped (only the root handles requests)
//! FocusPropagated  → the focused child, or own bindings when holding focus
//! Routed(path)     → children[path[depth]], or own handler when consumed
//! Broadcast        → every child, then own handler
//! Untyped          → dropped
//! ```
//!
//! Answers from children pass through [`Container::absorb`] on their way up,
//! where directional focus requests matching this container's orientation are
//! resolved into a sibling's path.

use super::handle::PanelHandle;
use super::keybinding::KeyBinding;
use super::style::PanelStyle;
use super::{child_path, Node, Update};
use crate::layout::{calculate_dimensions, Dimension, Layout, Orientation};
use crate::msg::{classify, Command, FocusGrant, FocusRequest, Handling, KeyMsg, Msg, Path, Relation};
use anyhow::Context;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Clear, Widget as _};

/// Where a focus grant addressed to the container ends up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusMode {
    /// Forward to the selected (stacked) or first child
    #[default]
    Delegate,
    /// Keep focus on the container; keys resolve against its own bindings
    Hold,
}

pub struct Container {
    name: String,
    path: Vec<usize>,
    children: Vec<Box<dyn Node>>,
    layout: Layout,
    selected: usize,
    focus_mode: FocusMode,
    holds_focus: bool,
    focus_within: bool,
    hidden: bool,
    bindings: Vec<KeyBinding>,
    style: PanelStyle,
    title: String,
    area: Rect,
    dirty: bool,
}

impl Container {
    pub fn new(name: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
            children: Vec::new(),
            layout: Layout::new(orientation),
            selected: 0,
            focus_mode: FocusMode::default(),
            holds_focus: false,
            focus_within: false,
            hidden: false,
            bindings: Vec::new(),
            style: PanelStyle::default(),
            title: String::new(),
            area: Rect::default(),
            dirty: true,
        }
    }

    pub fn horizontal(name: impl Into<String>) -> Self {
        Self::new(name, Orientation::Horizontal)
    }

    pub fn vertical(name: impl Into<String>) -> Self {
        Self::new(name, Orientation::Vertical)
    }

    pub fn stacked(name: impl Into<String>) -> Self {
        Self::new(name, Orientation::Stacked)
    }

    pub fn with_child(mut self, node: impl Node + 'static, dimension: Dimension) -> Self {
        self.children.push(Box::new(node));
        self.layout.dimensions.push(dimension);
        self
    }

    /// Add a tab; stacked containers ignore dimensions
    pub fn with_tab(self, node: impl Node + 'static) -> Self {
        self.with_child(node, Dimension::unspecified())
    }

    pub fn with_style(mut self, style: PanelStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_focus_mode(mut self, mode: FocusMode) -> Self {
        self.focus_mode = mode;
        self
    }

    /// Binding resolved while the container itself holds focus
    pub fn with_key_binding(mut self, binding: KeyBinding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.layout.orientation
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, index: usize) -> Option<&dyn Node> {
        self.children.get(index).map(|c| c.as_ref())
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Whether the container itself (not a descendant) holds focus
    pub fn holds_focus(&self) -> bool {
        self.holds_focus
    }

    /// Append a child and reassign paths below this container
    pub fn push(&mut self, node: Box<dyn Node>, dimension: Dimension) {
        self.children.push(node);
        self.layout.dimensions.push(dimension);
        self.restructured();
    }

    /// Remove the child at `index`, shifting later siblings down one
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Node>> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.children.remove(index);
        self.layout.dimensions.remove(index);
        if self.selected >= self.children.len() {
            self.selected = self.children.len().saturating_sub(1);
        } else if index < self.selected {
            self.selected -= 1;
        }
        self.restructured();
        Some(removed)
    }

    fn restructured(&mut self) {
        let path = self.path.clone();
        self.set_path(&path);
        self.apply_tab_visibility();
        self.dirty = true;
    }

    /// Show tab `index` of a stacked container
    ///
    /// Hidden flags follow immediately; the `TabSelected` notification is
    /// delivered through a command. When focus was inside the old tab it
    /// follows to the new one.
    pub fn select(&mut self, index: usize) -> Update {
        if self.layout.orientation != Orientation::Stacked || index >= self.children.len() {
            tracing::trace!(container = %self.name, index, "ignoring tab selection");
            return Update::none();
        }

        let previous = self.selected;
        let had_focus = self.children.get(previous).is_some_and(|c| c.is_focused());
        self.selected = index;
        self.apply_tab_visibility();
        self.dirty = true;
        tracing::debug!(container = %self.name, index, "tab selected");

        let mut update = Update::cmd(Command::message(Msg::TabSelected {
            container: self.name.clone(),
            index,
        }));
        if had_focus && previous != index {
            update.up.push(Msg::focus(child_path(&self.path, index)));
        }
        update
    }

    pub fn next_tab(&mut self) -> Update {
        if self.children.is_empty() {
            return Update::none();
        }
        self.select((self.selected + 1) % self.children.len())
    }

    pub fn prev_tab(&mut self) -> Update {
        let n = self.children.len();
        if n == 0 {
            return Update::none();
        }
        self.select((self.selected + n - 1) % n)
    }

    fn is_stacked(&self) -> bool {
        self.layout.orientation == Orientation::Stacked
    }

    fn apply_tab_visibility(&mut self) {
        let stacked = self.is_stacked();
        let selected = self.selected;
        let hidden = self.hidden;
        for (i, child) in self.children.iter_mut().enumerate() {
            child.set_hidden_in_tab(hidden || (stacked && i != selected));
        }
    }

    fn focused_child(&self) -> Option<usize> {
        self.children.iter().position(|c| c.is_focused())
    }

    /// Sibling path for a directional request, if this container resolves it
    fn resolve_direction(&self, request: &FocusRequest) -> Option<Path> {
        let step: isize = match (self.layout.orientation, request.relation) {
            (Orientation::Horizontal, Relation::Left) | (Orientation::Vertical, Relation::Up) => -1,
            (Orientation::Horizontal, Relation::Right) | (Orientation::Vertical, Relation::Down) => 1,
            _ => return None,
        };

        let origin = request
            .path
            .get(self.path.len())
            .copied()
            .filter(|i| *i < self.children.len() && request.path.starts_with(&self.path))
            .or_else(|| self.focused_child())?;

        let n = self.children.len() as isize;
        let next = (origin as isize + step).rem_euclid(n) as usize;
        Some(child_path(&self.path, next))
    }

    /// Rewrite a child's answers before they travel further up
    fn absorb(&self, mut update: Update) -> Update {
        for msg in update.up.iter_mut() {
            let Msg::FocusRequest(request) = msg else {
                continue;
            };
            if !request.relation.is_directional() {
                continue;
            }
            if let Some(target) = self.resolve_direction(request) {
                tracing::debug!(
                    container = %self.name,
                    from = ?request.path,
                    to = ?target,
                    relation = ?request.relation,
                    "resolved directional focus"
                );
                *request = FocusRequest::to(target);
            }
        }
        update
    }

    fn deliver(&mut self, index: usize, msg: &Msg) -> Update {
        let update = match self.children.get_mut(index) {
            Some(child) => child.handle_message(msg),
            None => {
                tracing::trace!(container = %self.name, index, "no child at index");
                return Update::none();
            }
        };
        self.absorb(update)
    }

    fn take_grant(&mut self) -> Update {
        if self.focus_mode == FocusMode::Hold || self.children.is_empty() {
            if !self.holds_focus {
                self.holds_focus = true;
                self.dirty = true;
            }
            return Update::none();
        }
        let index = if self.is_stacked() { self.selected } else { 0 };
        let grant = Msg::FocusGrant(FocusGrant {
            path: child_path(&self.path, index),
        });
        self.deliver(index, &grant)
    }

    /// Offer `key` to the local shortcuts of every visible child
    fn offer_local_shortcut(&mut self, key: &KeyMsg) -> Update {
        let targets: Vec<usize> = if self.is_stacked() {
            vec![self.selected]
        } else {
            (0..self.children.len()).collect()
        };

        let mut update = Update::none();
        for index in targets {
            if key.is_used() {
                break;
            }
            let msg = Msg::LocalShortcut {
                path: child_path(&self.path, index),
                key: key.clone(),
            };
            update.merge(self.deliver(index, &msg));
        }
        update
    }

    fn handle_own_key(&mut self, msg: &Msg) -> Update {
        let Msg::Key(key) = msg else {
            return Update::none();
        };

        let binding = self.bindings.iter().find(|kb| kb.matches(&key.event)).cloned();
        if let Some(binding) = binding {
            if key.claim() {
                return binding.fire();
            }
        }

        let mut update = self.offer_local_shortcut(key);
        if !key.is_used() {
            update.up.push(Msg::KeyUnused(key.clone()));
        }
        update
    }

    fn handle_local(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::FocusGrant(_) => self.take_grant(),
            Msg::LocalShortcut { key, .. } => self.offer_local_shortcut(key),
            _ => {
                tracing::trace!(container = %self.name, kind = msg.kind(), "no local handler");
                Update::none()
            }
        }
    }

    fn handle_broadcast(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::FocusRevoke => {
                if self.holds_focus {
                    self.holds_focus = false;
                    self.dirty = true;
                }
                Update::none()
            }
            Msg::FocusGrant(grant) if grant.path == self.path => self.take_grant(),
            Msg::SelectTab { container, index } if self.is_stacked() && *container == self.name => {
                self.select(*index)
            }
            _ => Update::none(),
        }
    }

    /// Mark dirty when focus entered or left this subtree
    fn sync_focus(&mut self) {
        let now = self.is_focused();
        if now != self.focus_within {
            self.focus_within = now;
            self.dirty = true;
        }
    }

    fn lay_out(&mut self, inner: Rect) -> Update {
        let mut update = Update::none();
        match self.layout.orientation {
            Orientation::Stacked => {
                for child in self.children.iter_mut() {
                    update.merge(child.handle_size(inner));
                }
            }
            Orientation::Horizontal => {
                let widths = calculate_dimensions(&self.layout.dimensions, inner.width);
                let mut x = inner.x;
                for (child, width) in self.children.iter_mut().zip(widths) {
                    let region = Rect::new(x, inner.y, width, inner.height).intersection(inner);
                    update.merge(child.handle_size(region));
                    x = x.saturating_add(width);
                }
            }
            Orientation::Vertical => {
                let heights = calculate_dimensions(&self.layout.dimensions, inner.height);
                let mut y = inner.y;
                for (child, height) in self.children.iter_mut().zip(heights) {
                    let region = Rect::new(inner.x, y, inner.width, height).intersection(inner);
                    update.merge(child.handle_size(region));
                    y = y.saturating_add(height);
                }
            }
        }
        update
    }
}

impl Node for Container {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &[usize] {
        &self.path
    }

    fn set_path(&mut self, path: &[usize]) {
        self.path = path.to_vec();
        for (i, child) in self.children.iter_mut().enumerate() {
            child.set_path(&child_path(path, i));
        }
    }

    fn init(&mut self) -> anyhow::Result<Update> {
        let mut update = Update::none();
        for child in self.children.iter_mut() {
            update.merge(child.init()?);
        }

        self.layout.validate(self.children.len()).with_context(|| {
            format!(
                "invalid {} layout in container '{}' at path {:?}: [{}]",
                self.layout.orientation.as_str(),
                self.name,
                self.path,
                self.layout.describe()
            )
        })?;

        if self.is_stacked() {
            self.selected = self.selected.min(self.children.len().saturating_sub(1));
        }
        self.apply_tab_visibility();
        Ok(self.absorb(update))
    }

    fn handle_message(&mut self, msg: &Msg) -> Update {
        let update = match classify(msg) {
            Handling::FocusPropagated => {
                if self.holds_focus {
                    self.handle_own_key(msg)
                } else if let Some(index) = self.focused_child() {
                    self.deliver(index, msg)
                } else {
                    tracing::trace!(container = %self.name, "no focused child");
                    Update::none()
                }
            }
            Handling::Routed(target) => {
                let depth = self.path.len();
                if target.len() > depth && target.starts_with(&self.path) {
                    let index = target[depth];
                    self.deliver(index, msg)
                } else if target == self.path.as_slice() {
                    self.handle_local(msg)
                } else {
                    tracing::trace!(container = %self.name, target = ?target, "misrouted message");
                    Update::none()
                }
            }
            Handling::Broadcast => match msg {
                // Hidden tabs never see local shortcuts
                Msg::LocalShortcut { key, .. } => self.offer_local_shortcut(key),
                _ => {
                    let mut update = Update::none();
                    for index in 0..self.children.len() {
                        update.merge(self.deliver(index, msg));
                    }
                    update.merge(self.handle_broadcast(msg));
                    update
                }
            },
            Handling::Request | Handling::Untyped => {
                tracing::trace!(container = %self.name, kind = msg.kind(), "dropped at container");
                Update::none()
            }
        };
        self.sync_focus();
        update
    }

    fn handle_size(&mut self, area: Rect) -> Update {
        self.area = area;
        self.dirty = true;
        let inner = self.style.inner(area);
        let update = self.lay_out(inner);
        self.absorb(update)
    }

    fn draw(&mut self, buf: &mut Buffer, force: bool) -> bool {
        let area = self.area.intersection(buf.area);
        if area.is_empty() {
            self.dirty = false;
            return false;
        }

        let force = force || self.dirty;
        if force {
            Clear.render(area, buf);
        }

        let mut changed = force;
        if self.is_stacked() {
            if let Some(child) = self.children.get_mut(self.selected) {
                changed |= child.draw(buf, force);
            }
        } else {
            for child in self.children.iter_mut() {
                changed |= child.draw(buf, force);
            }
        }

        if changed {
            let focused = self.is_focused();
            self.style.render(area, buf, &self.title, focused);
        }
        self.dirty = false;
        changed
    }

    fn is_focused(&self) -> bool {
        self.holds_focus || self.children.iter().any(|c| c.is_focused())
    }

    fn set_hidden_in_tab(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.apply_tab_visibility();
    }

    fn area(&self) -> Rect {
        self.area
    }

    fn collect_handles(&self, out: &mut Vec<PanelHandle>) {
        for child in &self.children {
            child.collect_handles(out);
        }
    }
}

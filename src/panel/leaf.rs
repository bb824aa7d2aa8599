//! Leaf panel wrapping a widget
//!
//! The panel owns everything routing-related so widgets stay simple:
//!
//! - focus grant/revoke and the border/title switch that goes with it
//! - key arbitration (override bindings → widget → other bindings → movement)
//! - global and local shortcuts that pull focus to this panel
//! - routing widget commands back to this panel's path

use super::handle::PanelHandle;
use super::keybinding::{KeyBinding, KeyDef};
use super::style::PanelStyle;
use super::widget::{RenderContext, Widget};
use super::{Node, Update};
use crate::msg::{classify, FocusRequest, Handling, KeyMsg, Msg, Relation};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Clear, Widget as _};

/// Which arrow keys turn into directional focus requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    /// Left/Right
    pub horizontal: bool,
    /// Up/Down
    pub vertical: bool,
}

impl Movement {
    pub fn both() -> Self {
        Self {
            horizontal: true,
            vertical: true,
        }
    }

    fn relation_for(&self, event: &KeyEvent) -> Option<Relation> {
        if event.modifiers != KeyModifiers::NONE {
            return None;
        }
        match event.code {
            KeyCode::Left if self.horizontal => Some(Relation::Left),
            KeyCode::Right if self.horizontal => Some(Relation::Right),
            KeyCode::Up if self.vertical => Some(Relation::Up),
            KeyCode::Down if self.vertical => Some(Relation::Down),
            _ => None,
        }
    }
}

pub struct Panel {
    handle: PanelHandle,
    path: Vec<usize>,
    widget: Box<dyn Widget>,
    style: PanelStyle,
    title: String,
    help: String,
    global_shortcut: Option<KeyBinding>,
    local_shortcut: Option<KeyBinding>,
    movement: Movement,
    focused: bool,
    hidden: bool,
    area: Rect,
    inner: Rect,
    dirty: bool,
}

impl Panel {
    pub fn new(name: impl Into<String>, widget: impl Widget + 'static) -> Self {
        Self {
            handle: PanelHandle::new(name),
            path: Vec::new(),
            widget: Box::new(widget),
            style: PanelStyle::default(),
            title: String::new(),
            help: String::new(),
            global_shortcut: None,
            local_shortcut: None,
            movement: Movement::default(),
            focused: false,
            hidden: false,
            area: Rect::default(),
            inner: Rect::default(),
            dirty: true,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_style(mut self, style: PanelStyle) -> Self {
        self.style = style;
        self
    }

    /// Sent to the root as contextual help whenever this panel gains focus
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Focus this panel when `key` reaches the root unclaimed
    pub fn with_global_shortcut(mut self, key: KeyDef) -> Self {
        self.global_shortcut = Some(KeyBinding::key(key));
        self
    }

    /// Focus this panel when `key` is offered to its subtree
    pub fn with_local_shortcut(mut self, key: KeyDef) -> Self {
        self.local_shortcut = Some(KeyBinding::key(key));
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_key_binding(self, binding: KeyBinding) -> Self {
        self.handle.add_key_binding(binding);
        self
    }

    pub fn handle(&self) -> PanelHandle {
        self.handle.clone()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Route widget commands back to this panel
    fn routed(&self, mut update: Update) -> Update {
        let path = self.path.clone();
        update.cmds = update
            .cmds
            .into_iter()
            .map(|cmd| cmd.route_to(path.clone()))
            .collect();
        update
    }

    fn widget_update(&mut self, msg: &Msg) -> Update {
        let update = self.widget.update(msg);
        self.routed(update)
    }

    fn grant(&mut self) -> Update {
        let mut update = Update::none();
        if !self.focused {
            self.focused = true;
            self.handle.set_focused(true);
            self.dirty = true;
            let changed = self.widget.focus_changed(true);
            update.merge(self.routed(changed));
            tracing::debug!(panel = %self.handle.name(), path = ?self.path, "focus granted");
        }
        update.up.push(Msg::ContextualHelp(self.help.clone()));
        update
    }

    fn revoke(&mut self) -> Update {
        if !self.focused {
            return Update::none();
        }
        self.focused = false;
        self.handle.set_focused(false);
        self.dirty = true;
        let changed = self.widget.focus_changed(false);
        self.routed(changed)
    }

    fn shortcut_focus(&self, shortcut: Option<&KeyBinding>, key: &KeyMsg) -> Update {
        match shortcut {
            Some(binding) if binding.matches(&key.event) && key.claim() => {
                Update::up(Msg::focus(self.path.clone()))
            }
            _ => Update::none(),
        }
    }

    /// First binding with the given override flag that matches and wins the claim
    fn fire_binding(&self, key: &KeyMsg, overrides: bool) -> Option<Update> {
        let binding = self
            .handle
            .key_bindings()
            .into_iter()
            .filter(|kb| kb.overrides == overrides)
            .find(|kb| kb.matches(&key.event))?;
        if key.claim() {
            Some(binding.fire())
        } else {
            None
        }
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Update {
        if let Some(update) = self.fire_binding(key, true) {
            return update;
        }

        let mut update = self.widget_update(&Msg::Key(key.clone()));
        if key.is_used() {
            self.dirty = true;
            return update;
        }

        if let Some(fired) = self.fire_binding(key, false) {
            update.merge(fired);
            return update;
        }

        if let Some(relation) = self.movement.relation_for(&key.event) {
            if key.claim() {
                update.up.push(Msg::FocusRequest(FocusRequest::towards(
                    self.path.clone(),
                    relation,
                )));
                return update;
            }
        }

        if !key.is_used() {
            update.up.push(Msg::KeyUnused(key.clone()));
        }
        update
    }

    fn handle_local(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::FocusGrant(_) => self.grant(),
            Msg::LocalShortcut { key, .. } if !self.hidden => {
                self.shortcut_focus(self.local_shortcut.as_ref(), key)
            }
            Msg::LocalShortcut { .. } => Update::none(),
            _ => self.widget_update(msg),
        }
    }

    fn handle_broadcast(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::FocusRevoke => self.revoke(),
            Msg::FocusGrant(grant) if grant.path == self.path => self.grant(),
            Msg::FocusGrant(_) => Update::none(),
            Msg::GlobalShortcut(key) => self.shortcut_focus(self.global_shortcut.as_ref(), key),
            Msg::LocalShortcut { key, .. } if !self.hidden => {
                self.shortcut_focus(self.local_shortcut.as_ref(), key)
            }
            Msg::LocalShortcut { .. } => Update::none(),
            _ => self.widget_update(msg),
        }
    }
}

impl Node for Panel {
    fn name(&self) -> &str {
        self.handle.name()
    }

    fn path(&self) -> &[usize] {
        &self.path
    }

    fn set_path(&mut self, path: &[usize]) {
        self.path = path.to_vec();
        self.handle.set_path(path);
    }

    fn init(&mut self) -> anyhow::Result<Update> {
        let update = self.widget.init();
        Ok(self.routed(update))
    }

    fn handle_message(&mut self, msg: &Msg) -> Update {
        match classify(msg) {
            Handling::FocusPropagated => match msg {
                Msg::Key(key) => self.handle_key(key),
                other => self.widget_update(other),
            },
            Handling::Routed(path) if path == self.path.as_slice() => self.handle_local(msg),
            Handling::Routed(path) => {
                tracing::trace!(panel = %self.handle.name(), target = ?path, "routed message past leaf");
                Update::none()
            }
            Handling::Broadcast => self.handle_broadcast(msg),
            Handling::Request | Handling::Untyped => {
                tracing::trace!(panel = %self.handle.name(), kind = msg.kind(), "dropped at leaf");
                Update::none()
            }
        }
    }

    fn handle_size(&mut self, area: Rect) -> Update {
        self.area = area;
        self.inner = self.style.inner(area);
        self.widget.resize(self.inner);
        self.dirty = true;
        Update::none()
    }

    fn draw(&mut self, buf: &mut Buffer, force: bool) -> bool {
        let area = self.area.intersection(buf.area);
        if area.is_empty() {
            self.dirty = false;
            return false;
        }
        if !(force || self.dirty || self.widget.needs_redraw()) {
            return false;
        }

        Clear.render(area, buf);
        self.style.render(area, buf, &self.title, self.focused);
        let inner = self.inner.intersection(buf.area);
        if !inner.is_empty() {
            let ctx = RenderContext {
                focused: self.focused,
            };
            self.widget.render(inner, buf, &ctx);
        }
        self.dirty = false;
        true
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn set_hidden_in_tab(&mut self, hidden: bool) {
        self.hidden = hidden;
        self.handle.set_hidden_in_tab(hidden);
    }

    fn area(&self) -> Rect {
        self.area
    }

    fn collect_handles(&self, out: &mut Vec<PanelHandle>) {
        out.push(self.handle.clone());
    }
}

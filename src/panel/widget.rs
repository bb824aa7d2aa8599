//! Widget trait - the content inside a leaf panel
//!
//! A widget never sees routing: the leaf [`Panel`](super::Panel) hands it keys
//! from the focus chain, messages routed to the panel's path and broadcasts.
//! Keys are claimed with [`KeyMsg::claim`](crate::msg::KeyMsg::claim); a key
//! the widget leaves unclaimed falls through to the panel's bindings.
//!
//! Commands returned by a widget are routed back to its panel: a
//! `Msg::Custom` result arrives later as `Msg::Routed` with the panel's path.

use super::Update;
use crate::msg::Msg;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

/// Immutable context passed to widgets during rendering
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub focused: bool,
}

pub trait Widget {
    /// Called once when the tree is initialised
    fn init(&mut self) -> Update {
        Update::none()
    }

    /// Handle a message delivered to the owning panel
    fn update(&mut self, msg: &Msg) -> Update;

    /// The content region changed
    fn resize(&mut self, _area: Rect) {}

    /// Draw into `area`; never write outside it
    fn render(&mut self, area: Rect, buf: &mut Buffer, ctx: &RenderContext);

    /// Content changed since the last render
    fn needs_redraw(&self) -> bool {
        false
    }

    /// The owning panel gained or lost focus
    fn focus_changed(&mut self, _focused: bool) -> Update {
        Update::none()
    }
}

//! Static scrollable text

use super::scroll::ScrollState;
use crate::msg::Msg;
use crate::panel::{truncate_to_width, RenderContext, Update, Widget};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

/// Scrolls with `j`/`k` and PageUp/PageDown; arrows are left to panel movement
pub struct TextView {
    lines: Vec<String>,
    scroll: ScrollState,
    height: usize,
    style: Style,
    focused_style: Style,
    dirty: bool,
}

impl TextView {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self {
            lines: text.as_ref().lines().map(str::to_string).collect(),
            scroll: ScrollState::manual(),
            height: 0,
            style: Style::default(),
            focused_style: Style::default().add_modifier(Modifier::BOLD),
            dirty: true,
        }
    }

    pub fn with_style(mut self, style: Style, focused: Style) -> Self {
        self.style = style;
        self.focused_style = focused;
        self
    }

    pub fn set_text(&mut self, text: impl AsRef<str>) {
        self.lines = text.as_ref().lines().map(str::to_string).collect();
        self.scroll.update_dimensions(self.lines.len(), self.height);
        self.dirty = true;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.scroll.offset()
    }
}

impl Widget for TextView {
    fn update(&mut self, msg: &Msg) -> Update {
        let Msg::Key(key) = msg else {
            return Update::none();
        };
        if key.event.modifiers != KeyModifiers::NONE {
            return Update::none();
        }
        let moved = match key.event.code {
            KeyCode::Char('j') => Some(self.scroll.scroll_down()),
            KeyCode::Char('k') => Some(self.scroll.scroll_up()),
            KeyCode::PageDown => Some(self.scroll.page_down()),
            KeyCode::PageUp => Some(self.scroll.page_up()),
            KeyCode::Home => {
                self.scroll.scroll_to_top();
                Some(true)
            }
            _ => None,
        };
        if let Some(moved) = moved {
            if key.claim() && moved {
                self.dirty = true;
            }
        }
        Update::none()
    }

    fn resize(&mut self, area: Rect) {
        self.height = area.height as usize;
        self.scroll.update_dimensions(self.lines.len(), self.height);
        self.dirty = true;
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
        let style = if ctx.focused {
            self.focused_style
        } else {
            self.style
        };
        let (start, end) = self.scroll.visible_range();
        for (row, line) in self.lines[start..end].iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.bottom() {
                break;
            }
            let text = truncate_to_width(line, area.width as usize);
            buf.set_string(area.x, y, text, style);
        }
        self.dirty = false;
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }
}

//! Panel decoration: border and title, switched on focus
//!
//! Decorations only ever touch the outermost ring of cells of a panel's
//! region. Children and widgets are laid out inside [`PanelStyle::inner`].

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Widget};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy)]
pub struct PanelStyle {
    pub borders: bool,
    pub border_type: BorderType,
    pub border: Color,
    pub border_focused: Color,
    pub title: Style,
    pub title_focused: Style,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self::plain()
    }
}

impl PanelStyle {
    /// No decoration; the widget gets the whole region
    pub fn plain() -> Self {
        Self {
            borders: false,
            border_type: BorderType::Plain,
            border: Color::DarkGray,
            border_focused: Color::Cyan,
            title: Style::default().fg(Color::Gray),
            title_focused: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        }
    }

    pub fn bordered() -> Self {
        Self {
            borders: true,
            border_type: BorderType::Rounded,
            ..Self::plain()
        }
    }

    pub fn with_border_type(mut self, border_type: BorderType) -> Self {
        self.border_type = border_type;
        self
    }

    pub fn with_colors(mut self, border: Color, focused: Color) -> Self {
        self.border = border;
        self.border_focused = focused;
        self.title_focused = self.title_focused.fg(focused);
        self
    }

    /// Region left for content once the decoration is drawn
    pub fn inner(&self, area: Rect) -> Rect {
        if self.borders {
            Block::default().borders(Borders::ALL).inner(area)
        } else {
            area
        }
    }

    /// Draw border and title around `area`, clipped to the buffer
    pub fn render(&self, area: Rect, buf: &mut Buffer, title: &str, focused: bool) {
        let area = area.intersection(buf.area);
        if !self.borders || area.is_empty() {
            return;
        }

        let (border, title_style) = if focused {
            (self.border_focused, self.title_focused)
        } else {
            (self.border, self.title)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(self.border_type)
            .border_style(Style::default().fg(border));

        if !title.is_empty() {
            let room = area.width.saturating_sub(4) as usize;
            let text = truncate_to_width(title, room);
            block = block.title(Span::styled(format!(" {text} "), title_style));
        }

        block.render(area, buf);
    }
}

/// Longest prefix of `text` that fits in `width` terminal columns
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

//! Logs view
//!
//! Displays entries of the shared [`LogBuffer`] with color-coded levels and
//! auto-follow. The buffer is filled from any thread by the tracing layer;
//! the view compares the buffer version on every frame, so with a tick
//! interval configured on the root new entries appear within one tick.

use super::scroll::ScrollState;
use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::msg::Msg;
use crate::panel::{truncate_to_width, RenderContext, Update, Widget};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

pub struct LogView {
    buffer: LogBuffer,
    scroll: ScrollState,
    height: usize,
    seen_version: Option<u64>,
    entries: Vec<LogEntry>,
}

impl LogView {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            scroll: ScrollState::new(),
            height: 0,
            seen_version: None,
            entries: Vec::new(),
        }
    }

    pub fn is_following(&self) -> bool {
        self.scroll.auto_follow
    }

    /// Pull entries from the buffer if it changed; returns whether it did
    fn sync(&mut self) -> bool {
        let version = self.buffer.version();
        if self.seen_version == Some(version) {
            return false;
        }
        self.seen_version = Some(version);
        self.entries = self.buffer.get_all();
        self.scroll.update_dimensions(self.entries.len(), self.height);
        true
    }

    fn handle_key(&mut self, code: KeyCode) -> Option<bool> {
        match code {
            KeyCode::Char('j') => Some(self.scroll.scroll_down()),
            KeyCode::Char('k') => Some(self.scroll.scroll_up()),
            KeyCode::PageDown => Some(self.scroll.page_down()),
            KeyCode::PageUp => Some(self.scroll.page_up()),
            KeyCode::Char('f') | KeyCode::End => {
                self.scroll.scroll_to_bottom();
                Some(true)
            }
            _ => None,
        }
    }
}

impl Widget for LogView {
    fn update(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::Key(key) if key.event.modifiers == KeyModifiers::NONE => {
                if let Some(moved) = self.handle_key(key.event.code) {
                    if key.claim() && moved {
                        // force a redraw on the next frame
                        self.seen_version = None;
                    }
                }
                Update::none()
            }
            _ => Update::none(),
        }
    }

    fn resize(&mut self, area: Rect) {
        self.height = area.height as usize;
        self.seen_version = None;
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _ctx: &RenderContext) {
        self.sync();
        let (start, end) = self.scroll.visible_range();
        for (row, entry) in self.entries[start..end].iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.bottom() {
                break;
            }
            let line = format_log_entry(entry);
            let text = truncate_to_width(&line, area.width as usize);
            buf.set_string(area.x, y, text, log_level_style(entry.level));
        }
    }

    fn needs_redraw(&self) -> bool {
        self.seen_version != Some(self.buffer.version())
    }
}

/// `HH:MM:SS LEVEL message`
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "{} {:5} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.message
    )
}

fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Info => Style::default(),
        LogLevel::Debug => Style::default().fg(Color::DarkGray),
        LogLevel::Trace => Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
    }
}

// Status line
//
// Shows the focused panel's help text on the left and uptime on the right.
// Help text arrives as a `HelpText` broadcast, uptime advances on `Tick`.

use crate::msg::Msg;
use crate::panel::{truncate_to_width, RenderContext, Update, Widget};
use crate::runtime::Tick;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

pub struct StatusLine {
    help: String,
    started: Instant,
    shown_secs: u64,
    style: Style,
    dirty: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            help: String::new(),
            started: Instant::now(),
            shown_secs: 0,
            style: Style::default().add_modifier(Modifier::REVERSED),
            dirty: true,
        }
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusLine {
    fn update(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::HelpText(text) if *text != self.help => {
                self.help = text.clone();
                self.dirty = true;
            }
            Msg::Broadcast(payload) if payload.is::<Tick>() => {
                let secs = self.started.elapsed().as_secs();
                if secs != self.shown_secs {
                    self.shown_secs = secs;
                    self.dirty = true;
                }
            }
            _ => {}
        }
        Update::none()
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _ctx: &RenderContext) {
        buf.set_style(area, self.style);

        let uptime = format!(" {} ", format_uptime(Duration::from_secs(self.shown_secs)));
        let uptime_width = uptime.width() as u16;
        let help_width = area.width.saturating_sub(uptime_width) as usize;

        let help = format!(" {}", self.help);
        buf.set_string(area.x, area.y, truncate_to_width(&help, help_width), self.style);
        if uptime_width <= area.width {
            buf.set_string(area.right() - uptime_width, area.y, &uptime, self.style);
        }
        self.dirty = false;
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }
}

/// `1h02m03s`, `2m05s`, `7s`
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(Duration::from_secs(7)), "7s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m05s");
        assert_eq!(format_uptime(Duration::from_secs(3723)), "1h02m03s");
    }

    #[test]
    fn help_text_updates_and_renders_left() {
        let mut status = StatusLine::new();
        let area = Rect::new(0, 0, 16, 1);
        let mut buf = Buffer::empty(area);
        status.render(area, &mut buf, &RenderContext { focused: false });
        assert!(!status.needs_redraw());

        status.update(&Msg::HelpText("j/k scroll".into()));
        assert!(status.needs_redraw());
        status.render(area, &mut buf, &RenderContext { focused: false });

        let row: String = (0..16).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(row, " j/k scroll  0s ");
    }
}

//! Tab strip for a stacked container
//!
//! The strip does not own the tabs. It asks the container (by name) to switch
//! with a `SelectTab` broadcast and follows the `TabSelected` notifications,
//! so selections made elsewhere are reflected too.

use crate::msg::Msg;
use crate::panel::{truncate_to_width, RenderContext, Update, Widget};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use unicode_width::UnicodeWidthStr;

pub struct TabStrip {
    container: String,
    titles: Vec<String>,
    selected: usize,
    dirty: bool,
}

impl TabStrip {
    pub fn new(container: impl Into<String>, titles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            container: container.into(),
            titles: titles.into_iter().map(Into::into).collect(),
            selected: 0,
            dirty: true,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn request(&self, index: usize) -> Update {
        Update::up(Msg::SelectTab {
            container: self.container.clone(),
            index,
        })
    }

    fn target_for(&self, code: KeyCode) -> Option<usize> {
        let n = self.titles.len();
        if n == 0 {
            return None;
        }
        match code {
            KeyCode::Char(']') | KeyCode::Char('l') => Some((self.selected + 1) % n),
            KeyCode::Char('[') | KeyCode::Char('h') => Some((self.selected + n - 1) % n),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                (index < n).then_some(index)
            }
            _ => None,
        }
    }
}

impl Widget for TabStrip {
    fn update(&mut self, msg: &Msg) -> Update {
        match msg {
            Msg::TabSelected { container, index } if *container == self.container => {
                if self.selected != *index {
                    self.selected = *index;
                    self.dirty = true;
                }
                Update::none()
            }
            Msg::Key(key) if key.event.modifiers == KeyModifiers::NONE => {
                match self.target_for(key.event.code) {
                    Some(index) if key.claim() => self.request(index),
                    _ => Update::none(),
                }
            }
            _ => Update::none(),
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, ctx: &RenderContext) {
        let mut x = area.x;
        for (i, title) in self.titles.iter().enumerate() {
            let remaining = area.right().saturating_sub(x) as usize;
            if remaining == 0 {
                break;
            }
            let label = format!(" {}:{} ", i + 1, title);
            let label = truncate_to_width(&label, remaining);
            let mut style = Style::default();
            if i == self.selected {
                style = style.add_modifier(Modifier::REVERSED);
                if ctx.focused {
                    style = style.add_modifier(Modifier::BOLD);
                }
            }
            buf.set_string(x, area.y, label, style);
            x = x.saturating_add(label.width() as u16);
        }
        self.dirty = false;
    }

    fn needs_redraw(&self) -> bool {
        self.dirty
    }

    fn focus_changed(&mut self, _focused: bool) -> Update {
        self.dirty = true;
        Update::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::KeyMsg;
    use crossterm::event::KeyEvent;

    fn press(strip: &mut TabStrip, c: char) -> Update {
        let key = KeyMsg::new(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE), 1);
        strip.update(&Msg::Key(key))
    }

    fn requested(update: &Update) -> Option<usize> {
        match update.up.as_slice() {
            [Msg::SelectTab { index, .. }] => Some(*index),
            _ => None,
        }
    }

    #[test]
    fn keys_request_tabs_by_container_name() {
        let mut strip = TabStrip::new("pages", ["one", "two", "three"]);
        assert_eq!(requested(&press(&mut strip, ']')), Some(1));
        assert_eq!(requested(&press(&mut strip, '[')), Some(2));
        assert_eq!(requested(&press(&mut strip, '3')), Some(2));
        assert_eq!(requested(&press(&mut strip, '9')), None);
    }

    #[test]
    fn follows_selection_of_its_container_only() {
        let mut strip = TabStrip::new("pages", ["one", "two"]);
        strip.update(&Msg::TabSelected {
            container: "other".into(),
            index: 1,
        });
        assert_eq!(strip.selected(), 0);

        strip.update(&Msg::TabSelected {
            container: "pages".into(),
            index: 1,
        });
        assert_eq!(strip.selected(), 1);
        assert!(strip.needs_redraw());
    }

    #[test]
    fn renders_numbered_titles() {
        let mut strip = TabStrip::new("pages", ["ab", "cd"]);
        let area = Rect::new(0, 0, 12, 1);
        let mut buf = Buffer::empty(area);
        strip.render(area, &mut buf, &RenderContext { focused: false });

        let row: String = (0..12).map(|x| buf[(x, 0)].symbol().to_string()).collect();
        assert_eq!(row, " 1:ab  2:cd ");
        assert!(buf[(0, 0)].modifier.contains(Modifier::REVERSED));
        assert!(!buf[(6, 0)].modifier.contains(Modifier::REVERSED));
    }
}

use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::render;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Widget;

/// Label of the option that removes a column filter.
pub const ALL_LABEL: &str = "---All---";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterAction {
    None,
    Redraw,
    /// Apply the chosen value; `None` means all values.
    Apply(Option<String>),
    Cancel,
}

/// A dropdown listing [`ALL_LABEL`] followed by the distinct values of one column.
#[derive(Clone, Debug)]
pub struct FilterDropdown {
    column: usize,
    values: Vec<String>,
    /// 0 is the "all" entry, `i + 1` is `values[i]`.
    cursor: usize,
    scroll: usize,
}

impl FilterDropdown {
    pub fn new(column: usize, values: Vec<String>, current: Option<&str>) -> Self {
        let cursor = current
            .and_then(|c| values.iter().position(|v| v == c))
            .map(|i| i + 1)
            .unwrap_or(0);
        Self {
            column,
            values,
            cursor,
            scroll: 0,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of entries, including the "all" entry.
    pub fn option_count(&self) -> usize {
        self.values.len() + 1
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_value(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn move_by(&mut self, delta: i64) {
        let last = self.option_count() as i64 - 1;
        self.cursor = (self.cursor as i64 + delta).clamp(0, last) as usize;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.step(-1),
            KeyCode::Down | KeyCode::Char('j') => self.step(1),
            KeyCode::PageUp => self.step(-10),
            KeyCode::PageDown => self.step(10),
            KeyCode::Home | KeyCode::Char('g') => self.step(i64::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => self.step(i64::MAX / 2),
            KeyCode::Enter | KeyCode::Char(' ') => {
                FilterAction::Apply(self.selected_value().map(str::to_string))
            }
            KeyCode::Esc | KeyCode::Char('q') => FilterAction::Cancel,
            _ => FilterAction::None,
        }
    }

    fn step(&mut self, delta: i64) -> FilterAction {
        let before = self.cursor;
        self.move_by(delta);
        if before == self.cursor {
            FilterAction::None
        } else {
            FilterAction::Redraw
        }
    }

    /// Preferred popup size: widest option plus borders, at most `max_h` rows tall.
    pub fn size_hint(&self, max_h: u16) -> (u16, u16) {
        let widest = self
            .values
            .iter()
            .map(|v| render::display_width(v))
            .chain(std::iter::once(render::display_width(ALL_LABEL)))
            .max()
            .unwrap_or(0);
        let w = (widest + 2).min(u16::MAX as usize) as u16;
        let h = (self.option_count() + 2).min(max_h as usize) as u16;
        (w, h)
    }

    /// Draws the popup over whatever is already in `area`.
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, style: Style, cursor_style: Style) {
        if area.width < 3 || area.height < 3 {
            return;
        }
        Clear.render(area, buf);
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let inner = block.inner(area);
        block.render(area, buf);
        buf.set_style(inner, style);

        let visible = inner.height as usize;
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }

        for (dy, i) in (self.scroll..self.option_count()).take(visible).enumerate() {
            let label = if i == 0 { ALL_LABEL } else { &self.values[i - 1] };
            let y = inner.y + dy as u16;
            let line_style = if i == self.cursor { cursor_style } else { style };
            buf.set_style(Rect::new(inner.x, y, inner.width, 1), line_style);
            render::render_str_truncated(inner.x, y, inner.width, buf, label, line_style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropdown() -> FilterDropdown {
        FilterDropdown::new(
            3,
            vec!["Chicago".into(), "Houston".into(), "Seattle".into()],
            Some("Houston"),
        )
    }

    #[test]
    fn starts_on_current_value() {
        let d = dropdown();
        assert_eq!(d.cursor(), 2);
        assert_eq!(d.selected_value(), Some("Houston"));
        let d = FilterDropdown::new(0, vec!["a".into()], Some("gone"));
        assert_eq!(d.selected_value(), None);
    }

    #[test]
    fn keys_move_and_apply() {
        let mut d = dropdown();
        assert_eq!(d.handle_key(&KeyEvent::new(KeyCode::Down)), FilterAction::Redraw);
        assert_eq!(d.handle_key(&KeyEvent::new(KeyCode::Down)), FilterAction::None);
        assert_eq!(
            d.handle_key(&KeyEvent::new(KeyCode::Enter)),
            FilterAction::Apply(Some("Seattle".into()))
        );
        d.handle_key(&KeyEvent::new(KeyCode::Home));
        assert_eq!(
            d.handle_key(&KeyEvent::new(KeyCode::Enter)),
            FilterAction::Apply(None)
        );
        assert_eq!(d.handle_key(&KeyEvent::new(KeyCode::Esc)), FilterAction::Cancel);
    }

    #[test]
    fn renders_all_entry_first() {
        let mut d = dropdown();
        let (w, h) = d.size_hint(20);
        assert_eq!((w, h), (11, 6));
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        d.render(area, &mut buf, Style::default(), Style::default());
        let line: String = (1..w - 1)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(line, ALL_LABEL);
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let values: Vec<String> = (0..20).map(|i| format!("v{i:02}")).collect();
        let mut d = FilterDropdown::new(0, values, Some("v15"));
        let area = Rect::new(0, 0, 12, 5);
        let mut buf = Buffer::empty(area);
        d.render(area, &mut buf, Style::default(), Style::default());
        let line: String = (1..4)
            .map(|x| buf.cell((x, 3)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(line, "v15");
    }
}

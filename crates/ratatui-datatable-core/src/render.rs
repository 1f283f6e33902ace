use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::viewport::ViewportState;

const TAB_WIDTH: usize = 4;

pub fn render_scrollbar(area: Rect, buf: &mut Buffer, state: &ViewportState, style: Style) {
    buf.set_style(area, style);
    if area.height == 0 {
        return;
    }
    if state.content_h <= state.viewport_h as u32 || state.content_h == 0 {
        for dy in 0..area.height {
            buf.set_stringn(area.x, area.y + dy, " ", 1, style);
        }
        return;
    }

    let track_h = area.height as f64;
    let thumb_h = ((state.viewport_h as f64 / state.content_h as f64) * track_h)
        .round()
        .clamp(1.0, track_h) as u16;

    let max_y = state
        .content_h
        .saturating_sub(state.viewport_h as u32)
        .max(1) as f64;
    let thumb_top = ((state.y as f64 / max_y) * (track_h - thumb_h as f64))
        .round()
        .clamp(0.0, (track_h - thumb_h as f64).max(0.0)) as u16;

    for dy in 0..area.height {
        let ch = if dy >= thumb_top && dy < thumb_top + thumb_h {
            "█"
        } else {
            " "
        };
        buf.set_stringn(area.x, area.y + dy, ch, 1, style);
    }
}

/// Writes display columns `[start_col, start_col + max_cols)` of a line into one buffer row.
///
/// Tabs expand to four columns; a wide char cut by either edge is skipped.
struct ClippedWriter<'a> {
    buf: &'a mut Buffer,
    x: u16,
    y: u16,
    start_col: usize,
    max_cols: usize,
    col: usize,
    out_cols: usize,
}

impl<'a> ClippedWriter<'a> {
    fn new(buf: &'a mut Buffer, x: u16, y: u16, start_col: u32, max_cols: u16) -> Self {
        Self {
            buf,
            x,
            y,
            start_col: start_col as usize,
            max_cols: max_cols as usize,
            col: 0,
            out_cols: 0,
        }
    }

    /// Returns `false` once the line is full.
    fn push_str(&mut self, s: &str, style: Style) -> bool {
        let mut tmp = [0u8; 4];
        for ch in s.chars() {
            if ch == '\t' {
                for _ in 0..TAB_WIDTH {
                    if !self.put(" ", 1, style) {
                        return false;
                    }
                }
                continue;
            }
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if !self.put(ch.encode_utf8(&mut tmp), w, style) {
                return false;
            }
        }
        true
    }

    fn put(&mut self, symbol: &str, w: usize, style: Style) -> bool {
        if self.col < self.start_col {
            self.col += w;
            return true;
        }
        if self.out_cols + w > self.max_cols {
            return false;
        }
        let x = self.x + self.out_cols as u16;
        if let Some(cell) = self.buf.cell_mut((x, self.y)) {
            cell.set_style(style);
            cell.set_symbol(symbol);
        }
        for dx in 1..w {
            if let Some(cell) = self.buf.cell_mut((x + dx as u16, self.y)) {
                cell.set_style(style);
                cell.set_symbol("");
            }
        }
        self.col += w;
        self.out_cols += w;
        true
    }
}

pub fn render_str_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    if max_cols == 0 {
        return;
    }
    ClippedWriter::new(buf, x, y, start_col, max_cols).push_str(input, style);
}

pub fn render_spans_clipped(
    x: u16,
    y: u16,
    start_col: u32,
    max_cols: u16,
    buf: &mut Buffer,
    spans: &[Span<'_>],
    fallback_style: Style,
) {
    if max_cols == 0 {
        return;
    }
    let mut w = ClippedWriter::new(buf, x, y, start_col, max_cols);
    for span in spans {
        let style = if span.style == Style::default() {
            fallback_style
        } else {
            span.style
        };
        if !w.push_str(&span.content, style) {
            return;
        }
    }
}

/// Like [`render_str_clipped`], but ends with `…` when `input` does not fit.
pub fn render_str_truncated(
    x: u16,
    y: u16,
    max_cols: u16,
    buf: &mut Buffer,
    input: &str,
    style: Style,
) {
    if max_cols == 0 {
        return;
    }
    if display_width(input) <= max_cols as usize {
        render_str_clipped(x, y, 0, max_cols, buf, input, style);
        return;
    }
    let head = slice_by_cols(input, 0, max_cols - 1);
    let mut w = ClippedWriter::new(buf, x, y, 0, max_cols);
    w.push_str(&head, style);
    w.push_str("…", style);
}

pub fn slice_by_cols(input: &str, start_col: u32, max_cols: u16) -> String {
    if max_cols == 0 {
        return String::new();
    }

    let start_col = start_col as usize;
    let max_cols = max_cols as usize;
    let input = if input.contains('\t') {
        std::borrow::Cow::Owned(input.replace('\t', "    "))
    } else {
        std::borrow::Cow::Borrowed(input)
    };

    let mut col = 0usize;
    let mut out_cols = 0usize;
    let mut out = String::new();

    for ch in input.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w == 0 {
            continue;
        }
        if col < start_col {
            col += w;
            continue;
        }
        if out_cols + w > max_cols {
            break;
        }
        out.push(ch);
        col += w;
        out_cols += w;
    }

    out
}

/// Display width with tabs counted as four columns.
pub fn display_width(s: &str) -> usize {
    s.split('\t')
        .map(UnicodeWidthStr::width)
        .sum::<usize>()
        + s.matches('\t').count() * TAB_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn row_text(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn slice_by_cols_handles_tabs_and_width() {
        assert_eq!(slice_by_cols("\t1", 0, 4), "    ");
        assert_eq!(slice_by_cols("abcdef", 0, 3), "abc");
        assert_eq!(slice_by_cols("abcdef", 2, 3), "cde");
        assert_eq!(slice_by_cols("你好", 1, 2), "好");
    }

    #[test]
    fn render_spans_clipped_expands_tabs() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 1));
        let spans = vec![Span::raw("\t1")];
        render_spans_clipped(0, 0, 0, 6, &mut buf, &spans, Style::default());
        assert!(row_text(&buf, 6).starts_with("    1"));
    }

    #[test]
    fn render_str_clipped_skips_start_columns() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 1));
        render_str_clipped(0, 0, 2, 4, &mut buf, "abcdef", Style::default());
        assert_eq!(row_text(&buf, 4), "cdef");
    }

    #[test]
    fn truncation_marks_cut_text() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        render_str_truncated(0, 0, 5, &mut buf, "Los Angeles", Style::default());
        assert_eq!(row_text(&buf, 5), "Los …");

        let mut buf = Buffer::empty(Rect::new(0, 0, 5, 1));
        render_str_truncated(0, 0, 5, &mut buf, "Ohio", Style::default());
        assert_eq!(row_text(&buf, 5), "Ohio ");
    }

    #[test]
    fn display_width_counts_tabs_and_wide_chars() {
        assert_eq!(display_width("ab"), 2);
        assert_eq!(display_width("\tx"), 5);
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn render_scrollbar_does_not_panic() {
        let mut state = ViewportState::default();
        state.set_viewport(10, 5);
        state.set_content(10, 50);
        let mut buf = Buffer::empty(Rect::new(0, 0, 1, 5));
        render_scrollbar(Rect::new(0, 0, 1, 5), &mut buf, &state, Style::default());
    }
}

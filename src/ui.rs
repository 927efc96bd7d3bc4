//! UiFrame: a thin wrapper around `ratatui::Frame` that clamps drawing to the
//! visible area.
//!
//! Host windows, console rows and floating windows all compute rectangles
//! that may drift partially outside the terminal buffer (a floating window
//! pulled left of its anchor, a status row on a one-line window). Writing
//! out-of-bounds into a `Buffer` panics, so every draw goes through here.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::Widget;
use unicode_width::UnicodeWidthChar;

use crate::layout::floating::FloatRect;

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer, for offscreen
    /// rendering and snapshots.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Copy `src` (drawn at its own origin 0,0) onto the frame at a signed
    /// destination, dropping whatever falls outside.
    pub fn blit_from_signed(&mut self, src: &Buffer, dest: FloatRect) {
        let frame_x0 = self.area.x as i32;
        let frame_y0 = self.area.y as i32;
        let frame_x1 = frame_x0 + self.area.width as i32;
        let frame_y1 = frame_y0 + self.area.height as i32;
        for sy in 0..dest.height as i32 {
            let dy = dest.y + sy;
            if dy < frame_y0 || dy >= frame_y1 {
                continue;
            }
            for sx in 0..dest.width as i32 {
                let dx = dest.x + sx;
                if dx < frame_x0 || dx >= frame_x1 {
                    continue;
                }
                if let (Some(src_cell), Some(dst_cell)) = (
                    src.cell((sx as u16, sy as u16)),
                    self.buffer.cell_mut((dx as u16, dy as u16)),
                ) {
                    *dst_cell = src_cell.clone();
                }
            }
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    let Some(available) = available_width(buffer, bounds, x, y) else {
        return;
    };
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn safe_set_line(buffer: &mut Buffer, bounds: Rect, x: u16, y: u16, line: &Line<'_>) {
    let Some(available) = available_width(buffer, bounds, x, y) else {
        return;
    };
    buffer.set_line(x, y, line, available);
}

fn available_width(buffer: &Buffer, bounds: Rect, x: u16, y: u16) -> Option<u16> {
    let bounds = bounds.intersection(buffer.area);
    if bounds.width == 0 || bounds.height == 0 {
        return None;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return None;
    }
    Some(max_x - x)
}

/// Longest prefix of `value` that fits in `width` display columns.
pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in value.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        used += ch_width;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn blit_from_signed_clips_negative_offsets() {
        let frame_area = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 2,
        };
        let mut dest = Buffer::empty(frame_area);
        let mut frame = UiFrame::from_parts(frame_area, &mut dest);
        let src_area = Rect {
            x: 0,
            y: 0,
            width: 3,
            height: 2,
        };
        let mut src = Buffer::empty(src_area);
        for y in 0..src_area.height {
            for x in 0..src_area.width {
                if let Some(cell) = src.cell_mut((x, y)) {
                    cell.set_symbol("#");
                }
            }
        }
        frame.blit_from_signed(
            &src,
            FloatRect {
                x: -1,
                y: 0,
                width: 3,
                height: 2,
            },
        );
        let buffer = frame.buffer;
        assert_eq!(buffer.cell((0, 0)).unwrap().symbol(), "#");
        assert_eq!(buffer.cell((1, 0)).unwrap().symbol(), "#");
        assert_eq!(buffer.cell((2, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn truncate_to_width_counts_display_columns() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
        assert_eq!(truncate_to_width("日本語", 5), "日本");
    }

    #[test]
    fn safe_set_string_writes_within_bounds() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 10,
            height: 2,
        };
        let mut buf = Buffer::empty(bounds);
        safe_set_string(&mut buf, bounds, 1, 0, "hello", Style::default());
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "h");

        // outside bounds should be ignored (no panic)
        safe_set_string(&mut buf, bounds, 100, 0, "x", Style::default());
        safe_set_line(&mut buf, bounds, 0, 7, &Line::from("x"));
    }

    #[test]
    fn safe_set_line_truncates_at_right_edge() {
        let bounds = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 1,
        };
        let mut buf = Buffer::empty(bounds);
        safe_set_line(&mut buf, bounds, 2, 0, &Line::from("xyz"));
        assert_eq!(buf.cell((2, 0)).unwrap().symbol(), "x");
        assert_eq!(buf.cell((3, 0)).unwrap().symbol(), "y");
    }
}

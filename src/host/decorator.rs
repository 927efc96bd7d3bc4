use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};

/// Draws chrome around a floating window that the host decided to decorate.
pub trait FloatingDecorator: std::fmt::Debug {
    /// `rect` is the outer chrome rectangle, one cell larger than the
    /// content on every side; drawing is clipped to `bounds`.
    fn render_chrome(&self, buffer: &mut Buffer, rect: Rect, bounds: Rect, title: &str);
}

#[derive(Debug)]
pub struct FrameDecorator;

impl FloatingDecorator for FrameDecorator {
    fn render_chrome(&self, buffer: &mut Buffer, rect: Rect, bounds: Rect, title: &str) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let border_style = Style::default().fg(Color::DarkGray).bg(Color::Reset);
        let title_style = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let left = rect.x;
        let top = rect.y;
        let right = rect.x.saturating_add(rect.width).saturating_sub(1);
        let bottom = rect.y.saturating_add(rect.height).saturating_sub(1);

        let mut put = |x: u16, y: u16, symbol: &str, style: Style| {
            if x >= bounds.x
                && x < bounds.x.saturating_add(bounds.width)
                && y >= bounds.y
                && y < bounds.y.saturating_add(bounds.height)
                && let Some(cell) = buffer.cell_mut((x, y))
            {
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        };

        for x in left..=right {
            let (top_symbol, bottom_symbol) = if x == left {
                ("┌", "└")
            } else if x == right {
                ("┐", "┘")
            } else {
                ("─", "─")
            };
            put(x, top, top_symbol, border_style);
            put(x, bottom, bottom_symbol, border_style);
        }
        for y in top.saturating_add(1)..bottom {
            put(left, y, "│", border_style);
            put(right, y, "│", border_style);
        }

        let inner_width = rect.width.saturating_sub(2) as usize;
        for (idx, ch) in title.chars().take(inner_width).enumerate() {
            let x = left + 1 + idx as u16;
            put(x, top, &ch.to_string(), title_style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_corners_and_title() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 8,
            height: 3,
        };
        let mut buffer = Buffer::empty(area);
        FrameDecorator.render_chrome(&mut buffer, area, area, "abc");
        assert_eq!(buffer.cell((0, 0)).unwrap().symbol(), "┌");
        assert_eq!(buffer.cell((7, 2)).unwrap().symbol(), "┘");
        assert_eq!(buffer.cell((1, 0)).unwrap().symbol(), "a");
        assert_eq!(buffer.cell((0, 1)).unwrap().symbol(), "│");
    }

    #[test]
    fn clips_to_bounds() {
        let area = Rect {
            x: 0,
            y: 0,
            width: 4,
            height: 2,
        };
        let mut buffer = Buffer::empty(area);
        let chrome = Rect {
            x: 2,
            y: 0,
            width: 6,
            height: 3,
        };
        FrameDecorator.render_chrome(&mut buffer, chrome, area, "");
        assert_eq!(buffer.cell((2, 0)).unwrap().symbol(), "┌");
        assert_eq!(buffer.cell((3, 1)).unwrap().symbol(), " ");
    }
}

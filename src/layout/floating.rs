use ratatui::prelude::Rect;

/// Signed floating rectangle origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Translate by `origin`, e.g. to turn parent-relative coordinates into
    /// absolute ones.
    pub fn offset_by(&self, origin: (i32, i32)) -> Self {
        Self {
            x: self.x + origin.0,
            y: self.y + origin.1,
            ..*self
        }
    }
}

/// Target origin of a `size` window pinned to the bottom-right corner of
/// `anchor`, shifted by `offset`.
///
/// The result is relative to the anchor when `parented`, absolute otherwise.
/// It is clamped so the window never starts left of or above the anchor.
pub fn anchored_position(
    anchor: Rect,
    size: (u16, u16),
    offset: (i16, i16),
    parented: bool,
) -> (i32, i32) {
    let (width, height) = size;
    let max_x = anchor.width as i32 - width as i32;
    let max_y = anchor.height as i32 - height as i32;
    let x = (max_x + offset.0 as i32).min(max_x).max(0);
    let y = (max_y + offset.1 as i32).min(max_y).max(0);
    if parented {
        (x, y)
    } else {
        (anchor.x as i32 + x, anchor.y as i32 + y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Rect {
        Rect {
            x: 40,
            y: 0,
            width: 40,
            height: 20,
        }
    }

    #[test]
    fn pinned_inside_bottom_right_corner() {
        let pos = anchored_position(anchor(), (12, 1), (-10, -1), true);
        assert_eq!(pos, (18, 18));
    }

    #[test]
    fn unparented_position_is_absolute() {
        let pos = anchored_position(anchor(), (12, 1), (-10, -1), false);
        assert_eq!(pos, (58, 18));
    }

    #[test]
    fn oversized_window_clamps_to_anchor_origin() {
        let pos = anchored_position(anchor(), (60, 1), (-10, -1), true);
        assert_eq!(pos, (0, 18));
    }

    #[test]
    fn positive_offsets_never_push_off_screen() {
        let pos = anchored_position(anchor(), (12, 1), (5, 3), true);
        assert_eq!(pos, (28, 19));
    }

    #[test]
    fn float_rect_offset() {
        let rect = FloatRect {
            x: 2,
            y: 3,
            width: 4,
            height: 1,
        };
        assert_eq!(rect.offset_by((10, 1)).position(), (12, 4));
    }
}

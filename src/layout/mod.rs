pub mod floating;

use crate::constants::DEFAULT_SAFETY_MARGIN;
use crate::measure::{ConsoleFont, TextMeasurer};
use crate::text::{Spacer, StyledText};

/// Where the status text goes on a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Columns reserved at the right edge for the status text.
    pub spacer_width: u16,
    /// Break the line before the status text instead of sharing the
    /// trailing line with existing content.
    pub wrap: bool,
}

impl Placement {
    pub fn spacer(&self) -> Spacer {
        Spacer::new(self.spacer_width)
    }
}

/// Computes right-aligned placement and the wrap decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlanner {
    safety_margin: u16,
}

impl LayoutPlanner {
    pub const fn new(safety_margin: u16) -> Self {
        Self { safety_margin }
    }

    pub fn safety_margin(&self) -> u16 {
        self.safety_margin
    }

    /// `max(ceil((columns + padding) * scale), columns)`.
    pub fn spacer_width(&self, text_columns: usize, padding: u16, scale: f32) -> u16 {
        let reserved = (text_columns as f64 + padding as f64) * scale.max(0.0) as f64;
        let reserved = reserved.ceil().min(u16::MAX as f64) as u16;
        reserved.max(text_columns.min(u16::MAX as usize) as u16)
    }

    /// True when `occupied` columns on the trailing line leave no room for a
    /// `spacer_width`-wide status text plus the safety margin.
    pub fn should_wrap(&self, occupied: usize, console_width: u16, spacer_width: u16) -> bool {
        let budget = console_width
            .saturating_sub(spacer_width)
            .saturating_sub(self.safety_margin);
        occupied > budget as usize
    }

    pub fn plan_columns(
        &self,
        text_columns: usize,
        occupied: usize,
        console_width: u16,
        padding: u16,
        scale: f32,
    ) -> Placement {
        let spacer_width = self.spacer_width(text_columns, padding, scale);
        Placement {
            spacer_width,
            wrap: self.should_wrap(occupied, console_width, spacer_width),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn plan(
        &self,
        measurer: &TextMeasurer,
        text: &StyledText,
        font: &ConsoleFont,
        occupied: usize,
        console_width: u16,
        padding: u16,
        scale: f32,
    ) -> Placement {
        let columns = measurer.measure_columns(text, font);
        self.plan_columns(columns, occupied, console_width, padding, scale)
    }
}

/// Everything needed to place one status text on any console.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub planner: &'a LayoutPlanner,
    pub measurer: &'a TextMeasurer,
    pub padding: u16,
    pub scale: f32,
}

impl PlacementContext<'_> {
    pub fn place(
        &self,
        text: &StyledText,
        font: &ConsoleFont,
        occupied: usize,
        console_width: u16,
    ) -> Placement {
        self.planner.plan(
            self.measurer,
            text,
            font,
            occupied,
            console_width,
            self.padding,
            self.scale,
        )
    }
}

impl Default for LayoutPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SAFETY_MARGIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_decision_against_budget() {
        let planner = LayoutPlanner::new(5);
        assert!(planner.should_wrap(65, 80, 12));
        assert!(!planner.should_wrap(50, 80, 12));
        // exactly on the budget still fits
        assert!(!planner.should_wrap(63, 80, 12));
        assert!(planner.should_wrap(64, 80, 12));
    }

    #[test]
    fn narrow_console_always_wraps_non_empty_line() {
        let planner = LayoutPlanner::new(5);
        assert!(planner.should_wrap(1, 10, 20));
        assert!(!planner.should_wrap(0, 10, 20));
    }

    #[test]
    fn spacer_width_covers_text_and_padding() {
        let planner = LayoutPlanner::default();
        assert_eq!(planner.spacer_width(10, 2, 1.0), 12);
        assert_eq!(planner.spacer_width(10, 0, 1.25), 13);
        // scale below one never reserves less than the text itself
        assert_eq!(planner.spacer_width(10, 0, 0.5), 10);
    }

    #[test]
    fn spacer_width_is_monotonic_in_text_length() {
        let planner = LayoutPlanner::default();
        for scale in [0.5_f32, 1.0, 1.3, 2.0] {
            for padding in [0_u16, 1, 4] {
                let mut previous = 0;
                for columns in 0..200 {
                    let width = planner.spacer_width(columns, padding, scale);
                    assert!(width as usize >= columns);
                    assert!(width >= previous);
                    previous = width;
                }
            }
        }
    }

    #[test]
    fn plan_measures_against_console_font() {
        let planner = LayoutPlanner::new(5);
        let measurer = TextMeasurer::default();
        let font = ConsoleFont::new(8, 16);
        let text = StyledText::raw("0123456789");
        let placement = planner.plan(&measurer, &text, &font, 65, 80, 2, 1.0);
        assert_eq!(
            placement,
            Placement {
                spacer_width: 12,
                wrap: true
            }
        );
        let placement = planner.plan(&measurer, &text, &font, 50, 80, 2, 1.0);
        assert!(!placement.wrap);
        assert_eq!(placement.spacer(), Spacer::new(12));
    }
}

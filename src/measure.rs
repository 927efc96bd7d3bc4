//! Pixel measurement of styled text and conversion to console columns.

use std::cell::Cell;

use crossterm::terminal::WindowSize;
use unicode_width::UnicodeWidthStr;

use crate::constants::{FALLBACK_CELL_HEIGHT_PX, FALLBACK_CELL_WIDTH_PX};
use crate::text::StyledText;

/// Character cell geometry of a particular console.
///
/// A `cell_width_px` of zero means the terminal never reported its pixel
/// size, so only approximate measurement is possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleFont {
    pub cell_width_px: u16,
    pub cell_height_px: u16,
}

impl ConsoleFont {
    pub const fn new(cell_width_px: u16, cell_height_px: u16) -> Self {
        Self {
            cell_width_px,
            cell_height_px,
        }
    }

    /// Font whose pixel geometry is unknown.
    pub const fn unknown() -> Self {
        Self::new(0, 0)
    }

    /// Derive cell geometry from the size crossterm reports for the terminal.
    pub fn from_window_size(size: WindowSize) -> Self {
        if size.columns == 0 || size.rows == 0 || size.width == 0 || size.height == 0 {
            return Self::unknown();
        }
        Self::new(size.width / size.columns, size.height / size.rows)
    }

    pub fn has_pixel_geometry(&self) -> bool {
        self.cell_width_px > 0
    }

    /// Cell width used as the unit for column conversion.
    fn base_width_px(&self) -> u32 {
        if self.has_pixel_geometry() {
            self.cell_width_px as u32
        } else {
            FALLBACK_CELL_WIDTH_PX as u32
        }
    }
}

impl Default for ConsoleFont {
    fn default() -> Self {
        Self::new(FALLBACK_CELL_WIDTH_PX, FALLBACK_CELL_HEIGHT_PX)
    }
}

/// Source of precise pixel extents for styled text.
pub trait PixelMetrics {
    /// Pixel width of `text` drawn with `font`, or `None` when the platform
    /// cannot say.
    fn text_width_px(&self, text: &StyledText, font: &ConsoleFont) -> Option<u32>;
}

/// Grid-exact metrics: display width of each grapheme times the cell width,
/// scaled by the text's font scale.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalMetrics;

impl PixelMetrics for TerminalMetrics {
    fn text_width_px(&self, text: &StyledText, font: &ConsoleFont) -> Option<u32> {
        if !font.has_pixel_geometry() {
            return None;
        }
        let cells: usize = text
            .spans()
            .iter()
            .map(|span| UnicodeWidthStr::width(span.content.as_ref()))
            .sum();
        Some(scaled_px(cells, font.cell_width_px as u32, text.scale()))
    }
}

impl<T: PixelMetrics + ?Sized> PixelMetrics for Box<T> {
    fn text_width_px(&self, text: &StyledText, font: &ConsoleFont) -> Option<u32> {
        (**self).text_width_px(text, font)
    }
}

fn scaled_px(cells: usize, cell_width_px: u32, scale: f32) -> u32 {
    let px = cells as f64 * cell_width_px as f64 * scale.max(0.0) as f64;
    px.ceil() as u32
}

/// Converts styled text into a whole number of console columns.
pub struct TextMeasurer {
    metrics: Box<dyn PixelMetrics>,
    fallback_logged: Cell<bool>,
}

impl std::fmt::Debug for TextMeasurer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextMeasurer")
            .field("fallback_logged", &self.fallback_logged.get())
            .finish_non_exhaustive()
    }
}

impl TextMeasurer {
    pub fn new(metrics: Box<dyn PixelMetrics>) -> Self {
        Self {
            metrics,
            fallback_logged: Cell::new(false),
        }
    }

    /// Columns `text` occupies on a console drawn with `font`.
    ///
    /// Partially covered cells count as whole cells.
    pub fn measure_columns(&self, text: &StyledText, font: &ConsoleFont) -> usize {
        let px = match self.metrics.text_width_px(text, font) {
            Some(px) => px,
            None => {
                if !self.fallback_logged.replace(true) {
                    tracing::warn!(
                        "pixel metrics unavailable for console font; estimating text width per character"
                    );
                }
                approximate_width_px(text, font)
            }
        };
        px.div_ceil(font.base_width_px()) as usize
    }

    pub fn fell_back(&self) -> bool {
        self.fallback_logged.get()
    }
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self::new(Box::new(TerminalMetrics))
    }
}

/// One cell per `char`, scaled.
fn approximate_width_px(text: &StyledText, font: &ConsoleFont) -> u32 {
    let chars: usize = text
        .spans()
        .iter()
        .map(|span| span.content.chars().count())
        .sum();
    scaled_px(chars, font.base_width_px(), text.scale())
}

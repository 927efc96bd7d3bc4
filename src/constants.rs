//! Shared crate-wide constants.

/// Slack (in terminal columns) subtracted from the console width before
/// deciding whether the status text still fits on the trailing line.
///
/// Some terminals redraw the last column of a row lazily or wrap one cell
/// early; keeping a few columns free avoids the status text being pushed onto
/// a second row by an off-by-one in the host's redisplay.
///
/// Units: terminal columns. Exposed through `StatusBarConfig::safety_margin`.
pub const DEFAULT_SAFETY_MARGIN: u16 = 5;

/// Blank columns kept between the status text and the right edge.
pub const DEFAULT_RIGHT_PADDING: u16 = 0;

/// Offset of a floating window from its anchor's bottom-right corner.
///
/// Negative values pull the window inward: `(-10, -1)` leaves the floating
/// window's right edge 10 columns left of the anchor's right edge and its
/// bottom edge one row above the anchor's bottom edge.
pub const DEFAULT_FLOATING_OFFSET: (i16, i16) = (-10, -1);

/// Cell width assumed when the terminal does not report pixel geometry.
pub const FALLBACK_CELL_WIDTH_PX: u16 = 8;

/// Cell height assumed when the terminal does not report pixel geometry.
pub const FALLBACK_CELL_HEIGHT_PX: u16 = 16;

/// Name given to the shared buffer displayed by every floating window.
pub const FLOATING_BUFFER_NAME: &str = " *term-tray*";

//! Styled status text and the padding that right-aligns it.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

/// Text plus the visual attributes the host needs to draw and measure it.
///
/// `scale` is the font scale implied by styling (1.0 for the console's base
/// font). Terminals cannot draw scaled glyphs, but hosts that can will report
/// wider pixel extents for scaled text, so measurement has to account for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledText {
    spans: Vec<Span<'static>>,
    scale: f32,
}

impl StyledText {
    pub fn new(spans: Vec<Span<'static>>) -> Self {
        Self { spans, scale: 1.0 }
    }

    pub fn raw<T: Into<String>>(content: T) -> Self {
        Self::new(vec![Span::raw(content.into())])
    }

    pub fn styled<T: Into<String>>(content: T, style: Style) -> Self {
        Self::new(vec![Span::styled(content.into(), style)])
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn push(&mut self, span: Span<'static>) {
        self.spans.push(span);
    }

    pub fn spans(&self) -> &[Span<'static>] {
        &self.spans
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_empty(&self) -> bool {
        self.spans.iter().all(|span| span.content.is_empty())
    }

    /// Concatenated content without styling.
    pub fn plain(&self) -> String {
        self.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    pub fn to_line(&self) -> Line<'static> {
        Line::from(self.spans.clone())
    }
}

impl Default for StyledText {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<&str> for StyledText {
    fn from(value: &str) -> Self {
        Self::raw(value)
    }
}

impl From<String> for StyledText {
    fn from(value: String) -> Self {
        Self::raw(value)
    }
}

/// Blank padding that extends up to column `width - reserve` of the line it
/// is drawn on, so whatever follows it ends flush with the right margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacer {
    pub reserve: u16,
}

impl Spacer {
    pub const fn new(reserve: u16) -> Self {
        Self { reserve }
    }

    /// Number of blank cells the spacer occupies when it starts at column
    /// `start` of a line that is `width` columns wide.
    pub fn resolve(&self, start: usize, width: u16) -> usize {
        let align_to = (width as usize).saturating_sub(self.reserve as usize);
        align_to.saturating_sub(start)
    }
}

/// The status value currently on display: styled text plus its spacer.
///
/// Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusText {
    pub spacer: Spacer,
    pub text: StyledText,
}

/// Trailing content of an inline annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationText {
    pub leading_newline: bool,
    pub spacer: Spacer,
    pub text: StyledText,
}

impl AnnotationText {
    pub fn inline(status: &StatusText) -> Self {
        Self {
            leading_newline: false,
            spacer: status.spacer,
            text: status.text.clone(),
        }
    }

    pub fn wrapped(status: &StatusText) -> Self {
        Self {
            leading_newline: true,
            ..Self::inline(status)
        }
    }
}

//! The host application as seen by the status bar.
//!
//! Consoles, windows and floating windows are owned by the host; the status
//! bar only holds ids and must expect any of them to vanish between calls.

pub mod decorator;
pub mod screen;

use ratatui::prelude::Rect;

use crate::error::HostError;
use crate::layout::floating::FloatRect;
use crate::measure::ConsoleFont;
use crate::text::{AnnotationText, Spacer, StyledText};

pub use screen::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnnotationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostWindowId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FloatingId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentBufferId(pub u32);

/// Marks console content written by a particular owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerTag(pub &'static str);

/// A run of literal console content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRun {
    pub spacer: Option<Spacer>,
    pub text: StyledText,
    pub owner: Option<OwnerTag>,
}

impl ContentRun {
    pub fn text(text: StyledText) -> Self {
        Self {
            spacer: None,
            text,
            owner: None,
        }
    }

    pub fn owned(spacer: Spacer, text: StyledText, owner: OwnerTag) -> Self {
        Self {
            spacer: Some(spacer),
            text,
            owner: Some(owner),
        }
    }

    fn is_blank(&self) -> bool {
        self.spacer.is_none() && self.text.is_empty()
    }
}

/// Literal content of a console.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsoleContent {
    runs: Vec<ContentRun>,
}

impl ConsoleContent {
    pub fn new(runs: Vec<ContentRun>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[ContentRun] {
        &self.runs
    }

    pub fn push(&mut self, run: ContentRun) {
        self.runs.push(run);
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(ContentRun::is_blank)
    }

    /// Any run written by `owner`.
    pub fn has_owner(&self, owner: OwnerTag) -> bool {
        self.runs.iter().any(|run| run.owner == Some(owner))
    }

    /// Content other than blank runs and runs written by `owner`.
    pub fn has_foreign(&self, owner: OwnerTag) -> bool {
        self.runs
            .iter()
            .any(|run| run.owner != Some(owner) && !run.is_blank())
    }

    pub fn without(&self, owner: OwnerTag) -> Self {
        Self {
            runs: self
                .runs
                .iter()
                .filter(|run| run.owner != Some(owner))
                .cloned()
                .collect(),
        }
    }

    /// Plain text with `\n` line breaks; spacers contribute nothing.
    pub fn plain(&self) -> String {
        self.runs.iter().map(|run| run.text.plain()).collect()
    }
}

/// Parameters of a floating window that the host may silently override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingParams {
    pub decorated: bool,
    pub focus_on_click: bool,
    pub focus_on_map: bool,
    pub scrollbars: bool,
    pub dedicated_viewport: bool,
    pub closable_by_window_commands: bool,
}

/// A single parameter assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatingParam {
    Decorated(bool),
    FocusOnClick(bool),
    FocusOnMap(bool),
    Scrollbars(bool),
    DedicatedViewport(bool),
    ClosableByWindowCommands(bool),
}

impl FloatingParams {
    /// Undecorated, unfocusable, single-purpose window.
    pub const fn status() -> Self {
        Self {
            decorated: false,
            focus_on_click: false,
            focus_on_map: false,
            scrollbars: false,
            dedicated_viewport: true,
            closable_by_window_commands: false,
        }
    }

    /// Every parameter as an assignment.
    pub fn assignments(&self) -> [FloatingParam; 6] {
        [
            FloatingParam::Decorated(self.decorated),
            FloatingParam::FocusOnClick(self.focus_on_click),
            FloatingParam::FocusOnMap(self.focus_on_map),
            FloatingParam::Scrollbars(self.scrollbars),
            FloatingParam::DedicatedViewport(self.dedicated_viewport),
            FloatingParam::ClosableByWindowCommands(self.closable_by_window_commands),
        ]
    }

    /// Assignments that turn `observed` into `self`.
    pub fn diff(&self, observed: &FloatingParams) -> Vec<FloatingParam> {
        let mut changes = Vec::new();
        if self.decorated != observed.decorated {
            changes.push(FloatingParam::Decorated(self.decorated));
        }
        if self.focus_on_click != observed.focus_on_click {
            changes.push(FloatingParam::FocusOnClick(self.focus_on_click));
        }
        if self.focus_on_map != observed.focus_on_map {
            changes.push(FloatingParam::FocusOnMap(self.focus_on_map));
        }
        if self.scrollbars != observed.scrollbars {
            changes.push(FloatingParam::Scrollbars(self.scrollbars));
        }
        if self.dedicated_viewport != observed.dedicated_viewport {
            changes.push(FloatingParam::DedicatedViewport(self.dedicated_viewport));
        }
        if self.closable_by_window_commands != observed.closable_by_window_commands {
            changes.push(FloatingParam::ClosableByWindowCommands(
                self.closable_by_window_commands,
            ));
        }
        changes
    }

    pub fn apply(&mut self, param: FloatingParam) {
        match param {
            FloatingParam::Decorated(value) => self.decorated = value,
            FloatingParam::FocusOnClick(value) => self.focus_on_click = value,
            FloatingParam::FocusOnMap(value) => self.focus_on_map = value,
            FloatingParam::Scrollbars(value) => self.scrollbars = value,
            FloatingParam::DedicatedViewport(value) => self.dedicated_viewport = value,
            FloatingParam::ClosableByWindowCommands(value) => {
                self.closable_by_window_commands = value
            }
        }
    }
}

impl Default for FloatingParams {
    /// What a host gives a freshly created window.
    fn default() -> Self {
        Self {
            decorated: true,
            focus_on_click: true,
            focus_on_map: true,
            scrollbars: true,
            dedicated_viewport: false,
            closable_by_window_commands: true,
        }
    }
}

/// Flags on the viewport that displays a floating window's content buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportFlags {
    pub reusable: bool,
    pub selectable: bool,
}

impl ViewportFlags {
    pub const fn locked() -> Self {
        Self {
            reusable: false,
            selectable: false,
        }
    }
}

/// Host lifecycle events the status bar can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hook {
    StatusConsoleFocused,
    SurfaceCreated,
    LayoutChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    StatusConsoleFocused,
    SurfaceCreated(SurfaceId),
    LayoutChanged,
}

impl HostEvent {
    pub fn hook(&self) -> Hook {
        match self {
            HostEvent::StatusConsoleFocused => Hook::StatusConsoleFocused,
            HostEvent::SurfaceCreated(_) => Hook::SurfaceCreated,
            HostEvent::LayoutChanged => Hook::LayoutChanged,
        }
    }
}

/// Console surfaces, their trailing annotations and literal content.
pub trait ConsoleHost {
    /// Surfaces that carry transient messages.
    fn console_surfaces(&self) -> Vec<SurfaceId>;

    /// Single-line status consoles, one per host window that owns one.
    fn status_consoles(&self) -> Vec<SurfaceId>;

    fn surface_alive(&self, surface: SurfaceId) -> bool;

    fn console_width(&self, surface: SurfaceId) -> Result<u16, HostError>;

    fn console_font(&self, surface: SurfaceId) -> Result<ConsoleFont, HostError>;

    /// Columns used on the console's last visual line.
    fn trailing_line_width(&self, surface: SurfaceId) -> Result<usize, HostError>;

    /// Create a zero-length annotation at the end of `surface` that renders
    /// after text inserted at its position and moves forward with it.
    fn attach_annotation(&mut self, surface: SurfaceId) -> Result<AnnotationId, HostError>;

    /// Surface of a live annotation whose surface is still alive.
    fn annotation_surface(&self, annotation: AnnotationId) -> Option<SurfaceId>;

    fn set_annotation_text(
        &mut self,
        annotation: AnnotationId,
        text: Option<AnnotationText>,
    ) -> Result<(), HostError>;

    fn remove_annotation(&mut self, annotation: AnnotationId);

    fn console_content(&self, surface: SurfaceId) -> Result<ConsoleContent, HostError>;

    fn set_console_content(
        &mut self,
        surface: SurfaceId,
        content: ConsoleContent,
    ) -> Result<(), HostError>;
}

/// Host windows and the floating windows anchored to them.
pub trait WindowHost {
    /// Live, visible top-level windows.
    fn host_windows(&self) -> Vec<HostWindowId>;

    /// Window that owns the status console active in `window`.
    fn status_console_owner(&self, window: HostWindowId) -> Option<HostWindowId>;

    fn window_area(&self, window: HostWindowId) -> Result<Rect, HostError>;

    /// Whether an embedded foreign layer in `window` draws above its children.
    fn has_embedded_layer(&self, window: HostWindowId) -> bool;

    /// Returns the previous suppression state.
    fn set_redisplay_suppressed(&mut self, suppressed: bool) -> bool;

    fn floating_windows(&self) -> Vec<FloatingId>;

    /// New zero-size, invisible floating window parented to `parent`.
    fn create_floating(&mut self, parent: HostWindowId) -> Result<FloatingId, HostError>;

    fn floating_alive(&self, floating: FloatingId) -> bool;

    fn floating_parent(&self, floating: FloatingId) -> Result<Option<HostWindowId>, HostError>;

    fn set_floating_parent(
        &mut self,
        floating: FloatingId,
        parent: Option<HostWindowId>,
    ) -> Result<(), HostError>;

    fn floating_root_alive(&self, floating: FloatingId) -> bool;

    fn floating_params(&self, floating: FloatingId) -> Result<FloatingParams, HostError>;

    fn set_floating_param(
        &mut self,
        floating: FloatingId,
        param: FloatingParam,
    ) -> Result<(), HostError>;

    fn floating_buffer(&self, floating: FloatingId) -> Option<ContentBufferId>;

    fn bind_content(
        &mut self,
        floating: FloatingId,
        buffer: ContentBufferId,
        flags: ViewportFlags,
    ) -> Result<(), HostError>;

    /// Resize to the bound content; returns the new size.
    fn fit_to_content(&mut self, floating: FloatingId) -> Result<(u16, u16), HostError>;

    /// Origin (parent-relative when parented) and size.
    fn floating_geometry(&self, floating: FloatingId) -> Result<FloatRect, HostError>;

    fn set_floating_position(
        &mut self,
        floating: FloatingId,
        position: (i32, i32),
    ) -> Result<(), HostError>;

    fn floating_visible(&self, floating: FloatingId) -> bool;

    fn set_floating_visible(&mut self, floating: FloatingId, visible: bool)
    -> Result<(), HostError>;

    fn destroy_floating(&mut self, floating: FloatingId);

    fn create_content_buffer(&mut self, name: &str) -> ContentBufferId;

    fn content_buffer_alive(&self, buffer: ContentBufferId) -> bool;

    fn set_buffer_content(
        &mut self,
        buffer: ContentBufferId,
        text: &StyledText,
    ) -> Result<(), HostError>;

    fn destroy_content_buffer(&mut self, buffer: ContentBufferId);
}

/// Lifecycle event subscription.
pub trait HostHooks {
    fn subscribe(&mut self, hook: Hook);
    fn unsubscribe(&mut self, hook: Hook);
}

pub trait Host: ConsoleHost + WindowHost + HostHooks {}

impl<T: ConsoleHost + WindowHost + HostHooks> Host for T {}

#[cfg(test)]
mod tests {
    use super::*;

    const OURS: OwnerTag = OwnerTag("ours");

    #[test]
    fn params_diff_lists_only_drifted_fields() {
        let desired = FloatingParams::status();
        let mut observed = desired;
        assert!(desired.diff(&observed).is_empty());
        observed.decorated = true;
        observed.scrollbars = true;
        assert_eq!(
            desired.diff(&observed),
            vec![
                FloatingParam::Decorated(false),
                FloatingParam::Scrollbars(false)
            ]
        );
        for change in desired.diff(&observed) {
            observed.apply(change);
        }
        assert_eq!(observed, desired);
    }

    #[test]
    fn fresh_window_differs_in_every_field() {
        let desired = FloatingParams::status();
        assert_eq!(desired.diff(&FloatingParams::default()).len(), 6);
        let mut applied = FloatingParams::default();
        for param in desired.assignments() {
            applied.apply(param);
        }
        assert_eq!(applied, desired);
    }

    #[test]
    fn content_ownership() {
        let mut content = ConsoleContent::default();
        assert!(content.is_empty());
        assert!(!content.has_foreign(OURS));
        content.push(ContentRun::owned(
            Spacer::new(4),
            StyledText::raw("tray"),
            OURS,
        ));
        assert!(content.has_owner(OURS));
        assert!(!content.has_foreign(OURS));
        content.push(ContentRun::text(StyledText::raw("Find file: ")));
        assert!(content.has_foreign(OURS));
        let foreign_only = content.without(OURS);
        assert_eq!(foreign_only.plain(), "Find file: ");
        assert!(!foreign_only.has_owner(OURS));
    }
}

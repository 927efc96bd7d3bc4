//! In-memory host: tiled windows inside one terminal area, each with an
//! optional single-line status console, a pair of echo surfaces for
//! transient messages, and floating windows composited on top.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Block;
use unicode_width::UnicodeWidthChar;

use super::decorator::{FloatingDecorator, FrameDecorator};
use super::{
    AnnotationId, ConsoleContent, ConsoleHost, ContentBufferId, ContentRun, FloatingId,
    FloatingParam, FloatingParams, Hook, HostEvent, HostHooks, HostWindowId, SurfaceId,
    ViewportFlags, WindowHost,
};
use crate::error::HostError;
use crate::layout::floating::FloatRect;
use crate::measure::ConsoleFont;
use crate::text::{AnnotationText, Spacer, StyledText};
use crate::ui::{UiFrame, safe_set_line, safe_set_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleKind {
    Echo,
    Status(HostWindowId),
}

#[derive(Debug)]
struct Console {
    kind: ConsoleKind,
    content: ConsoleContent,
}

/// Zero-length, sticky-end annotation. Every write the screen performs
/// either appends at the end or replaces the whole content, so an
/// annotation advanced by insertions at its position always sits at the end.
#[derive(Debug)]
struct Annotation {
    surface: SurfaceId,
    text: Option<AnnotationText>,
}

#[derive(Debug)]
struct WindowState {
    title: String,
    area: Rect,
    status_console: Option<SurfaceId>,
    shares_console_of: Option<HostWindowId>,
    embedded_layer: bool,
}

#[derive(Debug)]
struct Floating {
    parent: Option<HostWindowId>,
    params: FloatingParams,
    buffer: Option<ContentBufferId>,
    viewport: Option<ViewportFlags>,
    rect: FloatRect,
    visible: bool,
    root_alive: bool,
    position_writes: usize,
}

#[derive(Debug)]
struct ContentBuffer {
    name: String,
    text: StyledText,
}

pub struct Screen {
    area: Rect,
    font: ConsoleFont,
    windows: BTreeMap<HostWindowId, WindowState>,
    focused: Option<HostWindowId>,
    consoles: BTreeMap<SurfaceId, Console>,
    echo_surfaces: Vec<SurfaceId>,
    message_surface: Option<SurfaceId>,
    annotations: BTreeMap<AnnotationId, Annotation>,
    floats: BTreeMap<FloatingId, Floating>,
    buffers: BTreeMap<ContentBufferId, ContentBuffer>,
    hooks: BTreeSet<Hook>,
    pending: VecDeque<HostEvent>,
    redisplay_suppressed: bool,
    forced_decorations: bool,
    floats_created: usize,
    decorator: Box<dyn FloatingDecorator>,
    next_id: u32,
}

impl Screen {
    /// Empty screen with the usual pair of echo surfaces.
    pub fn new(area: Rect, font: ConsoleFont) -> Self {
        let mut screen = Self {
            area,
            font,
            windows: BTreeMap::new(),
            focused: None,
            consoles: BTreeMap::new(),
            echo_surfaces: Vec::new(),
            message_surface: None,
            annotations: BTreeMap::new(),
            floats: BTreeMap::new(),
            buffers: BTreeMap::new(),
            hooks: BTreeSet::new(),
            pending: VecDeque::new(),
            redisplay_suppressed: false,
            forced_decorations: false,
            floats_created: 0,
            decorator: Box::new(FrameDecorator),
            next_id: 1,
        };
        screen.add_echo_surface();
        screen.add_echo_surface();
        screen
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = id.saturating_add(1);
        id
    }

    fn emit(&mut self, event: HostEvent) {
        if self.hooks.contains(&event.hook()) {
            self.pending.push_back(event);
        }
    }

    /// Drain events for subscribed hooks.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        self.pending.drain(..).collect()
    }

    pub fn is_subscribed(&self, hook: Hook) -> bool {
        self.hooks.contains(&hook)
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn resize(&mut self, area: Rect) {
        if self.area == area {
            return;
        }
        self.area = area;
        self.retile();
    }

    fn retile(&mut self) {
        let count = self.windows.len() as u32;
        if count > 0 {
            let constraints = (0..count).map(|_| Constraint::Ratio(1, count));
            let areas = Layout::horizontal(constraints).split(self.area);
            for (window, area) in self.windows.values_mut().zip(areas.iter()) {
                window.area = *area;
            }
        }
        tracing::debug!(windows = count, "retiled host windows");
        self.emit(HostEvent::LayoutChanged);
    }

    /// New window with its own status console.
    pub fn add_window(&mut self, title: &str) -> HostWindowId {
        let id = HostWindowId(self.next_id());
        let console = SurfaceId(self.next_id());
        self.consoles.insert(
            console,
            Console {
                kind: ConsoleKind::Status(id),
                content: ConsoleContent::default(),
            },
        );
        self.insert_window(id, title, Some(console), None);
        id
    }

    /// New window that displays `owner`'s status console instead of its own.
    pub fn add_window_sharing(&mut self, title: &str, owner: HostWindowId) -> HostWindowId {
        let id = HostWindowId(self.next_id());
        self.insert_window(id, title, None, Some(owner));
        id
    }

    fn insert_window(
        &mut self,
        id: HostWindowId,
        title: &str,
        status_console: Option<SurfaceId>,
        shares_console_of: Option<HostWindowId>,
    ) {
        self.windows.insert(
            id,
            WindowState {
                title: title.to_string(),
                area: Rect::default(),
                status_console,
                shares_console_of,
                embedded_layer: false,
            },
        );
        if self.focused.is_none() {
            self.focused = Some(id);
        }
        self.retile();
    }

    /// Remove a window along with its status console and child floating
    /// windows.
    pub fn remove_window(&mut self, id: HostWindowId) {
        let Some(window) = self.windows.remove(&id) else {
            return;
        };
        if let Some(console) = window.status_console {
            self.remove_surface(console);
        }
        for other in self.windows.values_mut() {
            if other.shares_console_of == Some(id) {
                other.shares_console_of = None;
            }
        }
        let children: Vec<FloatingId> = self
            .floats
            .iter()
            .filter(|(_, float)| float.parent == Some(id))
            .map(|(fid, _)| *fid)
            .collect();
        for child in children {
            self.floats.remove(&child);
        }
        if self.focused == Some(id) {
            self.focused = self.windows.keys().next().copied();
        }
        self.retile();
    }

    pub fn focus_window(&mut self, id: HostWindowId) {
        if self.windows.contains_key(&id) {
            self.focused = Some(id);
        }
    }

    pub fn focused_window(&self) -> Option<HostWindowId> {
        self.focused
    }

    pub fn set_embedded_layer(&mut self, id: HostWindowId, embedded: bool) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.embedded_layer = embedded;
        }
    }

    pub fn add_echo_surface(&mut self) -> SurfaceId {
        let id = SurfaceId(self.next_id());
        self.consoles.insert(
            id,
            Console {
                kind: ConsoleKind::Echo,
                content: ConsoleContent::default(),
            },
        );
        self.echo_surfaces.push(id);
        self.emit(HostEvent::SurfaceCreated(id));
        id
    }

    /// Kill a surface; annotations on it become dead.
    pub fn remove_surface(&mut self, id: SurfaceId) {
        self.consoles.remove(&id);
        self.echo_surfaces.retain(|surface| *surface != id);
        if self.message_surface == Some(id) {
            self.message_surface = None;
        }
    }

    /// Show a transient message, alternating between the echo surfaces the
    /// way a double-buffered echo area does.
    pub fn show_message(&mut self, text: &str) {
        let next = match self.message_surface {
            Some(current) => self
                .echo_surfaces
                .iter()
                .copied()
                .find(|surface| *surface != current)
                .unwrap_or(current),
            None => match self.echo_surfaces.first() {
                Some(first) => *first,
                None => return,
            },
        };
        for surface in self.echo_surfaces.clone() {
            if let Some(console) = self.consoles.get_mut(&surface) {
                console.content = ConsoleContent::default();
            }
        }
        if let Some(console) = self.consoles.get_mut(&next) {
            console
                .content
                .push(ContentRun::text(StyledText::raw(text)));
        }
        self.message_surface = Some(next);
    }

    /// Append to the message currently displayed.
    pub fn append_message(&mut self, text: &str) {
        let Some(surface) = self.message_surface else {
            self.show_message(text);
            return;
        };
        if let Some(console) = self.consoles.get_mut(&surface) {
            console
                .content
                .push(ContentRun::text(StyledText::raw(text)));
        }
    }

    pub fn clear_message(&mut self) {
        if let Some(surface) = self.message_surface.take()
            && let Some(console) = self.consoles.get_mut(&surface)
        {
            console.content = ConsoleContent::default();
        }
    }

    pub fn message_surface(&self) -> Option<SurfaceId> {
        self.message_surface
    }

    pub fn status_console_of(&self, window: HostWindowId) -> Option<SurfaceId> {
        let owner = self.status_console_owner(window)?;
        self.windows.get(&owner)?.status_console
    }

    /// Enter a prompt in the focused window's status console. The prompt
    /// replaces the console's content, as reading input does.
    pub fn begin_prompt(&mut self, prompt: &str) {
        let Some(console) = self.focused.and_then(|w| self.status_console_of(w)) else {
            return;
        };
        if let Some(state) = self.consoles.get_mut(&console) {
            state.content = ConsoleContent::new(vec![ContentRun::text(StyledText::raw(prompt))]);
        }
        self.emit(HostEvent::StatusConsoleFocused);
    }

    pub fn end_prompt(&mut self) {
        let Some(console) = self.focused.and_then(|w| self.status_console_of(w)) else {
            return;
        };
        if let Some(state) = self.consoles.get_mut(&console) {
            state.content = ConsoleContent::default();
        }
    }

    /// Global display mode that re-enables decorations on every floating
    /// window behind the owner's back.
    pub fn set_forced_decorations(&mut self, forced: bool) {
        self.forced_decorations = forced;
        if forced {
            for float in self.floats.values_mut() {
                float.params.decorated = true;
            }
        }
    }

    pub fn forced_decorations(&self) -> bool {
        self.forced_decorations
    }

    /// Simulate the host tearing down a floating window's root viewport.
    pub fn kill_floating_root(&mut self, id: FloatingId) {
        if let Some(float) = self.floats.get_mut(&id) {
            float.root_alive = false;
        }
    }

    pub fn floats_created(&self) -> usize {
        self.floats_created
    }

    pub fn position_writes(&self, id: FloatingId) -> usize {
        self.floats
            .get(&id)
            .map(|float| float.position_writes)
            .unwrap_or(0)
    }

    pub fn viewport_flags(&self, id: FloatingId) -> Option<ViewportFlags> {
        self.floats.get(&id).and_then(|float| float.viewport)
    }

    pub fn redisplay_suppressed(&self) -> bool {
        self.redisplay_suppressed
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn buffer_text(&self, id: ContentBufferId) -> Option<String> {
        self.buffers.get(&id).map(|buffer| buffer.text.plain())
    }

    pub fn buffer_named(&self, name: &str) -> Option<ContentBufferId> {
        self.buffers
            .iter()
            .find(|(_, buffer)| buffer.name == name)
            .map(|(id, _)| *id)
    }

    /// Absolute rectangle of a floating window's content.
    pub fn floating_screen_rect(&self, id: FloatingId) -> Option<FloatRect> {
        let float = self.floats.get(&id)?;
        let origin = match float.parent {
            Some(parent) => {
                let area = self.windows.get(&parent)?.area;
                (area.x as i32, area.y as i32)
            }
            None => (0, 0),
        };
        Some(float.rect.offset_by(origin))
    }

    fn console_width_of(&self, console: &Console) -> u16 {
        let window = match console.kind {
            ConsoleKind::Status(window) => Some(window),
            ConsoleKind::Echo => self
                .focused
                .and_then(|focused| self.status_console_owner(focused)),
        };
        window
            .and_then(|id| self.windows.get(&id))
            .map(|window| window.area.width)
            .unwrap_or(self.area.width)
    }

    /// Visual lines of a console, annotations included.
    pub fn console_lines(&self, surface: SurfaceId) -> Vec<Line<'static>> {
        let Some(console) = self.consoles.get(&surface) else {
            return Vec::new();
        };
        let mut builder = LineBuilder::new(self.console_width_of(console));
        for run in console.content.runs() {
            builder.push_run(run.spacer, &run.text);
        }
        for annotation in self.annotations.values() {
            if annotation.surface != surface {
                continue;
            }
            if let Some(text) = &annotation.text {
                if text.leading_newline {
                    builder.hard_newline();
                }
                builder.push_run(Some(text.spacer), &text.text);
            }
        }
        builder.finish()
    }

    /// Surface drawn in `window`'s status row.
    fn displayed_console(&self, window: HostWindowId) -> Option<SurfaceId> {
        let console = self.windows.get(&window)?.status_console?;
        let owns_focus = self
            .focused
            .and_then(|focused| self.status_console_owner(focused))
            == Some(window);
        let prompting = self
            .consoles
            .get(&console)
            .is_some_and(|state| has_foreign_text(&state.content));
        match self.message_surface {
            Some(message) if owns_focus && !prompting => Some(message),
            _ => Some(console),
        }
    }

    /// Draw windows, status rows and floating windows.
    ///
    /// Nothing is drawn while redisplay is suppressed.
    pub fn render(&self, frame: &mut UiFrame<'_>) {
        if self.redisplay_suppressed {
            return;
        }
        for (id, window) in &self.windows {
            let area = window.area;
            if area.width == 0 || area.height == 0 {
                continue;
            }
            let console_rows = if window.status_console.is_some() { 1 } else { 0 };
            let body = Rect {
                height: area.height.saturating_sub(console_rows),
                ..area
            };
            frame.render_widget(Block::bordered().title(window.title.clone()), body);

            let Some(surface) = self.displayed_console(*id) else {
                continue;
            };
            let lines = self.console_lines(surface);
            let rows = (lines.len() as u16).min(area.height);
            let top = area.y + area.height - rows;
            let skip = lines.len().saturating_sub(rows as usize);
            let buffer = frame.buffer_mut();
            for (offset, line) in lines.iter().skip(skip).enumerate() {
                let y = top + offset as u16;
                let blank = " ".repeat(area.width as usize);
                safe_set_string(buffer, area, area.x, y, &blank, Style::default());
                safe_set_line(buffer, area, area.x, y, line);
            }
        }
        for (id, float) in &self.floats {
            if !float.visible {
                continue;
            }
            let Some(dest) = self.floating_screen_rect(*id) else {
                continue;
            };
            if dest.width == 0 || dest.height == 0 {
                continue;
            }
            let mut content = Buffer::empty(Rect {
                x: 0,
                y: 0,
                width: dest.width,
                height: dest.height,
            });
            if let Some(buffer) = float.buffer.and_then(|b| self.buffers.get(&b)) {
                content.set_line(0, 0, &buffer.text.to_line(), dest.width);
            }
            frame.blit_from_signed(&content, dest);
            if float.params.decorated {
                self.render_chrome(frame, dest, float);
            }
        }
    }

    fn render_chrome(&self, frame: &mut UiFrame<'_>, dest: FloatRect, float: &Floating) {
        let x = dest.x - 1;
        let y = dest.y - 1;
        if x < 0 || y < 0 {
            return;
        }
        let chrome = Rect {
            x: x as u16,
            y: y as u16,
            width: dest.width.saturating_add(2),
            height: dest.height.saturating_add(2),
        };
        let title = float
            .buffer
            .and_then(|b| self.buffers.get(&b))
            .map(|buffer| buffer.name.trim().to_string())
            .unwrap_or_default();
        let bounds = frame.area();
        self.decorator
            .render_chrome(frame.buffer_mut(), chrome, bounds, &title);
    }

    /// Render into a fresh buffer covering the whole screen.
    pub fn snapshot(&self) -> Buffer {
        let mut buffer = Buffer::empty(self.area);
        let mut frame = UiFrame::from_parts(self.area, &mut buffer);
        self.render(&mut frame);
        buffer
    }
}

/// Unowned text, e.g. a prompt being read.
fn has_foreign_text(content: &ConsoleContent) -> bool {
    content
        .runs()
        .iter()
        .any(|run| run.owner.is_none() && !run.text.is_empty())
}

struct LineBuilder {
    width: u16,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    column: usize,
    soft_break: bool,
}

impl LineBuilder {
    fn new(width: u16) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: Vec::new(),
            column: 0,
            soft_break: false,
        }
    }

    fn newline(&mut self) {
        self.lines
            .push(Line::from(std::mem::take(&mut self.current)));
        self.column = 0;
        self.soft_break = false;
    }

    /// Explicit line break. One directly after a soft wrap is absorbed.
    fn hard_newline(&mut self) {
        if self.soft_break {
            self.soft_break = false;
        } else {
            self.newline();
        }
    }

    fn push_run(&mut self, spacer: Option<Spacer>, text: &StyledText) {
        if let Some(spacer) = spacer {
            let blank = spacer.resolve(self.column, self.width);
            if blank > 0 {
                self.current.push(Span::raw(" ".repeat(blank)));
                self.column += blank;
                self.soft_break = false;
            }
        }
        for span in text.spans() {
            let mut pieces = span.content.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                self.push_wrapped(piece, span.style);
                if pieces.peek().is_some() {
                    self.hard_newline();
                }
            }
        }
    }

    /// Soft-wraps at the console width. A full line breaks eagerly, so the
    /// column never reaches `width`.
    fn push_wrapped(&mut self, piece: &str, style: Style) {
        let width = self.width as usize;
        let mut chunk = String::new();
        for ch in piece.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if width > 0 && self.column > 0 && self.column + w > width {
                self.flush_chunk(&mut chunk, style);
                self.newline();
            }
            chunk.push(ch);
            self.column += w;
            if width > 0 && self.column >= width {
                self.flush_chunk(&mut chunk, style);
                self.newline();
                self.soft_break = true;
            }
        }
        self.flush_chunk(&mut chunk, style);
    }

    fn flush_chunk(&mut self, chunk: &mut String, style: Style) {
        if !chunk.is_empty() {
            self.current
                .push(Span::styled(std::mem::take(chunk), style));
            self.soft_break = false;
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.newline();
        }
        self.lines
    }
}

fn content_trailing_width(content: &ConsoleContent, width: u16) -> usize {
    let mut builder = LineBuilder::new(width);
    for run in content.runs() {
        builder.push_run(run.spacer, &run.text);
    }
    builder.column
}

impl ConsoleHost for Screen {
    fn console_surfaces(&self) -> Vec<SurfaceId> {
        self.echo_surfaces.clone()
    }

    fn status_consoles(&self) -> Vec<SurfaceId> {
        self.windows
            .values()
            .filter_map(|window| window.status_console)
            .collect()
    }

    fn surface_alive(&self, surface: SurfaceId) -> bool {
        self.consoles.contains_key(&surface)
    }

    fn console_width(&self, surface: SurfaceId) -> Result<u16, HostError> {
        self.consoles
            .get(&surface)
            .map(|console| self.console_width_of(console))
            .ok_or(HostError::SurfaceGone(surface))
    }

    fn console_font(&self, surface: SurfaceId) -> Result<ConsoleFont, HostError> {
        if self.surface_alive(surface) {
            Ok(self.font)
        } else {
            Err(HostError::SurfaceGone(surface))
        }
    }

    fn trailing_line_width(&self, surface: SurfaceId) -> Result<usize, HostError> {
        let console = self
            .consoles
            .get(&surface)
            .ok_or(HostError::SurfaceGone(surface))?;
        Ok(content_trailing_width(
            &console.content,
            self.console_width_of(console),
        ))
    }

    fn attach_annotation(&mut self, surface: SurfaceId) -> Result<AnnotationId, HostError> {
        if !self.surface_alive(surface) {
            return Err(HostError::SurfaceGone(surface));
        }
        let id = AnnotationId(self.next_id());
        self.annotations.insert(
            id,
            Annotation {
                surface,
                text: None,
            },
        );
        Ok(id)
    }

    fn annotation_surface(&self, annotation: AnnotationId) -> Option<SurfaceId> {
        let surface = self.annotations.get(&annotation)?.surface;
        self.surface_alive(surface).then_some(surface)
    }

    fn set_annotation_text(
        &mut self,
        annotation: AnnotationId,
        text: Option<AnnotationText>,
    ) -> Result<(), HostError> {
        let surface = self
            .annotation_surface(annotation)
            .ok_or(HostError::AnnotationGone(annotation))?;
        if let Some(state) = self.annotations.get_mut(&annotation) {
            debug_assert_eq!(state.surface, surface);
            state.text = text;
        }
        Ok(())
    }

    fn remove_annotation(&mut self, annotation: AnnotationId) {
        self.annotations.remove(&annotation);
    }

    fn console_content(&self, surface: SurfaceId) -> Result<ConsoleContent, HostError> {
        self.consoles
            .get(&surface)
            .map(|console| console.content.clone())
            .ok_or(HostError::SurfaceGone(surface))
    }

    fn set_console_content(
        &mut self,
        surface: SurfaceId,
        content: ConsoleContent,
    ) -> Result<(), HostError> {
        let console = self
            .consoles
            .get_mut(&surface)
            .ok_or(HostError::SurfaceGone(surface))?;
        console.content = content;
        Ok(())
    }
}

impl WindowHost for Screen {
    fn host_windows(&self) -> Vec<HostWindowId> {
        self.windows
            .iter()
            .filter(|(_, window)| window.area.width > 0 && window.area.height > 0)
            .map(|(id, _)| *id)
            .collect()
    }

    fn status_console_owner(&self, window: HostWindowId) -> Option<HostWindowId> {
        let state = self.windows.get(&window)?;
        if state.status_console.is_some() {
            return Some(window);
        }
        let owner = state.shares_console_of?;
        self.windows
            .get(&owner)
            .and_then(|owner_state| owner_state.status_console)
            .map(|_| owner)
    }

    fn window_area(&self, window: HostWindowId) -> Result<Rect, HostError> {
        self.windows
            .get(&window)
            .map(|state| state.area)
            .ok_or(HostError::WindowGone(window))
    }

    fn has_embedded_layer(&self, window: HostWindowId) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|state| state.embedded_layer)
    }

    fn set_redisplay_suppressed(&mut self, suppressed: bool) -> bool {
        std::mem::replace(&mut self.redisplay_suppressed, suppressed)
    }

    fn floating_windows(&self) -> Vec<FloatingId> {
        self.floats.keys().copied().collect()
    }

    fn create_floating(&mut self, parent: HostWindowId) -> Result<FloatingId, HostError> {
        if !self.windows.contains_key(&parent) {
            return Err(HostError::WindowGone(parent));
        }
        let id = FloatingId(self.next_id());
        let mut params = FloatingParams::default();
        if self.forced_decorations {
            params.decorated = true;
        }
        self.floats.insert(
            id,
            Floating {
                parent: Some(parent),
                params,
                buffer: None,
                viewport: None,
                rect: FloatRect::default(),
                visible: false,
                root_alive: true,
                position_writes: 0,
            },
        );
        self.floats_created += 1;
        Ok(id)
    }

    fn floating_alive(&self, floating: FloatingId) -> bool {
        self.floats.contains_key(&floating)
    }

    fn floating_parent(&self, floating: FloatingId) -> Result<Option<HostWindowId>, HostError> {
        self.floats
            .get(&floating)
            .map(|float| float.parent)
            .ok_or(HostError::FloatingGone(floating))
    }

    fn set_floating_parent(
        &mut self,
        floating: FloatingId,
        parent: Option<HostWindowId>,
    ) -> Result<(), HostError> {
        if let Some(parent) = parent
            && !self.windows.contains_key(&parent)
        {
            return Err(HostError::WindowGone(parent));
        }
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.parent = parent;
        Ok(())
    }

    fn floating_root_alive(&self, floating: FloatingId) -> bool {
        self.floats
            .get(&floating)
            .is_some_and(|float| float.root_alive)
    }

    fn floating_params(&self, floating: FloatingId) -> Result<FloatingParams, HostError> {
        self.floats
            .get(&floating)
            .map(|float| float.params)
            .ok_or(HostError::FloatingGone(floating))
    }

    fn set_floating_param(
        &mut self,
        floating: FloatingId,
        param: FloatingParam,
    ) -> Result<(), HostError> {
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.params.apply(param);
        Ok(())
    }

    fn floating_buffer(&self, floating: FloatingId) -> Option<ContentBufferId> {
        self.floats.get(&floating).and_then(|float| float.buffer)
    }

    fn bind_content(
        &mut self,
        floating: FloatingId,
        buffer: ContentBufferId,
        flags: ViewportFlags,
    ) -> Result<(), HostError> {
        if !self.buffers.contains_key(&buffer) {
            return Err(HostError::ContentBufferGone(buffer));
        }
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.buffer = Some(buffer);
        float.viewport = Some(flags);
        Ok(())
    }

    fn fit_to_content(&mut self, floating: FloatingId) -> Result<(u16, u16), HostError> {
        let width = {
            let float = self
                .floats
                .get(&floating)
                .ok_or(HostError::FloatingGone(floating))?;
            float
                .buffer
                .and_then(|b| self.buffers.get(&b))
                .map(|buffer| buffer.text.to_line().width() as u16)
                .unwrap_or(0)
                .max(1)
        };
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.rect.width = width;
        float.rect.height = 1;
        Ok((width, 1))
    }

    fn floating_geometry(&self, floating: FloatingId) -> Result<FloatRect, HostError> {
        self.floats
            .get(&floating)
            .map(|float| float.rect)
            .ok_or(HostError::FloatingGone(floating))
    }

    fn set_floating_position(
        &mut self,
        floating: FloatingId,
        position: (i32, i32),
    ) -> Result<(), HostError> {
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.rect.x = position.0;
        float.rect.y = position.1;
        float.position_writes += 1;
        Ok(())
    }

    fn floating_visible(&self, floating: FloatingId) -> bool {
        self.floats.get(&floating).is_some_and(|float| float.visible)
    }

    fn set_floating_visible(
        &mut self,
        floating: FloatingId,
        visible: bool,
    ) -> Result<(), HostError> {
        let float = self
            .floats
            .get_mut(&floating)
            .ok_or(HostError::FloatingGone(floating))?;
        float.visible = visible;
        Ok(())
    }

    fn destroy_floating(&mut self, floating: FloatingId) {
        self.floats.remove(&floating);
    }

    fn create_content_buffer(&mut self, name: &str) -> ContentBufferId {
        let id = ContentBufferId(self.next_id());
        self.buffers.insert(
            id,
            ContentBuffer {
                name: name.to_string(),
                text: StyledText::default(),
            },
        );
        id
    }

    fn content_buffer_alive(&self, buffer: ContentBufferId) -> bool {
        self.buffers.contains_key(&buffer)
    }

    fn set_buffer_content(
        &mut self,
        buffer: ContentBufferId,
        text: &StyledText,
    ) -> Result<(), HostError> {
        let state = self
            .buffers
            .get_mut(&buffer)
            .ok_or(HostError::ContentBufferGone(buffer))?;
        state.text = text.clone();
        Ok(())
    }

    fn destroy_content_buffer(&mut self, buffer: ContentBufferId) {
        self.buffers.remove(&buffer);
        for float in self.floats.values_mut() {
            if float.buffer == Some(buffer) {
                float.buffer = None;
            }
        }
    }
}

impl HostHooks for Screen {
    fn subscribe(&mut self, hook: Hook) {
        self.hooks.insert(hook);
    }

    fn unsubscribe(&mut self, hook: Hook) {
        self.hooks.remove(&hook);
        self.pending.retain(|event| event.hook() != hook);
    }
}

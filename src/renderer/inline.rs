use crate::error::HostError;
use crate::host::{AnnotationId, ConsoleContent, ConsoleHost, ContentRun, OwnerTag, SurfaceId};
use crate::layout::PlacementContext;
use crate::text::{AnnotationText, StatusText, StyledText};

/// Marks literal content written into status consoles.
pub const STATUS_OWNER: OwnerTag = OwnerTag("term-tray");

/// Outcome of one inline render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InlineReport {
    pub annotations_updated: usize,
    pub annotations_wrapped: usize,
    pub status_consoles_written: usize,
    /// Status consoles left alone because they held someone else's content.
    pub status_consoles_busy: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Attached {
    annotation: AnnotationId,
    surface: SurfaceId,
}

/// Keeps one trailing annotation per console surface and mirrors the text
/// into status consoles as owned literal content.
#[derive(Debug, Default)]
pub struct InlineAnnotationRenderer {
    attached: Vec<Attached>,
    include_status_console: bool,
}

impl InlineAnnotationRenderer {
    pub fn new(include_status_console: bool) -> Self {
        Self {
            attached: Vec::new(),
            include_status_console,
        }
    }

    pub fn annotations(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.attached.iter().map(|entry| entry.annotation)
    }

    pub fn is_attached(&self, surface: SurfaceId) -> bool {
        self.attached.iter().any(|entry| entry.surface == surface)
    }

    /// Attach an annotation to `surface` unless one is already there.
    pub fn attach<H: ConsoleHost + ?Sized>(
        &mut self,
        host: &mut H,
        surface: SurfaceId,
    ) -> Result<AnnotationId, HostError> {
        if let Some(entry) = self
            .attached
            .iter()
            .find(|entry| entry.surface == surface)
            .copied()
            && host.annotation_surface(entry.annotation) == Some(surface)
        {
            return Ok(entry.annotation);
        }
        let annotation = host.attach_annotation(surface)?;
        self.attached.push(Attached {
            annotation,
            surface,
        });
        tracing::debug!(?surface, ?annotation, "attached status annotation");
        Ok(annotation)
    }

    /// Prune dead annotations, then attach to every surface that lacks one.
    pub fn attach_all<H: ConsoleHost + ?Sized>(&mut self, host: &mut H) {
        self.prune_dead(host);
        for surface in host.console_surfaces() {
            if self.is_attached(surface) {
                continue;
            }
            if let Err(err) = self.attach(host, surface) {
                tracing::debug!(%err, "surface vanished before attach");
            }
        }
    }

    /// Drop annotations whose surface no longer exists.
    pub fn prune_dead<H: ConsoleHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let before = self.attached.len();
        let mut dead = Vec::new();
        self.attached.retain(|entry| {
            let alive = host.annotation_surface(entry.annotation) == Some(entry.surface);
            if !alive {
                dead.push(entry.annotation);
            }
            alive
        });
        for annotation in dead {
            host.remove_annotation(annotation);
        }
        let pruned = before - self.attached.len();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned dead status annotations");
        }
        pruned
    }

    /// Place `status` on every live surface and status console.
    pub fn render<H: ConsoleHost + ?Sized>(
        &mut self,
        host: &mut H,
        ctx: &PlacementContext<'_>,
        status: &StatusText,
    ) -> InlineReport {
        self.attach_all(host);
        let mut report = InlineReport::default();
        for entry in self.attached.clone() {
            match place_annotation(host, ctx, entry, &status.text) {
                Ok(wrapped) => {
                    report.annotations_updated += 1;
                    if wrapped {
                        report.annotations_wrapped += 1;
                    }
                }
                Err(err) => tracing::debug!(%err, "skipping stale annotation"),
            }
        }
        if self.include_status_console {
            for console in host.status_consoles() {
                match write_status_console(host, ctx, console, &status.text) {
                    Ok(true) => report.status_consoles_written += 1,
                    Ok(false) => {
                        tracing::debug!(?console, "status console holds foreign content; skipped");
                        report.status_consoles_busy += 1;
                    }
                    Err(err) => tracing::debug!(%err, "status console vanished"),
                }
            }
        }
        report
    }

    /// Remove every annotation and any owned status console content.
    pub fn detach_all<H: ConsoleHost + ?Sized>(&mut self, host: &mut H) {
        for entry in self.attached.drain(..) {
            host.remove_annotation(entry.annotation);
        }
        for console in host.status_consoles() {
            let Ok(content) = host.console_content(console) else {
                continue;
            };
            if content.has_owner(STATUS_OWNER)
                && let Err(err) = host.set_console_content(console, content.without(STATUS_OWNER))
            {
                tracing::debug!(%err, "status console vanished during teardown");
            }
        }
    }
}

/// Returns whether the text was wrapped onto its own line.
fn place_annotation<H: ConsoleHost + ?Sized>(
    host: &mut H,
    ctx: &PlacementContext<'_>,
    entry: Attached,
    text: &StyledText,
) -> Result<bool, HostError> {
    let surface = entry.surface;
    let width = host.console_width(surface)?;
    let font = host.console_font(surface)?;
    let occupied = host.trailing_line_width(surface)?;
    let placement = ctx.place(text, &font, occupied, width);
    let status = StatusText {
        spacer: placement.spacer(),
        text: text.clone(),
    };
    let content = if placement.wrap {
        AnnotationText::wrapped(&status)
    } else {
        AnnotationText::inline(&status)
    };
    host.set_annotation_text(entry.annotation, Some(content))?;
    Ok(placement.wrap)
}

/// Replace owned content in a status console; returns `false` without
/// touching anything when the console holds content we did not write.
fn write_status_console<H: ConsoleHost + ?Sized>(
    host: &mut H,
    ctx: &PlacementContext<'_>,
    console: SurfaceId,
    text: &StyledText,
) -> Result<bool, HostError> {
    let content = host.console_content(console)?;
    if content.has_foreign(STATUS_OWNER) {
        return Ok(false);
    }
    let width = host.console_width(console)?;
    let font = host.console_font(console)?;
    let placement = ctx.place(text, &font, 0, width);
    let run = ContentRun::owned(placement.spacer(), text.clone(), STATUS_OWNER);
    host.set_console_content(console, ConsoleContent::new(vec![run]))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Screen;
    use crate::layout::LayoutPlanner;
    use crate::measure::{ConsoleFont, TextMeasurer};
    use crate::text::Spacer;
    use ratatui::layout::Rect;

    fn screen() -> Screen {
        let mut screen = Screen::new(
            Rect {
                x: 0,
                y: 0,
                width: 80,
                height: 6,
            },
            ConsoleFont::new(8, 16),
        );
        screen.add_window("main");
        screen
    }

    fn status(text: &str) -> StatusText {
        StatusText {
            spacer: Spacer::new(text.len() as u16),
            text: StyledText::raw(text),
        }
    }

    fn render(
        renderer: &mut InlineAnnotationRenderer,
        host: &mut Screen,
        text: &str,
    ) -> InlineReport {
        let planner = LayoutPlanner::new(5);
        let measurer = TextMeasurer::default();
        let ctx = PlacementContext {
            planner: &planner,
            measurer: &measurer,
            padding: 2,
            scale: 1.0,
        };
        renderer.render(host, &ctx, &status(text))
    }

    #[test]
    fn attach_is_idempotent_per_surface() {
        let mut host = screen();
        let mut renderer = InlineAnnotationRenderer::new(false);
        renderer.attach_all(&mut host);
        renderer.attach_all(&mut host);
        assert_eq!(renderer.annotations().count(), 2);
        assert_eq!(host.annotation_count(), 2);
    }

    #[test]
    fn long_message_wraps_status_text() {
        let mut host = screen();
        let mut renderer = InlineAnnotationRenderer::new(false);
        host.show_message(&"m".repeat(65));
        let report = render(&mut renderer, &mut host, "0123456789");
        assert_eq!(report.annotations_updated, 2);
        // only the surface showing the message is crowded
        assert_eq!(report.annotations_wrapped, 1);
        let surface = host.message_surface().unwrap();
        assert_eq!(host.console_lines(surface).len(), 2);
    }

    #[test]
    fn dead_surfaces_are_pruned_silently() {
        let mut host = screen();
        let mut renderer = InlineAnnotationRenderer::new(false);
        renderer.attach_all(&mut host);
        let doomed = host.console_surfaces()[0];
        host.remove_surface(doomed);
        let report = render(&mut renderer, &mut host, "ok");
        assert_eq!(report.annotations_updated, 1);
        assert!(!renderer.is_attached(doomed));
        assert_eq!(host.annotation_count(), 1);
    }

    #[test]
    fn foreign_status_console_content_is_untouched() {
        let mut host = screen();
        let mut renderer = InlineAnnotationRenderer::new(true);
        host.begin_prompt("Find file: ");
        let console = host.status_consoles()[0];
        let report = render(&mut renderer, &mut host, "12:00");
        assert_eq!(report.status_consoles_busy, 1);
        assert_eq!(report.status_consoles_written, 0);
        assert_eq!(host.console_content(console).unwrap().plain(), "Find file: ");
    }

    #[test]
    fn owned_status_console_content_is_replaced() {
        let mut host = screen();
        let mut renderer = InlineAnnotationRenderer::new(true);
        let console = host.status_consoles()[0];
        render(&mut renderer, &mut host, "12:00");
        render(&mut renderer, &mut host, "12:01");
        let content = host.console_content(console).unwrap();
        assert_eq!(content.runs().len(), 1);
        assert_eq!(content.plain(), "12:01");
        renderer.detach_all(&mut host);
        assert!(host.console_content(console).unwrap().is_empty());
        assert_eq!(host.annotation_count(), 0);
    }
}

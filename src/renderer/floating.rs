use std::collections::BTreeMap;

use crate::constants::{DEFAULT_FLOATING_OFFSET, FLOATING_BUFFER_NAME};
use crate::error::HostError;
use crate::host::{
    ContentBufferId, FloatingId, FloatingParams, HostWindowId, ViewportFlags, WindowHost,
};
use crate::layout::floating::anchored_position;
use crate::text::StyledText;

/// Outcome of one `show` pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatingReport {
    pub created: usize,
    pub reused: usize,
    pub moved: usize,
    pub params_reapplied: usize,
    pub destroyed: usize,
}

/// One floating window per host window that owns its status console, all
/// showing the same shared content buffer.
#[derive(Debug)]
pub struct FloatingWindowRenderer {
    buffer: Option<ContentBufferId>,
    windows: BTreeMap<HostWindowId, FloatingId>,
    desired: FloatingParams,
    offset: (i16, i16),
}

impl FloatingWindowRenderer {
    pub fn new(offset: (i16, i16)) -> Self {
        Self {
            buffer: None,
            windows: BTreeMap::new(),
            desired: FloatingParams::status(),
            offset,
        }
    }

    pub fn buffer(&self) -> Option<ContentBufferId> {
        self.buffer
    }

    pub fn window_for(&self, anchor: HostWindowId) -> Option<FloatingId> {
        self.windows.get(&anchor).copied()
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn ensure_buffer<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> ContentBufferId {
        match self.buffer {
            Some(buffer) if host.content_buffer_alive(buffer) => buffer,
            _ => {
                let buffer = host.create_content_buffer(FLOATING_BUFFER_NAME);
                tracing::debug!(?buffer, "created floating content buffer");
                self.buffer = Some(buffer);
                buffer
            }
        }
    }

    /// Host windows that own the status console they display.
    fn anchors<H: WindowHost + ?Sized>(host: &H) -> Vec<HostWindowId> {
        host.host_windows()
            .into_iter()
            .filter(|window| host.status_console_owner(*window) == Some(*window))
            .collect()
    }

    /// Write `content` to the shared buffer and make sure every anchor shows
    /// exactly one floating window with it.
    pub fn show<H: WindowHost + ?Sized>(
        &mut self,
        host: &mut H,
        content: &StyledText,
    ) -> FloatingReport {
        let mut report = FloatingReport::default();
        let buffer = self.ensure_buffer(host);
        if let Err(err) = host.set_buffer_content(buffer, content) {
            tracing::debug!(%err, "content buffer vanished");
            return report;
        }

        let anchors = Self::anchors(host);
        let stale: Vec<HostWindowId> = self
            .windows
            .keys()
            .filter(|anchor| !anchors.contains(anchor))
            .copied()
            .collect();
        for anchor in stale {
            if let Some(floating) = self.windows.remove(&anchor) {
                host.destroy_floating(floating);
                report.destroyed += 1;
                tracing::debug!(?anchor, ?floating, "anchor gone; destroyed floating window");
            }
        }

        for anchor in anchors {
            if let Err(err) = self.show_on(host, anchor, buffer, &mut report) {
                tracing::debug!(%err, ?anchor, "floating window unavailable this cycle");
                if let Some(floating) = self.windows.remove(&anchor) {
                    host.destroy_floating(floating);
                }
            }
        }
        report
    }

    fn show_on<H: WindowHost + ?Sized>(
        &mut self,
        host: &mut H,
        anchor: HostWindowId,
        buffer: ContentBufferId,
        report: &mut FloatingReport,
    ) -> Result<(), HostError> {
        let expected_parent = expected_parent(host, anchor);
        let existing = self.windows.get(&anchor).copied();
        let reusable = existing.filter(|floating| {
            host.floating_alive(*floating)
                && host.floating_root_alive(*floating)
                && host.floating_parent(*floating) == Ok(expected_parent)
                && host.floating_buffer(*floating) == Some(buffer)
        });

        let floating = match reusable {
            Some(floating) => {
                report.reused += 1;
                report.params_reapplied += self.reconcile_params(host, floating)?;
                let (width, height) = host.fit_to_content(floating)?;
                if self.place(host, anchor, floating, (width, height))? {
                    report.moved += 1;
                }
                if !host.floating_visible(floating) {
                    host.set_floating_visible(floating, true)?;
                }
                floating
            }
            None => {
                if let Some(stale) = existing {
                    tracing::debug!(
                        ?anchor,
                        floating = ?stale,
                        "replacing invalid floating window"
                    );
                    host.destroy_floating(stale);
                    report.destroyed += 1;
                }
                let floating = self.build(host, anchor, buffer)?;
                report.created += 1;
                report.moved += 1;
                floating
            }
        };
        self.windows.insert(anchor, floating);
        Ok(())
    }

    /// Create and configure a floating window with redisplay suppressed.
    fn build<H: WindowHost + ?Sized>(
        &self,
        host: &mut H,
        anchor: HostWindowId,
        buffer: ContentBufferId,
    ) -> Result<FloatingId, HostError> {
        let previous = host.set_redisplay_suppressed(true);
        let result = host.create_floating(anchor).and_then(|floating| {
            match self.configure_new(host, anchor, floating, buffer) {
                Ok(()) => Ok(floating),
                Err(err) => {
                    host.destroy_floating(floating);
                    Err(err)
                }
            }
        });
        host.set_redisplay_suppressed(previous);
        if let Ok(floating) = result {
            tracing::debug!(?anchor, ?floating, "created floating window");
        }
        result
    }

    fn configure_new<H: WindowHost + ?Sized>(
        &self,
        host: &mut H,
        anchor: HostWindowId,
        floating: FloatingId,
        buffer: ContentBufferId,
    ) -> Result<(), HostError> {
        for param in self.desired.assignments() {
            host.set_floating_param(floating, param)?;
        }
        self.reconcile_params(host, floating)?;
        host.bind_content(floating, buffer, ViewportFlags::locked())?;
        let size = host.fit_to_content(floating)?;
        if host.has_embedded_layer(anchor) {
            // embedded layers draw over child windows; detach so it stays visible
            host.set_floating_parent(floating, None)?;
        }
        self.place(host, anchor, floating, size)?;
        host.set_floating_visible(floating, true)
    }

    /// Re-apply parameters the host overrode; returns how many drifted.
    fn reconcile_params<H: WindowHost + ?Sized>(
        &self,
        host: &mut H,
        floating: FloatingId,
    ) -> Result<usize, HostError> {
        let observed = host.floating_params(floating)?;
        let changes = self.desired.diff(&observed);
        for change in &changes {
            host.set_floating_param(floating, *change)?;
        }
        if !changes.is_empty() {
            tracing::debug!(?floating, ?changes, "reapplied drifted floating parameters");
        }
        Ok(changes.len())
    }

    /// Move to the anchored position if not already there.
    fn place<H: WindowHost + ?Sized>(
        &self,
        host: &mut H,
        anchor: HostWindowId,
        floating: FloatingId,
        size: (u16, u16),
    ) -> Result<bool, HostError> {
        let area = host.window_area(anchor)?;
        let parented = host.floating_parent(floating)?.is_some();
        let target = anchored_position(area, size, self.offset, parented);
        let current = host.floating_geometry(floating)?.position();
        if current == target {
            tracing::trace!(?floating, "floating window already in place");
            return Ok(false);
        }
        host.set_floating_position(floating, target)?;
        Ok(true)
    }

    /// Destroy every floating window showing the shared buffer, then the
    /// buffer itself.
    pub fn teardown<H: WindowHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut destroyed = 0;
        if let Some(buffer) = self.buffer {
            for floating in host.floating_windows() {
                if host.floating_buffer(floating) == Some(buffer) {
                    host.destroy_floating(floating);
                    destroyed += 1;
                }
            }
        }
        for (_, floating) in std::mem::take(&mut self.windows) {
            if host.floating_alive(floating) {
                host.destroy_floating(floating);
                destroyed += 1;
            }
        }
        if let Some(buffer) = self.buffer.take() {
            host.destroy_content_buffer(buffer);
        }
        if destroyed > 0 {
            tracing::debug!(destroyed, "tore down floating windows");
        }
        destroyed
    }
}

impl Default for FloatingWindowRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_FLOATING_OFFSET)
    }
}

fn expected_parent<H: WindowHost + ?Sized>(host: &H, anchor: HostWindowId) -> Option<HostWindowId> {
    if host.has_embedded_layer(anchor) {
        None
    } else {
        Some(anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FloatingParam, Screen};
    use crate::measure::ConsoleFont;
    use ratatui::layout::Rect;

    fn screen() -> Screen {
        Screen::new(
            Rect {
                x: 0,
                y: 0,
                width: 80,
                height: 10,
            },
            ConsoleFont::new(8, 16),
        )
    }

    fn text() -> StyledText {
        StyledText::raw("12:00 load")
    }

    #[test]
    fn one_window_per_anchor_sharing_a_buffer() {
        let mut host = screen();
        let left = host.add_window("left");
        let right = host.add_window("right");
        host.add_window_sharing("side", right);
        let mut renderer = FloatingWindowRenderer::default();

        let report = renderer.show(&mut host, &text());
        assert_eq!(report.created, 2);
        assert_eq!(renderer.window_count(), 2);

        let buffer = renderer.buffer().unwrap();
        for anchor in [left, right] {
            let floating = renderer.window_for(anchor).unwrap();
            assert_eq!(host.floating_buffer(floating), Some(buffer));
            assert_eq!(host.floating_parent(floating), Ok(Some(anchor)));
            assert_eq!(host.floating_params(floating), Ok(FloatingParams::status()));
            assert_eq!(host.viewport_flags(floating), Some(ViewportFlags::locked()));
            assert!(host.floating_visible(floating));
        }
        assert_eq!(host.buffer_text(buffer).as_deref(), Some("12:00 load"));
        assert_eq!(host.buffer_named(FLOATING_BUFFER_NAME), Some(buffer));
    }

    #[test]
    fn unchanged_layout_touches_nothing() {
        let mut host = screen();
        let anchor = host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let floating = renderer.window_for(anchor).unwrap();
        let writes = host.position_writes(floating);

        let report = renderer.show(&mut host, &text());
        assert_eq!(report.created, 0);
        assert_eq!(report.reused, 1);
        assert_eq!(report.moved, 0);
        assert_eq!(report.params_reapplied, 0);
        assert_eq!(host.position_writes(floating), writes);
        assert_eq!(host.floats_created(), 1);
    }

    #[test]
    fn anchored_to_bottom_right_with_offset() {
        let mut host = screen();
        host.add_window("left");
        let right = host.add_window("right");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let floating = renderer.window_for(right).unwrap();
        // 40x10 anchor, 10x1 content, offset (-10, -1)
        assert_eq!(host.floating_geometry(floating).unwrap().position(), (20, 8));
        let rect = host.floating_screen_rect(floating).unwrap();
        assert_eq!((rect.x, rect.y), (60, 8));
    }

    #[test]
    fn resize_moves_existing_window() {
        let mut host = screen();
        let anchor = host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        host.resize(Rect {
            x: 0,
            y: 0,
            width: 100,
            height: 12,
        });
        let report = renderer.show(&mut host, &text());
        assert_eq!(report.created, 0);
        assert_eq!(report.moved, 1);
        let floating = renderer.window_for(anchor).unwrap();
        assert_eq!(host.floating_geometry(floating).unwrap().position(), (80, 10));
    }

    #[test]
    fn drifted_parameters_are_reapplied() {
        let mut host = screen();
        let anchor = host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let floating = renderer.window_for(anchor).unwrap();

        host.set_forced_decorations(true);
        host.set_floating_param(floating, FloatingParam::FocusOnClick(true))
            .unwrap();
        let report = renderer.show(&mut host, &text());
        assert_eq!(report.params_reapplied, 2);
        assert_eq!(report.created, 0);
        assert_eq!(host.floating_params(floating), Ok(FloatingParams::status()));
    }

    #[test]
    fn forced_decorations_at_creation_are_undone() {
        let mut host = screen();
        let anchor = host.add_window("main");
        host.set_forced_decorations(true);
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let floating = renderer.window_for(anchor).unwrap();
        assert!(!host.floating_params(floating).unwrap().decorated);
    }

    #[test]
    fn dead_root_is_replaced() {
        let mut host = screen();
        let anchor = host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let old = renderer.window_for(anchor).unwrap();
        host.kill_floating_root(old);

        let report = renderer.show(&mut host, &text());
        assert_eq!(report.created, 1);
        assert_eq!(report.destroyed, 1);
        assert!(!host.floating_alive(old));
        assert_ne!(renderer.window_for(anchor), Some(old));
        assert_eq!(host.floating_windows().len(), 1);
    }

    #[test]
    fn embedded_layer_gets_unparented_window() {
        let mut host = screen();
        host.add_window("left");
        let right = host.add_window("right");
        host.set_embedded_layer(right, true);
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let floating = renderer.window_for(right).unwrap();
        assert_eq!(host.floating_parent(floating), Ok(None));
        // absolute coordinates inside the anchor
        assert_eq!(host.floating_geometry(floating).unwrap().position(), (60, 8));

        let report = renderer.show(&mut host, &text());
        assert_eq!(report.created, 0);
    }

    #[test]
    fn closed_anchor_drops_its_window() {
        let mut host = screen();
        let left = host.add_window("left");
        host.add_window("right");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        host.remove_window(left);
        renderer.show(&mut host, &text());
        assert_eq!(renderer.window_count(), 1);
        assert_eq!(renderer.window_for(left), None);
        assert_eq!(host.floating_windows().len(), 1);
    }

    #[test]
    fn construction_restores_redisplay() {
        let mut host = screen();
        host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        assert!(!host.redisplay_suppressed());
    }

    #[test]
    fn teardown_is_idempotent_and_catches_orphans() {
        let mut host = screen();
        let anchor = host.add_window("main");
        let mut renderer = FloatingWindowRenderer::default();
        renderer.show(&mut host, &text());
        let buffer = renderer.buffer().unwrap();

        // a window showing our buffer that the renderer lost track of
        let orphan = host.create_floating(anchor).unwrap();
        host.bind_content(orphan, buffer, ViewportFlags::locked())
            .unwrap();

        assert_eq!(renderer.teardown(&mut host), 2);
        assert!(host.floating_windows().is_empty());
        assert!(!host.content_buffer_alive(buffer));
        assert_eq!(renderer.teardown(&mut host), 0);
        assert_eq!(renderer.buffer(), None);
    }
}

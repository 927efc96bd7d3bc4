//! The status bar controller.
//!
//! `StatusBar` owns the enable/disable state machine, picks a renderer from
//! its configuration and pushes text from a [`TextSource`] through the layout
//! planner onto the host. Scheduling stays outside: callers invoke
//! [`StatusBar::update`] on a timer and forward host events to
//! [`StatusBar::handle_event`].

use crate::config::StatusBarConfig;
use crate::error::ConfigError;
use crate::host::{ConsoleHost, Hook, Host, HostEvent};
use crate::layout::{LayoutPlanner, PlacementContext};
use crate::measure::{ConsoleFont, TextMeasurer};
use crate::renderer::{FloatingWindowRenderer, InlineAnnotationRenderer};
use crate::text::{Spacer, StatusText, StyledText};

/// Produces the status text once per update.
pub trait TextSource {
    fn get_text(&mut self) -> StyledText;
}

impl<F> TextSource for F
where
    F: FnMut() -> StyledText,
{
    fn get_text(&mut self) -> StyledText {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarState {
    Disabled,
    EnabledInline,
    EnabledFloating,
}

const HOOKS: [Hook; 3] = [
    Hook::StatusConsoleFocused,
    Hook::SurfaceCreated,
    Hook::LayoutChanged,
];

pub struct StatusBar<S> {
    config: StatusBarConfig,
    source: S,
    planner: LayoutPlanner,
    measurer: TextMeasurer,
    inline: InlineAnnotationRenderer,
    floating: FloatingWindowRenderer,
    state: StatusBarState,
    text: Option<StatusText>,
}

impl<S: TextSource> StatusBar<S> {
    pub fn new(config: StatusBarConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            planner: LayoutPlanner::new(config.safety_margin),
            measurer: TextMeasurer::default(),
            inline: InlineAnnotationRenderer::new(config.include_status_console),
            floating: FloatingWindowRenderer::new(config.floating_offset),
            state: StatusBarState::Disabled,
            text: None,
            config,
            source,
        })
    }

    /// Swap the text measurer, e.g. for one backed by real font metrics.
    pub fn with_measurer(mut self, measurer: TextMeasurer) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn state(&self) -> StatusBarState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state != StatusBarState::Disabled
    }

    pub fn config(&self) -> &StatusBarConfig {
        &self.config
    }

    /// Text currently on screen; `None` while disabled.
    pub fn text(&self) -> Option<&StatusText> {
        self.text.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Start showing status text. Any previous wiring is torn down first, so
    /// enabling twice leaves the same state as enabling once.
    pub fn enable<H: Host>(&mut self, host: &mut H) {
        self.disable(host);
        for hook in HOOKS {
            if hook == Hook::SurfaceCreated && self.config.use_floating_window {
                continue;
            }
            host.subscribe(hook);
        }
        if self.config.use_floating_window {
            self.state = StatusBarState::EnabledFloating;
        } else {
            self.inline.attach_all(host);
            self.state = StatusBarState::EnabledInline;
        }
        tracing::debug!(state = ?self.state, "status bar enabled");
        self.update(host);
    }

    /// Remove everything the bar put on screen. Safe to call repeatedly.
    pub fn disable<H: Host>(&mut self, host: &mut H) {
        let previous = std::mem::replace(&mut self.state, StatusBarState::Disabled);
        match previous {
            StatusBarState::Disabled => return,
            StatusBarState::EnabledInline => self.inline.detach_all(host),
            StatusBarState::EnabledFloating => {
                self.floating.teardown(host);
            }
        }
        for hook in HOOKS {
            host.unsubscribe(hook);
        }
        self.text = None;
        tracing::debug!(?previous, "status bar disabled");
    }

    /// Pull fresh text from the source and render it.
    pub fn update<H: Host>(&mut self, host: &mut H) {
        if !self.is_enabled() {
            return;
        }
        let text = self.source.get_text();
        self.set_text(host, text);
    }

    /// Render `text`. Dropped while disabled.
    pub fn set_text<H: Host>(&mut self, host: &mut H, text: StyledText) {
        if !self.is_enabled() {
            tracing::trace!("status bar disabled; dropping text");
            return;
        }
        let font = reference_font(host);
        let columns = self.measurer.measure_columns(&text, &font);
        let status = StatusText {
            spacer: Spacer::new(self.planner.spacer_width(
                columns,
                self.config.right_padding,
                self.config.text_scale_factor,
            )),
            text,
        };
        self.render(host, &status);
        self.text = Some(status);
    }

    fn render<H: Host>(&mut self, host: &mut H, status: &StatusText) {
        match self.state {
            StatusBarState::Disabled => {}
            StatusBarState::EnabledInline => {
                let ctx = PlacementContext {
                    planner: &self.planner,
                    measurer: &self.measurer,
                    padding: self.config.right_padding,
                    scale: self.config.text_scale_factor,
                };
                let report = self.inline.render(host, &ctx, status);
                tracing::trace!(?report, "inline render");
            }
            StatusBarState::EnabledFloating => {
                let report = self.floating.show(host, &status.text);
                tracing::trace!(?report, "floating render");
            }
        }
    }

    /// React to a host lifecycle event.
    pub fn handle_event<H: Host>(&mut self, host: &mut H, event: HostEvent) {
        match (self.state, event) {
            (StatusBarState::Disabled, _) => {}
            (StatusBarState::EnabledInline, HostEvent::SurfaceCreated(surface)) => {
                if let Err(err) = self.inline.attach(host, surface) {
                    tracing::debug!(%err, "new surface vanished before attach");
                    return;
                }
                if let Some(status) = self.text.clone() {
                    self.render(host, &status);
                }
            }
            (StatusBarState::EnabledFloating, HostEvent::SurfaceCreated(_)) => {}
            (_, HostEvent::StatusConsoleFocused | HostEvent::LayoutChanged) => self.update(host),
        }
    }

    /// Apply a new configuration, tearing down and re-enabling if the bar
    /// was running.
    pub fn reconfigure<H: Host>(
        &mut self,
        host: &mut H,
        config: StatusBarConfig,
    ) -> Result<(), ConfigError> {
        config.validate()?;
        let was_enabled = self.is_enabled();
        self.disable(host);
        self.planner = LayoutPlanner::new(config.safety_margin);
        self.inline = InlineAnnotationRenderer::new(config.include_status_console);
        self.floating = FloatingWindowRenderer::new(config.floating_offset);
        self.config = config;
        if was_enabled {
            self.enable(host);
        }
        Ok(())
    }
}

/// Font of the first status console, used to size the shared spacer.
fn reference_font<H: ConsoleHost + ?Sized>(host: &H) -> ConsoleFont {
    host.status_consoles()
        .into_iter()
        .find_map(|console| host.console_font(console).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Screen, WindowHost};
    use ratatui::layout::Rect;

    fn screen() -> Screen {
        let mut screen = Screen::new(
            Rect {
                x: 0,
                y: 0,
                width: 80,
                height: 8,
            },
            ConsoleFont::new(8, 16),
        );
        screen.add_window("main");
        screen
    }

    fn clock() -> impl FnMut() -> StyledText {
        let mut tick = 0;
        move || {
            tick += 1;
            StyledText::raw(format!("tick {tick}"))
        }
    }

    fn inline_config() -> StatusBarConfig {
        StatusBarConfig::default()
    }

    fn floating_config() -> StatusBarConfig {
        StatusBarConfig {
            use_floating_window: true,
            ..StatusBarConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = StatusBarConfig {
            text_scale_factor: 0.0,
            ..StatusBarConfig::default()
        };
        assert!(StatusBar::new(config, clock()).is_err());
    }

    #[test]
    fn enable_twice_matches_enable_once() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.enable(&mut host);
        let once = host.annotation_count();
        bar.enable(&mut host);
        assert_eq!(host.annotation_count(), once);
        assert_eq!(bar.state(), StatusBarState::EnabledInline);
        assert!(bar.text().is_some());
    }

    #[test]
    fn disable_twice_is_a_no_op() {
        let mut host = screen();
        let mut bar = StatusBar::new(floating_config(), clock()).unwrap();
        bar.enable(&mut host);
        assert_eq!(host.floating_windows().len(), 1);
        bar.disable(&mut host);
        bar.disable(&mut host);
        assert!(host.floating_windows().is_empty());
        assert_eq!(bar.state(), StatusBarState::Disabled);
        assert!(bar.text().is_none());
        for hook in HOOKS {
            assert!(!host.is_subscribed(hook));
        }
    }

    #[test]
    fn text_is_dropped_while_disabled() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.set_text(&mut host, StyledText::raw("ignored"));
        bar.update(&mut host);
        assert!(bar.text().is_none());
        assert_eq!(host.annotation_count(), 0);
    }

    #[test]
    fn spacer_reserves_padding_and_scale() {
        let mut host = screen();
        let config = StatusBarConfig {
            right_padding: 2,
            text_scale_factor: 1.5,
            ..StatusBarConfig::default()
        };
        let mut bar = StatusBar::new(config, clock()).unwrap();
        bar.enable(&mut host);
        bar.set_text(&mut host, StyledText::raw("12345678"));
        // ceil((8 + 2) * 1.5)
        assert_eq!(bar.text().unwrap().spacer, Spacer::new(15));
    }

    #[test]
    fn new_surface_gets_an_annotation() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.enable(&mut host);
        let before = host.annotation_count();
        host.add_echo_surface();
        for event in host.take_events() {
            bar.handle_event(&mut host, event);
        }
        assert_eq!(host.annotation_count(), before + 1);
    }

    #[test]
    fn floating_mode_ignores_surface_creation() {
        let mut host = screen();
        let mut bar = StatusBar::new(floating_config(), clock()).unwrap();
        bar.enable(&mut host);
        assert!(!host.is_subscribed(Hook::SurfaceCreated));
        assert!(host.is_subscribed(Hook::LayoutChanged));
        assert_eq!(host.annotation_count(), 0);
    }

    #[test]
    fn focus_events_pull_fresh_text() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.enable(&mut host);
        assert_eq!(bar.text().unwrap().text.plain(), "tick 1");
        bar.handle_event(&mut host, HostEvent::StatusConsoleFocused);
        bar.handle_event(&mut host, HostEvent::StatusConsoleFocused);
        assert_eq!(bar.text().unwrap().text.plain(), "tick 3");
    }

    #[test]
    fn reconfigure_switches_renderers_cleanly() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.enable(&mut host);
        assert!(host.annotation_count() > 0);

        bar.reconfigure(&mut host, floating_config()).unwrap();
        assert_eq!(bar.state(), StatusBarState::EnabledFloating);
        assert_eq!(host.annotation_count(), 0);
        assert_eq!(host.floating_windows().len(), 1);

        bar.reconfigure(&mut host, inline_config()).unwrap();
        assert_eq!(bar.state(), StatusBarState::EnabledInline);
        assert!(host.floating_windows().is_empty());
    }

    #[test]
    fn reconfigure_keeps_a_disabled_bar_disabled() {
        let mut host = screen();
        let mut bar = StatusBar::new(inline_config(), clock()).unwrap();
        bar.reconfigure(&mut host, floating_config()).unwrap();
        assert_eq!(bar.state(), StatusBarState::Disabled);
        assert!(host.floating_windows().is_empty());
    }
}

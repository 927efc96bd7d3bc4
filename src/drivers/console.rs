use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{self, Event};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::{InputDriver, OutputDriver, is_actionable};
use crate::measure::ConsoleFont;
use crate::ui::UiFrame;

/// Reads crossterm events, skipping key releases and repeats.
#[derive(Debug, Default)]
pub struct ConsoleInputDriver {
    pending: Option<Event>,
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputDriver for ConsoleInputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        while event::poll(timeout)? {
            let evt = event::read()?;
            if is_actionable(&evt) {
                self.pending = Some(evt);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read(&mut self) -> io::Result<Event> {
        if let Some(evt) = self.pending.take() {
            return Ok(evt);
        }
        loop {
            let evt = event::read()?;
            if is_actionable(&evt) {
                return Ok(evt);
            }
        }
    }
}

pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }

    /// Cell pixel geometry of the terminal, unknown when not reported.
    pub fn console_font(&self) -> ConsoleFont {
        match terminal::window_size() {
            Ok(size) => ConsoleFont::from_window_size(size),
            Err(err) => {
                tracing::debug!(%err, "terminal did not report its window size");
                ConsoleFont::unknown()
            }
        }
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()?;
        self.terminal.clear()?;
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;
        self.entered = false;
        Ok(())
    }

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>),
    {
        self.terminal
            .draw(move |frame| f(UiFrame::new(frame)))
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{Event, KeyCode, KeyModifiers};
use crossterm::terminal;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use term_tray::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_tray::drivers::OutputDriver;
use term_tray::event_loop::{ControlFlow, EventLoop, LoopEvent};
use term_tray::host::Screen;
use term_tray::schedule::UpdateSchedule;
use term_tray::{StatusBar, StatusBarConfig, StyledText, TextSource, tracing_sub};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_WINDOWS: u16 = 8;

#[derive(Parser, Debug)]
#[command(
    name = "term-tray",
    version = env!("CARGO_PKG_VERSION"),
    about = "Right-aligned status line demo over tiled console windows"
)]
struct Cli {
    /// Show the status text in floating windows instead of inline.
    #[arg(long)]
    floating: bool,

    /// Blank columns kept between the status text and the right edge.
    #[arg(long, value_name = "COLUMNS", default_value_t = 0)]
    padding: u16,

    /// Width multiplier for the reserved status area.
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    scale: f32,

    /// Seconds between updates; 0 turns periodic updates off.
    #[arg(long, value_name = "SECONDS", default_value_t = 1.0)]
    interval: f64,

    /// Leave the per-window status consoles alone.
    #[arg(long)]
    no_status_console: bool,

    /// Number of tiled host windows.
    #[arg(long, value_name = "COUNT", default_value_t = 2)]
    windows: u16,

    /// Write debug logs here; logging is discarded otherwise.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> io::Result<StatusBarConfig> {
        let update_interval = if self.interval == 0.0 {
            None
        } else {
            Some(Duration::try_from_secs_f64(self.interval).map_err(invalid_input)?)
        };
        Ok(StatusBarConfig {
            text_scale_factor: self.scale,
            right_padding: self.padding,
            update_interval,
            use_floating_window: self.floating,
            include_status_console: !self.no_status_console,
            ..StatusBarConfig::default()
        })
    }
}

fn invalid_input<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
}

/// Hostname plus a UTC wall clock.
struct ClockSource {
    host: String,
}

impl ClockSource {
    fn new() -> Self {
        let host = hostname::get()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "localhost".to_string());
        Self { host }
    }
}

impl TextSource for ClockSource {
    fn get_text(&mut self) -> StyledText {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            % 86_400;
        let mut text = StyledText::styled(
            self.host.clone(),
            Style::default().fg(Color::Cyan),
        );
        text.push(Span::raw(" "));
        text.push(Span::styled(
            format!(
                "{:02}:{:02}:{:02} UTC",
                secs / 3600,
                (secs / 60) % 60,
                secs % 60
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        text
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    tracing_sub::init_default(cli.log_file.as_deref())?;
    let config = cli.config()?;
    let mut bar = StatusBar::new(config.clone(), ClockSource::new()).map_err(invalid_input)?;

    let mut output = ConsoleOutputDriver::new()?;
    let font = output.console_font();
    let (columns, rows) = terminal::size()?;
    let mut screen = Screen::new(
        Rect {
            x: 0,
            y: 0,
            width: columns,
            height: rows,
        },
        font,
    );
    for index in 0..cli.windows.clamp(1, MAX_WINDOWS) {
        let title = if index == 0 {
            "f float | m prompt | e echo | c clear | d decorations | q quit".to_string()
        } else {
            format!("window {}", index + 1)
        };
        screen.add_window(&title);
    }

    output.enter()?;
    bar.enable(&mut screen);
    let mut schedule = UpdateSchedule::new(config.update_interval);
    schedule.mark(Instant::now());

    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), POLL_INTERVAL);
    let result = event_loop.run(|event| {
        match event {
            LoopEvent::Tick => {
                if schedule.due(Instant::now()) {
                    bar.update(&mut screen);
                }
            }
            LoopEvent::Input(Event::Resize(columns, rows)) => {
                screen.resize(Rect {
                    x: 0,
                    y: 0,
                    width: columns,
                    height: rows,
                });
            }
            LoopEvent::Input(Event::Key(key)) => {
                if key.code == KeyCode::Char('q')
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    return Ok(ControlFlow::Quit);
                }
                match key.code {
                    KeyCode::Char('f') => {
                        let mut next = bar.config().clone();
                        next.use_floating_window = !next.use_floating_window;
                        bar.reconfigure(&mut screen, next).map_err(invalid_input)?;
                    }
                    KeyCode::Char('m') => screen.begin_prompt("M-x "),
                    KeyCode::Char('e') => {
                        screen.show_message("Wrote /tmp/notes.txt");
                        bar.update(&mut screen);
                    }
                    KeyCode::Char('c') => {
                        screen.end_prompt();
                        screen.clear_message();
                        bar.update(&mut screen);
                    }
                    KeyCode::Char('d') => {
                        let forced = !screen.forced_decorations();
                        screen.set_forced_decorations(forced);
                    }
                    _ => {}
                }
            }
            LoopEvent::Input(_) => {}
        }
        for host_event in screen.take_events() {
            bar.handle_event(&mut screen, host_event);
        }
        output.draw(|mut frame| screen.render(&mut frame))?;
        Ok(ControlFlow::Continue)
    });

    bar.disable(&mut screen);
    output.exit()?;
    result
}

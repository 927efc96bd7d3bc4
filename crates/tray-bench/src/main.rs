use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use ratatui::layout::Rect;

use term_tray::host::{Screen, WindowHost};
use term_tray::measure::ConsoleFont;
use term_tray::{StatusBar, StatusBarConfig, StyledText};

#[derive(Parser, Debug)]
#[command(
    name = "tray-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Headless benchmark of status bar update cycles"
)]
struct BenchCli {
    /// Number of update cycles to run.
    #[arg(short = 'n', long = "cycles", value_name = "COUNT", default_value_t = 10_000)]
    cycles: u32,

    /// Number of tiled host windows.
    #[arg(short = 'w', long = "windows", value_name = "COUNT", default_value_t = 4)]
    windows: u16,

    /// Screen size as COLUMNSxROWS.
    #[arg(long = "size", value_name = "COLSxROWS", default_value = "160x48")]
    size: String,

    /// Benchmark the floating window renderer instead of inline annotations.
    #[arg(long)]
    floating: bool,

    /// Render a full snapshot every N cycles; 0 disables rendering.
    #[arg(long = "render-every", value_name = "N", default_value_t = 10)]
    render_every: u32,
}

struct BenchConfig {
    cycles: u32,
    windows: u16,
    area: Rect,
    floating: bool,
    render_every: u32,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if cli.cycles == 0 {
            return Err("cycles must be at least 1".to_string());
        }
        if !(1..=32).contains(&cli.windows) {
            return Err("windows must be between 1 and 32".to_string());
        }
        let (columns, rows) = cli
            .size
            .split_once('x')
            .and_then(|(c, r)| Some((c.parse::<u16>().ok()?, r.parse::<u16>().ok()?)))
            .ok_or_else(|| format!("size must look like 160x48, got {:?}", cli.size))?;
        if columns < 20 || rows < 4 {
            return Err("size must be at least 20x4".to_string());
        }
        Ok(Self {
            cycles: cli.cycles,
            windows: cli.windows,
            area: Rect {
                x: 0,
                y: 0,
                width: columns,
                height: rows,
            },
            floating: cli.floating,
            render_every: cli.render_every,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;
    let stats = run_benchmark(&config)?;
    println!("{}", stats.final_report(&config));
    Ok(())
}

fn run_benchmark(config: &BenchConfig) -> io::Result<BenchStats> {
    let mut screen = Screen::new(config.area, ConsoleFont::new(8, 16));
    for index in 0..config.windows {
        screen.add_window(&format!("window {}", index + 1));
    }

    let mut tick: u32 = 0;
    let source = move || {
        tick = tick.wrapping_add(1);
        // width varies so placement keeps changing
        StyledText::raw(format!("cycle {tick} {}", "|".repeat((tick % 7) as usize)))
    };
    let bar_config = StatusBarConfig {
        use_floating_window: config.floating,
        update_interval: None,
        ..StatusBarConfig::default()
    };
    let mut bar = StatusBar::new(bar_config, source)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
    bar.enable(&mut screen);

    let mut stats = BenchStats::new();
    for cycle in 0..config.cycles {
        churn(&mut screen, config, cycle);
        for event in screen.take_events() {
            bar.handle_event(&mut screen, event);
        }

        let start = Instant::now();
        bar.update(&mut screen);
        stats.record_update(start.elapsed());

        if config.render_every > 0 && cycle % config.render_every == 0 {
            let start = Instant::now();
            let buffer = screen.snapshot();
            stats.record_render(start.elapsed(), buffer.area.area() as u64);
        }
    }
    stats.floating_windows = screen.floating_windows().len();
    stats.floats_created = screen.floats_created();
    bar.disable(&mut screen);
    stats.leftover_annotations = screen.annotation_count();
    stats.leftover_floating = screen.floating_windows().len();
    stats.mark_completed();
    Ok(stats)
}

/// Host activity between updates: messages, prompts, resizes and
/// decoration drift.
fn churn(screen: &mut Screen, config: &BenchConfig, cycle: u32) {
    match cycle % 50 {
        5 => screen.show_message(&"m".repeat((cycle % config.area.width as u32) as usize)),
        15 => screen.begin_prompt("Find file: "),
        20 => screen.end_prompt(),
        30 => screen.clear_message(),
        40 => {
            let forced = !screen.forced_decorations();
            screen.set_forced_decorations(forced);
        }
        _ => {}
    }
    if cycle % 500 == 250 {
        let shrink = (cycle / 500 % 3) as u16 * 10;
        screen.resize(Rect {
            width: config.area.width.saturating_sub(shrink),
            ..config.area
        });
    }
}

struct BenchStats {
    start: Instant,
    completed_at: Option<Instant>,
    updates: u64,
    update_time: Duration,
    slowest_update: Duration,
    renders: u64,
    render_time: Duration,
    cells_rendered: u64,
    floating_windows: usize,
    floats_created: usize,
    leftover_annotations: usize,
    leftover_floating: usize,
}

impl BenchStats {
    fn new() -> Self {
        Self {
            start: Instant::now(),
            completed_at: None,
            updates: 0,
            update_time: Duration::ZERO,
            slowest_update: Duration::ZERO,
            renders: 0,
            render_time: Duration::ZERO,
            cells_rendered: 0,
            floating_windows: 0,
            floats_created: 0,
            leftover_annotations: 0,
            leftover_floating: 0,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.completed_at {
            Some(done) => done.duration_since(self.start),
            None => self.start.elapsed(),
        }
    }

    fn mark_completed(&mut self) {
        self.completed_at = Some(Instant::now());
    }

    fn record_update(&mut self, time: Duration) {
        self.updates = self.updates.saturating_add(1);
        self.update_time += time;
        self.slowest_update = self.slowest_update.max(time);
    }

    fn record_render(&mut self, time: Duration, cells: u64) {
        self.renders = self.renders.saturating_add(1);
        self.render_time += time;
        self.cells_rendered = self.cells_rendered.saturating_add(cells);
    }

    fn average_us(total: Duration, count: u64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        total.as_secs_f64() / count as f64 * 1_000_000.0
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        indoc::formatdoc!(
            r#"
            Tray bench ({mode}, {windows} windows, {width}x{height}) in {elapsed:.2}s.
            Updates: {updates} | avg {update_avg:.1} us | worst {update_worst:.1} us
            Renders: {renders} | avg {render_avg:.1} us | {cells} cells
            Floating windows: {floating} live, {created} created
            After disable: {annotations} annotations, {leftover} floating windows
            "#,
            mode = if config.floating { "floating" } else { "inline" },
            windows = config.windows,
            width = config.area.width,
            height = config.area.height,
            elapsed = self.elapsed().as_secs_f64(),
            updates = self.updates,
            update_avg = Self::average_us(self.update_time, self.updates),
            update_worst = self.slowest_update.as_secs_f64() * 1_000_000.0,
            renders = self.renders,
            render_avg = Self::average_us(self.render_time, self.renders),
            cells = self.cells_rendered,
            floating = self.floating_windows,
            created = self.floats_created,
            annotations = self.leftover_annotations,
            leftover = self.leftover_floating,
        )
    }
}

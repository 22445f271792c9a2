use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event as CEvent, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use tui::{backend::CrosstermBackend, Terminal};

use crate::app::App;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::ui;

enum Event<I> {
    Input(I),
    Tick,
}

const TICK_RATE: Duration = Duration::from_millis(200);

/// Runs `body` between `enter` and `leave`. Once `enter` succeeds, `leave`
/// runs whatever `body` returns; the first error wins.
pub fn guarded<T>(
    enter: impl FnOnce() -> Result<()>,
    body: impl FnOnce() -> Result<T>,
    leave: impl FnOnce() -> Result<()>,
) -> Result<T> {
    enter()?;
    let outcome = body();
    let restored = leave();
    let value = outcome?;
    restored?;
    Ok(value)
}

/// Takes over the terminal for one dashboard session.
pub fn run(dataset: Dataset) -> Result<()> {
    let mut app = App::new(dataset);
    guarded(
        || Ok(enable_raw_mode()?),
        || session(&mut app),
        || {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
            info!("dashboard closed");
            Ok(())
        },
    )
}

fn session(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    info!("dashboard started");

    let rx = spawn_input(TICK_RATE);
    event_loop(&mut terminal, app, &rx)
}

/// Key events come from a reader thread; ticks keep the screen redrawing.
fn spawn_input(tick_rate: Duration) -> mpsc::Receiver<Event<KeyEvent>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            match event::poll(timeout) {
                Ok(true) => {
                    if let Ok(CEvent::Key(key)) = event::read() {
                        if tx.send(Event::Input(key)).is_err() {
                            return;
                        }
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    error!("terminal event polling failed: {}", e);
                    return;
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if tx.send(Event::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
    rx
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mpsc::Receiver<Event<KeyEvent>>,
) -> Result<()> {
    loop {
        terminal.draw(|rect| ui::draw(rect, app))?;
        if app.should_quit {
            return Ok(());
        }

        match rx.recv() {
            Ok(Event::Input(key)) => app.handle_key(key),
            Ok(Event::Tick) => {}
            // Input thread gone: nothing can reach the dashboard anymore.
            Err(_) => return Ok(()),
        }
    }
}

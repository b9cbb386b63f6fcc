mod api;
mod app;
mod config;
mod events;
mod models;
mod requester;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{backend::Backend, prelude::*};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use api::ChatClient;
use app::App;
use events::AppEvent;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config()?;
    let api_key = config::api_key()?;

    // The TUI owns stdout, so logs go to a file
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("termgpt.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let client = ChatClient::new(cfg.base_url.clone(), api_key, cfg.request_timeout)?;

    // Hand-off channels, capacity 1: the requester's fragment send suspends
    // until the event loop has consumed the previous fragment, and a prompt
    // is only handed over while the requester is idle
    let (prompt_tx, prompt_rx) = mpsc::channel::<String>(1);
    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(1);

    let requester = tokio::spawn(requester::run(
        client,
        cfg.model.clone(),
        prompt_rx,
        event_tx,
    ));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cfg.model, config::shell_name());
    let res = run_app(&mut terminal, &mut app, &prompt_tx, &mut event_rx);

    // An in-flight stream must not outlive the UI
    requester.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The composed-but-unsent input survives the session
    println!("{}", app.input_buffer);

    res
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    prompt_tx: &mpsc::Sender<String>,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Requester events first so fragments land before the next redraw
        if let Ok(app_event) = event_rx.try_recv() {
            app.apply_event(app_event);
        }

        // Short poll keeps fragment latency low without starving keystrokes
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_keyboard_input(app, key.code, key.modifiers, prompt_tx);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn handle_keyboard_input(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    prompt_tx: &mpsc::Sender<String>,
) {
    match key {
        KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Enter => {
            if let Some(text) = app.begin_submission() {
                // The streaming guard in begin_submission keeps at most one
                // prompt in flight, so the capacity-1 slot is always free
                if let Err(e) = prompt_tx.try_send(text) {
                    warn!("prompt hand-off failed: {e}");
                    app.apply_event(AppEvent::ResponseFailed(format!(
                        "could not hand off prompt: {e}"
                    )));
                }
            }
        }

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            app.input_buffer.push(c);
        }

        _ => {}
    }
}

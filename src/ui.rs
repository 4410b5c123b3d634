// src/ui.rs

pub mod chat;
pub mod footer;
pub mod header;
pub mod quit_confirm;

use crate::api::Generator;
use crate::app::{App, AppState};
use crate::config::Config;
use crate::constants::EVENT_POLL_MS;
use crate::errors::ChatResult;
use crate::key_handlers::handle_key;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use log::{error, info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::{io, time::Duration};

/// Runs the terminal UI until the user quits. The session lives exactly as
/// long as this call.
pub async fn run_ui<G>(config: &Config, generator: &G) -> ChatResult<()>
where
    G: Generator + ?Sized,
{
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, SetTitle(&config.page_title)) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(e.into());
        }
    };

    let app = App::new(config);
    info!("chat started with model {} in session {}", app.model, app.session.id());
    let res = run_app(&mut terminal, app, generator, poll_terminal_event).await;

    restore_terminal(&mut terminal);
    res
}

/// Puts the terminal back the way we found it. Failures are logged, not
/// returned.
fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) {
    if let Err(e) = disable_raw_mode() {
        warn!("failed to disable raw mode: {}", e);
    }
    if let Err(e) = execute!(terminal.backend_mut(), LeaveAlternateScreen) {
        warn!("failed to leave alternate screen: {}", e);
    }
    if let Err(e) = terminal.show_cursor() {
        warn!("failed to show cursor: {}", e);
    }
}

/// Waits up to one poll interval for the next terminal event.
fn poll_terminal_event() -> ChatResult<Option<Event>> {
    if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Main loop of the application. The session is ended however the loop exits.
async fn run_app<B, G, E>(
    terminal: &mut Terminal<B>,
    mut app: App,
    generator: &G,
    mut next_event: E,
) -> ChatResult<()>
where
    B: Backend,
    G: Generator + ?Sized,
    E: FnMut() -> ChatResult<Option<Event>>,
{
    let res = event_loop(terminal, &mut app, generator, &mut next_event).await;
    if let Err(e) = &res {
        error!("chat loop failed: {}", e);
    }
    app.session.end();
    res
}

async fn event_loop<B, G, E>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    generator: &G,
    next_event: &mut E,
) -> ChatResult<()>
where
    B: Backend,
    G: Generator + ?Sized,
    E: FnMut() -> ChatResult<Option<Event>>,
{
    while app.state != AppState::Quit {
        terminal.draw(|f| draw(f, app))?;

        if let Some(Event::Key(key)) = next_event()? {
            if key.kind == KeyEventKind::Press {
                handle_key(key, app, terminal, generator).await?;
            }
        }
    }
    Ok(())
}

/// Renders the whole screen: header, transcript, status, input and footer.
pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2), // Header
                Constraint::Min(1),    // Transcript
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
                Constraint::Length(1), // Footer
            ]
            .as_ref(),
        )
        .split(size);

    header::draw_header(f, chunks[0], &app.title);
    chat::draw_messages(f, chunks[1], app);
    app.status_indicator.render(f, chunks[2]);
    chat::draw_input(f, chunks[3], app);
    footer::draw_footer(f, chunks[4], app);

    if app.state == AppState::QuitConfirm {
        quit_confirm::draw_quit_confirm(f, centered_rect(50, 30, size));
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

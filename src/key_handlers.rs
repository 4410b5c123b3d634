use crate::api::Generator;
use crate::app::{App, AppState};
use crate::chat::{begin_turn, complete_turn};
use crate::constants::SPINNER_INTERVAL_MS;
use crate::errors::ChatResult;
use crate::ui::draw;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::error;
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;
use tokio::time;

const PAGE_LINES: u16 = 10;

pub async fn handle_key<B, G>(
    key: KeyEvent,
    app: &mut App,
    terminal: &mut Terminal<B>,
    generator: &G,
) -> ChatResult<()>
where
    B: Backend,
    G: Generator + ?Sized,
{
    match app.state {
        AppState::Chat => handle_chat_input(key, app, terminal, generator).await,
        AppState::QuitConfirm => {
            handle_quit_confirm_input(key, app);
            Ok(())
        }
        AppState::Quit => Ok(()),
    }
}

pub async fn handle_chat_input<B, G>(
    key: KeyEvent,
    app: &mut App,
    terminal: &mut Terminal<B>,
    generator: &G,
) -> ChatResult<()>
where
    B: Backend,
    G: Generator + ?Sized,
{
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::QuitConfirm;
        }
        KeyCode::Enter => {
            let user_message = std::mem::take(&mut app.input);
            if !user_message.trim().is_empty() {
                submit_input(app, terminal, generator, &user_message).await?;
            }
        }
        KeyCode::PageUp => app.scroll_up(PAGE_LINES),
        KeyCode::PageDown => app.scroll_down(PAGE_LINES),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'c' => app.state = AppState::QuitConfirm,
                    'u' => app.scroll_up(PAGE_LINES / 2),
                    'd' => app.scroll_down(PAGE_LINES / 2),
                    _ => {}
                }
            } else {
                app.input.push(c);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Runs one interaction. Input is not read until the reply arrives; the
/// spinner keeps redrawing meanwhile.
async fn submit_input<B, G>(
    app: &mut App,
    terminal: &mut Terminal<B>,
    generator: &G,
    text: &str,
) -> ChatResult<()>
where
    B: Backend,
    G: Generator + ?Sized,
{
    app.last_error = None;
    app.follow_output = true;
    let pending = begin_turn(app.session.messages_mut(), text);

    app.status_indicator.set_thinking(true);
    app.status_indicator.set_status("Thinking...");
    terminal.draw(|f| draw(f, app))?;

    let mut ticker = time::interval(Duration::from_millis(SPINNER_INTERVAL_MS));
    let resolution = pending.resolve(generator);
    tokio::pin!(resolution);

    let outcome = loop {
        tokio::select! {
            outcome = &mut resolution => break outcome,
            _ = ticker.tick() => {
                app.status_indicator.update_spinner();
                terminal.draw(|f| draw(f, app))?;
            }
        }
    };

    app.status_indicator.set_thinking(false);
    app.status_indicator.clear_status();

    match outcome {
        Ok(generation) => complete_turn(app.session.messages_mut(), &generation),
        Err(e) => {
            error!("interaction failed: {}", e);
            app.last_error = Some(e.to_string());
        }
    }
    app.follow_output = true;
    Ok(())
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.state = AppState::Quit;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.state = AppState::Chat;
        }
        _ => {}
    }
}

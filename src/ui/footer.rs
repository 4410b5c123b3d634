use crate::{app::App, app::AppState};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Draws the footer with instructions for the current state.
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let instructions = match app.state {
        AppState::Chat if app.is_processing() => format!("{} · waiting for a reply...", app.model),
        AppState::Chat => format!(
            "{} · Enter to send · PgUp/PgDn to scroll · Esc to quit",
            app.model
        ),
        AppState::QuitConfirm => "Press 'y' to confirm quit or 'n' to cancel.".to_string(),
        AppState::Quit => String::new(),
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center);

    f.render_widget(footer, area);
}

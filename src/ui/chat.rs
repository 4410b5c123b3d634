use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, AppState};
use crate::chat_message::render_turn;

/// Replays every turn of the session, then the error banner if the last
/// interaction failed.
pub fn draw_messages(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    let mut lines: Vec<Line<'static>> = Vec::new();
    for turn in app.session.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_turn(turn, area.width));
    }

    if let Some(error) = &app.last_error {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(error_lines(error, area.width));
    }

    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    app.max_scroll = total_lines.saturating_sub(area.height);
    if app.follow_output || app.chat_scroll > app.max_scroll {
        app.chat_scroll = app.max_scroll;
    }

    f.render_widget(Paragraph::new(lines).scroll((app.chat_scroll, 0)), area);
}

fn error_lines(error: &str, width: u16) -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);
    let wrap_width = (width as usize).saturating_sub(2).max(1);

    textwrap::wrap(error, wrap_width)
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let marker = if idx == 0 { "✗ " } else { "  " };
            Line::from(vec![
                Span::styled(marker, style),
                Span::styled(line.into_owned(), style),
            ])
        })
        .collect()
}

pub fn draw_input(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let text_width = u16::try_from(app.input.width()).unwrap_or(u16::MAX);
    let visible_width = inner.width.saturating_sub(3);
    let shown_width = text_width.min(visible_width);
    let scroll_offset = text_width - shown_width;

    let line = if app.input.is_empty() {
        Line::from(vec![
            Span::styled("→ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                app.input_placeholder.as_str(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("→ ", Style::default().fg(Color::DarkGray)),
            Span::styled(app.input.as_str(), Style::default().fg(Color::White)),
        ])
    };

    f.render_widget(
        Paragraph::new(line).block(block).scroll((0, scroll_offset)),
        area,
    );

    if app.state == AppState::Chat && !app.is_processing() {
        let cursor_x = inner.x.saturating_add(2).saturating_add(shown_width);
        f.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use ratatui::{backend::TestBackend, Terminal};

    fn cursor_after_drawing(input: String) -> u16 {
        let mut app = App::new(&Config::default());
        app.input = input;

        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal.draw(|f| draw_input(f, f.area(), &app)).unwrap();
        terminal.get_cursor_position().unwrap().x
    }

    #[test]
    fn test_cursor_follows_short_input() {
        assert_eq!(cursor_after_drawing("hello".to_string()), 8);
    }

    #[test]
    fn test_very_long_input_keeps_cursor_inside_box() {
        assert_eq!(cursor_after_drawing("a".repeat(65_533)), 58);
        assert_eq!(cursor_after_drawing("a".repeat(70_000)), 58);
    }

    #[test]
    fn test_error_lines_wrap_with_marker() {
        let lines = error_lines("API error: the service is unavailable", 20);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();

        assert!(text.len() > 1);
        assert!(text[0].starts_with("✗ API error:"));
        assert!(text[1..].iter().all(|l| l.starts_with("  ")));
    }
}

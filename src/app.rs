use crate::config::Config;
use crate::session::SessionState;
use crate::status_indicator::StatusIndicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Chat,
    QuitConfirm,
    Quit,
}

pub struct App {
    pub state: AppState,
    pub session: SessionState,
    pub input: String,
    pub title: String,
    pub input_placeholder: String,
    pub model: String,
    pub status_indicator: StatusIndicator,
    /// Error from the last failed interaction, shown until the next submission.
    pub last_error: Option<String>,
    pub chat_scroll: u16,
    pub max_scroll: u16,
    pub follow_output: bool,
}

impl App {
    pub fn new(config: &Config) -> App {
        let mut session = SessionState::new();
        session.messages_mut();

        App {
            state: AppState::Chat,
            session,
            input: String::new(),
            title: config.title.clone(),
            input_placeholder: config.input_placeholder.clone(),
            model: config.model.clone(),
            status_indicator: StatusIndicator::new(),
            last_error: None,
            chat_scroll: 0,
            max_scroll: 0,
            follow_output: true,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status_indicator.is_thinking()
    }

    pub fn scroll_up(&mut self, lines: u16) {
        if self.follow_output {
            self.chat_scroll = self.max_scroll;
            self.follow_output = false;
        }
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
        if self.chat_scroll >= self.max_scroll {
            self.chat_scroll = self.max_scroll;
            self.follow_output = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        App::new(&Config::default())
    }

    #[test]
    fn test_new_app_has_empty_history() {
        let app = test_app();
        assert_eq!(app.state, AppState::Chat);
        assert!(app.session.messages().is_empty());
        assert_eq!(app.input_placeholder, "What is up?");
    }

    #[test]
    fn test_scrolling_detaches_and_reattaches() {
        let mut app = test_app();
        app.max_scroll = 20;

        app.scroll_up(5);
        assert!(!app.follow_output);
        assert_eq!(app.chat_scroll, 15);

        app.scroll_down(3);
        assert!(!app.follow_output);
        assert_eq!(app.chat_scroll, 18);

        app.scroll_down(10);
        assert!(app.follow_output);
        assert_eq!(app.chat_scroll, 20);
    }

    #[test]
    fn test_scroll_up_stops_at_top() {
        let mut app = test_app();
        app.max_scroll = 2;
        app.scroll_up(10);
        assert_eq!(app.chat_scroll, 0);
    }
}

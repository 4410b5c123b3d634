use crate::constants::{MODEL_LABEL, USER_LABEL};
use crate::conversation::{Role, Turn};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const USER_COLOR: Color = Color::Rgb(255, 223, 128);
const MODEL_COLOR: Color = Color::Rgb(144, 238, 144);
const CODE_COLOR: Color = Color::Rgb(209, 154, 102);
const USER_INDENT: &str = "  ";
const GUTTER: &str = "│ ";
const CODE_MARKER: &str = "▎ ";

/// Renders one turn as a boxed block of lines no wider than `width`.
pub fn render_turn(turn: &Turn, width: u16) -> Vec<Line<'static>> {
    let style = base_style(turn.role);
    let indent = match turn.role {
        Role::User => USER_INDENT,
        Role::Model => "",
    };
    let label = match turn.role {
        Role::User => USER_LABEL,
        Role::Model => MODEL_LABEL,
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─ ".to_string(), style),
        Span::styled(label.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::styled(" ".to_string(), style),
        Span::styled(
            turn.created_at.format("%H:%M").to_string(),
            style.add_modifier(Modifier::DIM),
        ),
    ])];

    let content_width = (width as usize)
        .saturating_sub(indent.width() + GUTTER.width())
        .max(1);

    for line in render_markdown(&turn.content, content_width, style) {
        let mut spans = vec![
            Span::styled(indent.to_string(), style),
            Span::styled(GUTTER.to_string(), style),
        ];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));

    lines
}

fn base_style(role: Role) -> Style {
    Style::default().fg(match role {
        Role::User => USER_COLOR,
        Role::Model => MODEL_COLOR,
    })
}

/// Renders markdown into word-wrapped, styled lines.
pub fn render_markdown(markdown: &str, width: usize, base: Style) -> Vec<Line<'static>> {
    MarkdownRenderer::new(width, base).render(markdown)
}

/// A run of text wrapped as a unit, possibly spanning several styles.
#[derive(Debug, Clone)]
struct Word {
    pieces: Vec<(String, Style)>,
    spaced: bool,
}

impl Word {
    fn display_width(&self) -> usize {
        self.pieces.iter().map(|(text, _)| text.width()).sum()
    }

    /// Breaks the word into chunks no wider than `max_width` columns. Only
    /// the last chunk keeps the trailing space.
    fn split_to_width(self, max_width: usize) -> Vec<Word> {
        if self.display_width() <= max_width {
            return vec![self];
        }

        let mut chunks = Vec::new();
        let mut current: Vec<(String, Style)> = Vec::new();
        let mut current_width = 0;

        for (text, style) in self.pieces {
            let mut run = String::new();
            for ch in text.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width > 0 && current_width + ch_width > max_width {
                    if !run.is_empty() {
                        current.push((std::mem::take(&mut run), style));
                    }
                    chunks.push(Word {
                        pieces: std::mem::take(&mut current),
                        spaced: false,
                    });
                    current_width = 0;
                }
                run.push(ch);
                current_width += ch_width;
            }
            if !run.is_empty() {
                current.push((run, style));
            }
        }

        if !current.is_empty() {
            chunks.push(Word {
                pieces: current,
                spaced: self.spaced,
            });
        }
        chunks
    }
}

/// Hard-splits `text` into runs no wider than `max_width` columns.
fn split_by_width(text: &str, max_width: usize) -> Vec<String> {
    let mut runs = vec![String::new()];
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width > 0 && current_width + ch_width > max_width {
            runs.push(String::new());
            current_width = 0;
        }
        if let Some(run) = runs.last_mut() {
            run.push(ch);
        }
        current_width += ch_width;
    }
    runs
}

impl Fragment for Word {
    fn width(&self) -> f64 {
        self.display_width() as f64
    }

    fn whitespace_width(&self) -> f64 {
        if self.spaced {
            1.0
        } else {
            0.0
        }
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

struct MarkdownRenderer {
    width: usize,
    base: Style,
    lines: Vec<Line<'static>>,
    words: Vec<Word>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    item_indents: Vec<usize>,
    pending_marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
}

impl MarkdownRenderer {
    fn new(width: usize, base: Style) -> Self {
        Self {
            width: width.max(1),
            base,
            lines: Vec::new(),
            words: Vec::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            item_indents: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn render(mut self, markdown: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(markdown, options) {
            self.handle(event);
        }
        self.flush_words();

        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.lines
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.push_code(&text);
                } else {
                    self.push_text(&text, self.current_style());
                }
            }
            Event::Code(code) => {
                let style = self.current_style().fg(CODE_COLOR);
                self.push_text(&code, style);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_text(&html, self.current_style());
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_text(marker, self.current_style());
            }
            Event::SoftBreak => self.mark_spaced(),
            Event::HardBreak => self.flush_words(),
            Event::Rule => {
                self.flush_words();
                let rule = "─".repeat(self.width);
                self.lines.push(Line::from(Span::styled(
                    rule,
                    Style::default().fg(Color::DarkGray),
                )));
                self.blank_line();
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush_words();
                self.push_style(Modifier::BOLD | Modifier::UNDERLINED);
            }
            Tag::Strong => self.push_style(Modifier::BOLD),
            Tag::Emphasis => self.push_style(Modifier::ITALIC),
            Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
            Tag::Link { .. } => {
                let style = self
                    .current_style()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED);
                self.styles.push(style);
            }
            Tag::CodeBlock(_) => {
                self.flush_words();
                self.in_code_block = true;
            }
            Tag::BlockQuote(_) => {
                self.flush_words();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush_words();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_words();
                let outer = self.item_indents.last().copied().unwrap_or(0);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_indents.push(outer + marker.width());
                self.pending_marker = Some(format!("{}{}", " ".repeat(outer), marker));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_words();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_words();
                self.styles.pop();
                self.blank_line();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough | TagEnd::Link => {
                self.styles.pop();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_words();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::Item => {
                self.flush_words();
                self.item_indents.pop();
                self.pending_marker = None;
            }
            TagEnd::List(_) => {
                self.flush_words();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn push_text(&mut self, text: &str, style: Style) {
        for piece in text.split_inclusive(char::is_whitespace) {
            let word = piece.trim_end_matches(char::is_whitespace);
            let spaced = word.len() != piece.len();

            if !word.is_empty() {
                match self.words.last_mut() {
                    Some(last) if !last.spaced => last.pieces.push((word.to_string(), style)),
                    _ => self.words.push(Word {
                        pieces: vec![(word.to_string(), style)],
                        spaced: false,
                    }),
                }
            }
            if spaced {
                self.mark_spaced();
            }
        }
    }

    fn mark_spaced(&mut self) {
        if let Some(last) = self.words.last_mut() {
            last.spaced = true;
        }
    }

    fn push_code(&mut self, code: &str) {
        let code_style = Style::default()
            .fg(CODE_COLOR)
            .add_modifier(Modifier::BOLD);

        let available = self
            .width
            .saturating_sub(self.quote_depth * 2 + CODE_MARKER.width())
            .max(1);

        for code_line in code.lines() {
            let expanded = code_line.replace('\t', "    ");
            for run in split_by_width(&expanded, available) {
                let mut spans = self.quote_spans();
                spans.push(Span::styled(
                    CODE_MARKER.to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
                spans.push(Span::styled(run, code_style));
                self.lines.push(Line::from(spans));
            }
        }
    }

    fn quote_spans(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled("┃ ".to_string(), Style::default().fg(Color::DarkGray)))
            .collect()
    }

    fn flush_words(&mut self) {
        if self.words.is_empty() {
            return;
        }
        let item_indent = self.item_indents.last().copied().unwrap_or(0);
        let first_prefix = self
            .pending_marker
            .take()
            .unwrap_or_else(|| " ".repeat(item_indent));
        let rest_prefix = " ".repeat(item_indent);
        let quote_width = self.quote_depth * 2;

        let available = self
            .width
            .saturating_sub(quote_width + item_indent)
            .max(1);

        let words: Vec<Word> = std::mem::take(&mut self.words)
            .into_iter()
            .flat_map(|word| word.split_to_width(available))
            .collect();

        for (idx, row) in wrap_first_fit(&words, &[available as f64])
            .into_iter()
            .enumerate()
        {
            let mut spans = self.quote_spans();
            let prefix = if idx == 0 { &first_prefix } else { &rest_prefix };
            if !prefix.is_empty() {
                spans.push(Span::styled(prefix.clone(), self.base));
            }

            for (pos, word) in row.iter().enumerate() {
                for (text, style) in &word.pieces {
                    spans.push(Span::styled(text.clone(), *style));
                }
                if word.spaced && pos + 1 < row.len() {
                    spans.push(Span::styled(" ".to_string(), self.base));
                }
            }
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraph_wraps_to_width() {
        let lines = render_markdown("the quick brown fox jumps", 10, Style::default());
        assert_eq!(plain(&lines), ["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let lines = render_markdown("one\n\ntwo", 40, Style::default());
        assert_eq!(plain(&lines), ["one", "", "two"]);
    }

    #[test]
    fn test_inline_styles_do_not_split_words() {
        let lines = render_markdown("a **bold**ly b", 40, Style::default());
        assert_eq!(plain(&lines), ["a boldly b"]);

        let bold = lines[0]
            .spans
            .iter()
            .find(|s| s.content == "bold")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_long_code_line_is_split_at_width() {
        let code = "let value = compute_something(alpha, beta, gamma); // TAILMARKER";
        let markdown = format!("```rust\n{}\n```", code);
        let lines = plain(&render_markdown(&markdown, 20, Style::default()));

        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.starts_with("▎ ") && l.width() <= 20));

        let rejoined: String = lines.iter().map(|l| &l["▎ ".len()..]).collect();
        assert_eq!(rejoined, code);
    }

    #[test]
    fn test_short_code_line_stays_whole() {
        let markdown = "```\nfn main() {}\n```";
        let lines = render_markdown(markdown, 40, Style::default());
        assert_eq!(plain(&lines), ["▎ fn main() {}"]);
    }

    #[test]
    fn test_overlong_word_is_split_at_width() {
        let url = "https://example.com/a/very/long/path/TAILMARKER";
        let markdown = format!("see {} now", url);
        let lines = plain(&render_markdown(&markdown, 16, Style::default()));

        assert!(lines.iter().all(|l| l.width() <= 16));
        assert_eq!(lines[0], "see");
        assert!(lines.concat().contains(url));
        assert_eq!(lines.last().map(String::as_str), Some("now"));
    }

    #[test]
    fn test_split_keeps_styles_of_each_piece() {
        let lines = render_markdown("**abcdef**ghij", 4, Style::default());
        assert_eq!(plain(&lines), ["abcd", "efgh", "ij"]);

        let bold_tail = lines[1].spans.iter().find(|s| s.content == "ef").unwrap();
        assert!(bold_tail.style.add_modifier.contains(Modifier::BOLD));
        let plain_head = lines[1].spans.iter().find(|s| s.content == "gh").unwrap();
        assert!(!plain_head.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_lists() {
        let lines = render_markdown("- apple\n- pear\n\n1. one\n2. two", 40, Style::default());
        assert_eq!(
            plain(&lines),
            ["• apple", "• pear", "", "1. one", "2. two"]
        );
    }

    #[test]
    fn test_list_item_continuation_is_indented() {
        let lines = render_markdown("- alpha beta gamma", 10, Style::default());
        assert_eq!(plain(&lines), ["• alpha", "  beta", "  gamma"]);
    }

    #[test]
    fn test_block_quote_prefix() {
        let lines = render_markdown("> quoted", 40, Style::default());
        assert_eq!(plain(&lines), ["┃ quoted"]);
    }

    #[test]
    fn test_empty_content_renders_one_line() {
        assert_eq!(render_markdown("", 10, Style::default()).len(), 1);
    }

    #[test]
    fn test_render_turn_frames_content() {
        let turn = Turn::user("hello there");
        let text = plain(&render_turn(&turn, 40));

        assert!(text[0].starts_with("  ┌─ You "));
        assert_eq!(text[1], "  │ hello there");
        assert_eq!(text.last().map(String::as_str), Some("  ╰─"));
    }

    #[test]
    fn test_model_turn_is_not_indented() {
        let text = plain(&render_turn(&Turn::model("hi"), 40));
        assert!(text[0].starts_with("┌─ Gemini "));
        assert_eq!(text[1], "│ hi");
    }
}

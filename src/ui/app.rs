use ratatui::{
    text::Line,
    widgets::{Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::core::config::{LayoutConfig, ReentryPolicy};

/// Response text laid out for the display pane, without its border.
pub fn display_paragraph(text: &str) -> Paragraph<'_> {
    let content: Vec<Line> = text.lines().map(Line::from).collect();
    Paragraph::new(content).wrap(Wrap { trim: false })
}

/// Display traffic coming back from a running ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    Show { token: u64, text: String },
    Finished { token: u64 },
}

pub struct App {
    // Core state
    pub should_quit: bool,

    // Question input
    pub input: String,
    pub cursor_position: usize, // in chars, not bytes

    // Response pane
    pub display: String,
    pub display_scroll: u16,

    // Request bookkeeping
    pub reentry: ReentryPolicy,
    pub next_token: u64,
    pub latest_token: Option<u64>,
    pub in_flight: usize,

    // UI state
    pub layout: LayoutConfig,
    pub terminal_size: (u16, u16),
}

impl Default for App {
    fn default() -> Self {
        Self {
            should_quit: false,

            input: String::new(),
            cursor_position: 0,

            display: String::new(),
            display_scroll: 0,

            reentry: ReentryPolicy::default(),
            next_token: 0,
            latest_token: None,
            in_flight: 0,

            layout: LayoutConfig::default(),
            terminal_size: (80, 24),
        }
    }
}

impl App {
    pub fn new(reentry: ReentryPolicy, layout: LayoutConfig) -> Self {
        Self {
            reentry,
            layout,
            ..Self::default()
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_input(&mut self, text: String) {
        self.cursor_position = text.chars().count();
        self.input = text;
    }

    pub fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn add_char(&mut self, c: char) {
        let idx = self.byte_index();
        self.input.insert(idx, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            let idx = self.byte_index();
            self.input.remove(idx);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.display_scroll = self.display_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.display_scroll = self
            .display_scroll
            .saturating_add(lines)
            .min(self.max_display_scroll());
    }

    /// Terminal columns between the start of the input and the cursor.
    pub fn cursor_column(&self) -> usize {
        self.input[..self.byte_index()].width()
    }

    /// Rows the response takes once wrapped to the pane's inner width, counted
    /// the same way the response pane wraps them.
    pub fn display_rows(&self) -> usize {
        let inner_width = self.terminal_size.0.saturating_sub(2).max(1);
        display_paragraph(&self.display).line_count(inner_width)
    }

    pub fn max_display_scroll(&self) -> u16 {
        let hidden = self
            .display_rows()
            .saturating_sub(self.get_display_visible_lines() as usize);
        u16::try_from(hidden).unwrap_or(u16::MAX)
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Hands out a token for a new ask, or `None` if the policy refuses one
    /// right now. The input text is left as typed.
    pub fn begin_request(&mut self) -> Option<u64> {
        if self.reentry == ReentryPolicy::SingleFlight && self.is_pending() {
            return None;
        }

        let token = self.next_token;
        self.next_token += 1;
        self.latest_token = Some(token);
        self.in_flight += 1;
        Some(token)
    }

    pub fn apply(&mut self, message: UiMessage) {
        match message {
            UiMessage::Show { token, text } => {
                if self.reentry == ReentryPolicy::LatestWins && self.latest_token != Some(token) {
                    return;
                }
                self.display = text;
                self.display_scroll = 0;
            }
            UiMessage::Finished { .. } => {
                self.in_flight = self.in_flight.saturating_sub(1);
            }
        }
    }

    pub fn get_display_visible_lines(&self) -> u16 {
        // Total height - input field - footer (1) - display borders (2)
        self.terminal_size
            .1
            .saturating_sub(self.layout.input_field_height + 3)
            .max(1)
    }
}

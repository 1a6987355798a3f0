use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::ui::app::{display_paragraph, App};

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.layout.input_field_height), // Question input
            Constraint::Min(3),                                // Response
            Constraint::Length(1),                             // Key hints
        ])
        .split(size);

    draw_input(f, app, chunks[0]);
    draw_display(f, app, chunks[1]);
    draw_footer(f, chunks[2]);
}

fn block<'a>(app: &App, title: String) -> Block<'a> {
    let border_type = if app.layout.rounded_borders {
        BorderType::Rounded
    } else {
        BorderType::Plain
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(border_type)
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let block = block(app, " Question ".to_string()).border_style(Style::default().fg(Color::Green));

    // Keep the cursor inside the box by sliding the text left.
    let inner_width = area.width.saturating_sub(2).max(1);
    let cursor_column = u16::try_from(app.cursor_column()).unwrap_or(u16::MAX);
    let offset = cursor_column.saturating_sub(inner_width - 1);

    let paragraph = if app.input.is_empty() {
        Paragraph::new(Span::styled(
            "Type a question and press Enter...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(app.input.as_str()).scroll((0, offset))
    };

    f.render_widget(paragraph.block(block), area);

    let cursor_x = area.x + 1 + (cursor_column - offset);
    let cursor_y = area.y + 1;
    f.set_cursor(cursor_x, cursor_y);
}

fn draw_display(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.is_pending() {
        format!(" Response ({} pending) ", app.in_flight)
    } else {
        " Response ".to_string()
    };
    let block = block(app, title).border_style(Style::default().fg(Color::Gray));

    let paragraph = display_paragraph(&app.display)
        .block(block)
        .scroll((app.display_scroll, 0));

    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let hint = Style::default().fg(Color::Gray);

    let line = Line::from(vec![
        Span::styled(" Enter", key),
        Span::styled(" ask  ", hint),
        Span::styled("Ctrl+U", key),
        Span::styled(" clear  ", hint),
        Span::styled("Up/Down", key),
        Span::styled(" scroll  ", hint),
        Span::styled("Esc", key),
        Span::styled(" quit", hint),
    ]);

    f.render_widget(Paragraph::new(line), area);
}

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::MessageRole;

pub fn render_transcript(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.messages.is_empty() {
        // Welcome banner at the bottom of the transcript area
        let welcome_text = vec![
            Line::from(Span::styled(
                "Welcome to termgpt",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Type a message and press Enter to send",
                Style::default().fg(Color::Cyan),
            )),
        ];

        let welcome_paragraph =
            Paragraph::new(welcome_text).alignment(ratatui::layout::Alignment::Center);

        let welcome_height = 2;
        let y_pos = area.y + area.height.saturating_sub(welcome_height);

        let welcome_area = Rect {
            x: area.x,
            y: y_pos,
            width: area.width,
            height: welcome_height.min(area.height),
        };

        frame.render_widget(welcome_paragraph, welcome_area);
        return;
    }

    let mut lines = Vec::new();
    for message in &app.messages {
        let is_error =
            message.role == MessageRole::Assistant && message.content.starts_with("Error: ");

        let (role, color) = match message.role {
            MessageRole::User => ("You", Color::Cyan),
            MessageRole::Assistant if is_error => ("Assistant", Color::Red),
            MessageRole::Assistant => ("Assistant", Color::Green),
        };

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("## {role}"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        if message.content.is_empty() {
            // Placeholder while the response is still streaming
            lines.push(Line::from(Span::styled(
                "...",
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            let content_style = if is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            for content_line in message.content.lines() {
                lines.push(Line::from(Span::styled(
                    content_line.to_string(),
                    content_style,
                )));
            }
        }
    }

    // Clamp the scroll offset against the wrapped height so that
    // scroll_to_bottom (usize::MAX) pins the view to the last line
    let available_width = (area.width as usize).max(1);
    let total_visual_lines = visual_line_count(&lines, available_width);
    let visible_height = area.height as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);

    if app.scroll_offset != actual_scroll {
        app.scroll_offset = actual_scroll;
    }

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(transcript, area);
}

/// Number of terminal rows the lines occupy after wrapping to `width`
fn visual_line_count(lines: &[Line], width: usize) -> usize {
    lines
        .iter()
        .map(|line| {
            let line_width = line.width();
            if line_width == 0 {
                1
            } else {
                line_width.div_ceil(width)
            }
        })
        .sum()
}

pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let streaming_indicator = if app.is_streaming {
        " [Streaming...]"
    } else {
        ""
    };

    let status_text = format!("{} | {}{}", app.model, app.shell, streaming_indicator);

    let style = if app.is_streaming {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let status = Paragraph::new(status_text)
        .alignment(ratatui::layout::Alignment::Right)
        .style(style);

    frame.render_widget(status, area);
}

pub fn render_input_field(frame: &mut Frame, app: &App, area: Rect) {
    let input_text = if app.input_buffer.is_empty() {
        "Type your message..."
    } else {
        &app.input_buffer
    };

    let input_style = if app.input_buffer.is_empty() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };

    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(input, area);
}

pub fn render_bottom_bar(frame: &mut Frame, area: Rect) {
    let bar = Paragraph::new("Enter: Send | Up/Down/PgUp/PgDn: Scroll | Esc/Ctrl+C: Quit")
        .alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(bar, area);
}

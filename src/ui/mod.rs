pub mod widgets;

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

pub fn render(frame: &mut Frame, app: &mut App) {
    // Width available for input text is total width - 2 (for borders)
    let available_width = (frame.area().width.saturating_sub(2) as usize).max(1);

    // Grow the input box as the buffer wraps, up to half the screen
    let input_lines = if app.input_buffer.is_empty() {
        1
    } else {
        app.input_buffer.chars().count().div_ceil(available_width)
    };
    let max_lines = (frame.area().height as usize / 2).saturating_sub(2);
    let actual_lines = input_lines.clamp(1, max_lines.max(1));

    #[allow(clippy::cast_possible_truncation)]
    let input_height = (actual_lines + 2) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),                // Transcript (top, flexible)
            Constraint::Length(1),             // Status line
            Constraint::Length(input_height),  // Input field (dynamic height)
            Constraint::Length(1),             // Bottom keymap bar
        ])
        .split(frame.area());

    widgets::render_transcript(frame, app, chunks[0]);
    widgets::render_status_bar(frame, app, chunks[1]);
    widgets::render_input_field(frame, app, chunks[2]);
    widgets::render_bottom_bar(frame, chunks[3]);
}

//! Identity prompt shown until a user token is known.

use ratatui::layout::{Constraint, Flex, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme::{COLOR_ACCENT, COLOR_DIM};
use crate::view::ChatView;

pub(super) fn render_identity_screen(frame: &mut Frame, view: &ChatView) {
    let [area] = Layout::vertical([Constraint::Length(7)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Max(64)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_ACCENT))
        .title(" Sign in ");

    // Never echo the token itself
    let masked = "•".repeat(view.token_input.chars().count());
    let text = vec![
        Line::from("A user token is required to use the chat."),
        Line::from(""),
        Line::from(format!("Token: {}", masked)),
        Line::from(""),
        Line::styled(
            "Enter to continue · Esc to quit",
            Style::default().fg(COLOR_DIM).add_modifier(Modifier::ITALIC),
        ),
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}

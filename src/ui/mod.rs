//! Terminal rendering for the chat view
//!
//! Layout on the chat screen:
//! - Left: thread list (hidden with `--sidebar false` or Ctrl+B)
//! - Right: message list, status line, input box
//!
//! The identity screen replaces everything until a user token is known, and
//! an alert, when present, is drawn as a centered overlay on top.

mod chat;
mod identity;
mod messages;
mod theme;

pub use messages::{message_lines, wrapped_height};
pub use theme::*;

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::view::{ChatView, Screen};

/// Render the current screen
pub fn render(frame: &mut Frame, view: &ChatView) {
    match view.screen() {
        Screen::IdentityRequired => identity::render_identity_screen(frame, view),
        Screen::Chat => chat::render_chat_screen(frame, view),
    }

    if let Some(alert) = view.alert.as_deref() {
        render_alert(frame, alert);
    }
}

fn render_alert(frame: &mut Frame, message: &str) {
    let area = centered(frame.area(), 60, 7);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_ERROR))
        .title(" Alert ");
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::styled(
            "Press Enter to dismiss",
            Style::default().fg(COLOR_DIM).add_modifier(Modifier::ITALIC),
        ),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

/// A `width` x `height` rect centered in `area`, clamped to fit
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

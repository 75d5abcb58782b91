//! Message list rendering helpers

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::theme::{COLOR_ASSISTANT, COLOR_CODE, COLOR_CODE_BG, COLOR_USER};
use crate::models::{Message, Role};

fn role_label(role: Role) -> Span<'static> {
    let (label, color) = match role {
        Role::User => ("You", COLOR_USER),
        Role::Assistant => ("Assistant", COLOR_ASSISTANT),
        Role::Code => ("Code", COLOR_CODE),
    };
    Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Lines for a whole message list: a role label, the body, a blank spacer.
pub fn message_lines(messages: &[Message]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in messages {
        lines.push(Line::from(role_label(message.role)));

        let body_style = match message.role {
            Role::Code => Style::default().bg(COLOR_CODE_BG),
            _ => Style::default(),
        };
        if message.text.is_empty() {
            // Streaming has not produced anything yet
            lines.push(Line::styled("…", body_style));
        } else {
            lines.extend(
                message
                    .text
                    .lines()
                    .map(|line| Line::styled(line.to_string(), body_style)),
            );
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Rows `lines` occupy when wrapped at `width` columns
pub fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let width = usize::from(width);
    let rows: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

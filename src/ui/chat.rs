//! Chat screen: thread sidebar, message list, status line, input.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use super::messages::{message_lines, wrapped_height};
use super::theme::{COLOR_ACCENT, COLOR_BORDER, COLOR_DIM, COLOR_ERROR};
use crate::view::{ChatView, Focus};

const SIDEBAR_WIDTH: u16 = 30;

pub(super) fn render_chat_screen(frame: &mut Frame, view: &ChatView) {
    let area = frame.area();
    let main = if view.sidebar_visible {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
                .areas(area);
        render_sidebar(frame, view, sidebar);
        main
    } else {
        area
    };

    let [messages, status, input] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(main);

    render_messages(frame, view, messages);
    render_status(frame, view, status);
    render_input(frame, view, input);
}

/// First line of `text`, cut to `max` columns with a trailing ellipsis
fn single_line(text: &str, max: usize) -> String {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    let more_lines = text.trim().lines().count() > 1;
    if first.chars().count() > max {
        let kept: String = first.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept.trim_end())
    } else if more_lines {
        format!("{}…", first)
    } else {
        first.to_string()
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(COLOR_ACCENT)
    } else {
        Style::default().fg(COLOR_BORDER)
    }
}

fn render_sidebar(frame: &mut Frame, view: &ChatView, area: Rect) {
    let items: Vec<ListItem> = view
        .threads
        .iter()
        .map(|thread| {
            let width = usize::from(SIDEBAR_WIDTH.saturating_sub(4));
            let preview = single_line(&thread.last_message, width);
            ListItem::new(vec![
                Line::from(single_line(&thread.title, width)),
                Line::styled(preview, Style::default().fg(COLOR_DIM)),
            ])
        })
        .collect();

    let selected = view
        .current_thread_id
        .as_deref()
        .and_then(|id| view.threads.iter().position(|t| t.id == id));
    let mut state = ListState::default().with_selected(selected);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(view.focus == Focus::Threads))
                .title(" Threads "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_messages(frame: &mut Frame, view: &ChatView, area: Rect) {
    let title = view
        .current_thread()
        .map(|t| format!(" {} ", single_line(&t.title, usize::from(area.width.saturating_sub(4)))))
        .unwrap_or_else(|| " Chat ".to_string());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(false))
        .title(title);

    let lines = if view.loading {
        vec![Line::styled("Loading conversations…", Style::default().fg(COLOR_DIM))]
    } else {
        view.current_thread()
            .map(|t| message_lines(&t.messages))
            .unwrap_or_default()
    };

    // Stick to the bottom unless the user scrolled up
    let inner = block.inner(area);
    let total = wrapped_height(&lines, inner.width);
    let max_scroll = total.saturating_sub(inner.height);
    let scroll = max_scroll.saturating_sub(view.scroll_offset);

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

fn render_status(frame: &mut Frame, view: &ChatView, area: Rect) {
    let mut spans = Vec::new();
    if let Some(status) = view.status.as_deref() {
        spans.push(Span::styled(status.to_string(), Style::default().fg(COLOR_ERROR)));
    } else if !view.input_enabled {
        spans.push(Span::styled("Assistant is responding…", Style::default().fg(COLOR_DIM)));
    }
    if let Some(quota) = view.quota {
        if !spans.is_empty() {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            format!("{} tokens left", quota),
            Style::default().fg(COLOR_DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(frame: &mut Frame, view: &ChatView, area: Rect) {
    let hint = if view.sidebar_visible {
        " Enter send · Ctrl+N new · Tab threads · Ctrl+B sidebar · Ctrl+C quit "
    } else {
        " Enter send · Ctrl+N new · Ctrl+B sidebar · Ctrl+C quit "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(view.focus == Focus::Input))
        .title_bottom(Line::styled(hint, Style::default().fg(COLOR_DIM)));

    let style = if view.input_enabled {
        Style::default()
    } else {
        Style::default().fg(COLOR_DIM)
    };
    frame.render_widget(
        Paragraph::new(view.input.as_str()).style(style).block(block),
        area,
    );

    if view.focus == Focus::Input && view.alert.is_none() {
        let width = u16::try_from(view.input.chars().count()).unwrap_or(u16::MAX);
        let x = area.x + 1 + width.min(area.width.saturating_sub(3));
        frame.set_cursor_position((x, area.y + 1));
    }
}

//! Frame layout and widgets

use super::markup::markup_lines;
use crate::backend::ChatBackend;
use crate::runtime::ConversationController;
use crate::state_machine::Role;
use crate::view::{
    ChatHeader, InputSurface, SessionDirectory, TranscriptEntry, TranscriptView,
    WELCOME_CAPABILITIES, WELCOME_GREETING, WELCOME_INTRO,
};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

const SIDEBAR_WIDTH: u16 = 30;
const KEY_HINTS: &str =
    "Enter send · Shift+Enter newline · Tab sessions · Ctrl+N new · Ctrl+R refresh · PgUp/PgDn scroll · Esc quit";

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

pub fn draw<B>(frame: &mut Frame, controller: &mut ConversationController<B>)
where
    B: ChatBackend + 'static,
{
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(frame.area());

    let input_rows = controller.input().height() + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(input_rows),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    let sidebar_focused = !controller.input().is_focused();
    draw_sidebar(frame, columns[0], controller.directory(), sidebar_focused);
    draw_header(frame, rows[0], controller.header());
    draw_transcript(frame, rows[1], controller.transcript_mut());
    draw_input(frame, rows[2], controller.input());
    frame.render_widget(
        Paragraph::new(Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray))),
        rows[3],
    );
}

fn draw_sidebar(frame: &mut Frame, area: Rect, directory: &SessionDirectory, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(focused))
        .title(Span::styled(
            "Sessions",
            Style::default().add_modifier(Modifier::BOLD),
        ));

    if let Some(placeholder) = directory.placeholder() {
        let text = Paragraph::new(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = directory
        .entries()
        .iter()
        .map(|entry| {
            let preview_style = if entry.active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(vec![
                Line::from(Span::styled(entry.preview.clone(), preview_style)),
                Line::from(Span::styled(
                    format!("  {}", entry.date),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if focused {
        state.select(Some(directory.cursor()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_header(frame: &mut Frame, area: Rect, header: &ChatHeader) {
    let mut spans = vec![Span::styled(
        header.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(label) = &header.session_label {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            label.clone(),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Lines for every transcript entry, separated by blank lines
pub fn transcript_text(entries: &[TranscriptEntry]) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        match entry {
            TranscriptEntry::Welcome => {
                lines.push(Line::from(Span::styled(
                    WELCOME_GREETING,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(WELCOME_INTRO));
                lines.extend(
                    WELCOME_CAPABILITIES
                        .iter()
                        .map(|c| Line::from(format!("  • {c}"))),
                );
            }
            TranscriptEntry::Turn { role, markup } => {
                let (label, color) = match role {
                    Role::User => ("You", Color::Blue),
                    Role::Assistant => ("Agent", Color::Green),
                };
                lines.push(Line::from(Span::styled(
                    label,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
                lines.extend(markup_lines(markup, Style::default()));
            }
            TranscriptEntry::Tool { name, args } => {
                let dim = Style::default().fg(Color::DarkGray);
                lines.push(Line::from(vec![
                    Span::styled("🔧 Called ", dim),
                    Span::styled(name.clone(), dim.add_modifier(Modifier::BOLD)),
                    Span::styled(format!("({args})"), dim),
                ]));
            }
            TranscriptEntry::Typing => {
                lines.push(Line::from(Span::styled(
                    "● ● ●",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::SLOW_BLINK),
                )));
            }
        }
    }

    Text::from(lines)
}

fn draw_transcript(frame: &mut Frame, area: Rect, transcript: &mut TranscriptView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let paragraph = Paragraph::new(transcript_text(transcript.entries())).wrap(Wrap { trim: false });
    let total = u16::try_from(paragraph.line_count(inner_width)).unwrap_or(u16::MAX);

    // Follow the bottom unless the user scrolled back
    let max_back = total.saturating_sub(inner_height);
    transcript.clamp_scroll(max_back);
    let offset = max_back - transcript.scroll_back();

    frame.render_widget(paragraph.block(block).scroll((offset, 0)), area);
}

fn draw_input(frame: &mut Frame, area: Rect, input: &InputSurface) {
    let title = if input.is_enabled() {
        "Message"
    } else {
        "Waiting for reply..."
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(input.is_focused() && input.is_enabled()))
        .title(title);

    let text_style = if input.is_enabled() {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines: Vec<&str> = input.text().split('\n').collect();
    let line_count = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let visible = area.height.saturating_sub(2).max(1);
    let scroll = line_count.saturating_sub(visible);

    let paragraph = Paragraph::new(input.text().to_string())
        .style(text_style)
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    if input.is_focused() && input.is_enabled() {
        let last = lines.last().copied().unwrap_or_default();
        let column = u16::try_from(Span::raw(last).width()).unwrap_or(u16::MAX);
        let x = (area.x + 1)
            .saturating_add(column)
            .min(area.right().saturating_sub(2));
        let y = area.y + 1 + (line_count - scroll).saturating_sub(1);
        frame.set_cursor_position(Position::new(x, y));
    }
}

//! Player panel: media info, the control surface and the active stream

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{PlayerControl, PlayerViewState, SessionPhase};

pub fn render_player(frame: &mut Frame, area: Rect, player: &PlayerViewState) {
    let title = match player.title() {
        "" => " Player ".to_string(),
        name => format!(" {} ", name),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    let Some(controls) = player.controls.as_ref() else {
        let text = match player.phase {
            SessionPhase::FetchingCapabilities | SessionPhase::Uninitialized => "Loading...",
            _ => "No player running",
        };
        frame.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)).block(block), area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Media info
            Constraint::Length(player.visible_controls().len() as u16 + 1),
            Constraint::Min(0),    // Source
        ])
        .split(inner);

    if let Some(caps) = player.capabilities.as_deref() {
        let info = Line::from(vec![
            Span::styled("Size ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{}x{}", caps.width, caps.height)),
            Span::styled("   Audio tracks ", Style::default().fg(Color::DarkGray)),
            Span::raw(caps.audio_languages.len().to_string()),
            Span::styled("   Subtitles ", Style::default().fg(Color::DarkGray)),
            Span::raw(caps.subtitles.len().to_string()),
        ]);
        frame.render_widget(Paragraph::new(info), chunks[0]);
    }

    let availability = controls.availability();
    let lines: Vec<Line> = player
        .visible_controls()
        .into_iter()
        .map(|control| {
            let focused = control == player.focused;
            let enabled = availability.allows(control);
            let value_style = match (focused, enabled) {
                (true, true) => Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::REVERSED),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            let value = match control {
                PlayerControl::Raw => controls.display(control),
                _ => format!("‹ {} ›", controls.display(control)),
            };
            Line::from(vec![
                Span::styled(format!("{:>12}  ", control.label()), Style::default().fg(Color::Yellow)),
                Span::styled(value, value_style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), chunks[1]);

    if let Some(source) = player.source.as_ref() {
        let mut lines = vec![Line::from(vec![
            Span::styled("Stream ", Style::default().fg(Color::DarkGray)),
            Span::raw(source.url.as_str()),
        ])];
        for path in source.subtitle_paths() {
            lines.push(Line::from(vec![
                Span::styled("Subs   ", Style::default().fg(Color::DarkGray)),
                Span::raw(path),
            ]));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[2]);
    }
}

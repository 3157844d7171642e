//! Layout rendering (top bar, status bar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use crate::model::{BrowseState, PlayerViewState, SessionPhase, UiState, ViewTag};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, browse: &BrowseState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Current folder
            Constraint::Length(34), // Server
        ])
        .split(area);

    let path = match browse.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };
    let folder = Paragraph::new(path)
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Folder ")
                .padding(Padding::horizontal(1))
                .border_style(if ui_state.active_view == ViewTag::Browse {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(folder, chunks[0]);

    let server = Paragraph::new(ui_state.server.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Server "));
    frame.render_widget(server, chunks[1]);
}

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    browse: &BrowseState,
    player: &PlayerViewState,
) {
    let status = match ui_state.active_view {
        ViewTag::Browse if browse.is_loading => " Loading...".to_string(),
        ViewTag::Browse => format!(
            " {} folders, {} videos",
            browse.listing.as_ref().map_or(0, |l| l.folders.len()),
            browse.listing.as_ref().map_or(0, |l| l.media.len()),
        ),
        ViewTag::MediaPlayer => match player.phase {
            SessionPhase::Ready => format!(" ▶ {}", player.title()),
            phase => format!(" {}", phase),
        },
    };

    let hints = match ui_state.active_view {
        ViewTag::Browse => " ↑↓ Select | Enter Open | Backspace Up | H Help | Q Quit ",
        ViewTag::MediaPlayer => " ↑↓ Control | ←→ Change | R Reload | Esc Back | H Help ",
    };

    let bar = Paragraph::new(status).block(
        Block::default()
            .borders(Borders::ALL)
            .title_bottom(Line::from(hints).right_aligned()),
    );
    frame.render_widget(bar, area);
}

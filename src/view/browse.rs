//! Folder listing rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{BrowseEntry, BrowseState};
use super::utils::{inner_width, render_scrollable_list, truncate_string};

pub fn render_listing(frame: &mut Frame, area: Rect, browse: &BrowseState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Library ")
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    if browse.listing.is_none() {
        let text = if browse.is_loading { "Loading..." } else { "Nothing here yet" };
        let placeholder = Paragraph::new(text)
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let width = inner_width(area);
    let items: Vec<ListItem> = browse
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let color = match entry {
                BrowseEntry::Parent { .. } => Color::DarkGray,
                BrowseEntry::Folder { .. } => Color::Cyan,
                BrowseEntry::Media { .. } => Color::White,
            };
            let style = if i == browse.selected_index {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            };
            ListItem::new(truncate_string(&entry.label(), width)).style(style)
        })
        .collect();

    render_scrollable_list(frame, area, items, browse.selected_index, block);
}

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::picker::{Picker, PickerEntry, PickerFocus};

pub fn draw_picker(f: &mut Frame, area: Rect, picker: &Picker) {
    // Create a centered modal
    let modal_width = 64.min(area.width.saturating_sub(4));
    let modal_height = 22.min(area.height.saturating_sub(4));

    let modal_area = Rect {
        x: (area.width - modal_width) / 2,
        y: (area.height - modal_height) / 2,
        width: modal_width,
        height: modal_height,
    };

    // Clear the background
    f.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Pick Audio ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(block, modal_area);

    let inner_area = modal_area.inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Current path
            Constraint::Min(3),    // Entries
            Constraint::Length(3), // Search field
            Constraint::Length(1), // Controls
        ])
        .split(inner_area);

    let path_widget = Paragraph::new(format!("📁 {}", picker.current_path.display()))
        .style(Style::default().fg(Color::Blue))
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(path_widget, chunks[0]);

    let visible = picker.visible_entries();
    if visible.is_empty() {
        let message = if picker.query.is_empty() {
            "No audio files here"
        } else {
            "No matches"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(empty, chunks[1]);
    } else {
        let items: Vec<ListItem> = visible
            .iter()
            .map(|entry| {
                let (prefix, color) = match entry {
                    PickerEntry::Parent => ("↑ ", Color::White),
                    PickerEntry::Directory(_) => ("📁 ", Color::Blue),
                    PickerEntry::Audio(_) => ("♪ ", Color::Green),
                };
                ListItem::new(format!("{prefix}{}", entry.name())).style(Style::default().fg(color))
            })
            .collect();

        let highlight = if picker.focus == PickerFocus::List {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let list = List::new(items).highlight_style(highlight);
        let mut state = ListState::default();
        state.select(Some(picker.selected));
        f.render_stateful_widget(list, chunks[1], &mut state);
    }

    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(if picker.focus == PickerFocus::Search {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(" Search ");

    let search_widget = Paragraph::new(picker.query.as_str())
        .style(Style::default().fg(Color::White))
        .block(search_block);
    f.render_widget(search_widget, chunks[2]);

    if picker.focus == PickerFocus::Search {
        let cursor_x = chunks[2].x + 1 + picker.query.chars().count() as u16;
        let cursor_y = chunks[2].y + 1;
        if cursor_x < chunks[2].x + chunks[2].width.saturating_sub(1) {
            f.set_cursor_position((cursor_x, cursor_y));
        }
    }

    let controls = if picker.focus == PickerFocus::Search {
        vec![
            Span::styled("[Enter]", Style::default().fg(Color::Green)),
            Span::raw(" done  "),
            Span::styled("[^K]", Style::default().fg(Color::Yellow)),
            Span::raw(" clear  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red)),
            Span::raw(" back"),
        ]
    } else {
        vec![
            Span::styled("[↑↓]", Style::default().fg(Color::Magenta)),
            Span::raw(" move  "),
            Span::styled("[/]", Style::default().fg(Color::Blue)),
            Span::raw(" search  "),
            Span::styled("[Enter]", Style::default().fg(Color::Green)),
            Span::raw(" pick  "),
            Span::styled("[Esc]", Style::default().fg(Color::Red)),
            Span::raw(" cancel"),
        ]
    };
    let controls_widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(controls_widget, chunks[3]);
}

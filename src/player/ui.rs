use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};
use std::time::Duration;

use super::app::App;
use super::picker_ui::draw_picker;
use tapeloop::session::{AudioBackend, TransportState};

pub fn draw<B: AudioBackend>(f: &mut Frame, app: &App<B>) {
    let size = f.area();

    draw_main_ui(f, app);

    if let Some(ref picker) = app.picker {
        draw_picker(f, size, picker);
    }
}

fn draw_main_ui<B: AudioBackend>(f: &mut Frame, app: &App<B>) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(3), // Selected file
            Constraint::Length(3), // Action button
            Constraint::Length(3), // Loop position
            Constraint::Length(3), // Recording status
            Constraint::Min(0),
            Constraint::Length(2), // Controls
        ])
        .split(size);

    let title = Paragraph::new("🎙 tapeloop")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    draw_file_label(f, chunks[1], app);
    draw_action_button(f, chunks[2], app);
    draw_loop_position(f, chunks[3], app);
    draw_recording_status(f, chunks[4], app);
    draw_controls(f, chunks[6], app);
}

fn draw_file_label<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let (text, style) = match app.controller.file_label() {
        Some(label) => (
            label.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        None => (
            "No file selected".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let widget = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(widget, area);
}

fn draw_action_button<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let controller = &app.controller;

    let color = if !controller.action_enabled() {
        Color::DarkGray
    } else if controller.state() == TransportState::Playing {
        Color::Red
    } else {
        Color::Green
    };

    let width = 24.min(area.width);
    let button_area = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: area.height,
    };

    let mut label_style = Style::default().fg(color);
    if controller.action_enabled() {
        label_style = label_style.add_modifier(Modifier::BOLD);
    }

    let button = Paragraph::new(controller.action_label())
        .style(label_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(button, button_area);
}

fn draw_loop_position<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),    // Gauge
            Constraint::Length(15), // Time display
        ])
        .split(area);

    let position = app.controller.playback_position();
    let duration = app.controller.loop_duration();

    let ratio = match duration {
        Some(total) if !total.is_zero() => {
            (position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Loop "))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label("");
    f.render_widget(gauge, chunks[0]);

    let time_info = format!(
        "{} / {}",
        format_time(position),
        format_time(duration.unwrap_or_default())
    );
    let time_widget = Paragraph::new(time_info)
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(time_widget, chunks[1]);
}

fn draw_recording_status<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let controller = &app.controller;
    let level = controller.input_level();

    let mut spans = if controller.is_recording() {
        vec![
            Span::styled(
                "● REC ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format_time(controller.recording_elapsed().unwrap_or_default())),
            Span::raw("  in "),
            Span::styled(get_led_char(level), Style::default().fg(get_led_color(level))),
        ]
    } else {
        vec![
            Span::styled("○ REC ", Style::default().fg(Color::DarkGray)),
            Span::styled("--:--", Style::default().fg(Color::DarkGray)),
        ]
    };

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        controller.recording_path().display().to_string(),
        Style::default().fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(widget, area);
}

fn draw_controls<B: AudioBackend>(f: &mut Frame, area: Rect, app: &App<B>) {
    let action_color = if app.controller.action_enabled() {
        Color::Green
    } else {
        Color::DarkGray
    };

    let controls = vec![
        Span::styled("[o]", Style::default().fg(Color::Blue)),
        Span::raw(" pick file  "),
        Span::styled("[space]", Style::default().fg(action_color)),
        Span::raw(if app.controller.is_playing() {
            " stop  "
        } else {
            " play + record  "
        }),
        Span::styled("[q]", Style::default().fg(Color::Red)),
        Span::raw(" quit"),
    ];

    let border_widget = Block::default().borders(Borders::TOP);
    f.render_widget(border_widget, area);

    let inner = Rect {
        y: area.y + 1,
        height: area.height.saturating_sub(1),
        ..area
    };
    let controls_widget = Paragraph::new(Line::from(controls)).alignment(Alignment::Center);
    f.render_widget(controls_widget, inner);
}

pub fn format_time(time: Duration) -> String {
    let secs = time.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn get_led_char(level: f32) -> &'static str {
    if level < 0.05 {
        "○" // Empty circle
    } else if level < 0.3 {
        "◐" // Half filled
    } else {
        "●" // Full circle
    }
}

fn get_led_color(level: f32) -> Color {
    if level > 0.9 {
        Color::Rgb(255, 100, 100) // Red when clipping
    } else if level > 0.3 {
        Color::Rgb(100, 255, 100)
    } else if level > 0.05 {
        Color::Rgb(50, 200, 50)
    } else {
        Color::Rgb(20, 100, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_time(Duration::from_secs(61)), "01:01");
        assert_eq!(format_time(Duration::from_secs(3600)), "60:00");
    }

    #[test]
    fn test_led_thresholds() {
        assert_eq!(get_led_char(0.0), "○");
        assert_eq!(get_led_char(0.1), "◐");
        assert_eq!(get_led_char(0.8), "●");
        assert_eq!(get_led_color(0.95), Color::Rgb(255, 100, 100));
    }
}

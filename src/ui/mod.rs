pub mod axes;
pub mod chart;
pub mod data;
pub mod help;
pub mod tabs;

use chrono::{Local, TimeZone};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Tab};
use crate::data::{format_bytes, truncate_string};

/// Helper to create a centered rect as a percentage of the given area
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Main render function that draws the entire UI
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(5),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_title(f, chunks[0], app);
    tabs::render_tabs(f, chunks[1], app.active_tab);

    match (app.active_tab, app.activity.as_ref()) {
        (Tab::Home, _) => render_home(f, chunks[2], app),
        (Tab::Axes, Some(activity)) => {
            axes::render_axes(f, chunks[2], &activity.frame, &app.options, &app.columns, app.axes_cursor)
        }
        (Tab::Data, Some(activity)) => {
            self::data::render_data(f, chunks[2], &activity.frame, &app.options, app.selected_row)
        }
        (Tab::Chart, Some(activity)) => match app.chart {
            Some(ref spec) => chart::render_chart(f, chunks[2], spec, &activity.frame, app.selected_row),
            None => render_message(f, chunks[2], app.warning.as_deref().unwrap_or("Nothing to plot")),
        },
        (_, None) => render_message(f, chunks[2], "No file loaded. Pick a FIT file on the Home tab."),
    }

    render_status_bar(f, chunks[3], app);

    // Help overlay (on top of everything)
    if app.show_help {
        help::render_help(f);
    }
}

fn render_title(f: &mut Frame, area: Rect, app: &App) {
    let title = if let Some(ref activity) = app.activity {
        format!("FIT File Data Analysis: {}", activity.name())
    } else {
        "FIT File Data Analysis".to_string()
    };

    let paragraph = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn format_modified(ms: u64) -> String {
    Local
        .timestamp_millis_opt(ms as i64)
        .single()
        .map(|t| t.format("%m/%d %H:%M").to_string())
        .unwrap_or_default()
}

fn render_home(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();
    let key_style = Style::default().fg(Color::Green);
    let desc_style = Style::default().fg(Color::DarkGray);

    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!("FIT files in {}", app.dir.display()),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(""));

    if app.files.is_empty() {
        lines.push(Line::styled(
            "No .fit files found. Copy one into this directory or pass a path on the command line.",
            Style::default().fg(Color::Gray),
        ));
    }

    for (i, entry) in app.files.iter().enumerate() {
        let is_selected = i == app.files_selected;
        let prefix = if is_selected { " \u{25b8} " } else { "   " };
        let style = if is_selected {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(truncate_string(&entry.name, 40), style),
            Span::styled(format!("  {}  ", format_modified(entry.modified)), desc_style),
            Span::styled(format_bytes(entry.size), desc_style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" \u{2191}\u{2193}", key_style),
        Span::styled(": select  ", desc_style),
        Span::styled("Enter", key_style),
        Span::styled(": load  ", desc_style),
        Span::styled("d", key_style),
        Span::styled(": hide  ", desc_style),
        Span::styled("r", key_style),
        Span::styled(": rescan  ", desc_style),
        Span::styled("?", key_style),
        Span::styled(": help", desc_style),
    ]));

    lines.push(Line::from(""));
    if let Some(ref path) = app.loading {
        let dots = ".".repeat(((app.ticks / 5) % 4) as usize);
        lines.push(Line::styled(
            format!("Decoding {}{}", path.display(), dots),
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(ref activity) = app.activity {
        lines.push(Line::styled(
            format!(
                "\u{2713} Loaded {}: {} records, {} fields",
                activity.name(),
                activity.frame.len(),
                app.columns.len()
            ),
            Style::default().fg(Color::Green),
        ));
    }

    let border_color = if app.activity.is_some() {
        Color::Green
    } else if !app.files.is_empty() {
        Color::Cyan
    } else {
        Color::Yellow
    };

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Files ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

fn render_message(f: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let help_hint = format!("←→: tabs | {} | c: clear | ?: help | q: quit", app.active_tab.key_hint());

    let (text, style) = match app.warning {
        Some(ref warning) => (
            format!(" \u{26a0} {} | {}", warning, help_hint),
            Style::default().fg(Color::Yellow),
        ),
        None => (help_hint, Style::default().fg(Color::DarkGray)),
    };

    let paragraph = Paragraph::new(text).style(style).alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::data::{truncate_string, value_to_string, Frame as DataFrame};
use crate::plot::{PlotOptions, MAX_Y_COLUMNS};

fn role(options: &PlotOptions, column: &str) -> String {
    let mut roles = Vec::new();
    if options.x == column {
        roles.push("X".to_string());
    }
    if let Some(pos) = options.ys.iter().position(|y| y == column) {
        if pos >= MAX_Y_COLUMNS {
            roles.push(format!("Y{} (ignored)", pos + 1));
        } else if pos == 1 && options.uses_secondary_axis() {
            roles.push("Y2 (right)".to_string());
        } else {
            roles.push(format!("Y{}", pos + 1));
        }
    }
    if roles.is_empty() {
        "-".to_string()
    } else {
        roles.join(", ")
    }
}

pub fn render_axes(
    f: &mut Frame,
    area: Rect,
    frame: &DataFrame,
    options: &PlotOptions,
    columns: &[String],
    cursor: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let header_cells = ["Column", "Units", "Kind", "Role", "Sample Value"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = columns
        .iter()
        .map(|col| {
            let idx = frame.column(col);
            let kind = idx.map(|i| frame.column_kind(i).label()).unwrap_or("-");
            let sample = idx
                .and_then(|i| frame.first_value(i))
                .map(value_to_string)
                .unwrap_or_else(|| "-".to_string());
            let role = role(options, col);

            let style = if role != "-" {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };

            Row::new(vec![
                Cell::from(col.clone()).style(style),
                Cell::from(frame.units(col).to_string()).style(Style::default().fg(Color::Gray)),
                Cell::from(kind).style(Style::default().fg(Color::DarkGray)),
                Cell::from(role).style(style),
                Cell::from(truncate_string(&sample, 30)).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(12),
        Constraint::Percentage(10),
        Constraint::Percentage(18),
        Constraint::Percentage(30),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Columns ({} available) ", columns.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));

    let mut state = TableState::default();
    if !columns.is_empty() {
        state.select(Some(cursor));
    }
    f.render_stateful_widget(table, chunks[0], &mut state);

    render_options(f, chunks[1], options);
}

fn checkbox(on: bool) -> &'static str {
    if on {
        "[x]"
    } else {
        "[ ]"
    }
}

fn render_options(f: &mut Frame, area: Rect, options: &PlotOptions) {
    let on = Style::default().fg(Color::Green);
    let off = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(
            format!("{} Use shared Y-axis (s)", checkbox(options.shared_y_axis)),
            if options.shared_y_axis { on } else { off },
        ),
        Span::raw("   "),
        Span::styled(
            format!("{} Smooth data (m)", checkbox(options.smooth)),
            if options.smooth { on } else { off },
        ),
    ];
    if options.smooth {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("Moving average window size: {} (+/-)", options.window),
            Style::default().fg(Color::Cyan),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .title(" Options ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

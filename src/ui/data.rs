use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::data::{truncate_string, value_to_string, Frame as DataFrame};
use crate::plot::{axis_title, limit_y_columns, PlotOptions};

/// Columns shown in the table: X first, then the plotted Ys
fn visible_columns(options: &PlotOptions) -> Vec<String> {
    let (ys, _) = limit_y_columns(&options.ys);
    std::iter::once(options.x.clone())
        .chain(ys.into_iter().filter(|y| *y != options.x))
        .collect()
}

/// First row of the window of `height` rows that keeps `selected` visible
fn window_start(selected: usize, height: usize, len: usize) -> usize {
    if height == 0 || len <= height {
        return 0;
    }
    selected
        .saturating_sub(height / 2)
        .min(len - height)
}

pub fn render_data(f: &mut Frame, area: Rect, frame: &DataFrame, options: &PlotOptions, selected: usize) {
    let columns = visible_columns(options);
    let indices: Vec<Option<usize>> = columns.iter().map(|c| frame.column(c)).collect();

    let header_cells = columns.iter().enumerate().map(|(i, name)| {
        let style = if i == 0 {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        };
        Cell::from(axis_title(name, frame.units(name))).style(style)
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    // Only materialise the rows that fit on screen
    let height = area.height.saturating_sub(4) as usize;
    let start = window_start(selected, height, frame.len());
    let end = (start + height.max(1)).min(frame.len());

    let rows: Vec<Row> = (start..end)
        .map(|row_idx| {
            let cells: Vec<Cell> = indices
                .iter()
                .enumerate()
                .map(|(col_pos, idx)| {
                    let display = idx
                        .map(|i| value_to_string(frame.cell(row_idx, i)))
                        .unwrap_or_else(|| "-".to_string());

                    let style = if col_pos == 0 {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default().fg(Color::Green)
                    };

                    Cell::from(truncate_string(&display, 30)).style(style)
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let num_cols = columns.len().max(1);
    let widths = vec![Constraint::Percentage((100 / num_cols) as u16); num_cols];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Data ({} rows) ", frame.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow));

    let mut state = TableState::default();
    if end > start {
        state.select(Some(selected.saturating_sub(start)));
    }

    f.render_stateful_widget(table, area, &mut state);

    // Show row indicator
    if !frame.is_empty() {
        let indicator = format!(" Row {}/{} ", selected + 1, frame.len());
        let width = indicator.len() as u16 + 1;
        if area.width > width + 2 {
            let indicator_area = Rect::new(area.x + area.width - width - 1, area.y, width, 1);
            let indicator_widget = Paragraph::new(indicator).style(Style::default().fg(Color::DarkGray));
            f.render_widget(indicator_widget, indicator_area);
        }
    }
}

use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
};

use crate::data::{
    format_clock, format_number, format_with_unit, truncate_string, value_to_string, Frame as DataFrame,
};
use crate::plot::{AxisSide, ChartSpec, XScale};

const TRACE_COLORS: [Color; 2] = [Color::Cyan, Color::Magenta];
const GUTTER_WIDTH: u16 = 12;

/// Widen bounds by 10% so lines don't sit on the border
fn padded(bounds: [f64; 2]) -> [f64; 2] {
    let range = bounds[1] - bounds[0];
    if range <= f64::EPSILON {
        [bounds[0] - 1.0, bounds[1] + 1.0]
    } else {
        [bounds[0] - range * 0.1, bounds[1] + range * 0.1]
    }
}

fn widened(bounds: [f64; 2]) -> [f64; 2] {
    if bounds[1] - bounds[0] <= f64::EPSILON {
        [bounds[0] - 1.0, bounds[1] + 1.0]
    } else {
        bounds
    }
}

/// Map a secondary-axis value into primary-axis coordinates
fn rescale(value: f64, from: [f64; 2], to: [f64; 2]) -> f64 {
    let span = from[1] - from[0];
    if span.abs() <= f64::EPSILON {
        return (to[0] + to[1]) / 2.0;
    }
    to[0] + (value - from[0]) * (to[1] - to[0]) / span
}

fn x_label(spec: &ChartSpec, x: f64) -> String {
    match spec.x_scale {
        XScale::Time => format_clock(x),
        XScale::Linear => format_number(x),
        XScale::Category => spec
            .categories
            .get(x.round().max(0.0) as usize)
            .map(|c| truncate_string(c, 10))
            .unwrap_or_default(),
    }
}

pub fn render_chart(f: &mut Frame, area: Rect, spec: &ChartSpec, frame: &DataFrame, selected: usize) {
    // Split area for chart and selection info
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    let (plot_area, gutter_area) = if spec.y2_axis.is_some() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(GUTTER_WIDTH)])
            .split(chunks[0]);
        (cols[0], Some(cols[1]))
    } else {
        (chunks[0], None)
    };

    let Some(x_bounds) = spec.x_bounds().map(widened) else {
        render_empty(f, chunks[0], spec);
        return;
    };
    let y_bounds = padded(spec.y_bounds(AxisSide::Primary).unwrap_or([0.0, 1.0]));
    let y2_bounds = spec.y_bounds(AxisSide::Secondary).map(padded);

    // Gaps split a trace into several datasets; only the first carries the legend name
    let mut segments: Vec<(usize, Vec<(f64, f64)>)> = Vec::new();
    let mut markers: Vec<(usize, Vec<(f64, f64)>)> = Vec::new();
    for (i, trace) in spec.traces.iter().enumerate() {
        let to_primary = |(x, y): (f64, f64)| match (trace.axis, y2_bounds) {
            (AxisSide::Secondary, Some(from)) => (x, rescale(y, from, y_bounds)),
            _ => (x, y),
        };
        for segment in trace.segments() {
            segments.push((i, segment.into_iter().map(to_primary).collect()));
        }
        if let Some(y) = trace.at_row(selected).and_then(|p| p.y.map(|y| (p.x, y))) {
            markers.push((i, vec![to_primary(y)]));
        }
    }

    let mut named = vec![false; spec.traces.len()];
    let mut datasets: Vec<Dataset> = Vec::new();
    for (i, points) in &segments {
        let trace = &spec.traces[*i];
        let mut dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(TRACE_COLORS[*i % TRACE_COLORS.len()]))
            .data(points);
        if !named[*i] {
            named[*i] = true;
            let name = if trace.axis == AxisSide::Secondary {
                format!("{} (right)", trace.name)
            } else {
                trace.name.clone()
            };
            dataset = dataset.name(name);
        }
        datasets.push(dataset);
    }
    for (_, point) in &markers {
        datasets.push(
            Dataset::default()
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .data(point),
        );
    }

    let x_mid = (x_bounds[0] + x_bounds[1]) / 2.0;
    let x_labels = vec![
        Span::raw(x_label(spec, x_bounds[0])),
        Span::raw(x_label(spec, x_mid)),
        Span::raw(x_label(spec, x_bounds[1])),
    ];

    let y_labels = vec![
        Span::raw(format_number(y_bounds[0])),
        Span::raw(format_number((y_bounds[0] + y_bounds[1]) / 2.0)),
        Span::raw(format_number(y_bounds[1])),
    ];

    let mut title = format!(" {} ", spec.title);
    if spec.smoothing_window > 1 {
        title = format!(" {} (smoothed, window {}) ", spec.title, spec.smoothing_window);
    }

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(title)
                .title_bottom(format!(" {} ", spec.legend_title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .x_axis(
            Axis::default()
                .title(spec.x_axis.title.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(spec.y_axis.title.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(50)));

    f.render_widget(chart, plot_area);

    if let (Some(gutter), Some(bounds), Some(axis)) = (gutter_area, y2_bounds, spec.y2_axis.as_ref()) {
        render_secondary_axis(f, gutter, bounds, &axis.title);
    }

    render_selection_info(f, chunks[1], spec, frame, selected);
}

/// Labels for the right-hand axis, top to bottom
fn secondary_labels(bounds: [f64; 2], height: usize) -> Vec<String> {
    let mut labels = vec![String::new(); height];
    if height == 0 {
        return labels;
    }
    labels[0] = format_number(bounds[1]);
    labels[height - 1] = format_number(bounds[0]);
    if height > 2 {
        labels[height / 2] = format_number((bounds[0] + bounds[1]) / 2.0);
    }
    labels
}

fn render_secondary_axis(f: &mut Frame, area: Rect, bounds: [f64; 2], title: &str) {
    // The chart's plot area starts below its border and ends above the x axis rows
    let height = area.height.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = vec![Line::from("")];
    lines.extend(
        secondary_labels(bounds, height)
            .into_iter()
            .map(|l| Line::styled(l, Style::default().fg(TRACE_COLORS[1]))),
    );

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(truncate_string(title, GUTTER_WIDTH as usize - 2))
            .borders(Borders::TOP | Borders::RIGHT | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Blue)),
    );

    f.render_widget(paragraph, area);
}

fn render_selection_info(f: &mut Frame, area: Rect, spec: &ChartSpec, frame: &DataFrame, selected: usize) {
    if frame.is_empty() {
        return;
    }

    let x_value = frame
        .column(&spec.x_axis.column)
        .map(|i| value_to_string(frame.cell(selected, i)))
        .unwrap_or_else(|| "-".to_string());

    let values: Vec<String> = spec
        .traces
        .iter()
        .map(|trace| {
            let value = trace
                .at_row(selected)
                .and_then(|p| p.y)
                .map(|y| format_with_unit(y, &trace.unit))
                .unwrap_or_else(|| "-".to_string());
            format!("{} = {}", trace.name, value)
        })
        .collect();

    let info = format!(
        "◆ Row {}/{}: {} = {} → {}",
        selected + 1,
        frame.len(),
        spec.x_axis.column,
        x_value,
        values.join(" | ")
    );

    let paragraph = Paragraph::new(info)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_empty(f: &mut Frame, area: Rect, spec: &ChartSpec) {
    let paragraph = Paragraph::new("No data to display")
        .block(
            Block::default()
                .title(format!(" {} ", spec.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    f.render_widget(paragraph, area);
}

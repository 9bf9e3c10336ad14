use serde::Serialize;
use thiserror::Error;

use crate::data::{rolling_mean, value_to_string, ColumnKind, Frame};

pub const MIN_WINDOW: usize = 1;
pub const MAX_WINDOW: usize = 100;
pub const DEFAULT_WINDOW: usize = 5;
pub const MAX_Y_COLUMNS: usize = 2;

pub const DEFAULT_X_COLUMN: &str = "Timestamp";
pub const DEFAULT_Y_COLUMN: &str = "Heart Rate";
pub const LEGEND_TITLE: &str = "Measurement Type";
pub const TOO_MANY_Y_WARNING: &str =
    "Please select up to 2 Y-axes only. Using the first 2 selected.";

#[derive(Debug, Error, PartialEq)]
pub enum PlotError {
    #[error("Please select at least one Y-axis to plot.")]
    NoYColumns,
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// The user's axis and smoothing choices
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub x: String,
    /// Selected Y columns, in selection order. Only the first two are plotted.
    pub ys: Vec<String>,
    pub shared_y_axis: bool,
    pub smooth: bool,
    pub window: usize,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            x: String::new(),
            ys: Vec::new(),
            shared_y_axis: true,
            smooth: false,
            window: DEFAULT_WINDOW,
        }
    }
}

impl PlotOptions {
    /// Defaults for a freshly loaded frame
    pub fn for_columns(columns: &[String]) -> Self {
        Self {
            x: default_x(columns).unwrap_or_default(),
            ys: default_ys(columns),
            ..Self::default()
        }
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window.clamp(MIN_WINDOW, MAX_WINDOW);
    }

    /// Window actually applied to the Y series
    pub fn effective_window(&self) -> usize {
        if self.smooth {
            self.window.clamp(MIN_WINDOW, MAX_WINDOW)
        } else {
            1
        }
    }

    /// Add or remove a Y column, keeping selection order
    pub fn toggle_y(&mut self, column: &str) {
        if let Some(pos) = self.ys.iter().position(|c| c == column) {
            self.ys.remove(pos);
        } else {
            self.ys.push(column.to_string());
        }
    }

    pub fn uses_secondary_axis(&self) -> bool {
        !self.shared_y_axis && self.ys.len() > 1
    }
}

pub fn default_x(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| c.as_str() == DEFAULT_X_COLUMN)
        .or_else(|| columns.first())
        .cloned()
}

pub fn default_ys(columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.as_str() == DEFAULT_Y_COLUMN)
        .take(1)
        .cloned()
        .collect()
}

/// Keep the first two Y columns, with a warning when more were selected
pub fn limit_y_columns(ys: &[String]) -> (Vec<String>, Option<&'static str>) {
    if ys.len() > MAX_Y_COLUMNS {
        (ys[..MAX_Y_COLUMNS].to_vec(), Some(TOO_MANY_Y_WARNING))
    } else {
        (ys.to_vec(), None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XScale {
    /// Seconds since the Unix epoch
    Time,
    Linear,
    /// Row position, labelled from `ChartSpec::categories`
    Category,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub column: String,
    pub unit: String,
    pub title: String,
}

impl AxisSpec {
    fn new(frame: &Frame, column: &str) -> Self {
        let unit = frame.units(column).to_string();
        Self {
            column: column.to_string(),
            title: axis_title(column, &unit),
            unit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub row: usize,
    pub x: f64,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub unit: String,
    pub axis: AxisSide,
    pub points: Vec<Point>,
}

impl Trace {
    pub fn at_row(&self, row: usize) -> Option<&Point> {
        self.points
            .binary_search_by_key(&row, |p| p.row)
            .ok()
            .map(|i| &self.points[i])
    }

    /// Runs of consecutive present values, drawn as separate lines
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for point in &self.points {
            match point.y {
                Some(y) => current.push((point.x, y)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// Everything needed to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub legend_title: String,
    pub x_axis: AxisSpec,
    pub x_scale: XScale,
    pub categories: Vec<String>,
    pub y_axis: AxisSpec,
    pub y2_axis: Option<AxisSpec>,
    pub smoothing_window: usize,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    pub fn x_bounds(&self) -> Option<[f64; 2]> {
        bounds(self.traces.iter().flat_map(|t| t.points.iter().map(|p| p.x)))
    }

    pub fn y_bounds(&self, side: AxisSide) -> Option<[f64; 2]> {
        bounds(
            self.traces
                .iter()
                .filter(|t| t.axis == side)
                .flat_map(|t| t.points.iter().filter_map(|p| p.y)),
        )
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<[f64; 2]> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

/// `Heart Rate (bpm)`, or the bare name when there is no unit
pub fn axis_title(column: &str, unit: &str) -> String {
    if unit.is_empty() {
        column.to_string()
    } else {
        format!("{} ({})", column, unit)
    }
}

/// Turn a column selection into a chart description
pub fn build_chart(frame: &Frame, options: &PlotOptions) -> Result<ChartSpec, PlotError> {
    let (ys, _) = limit_y_columns(&options.ys);
    if ys.is_empty() {
        return Err(PlotError::NoYColumns);
    }

    let x_idx = frame
        .column(&options.x)
        .ok_or_else(|| PlotError::UnknownColumn(options.x.clone()))?;
    let y_indices = ys
        .iter()
        .map(|y| frame.column(y).ok_or_else(|| PlotError::UnknownColumn(y.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    let (x_scale, xs, categories) = match frame.column_kind(x_idx) {
        ColumnKind::Time => (XScale::Time, frame.numeric_values(x_idx), Vec::new()),
        ColumnKind::Numeric => (XScale::Linear, frame.numeric_values(x_idx), Vec::new()),
        ColumnKind::Text | ColumnKind::Empty => (
            XScale::Category,
            frame
                .values(x_idx)
                .enumerate()
                .map(|(i, c)| (!c.is_missing()).then_some(i as f64))
                .collect(),
            frame.values(x_idx).map(value_to_string).collect(),
        ),
    };

    let secondary = !options.shared_y_axis && ys.len() > 1;
    let window = options.effective_window();

    let traces = ys
        .iter()
        .zip(&y_indices)
        .enumerate()
        .map(|(i, (name, &y_idx))| {
            let values = rolling_mean(&frame.numeric_values(y_idx), window);
            let points = xs
                .iter()
                .copied()
                .zip(values)
                .enumerate()
                .filter_map(|(row, (x, y))| x.map(|x| Point { row, x, y }))
                .collect();
            Trace {
                name: name.clone(),
                unit: frame.units(name).to_string(),
                axis: if secondary && i == 1 {
                    AxisSide::Secondary
                } else {
                    AxisSide::Primary
                },
                points,
            }
        })
        .collect();

    Ok(ChartSpec {
        title: format!("{} over Time", ys.join(" vs ")),
        legend_title: LEGEND_TITLE.to_string(),
        x_axis: AxisSpec::new(frame, &options.x),
        x_scale,
        categories,
        y_axis: AxisSpec::new(frame, &ys[0]),
        y2_axis: secondary.then(|| AxisSpec::new(frame, &ys[1])),
        smoothing_window: window,
        traces,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cell, RawField};
    use chrono::{Local, TimeZone};

    fn sample_frame() -> Frame {
        let records = (0..6)
            .map(|i| {
                let t = Local.timestamp_opt(1_700_000_000 + i, 0).single().unwrap();
                let mut record = vec![
                    RawField::new("timestamp", Cell::Time(t), "s"),
                    RawField::new("heart_rate", Cell::Number(100.0 + i as f64), "bpm"),
                    RawField::new("altitude", Cell::Number(10.0 * i as f64), "m"),
                    RawField::new("grade", Cell::Number(1.0), ""),
                ];
                if i == 3 {
                    record[2].value = Cell::Missing;
                }
                record
            })
            .collect();
        Frame::from_records(records)
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_prefer_timestamp_and_heart_rate() {
        let cols = names(&["Distance", "Timestamp", "Heart Rate"]);
        assert_eq!(default_x(&cols).as_deref(), Some("Timestamp"));
        assert_eq!(default_ys(&cols), names(&["Heart Rate"]));

        let cols = names(&["Distance", "Power"]);
        assert_eq!(default_x(&cols).as_deref(), Some("Distance"));
        assert!(default_ys(&cols).is_empty());
        assert_eq!(default_x(&[]), None);
    }

    #[test]
    fn options_start_shared_and_unsmoothed() {
        let opts = PlotOptions::for_columns(&names(&["Timestamp", "Heart Rate"]));
        assert_eq!(opts.x, "Timestamp");
        assert_eq!(opts.ys, names(&["Heart Rate"]));
        assert!(opts.shared_y_axis);
        assert!(!opts.smooth);
        assert_eq!(opts.window, 5);
        assert_eq!(opts.effective_window(), 1);
    }

    #[test]
    fn window_is_clamped() {
        let mut opts = PlotOptions::default();
        opts.set_window(0);
        assert_eq!(opts.window, 1);
        opts.set_window(500);
        assert_eq!(opts.window, 100);
        opts.smooth = true;
        assert_eq!(opts.effective_window(), 100);
    }

    #[test]
    fn limits_to_two_y_columns() {
        let (ys, warning) = limit_y_columns(&names(&["A", "B", "C"]));
        assert_eq!(ys, names(&["A", "B"]));
        assert_eq!(warning, Some(TOO_MANY_Y_WARNING));

        let (ys, warning) = limit_y_columns(&names(&["A"]));
        assert_eq!(ys, names(&["A"]));
        assert_eq!(warning, None);
    }

    #[test]
    fn toggle_y_keeps_selection_order() {
        let mut opts = PlotOptions::default();
        opts.toggle_y("Power");
        opts.toggle_y("Cadence");
        opts.toggle_y("Speed");
        opts.toggle_y("Power");
        assert_eq!(opts.ys, names(&["Cadence", "Speed"]));
    }

    #[test]
    fn no_y_columns_is_an_error() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ..PlotOptions::default()
        };
        let err = build_chart(&frame, &opts).unwrap_err();
        assert_eq!(err, PlotError::NoYColumns);
        assert_eq!(err.to_string(), "Please select at least one Y-axis to plot.");
    }

    #[test]
    fn unknown_column_is_an_error() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Power"]),
            ..PlotOptions::default()
        };
        assert_eq!(
            build_chart(&frame, &opts).unwrap_err(),
            PlotError::UnknownColumn("Power".into())
        );
    }

    #[test]
    fn shared_axis_chart() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate", "Altitude"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();

        assert_eq!(chart.title, "Heart Rate vs Altitude over Time");
        assert_eq!(chart.legend_title, "Measurement Type");
        assert_eq!(chart.x_axis.title, "Timestamp (s)");
        assert_eq!(chart.x_scale, XScale::Time);
        assert_eq!(chart.y_axis.title, "Heart Rate (bpm)");
        assert!(chart.y2_axis.is_none());
        assert!(chart.traces.iter().all(|t| t.axis == AxisSide::Primary));
        assert_eq!(chart.traces[0].points[0].x, 1_700_000_000.0);
        assert_eq!(chart.traces[1].points[3].y, None);
        assert_eq!(chart.x_bounds(), Some([1_700_000_000.0, 1_700_000_005.0]));
        assert_eq!(chart.y_bounds(AxisSide::Primary), Some([0.0, 105.0]));
    }

    #[test]
    fn separate_axes_put_second_trace_on_the_right() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate", "Grade"]),
            shared_y_axis: false,
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();

        assert_eq!(chart.traces[0].axis, AxisSide::Primary);
        assert_eq!(chart.traces[1].axis, AxisSide::Secondary);
        let y2 = chart.y2_axis.as_ref().unwrap();
        assert_eq!(y2.title, "Grade");
        assert_eq!(chart.y_bounds(AxisSide::Secondary), Some([1.0, 1.0]));
    }

    #[test]
    fn separate_axes_with_one_column_stays_single_axis() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate"]),
            shared_y_axis: false,
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        assert!(chart.y2_axis.is_none());
        assert_eq!(chart.traces[0].axis, AxisSide::Primary);
    }

    #[test]
    fn extra_y_columns_are_ignored() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate", "Altitude", "Grade"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        assert_eq!(chart.traces.len(), 2);
    }

    #[test]
    fn smoothing_applies_centered_rolling_mean() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate"]),
            smooth: true,
            window: 3,
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        let ys: Vec<Option<f64>> = chart.traces[0].points.iter().map(|p| p.y).collect();
        assert_eq!(
            ys,
            vec![None, Some(101.0), Some(102.0), Some(103.0), Some(104.0), None]
        );
        assert_eq!(chart.smoothing_window, 3);
    }

    #[test]
    fn segments_split_on_gaps() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Altitude"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        let segments = chart.traces[0].segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].len(), 3);
        assert_eq!(segments[1].len(), 2);
        assert_eq!(chart.traces[0].at_row(4).and_then(|p| p.y), Some(40.0));
    }

    #[test]
    fn numeric_x_uses_values_and_skips_missing() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Altitude".into(),
            ys: names(&["Heart Rate"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        assert_eq!(chart.x_scale, XScale::Linear);
        assert_eq!(chart.x_axis.title, "Altitude (m)");
        assert_eq!(chart.traces[0].points.len(), 5);
        assert!(chart.traces[0].at_row(3).is_none());
    }

    #[test]
    fn text_x_skips_rows_without_a_category() {
        let records = ["run", "", "walk"]
            .iter()
            .enumerate()
            .map(|(i, activity)| {
                let mut record = vec![RawField::new("heart_rate", Cell::Number(1.0 + i as f64), "bpm")];
                if !activity.is_empty() {
                    record.push(RawField::new("activity_type", Cell::Text(activity.to_string()), ""));
                }
                record
            })
            .collect();
        let frame = Frame::from_records(records);
        let opts = PlotOptions {
            x: "Activity Type".into(),
            ys: names(&["Heart Rate"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        assert_eq!(chart.x_scale, XScale::Category);
        let points: Vec<(usize, f64)> = chart.traces[0].points.iter().map(|p| (p.row, p.x)).collect();
        assert_eq!(points, vec![(0, 0.0), (2, 2.0)]);
        assert!(chart.traces[0].at_row(1).is_none());
    }

    #[test]
    fn empty_x_column_plots_nothing() {
        let records = (0..3)
            .map(|i| {
                vec![
                    RawField::new("heart_rate", Cell::Number(100.0 + i as f64), "bpm"),
                    RawField::new("cadence", Cell::Missing, "rpm"),
                ]
            })
            .collect();
        let frame = Frame::from_records(records);
        let opts = PlotOptions {
            x: "Cadence".into(),
            ys: names(&["Heart Rate"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        assert!(chart.traces[0].points.is_empty());
        assert!(chart.x_bounds().is_none());
    }

    #[test]
    fn chart_serializes_to_json() {
        let frame = sample_frame();
        let opts = PlotOptions {
            x: "Timestamp".into(),
            ys: names(&["Heart Rate"]),
            ..PlotOptions::default()
        };
        let chart = build_chart(&frame, &opts).unwrap();
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["x_scale"], "time");
        assert_eq!(json["traces"][0]["axis"], "primary");
        assert_eq!(json["y_axis"]["unit"], "bpm");
    }
}

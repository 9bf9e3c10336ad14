use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::data::{Activity, FitFileEntry};
use crate::plot::{build_chart, limit_y_columns, ChartSpec, PlotOptions};
use crate::watcher::list_fit_files;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home = 0,
    Axes = 1,
    Data = 2,
    Chart = 3,
}

impl Tab {
    pub const COUNT: usize = 4;
    pub const ALL: [Tab; Tab::COUNT] = [Tab::Home, Tab::Axes, Tab::Data, Tab::Chart];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Home => "1:Files",
            Tab::Axes => "2:Axes",
            Tab::Data => "3:Data",
            Tab::Chart => "4:Chart",
        }
    }

    /// Status-bar hint for the keys this tab handles
    pub fn key_hint(&self) -> &'static str {
        match self {
            Tab::Home => "↑↓: select | enter: open | d: hide | r: rescan",
            Tab::Axes => "↑↓: column | x: set X | space: toggle Y | s: shared axis | m: smooth | +/-: window",
            Tab::Data | Tab::Chart => "↑↓: row | PgUp/PgDn: page | Home/End: jump",
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Tab::Home,
            1 => Tab::Axes,
            2 => Tab::Data,
            3 => Tab::Chart,
            _ => Tab::Home,
        }
    }

    pub fn next(&self) -> Self {
        Tab::from_index((*self as usize + 1) % Self::COUNT)
    }

    pub fn prev(&self) -> Self {
        Tab::from_index((*self as usize + Self::COUNT - 1) % Self::COUNT)
    }
}

/// Selection requested on the command line, applied to every loaded file
/// where the named columns exist
#[derive(Debug, Clone)]
pub struct InitialSelection {
    pub x: Option<String>,
    pub ys: Vec<String>,
    pub shared_y_axis: bool,
    pub smooth: Option<usize>,
}

impl Default for InitialSelection {
    fn default() -> Self {
        Self {
            x: None,
            ys: Vec::new(),
            shared_y_axis: true,
            smooth: None,
        }
    }
}

impl InitialSelection {
    pub fn options_for(&self, columns: &[String]) -> PlotOptions {
        let mut options = PlotOptions::for_columns(columns);
        if let Some(x) = self.x.as_ref().filter(|x| columns.contains(*x)) {
            options.x = x.clone();
        }
        let ys: Vec<String> = self
            .ys
            .iter()
            .filter(|y| columns.contains(*y))
            .cloned()
            .collect();
        if !ys.is_empty() {
            options.ys = ys;
        }
        options.shared_y_axis = self.shared_y_axis;
        if let Some(window) = self.smooth {
            options.smooth = true;
            options.set_window(window);
        }
        options
    }
}

pub struct App {
    pub activity: Option<Activity>,
    pub active_tab: Tab,
    pub selected_row: usize,
    pub show_help: bool,
    pub running: bool,
    pub ticks: u32,
    // Axis selection
    pub options: PlotOptions,
    pub columns: Vec<String>,
    pub axes_cursor: usize,
    pub chart: Option<ChartSpec>,
    pub warning: Option<String>,
    // File browser
    pub dir: PathBuf,
    pub files: Vec<FitFileEntry>,
    pub files_selected: usize,
    hidden: HashSet<PathBuf>,
    pub loading: Option<PathBuf>,
    /// File waiting to be decoded (polled by main loop)
    pending_load: Option<PathBuf>,
    initial: InitialSelection,
}

impl App {
    pub fn new(dir: PathBuf, initial: InitialSelection) -> Self {
        Self {
            activity: None,
            active_tab: Tab::Home,
            selected_row: 0,
            show_help: false,
            running: true,
            ticks: 0,
            options: PlotOptions::default(),
            columns: Vec::new(),
            axes_cursor: 0,
            chart: None,
            warning: None,
            dir,
            files: Vec::new(),
            files_selected: 0,
            hidden: HashSet::new(),
            loading: None,
            pending_load: None,
            initial,
        }
    }

    /// Queue a file for decoding
    pub fn request_load(&mut self, path: PathBuf) {
        info!("Load requested: {}", path.display());
        self.loading = Some(path.clone());
        self.pending_load = Some(path);
        self.warning = None;
    }

    /// Take pending load (called by main loop)
    pub fn take_pending_load(&mut self) -> Option<PathBuf> {
        self.pending_load.take()
    }

    pub fn on_load_success(&mut self, activity: Activity) {
        self.columns = activity.frame.available_columns();
        self.options = self.initial.options_for(&self.columns);
        debug!("Initial selection: {:?}", self.options);
        self.activity = Some(activity);
        self.loading = None;
        self.selected_row = 0;
        self.axes_cursor = 0;
        self.active_tab = Tab::Chart;
        self.rebuild_chart();
    }

    pub fn on_load_error(&mut self, error: String) {
        warn!("Load failed: {}", error);
        self.loading = None;
        self.warning = Some(format!("Failed to load file: {}", error));
    }

    pub fn clear_activity(&mut self) {
        self.activity = None;
        self.chart = None;
        self.columns.clear();
        self.options = PlotOptions::default();
        self.selected_row = 0;
        self.axes_cursor = 0;
        self.warning = None;
        self.active_tab = Tab::Home;
    }

    pub fn row_count(&self) -> usize {
        self.activity.as_ref().map(|a| a.frame.len()).unwrap_or(0)
    }

    /// Recompute the chart after any selection change
    fn rebuild_chart(&mut self) {
        self.chart = None;
        self.warning = None;
        let Some(ref activity) = self.activity else {
            return;
        };

        let (ys, too_many) = limit_y_columns(&self.options.ys);
        if let Some(message) = too_many {
            self.warning = Some(message.to_string());
        }

        let options = PlotOptions {
            ys,
            ..self.options.clone()
        };
        match build_chart(&activity.frame, &options) {
            Ok(chart) => {
                debug!("Chart rebuilt: {}", chart.title);
                self.chart = Some(chart);
            }
            Err(e) => {
                if self.warning.is_none() {
                    self.warning = Some(e.to_string());
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // Any key closes help
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('c') => self.clear_activity(),
            KeyCode::Left => self.active_tab = self.active_tab.prev(),
            KeyCode::Right => self.active_tab = self.active_tab.next(),
            _ => match self.active_tab {
                Tab::Home => self.handle_home_key(key),
                Tab::Axes => self.handle_axes_key(key),
                Tab::Data | Tab::Chart => self.handle_row_key(key),
            },
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let len = self.files.len();
        match key.code {
            KeyCode::Enter => self.load_selected_file(),
            KeyCode::Char('d') | KeyCode::Delete => self.hide_selected_file(),
            KeyCode::Char('r') => self.refresh_files(),
            code => self.files_selected = move_cursor(self.files_selected, len, code),
        }
    }

    fn handle_axes_key(&mut self, key: KeyEvent) {
        if self.activity.is_none() {
            return;
        }
        let len = self.columns.len();
        match key.code {
            KeyCode::Char('x') => {
                if let Some(col) = self.columns.get(self.axes_cursor) {
                    self.options.x = col.clone();
                    self.rebuild_chart();
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(col) = self.columns.get(self.axes_cursor).cloned() {
                    self.options.toggle_y(&col);
                    self.rebuild_chart();
                }
            }
            KeyCode::Char('s') => {
                self.options.shared_y_axis = !self.options.shared_y_axis;
                self.rebuild_chart();
            }
            KeyCode::Char('m') => {
                self.options.smooth = !self.options.smooth;
                self.rebuild_chart();
            }
            KeyCode::Char('+') | KeyCode::Char('=') if self.options.smooth => {
                self.options.set_window(self.options.window + 1);
                self.rebuild_chart();
            }
            KeyCode::Char('-') if self.options.smooth => {
                self.options.set_window(self.options.window.saturating_sub(1));
                self.rebuild_chart();
            }
            code => self.axes_cursor = move_cursor(self.axes_cursor, len, code),
        }
    }

    fn handle_row_key(&mut self, key: KeyEvent) {
        self.selected_row = move_cursor(self.selected_row, self.row_count(), key.code);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.show_help {
            if matches!(mouse.kind, MouseEventKind::Down(_)) {
                self.show_help = false;
            }
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => self.handle_scroll(-3),
            MouseEventKind::ScrollDown => self.handle_scroll(3),
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: i32) {
        let (cursor, len) = match self.active_tab {
            Tab::Home => (&mut self.files_selected, self.files.len()),
            Tab::Axes => (&mut self.axes_cursor, self.columns.len()),
            Tab::Data | Tab::Chart => {
                let len = self.activity.as_ref().map(|a| a.frame.len()).unwrap_or(0);
                (&mut self.selected_row, len)
            }
        };
        if len == 0 {
            return;
        }
        if delta < 0 {
            *cursor = cursor.saturating_sub(delta.unsigned_abs() as usize);
        } else {
            *cursor = (*cursor + delta as usize).min(len - 1);
        }
    }

    pub fn refresh_files(&mut self) {
        self.files = list_fit_files(&self.dir)
            .into_iter()
            .filter(|f| !self.hidden.contains(&f.path))
            .collect();
        if !self.files.is_empty() {
            self.files_selected = self.files_selected.min(self.files.len() - 1);
        } else {
            self.files_selected = 0;
        }
    }

    fn hide_selected_file(&mut self) {
        if self.files_selected >= self.files.len() {
            return;
        }
        let entry = self.files.remove(self.files_selected);
        debug!("Hiding {} from file list", entry.path.display());
        self.hidden.insert(entry.path);
        if self.files_selected >= self.files.len() {
            self.files_selected = self.files.len().saturating_sub(1);
        }
    }

    fn load_selected_file(&mut self) {
        if self.loading.is_some() {
            return;
        }
        if let Some(entry) = self.files.get(self.files_selected) {
            let path = entry.path.clone();
            self.request_load(path);
        }
    }

    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }
}

/// Apply a navigation key to a list cursor. Up/Down wrap, paging clamps.
fn move_cursor(cursor: usize, len: usize, code: KeyCode) -> usize {
    if len == 0 {
        return 0;
    }
    match code {
        KeyCode::Up => (cursor + len - 1) % len,
        KeyCode::Down => (cursor + 1) % len,
        KeyCode::PageUp => cursor.saturating_sub(10),
        KeyCode::PageDown => (cursor + 10).min(len - 1),
        KeyCode::Home => 0,
        KeyCode::End => len - 1,
        _ => cursor.min(len - 1),
    }
}

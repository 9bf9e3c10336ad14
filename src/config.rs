use simplelog::LevelFilter;
use std::path::PathBuf;

pub const DIR_ENV: &str = "FITCHART_DIR";
pub const LOG_ENV: &str = "FITCHART_LOG";

/// Runtime settings resolved from CLI arguments and the environment
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory browsed on the Home tab
    pub dir: PathBuf,
    pub log_level: LevelFilter,
    pub log_path: PathBuf,
}

impl Settings {
    pub fn resolve(cli_dir: Option<PathBuf>) -> Self {
        Self::from_values(
            cli_dir,
            std::env::var(DIR_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
        )
    }

    fn from_values(
        cli_dir: Option<PathBuf>,
        env_dir: Option<String>,
        env_level: Option<String>,
    ) -> Self {
        let dir = cli_dir
            .or_else(|| env_dir.filter(|d| !d.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let log_level = env_level
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(LevelFilter::Debug);

        Self {
            dir,
            log_level,
            log_path: default_log_path(),
        }
    }
}

pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fitchart/fitchart.log")
}

pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

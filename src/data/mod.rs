pub mod format;
pub mod frame;
pub mod model;
pub mod series;

pub use format::{format_bytes, format_clock, format_number, format_with_unit, truncate_string};
pub use frame::Frame;
pub use model::{value_to_string, Activity, Cell, ColumnKind, FitFileEntry, RawField, RawRecord};
pub use series::rolling_mean;

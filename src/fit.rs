use std::path::Path;

use fitparser::profile::MesgNum;
use fitparser::Value;
use log::{debug, info};
use thiserror::Error;

use crate::data::{Activity, Cell, Frame, RawField, RawRecord};

#[derive(Debug, Error)]
pub enum FitError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode FIT data: {0}")]
    Decode(String),
    #[error("no record messages found")]
    NoRecords,
}

/// Decode every `record` message in a FIT byte stream
pub fn decode_records(bytes: &[u8]) -> Result<Vec<RawRecord>, FitError> {
    let messages =
        fitparser::de::from_bytes(bytes).map_err(|e| FitError::Decode(e.to_string()))?;
    debug!("Decoded {} FIT messages", messages.len());

    let records: Vec<RawRecord> = messages
        .into_iter()
        .filter(|msg| msg.kind() == MesgNum::Record)
        .map(|msg| {
            msg.fields()
                .iter()
                .map(|field| {
                    RawField::new(field.name(), value_to_cell(field.value()), field.units())
                })
                .collect()
        })
        .collect();

    Ok(records)
}

/// Read, decode and tabulate a FIT file
pub fn load_activity(path: &Path) -> Result<Activity, FitError> {
    let bytes = std::fs::read(path).map_err(|source| FitError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let records = decode_records(&bytes)?;
    if records.is_empty() {
        return Err(FitError::NoRecords);
    }

    let frame = Frame::from_records(records);
    info!(
        "Loaded {}: {} rows, {} columns",
        path.display(),
        frame.len(),
        frame.columns().len()
    );

    Ok(Activity {
        path: path.to_path_buf(),
        frame,
    })
}

fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::Timestamp(ts) => Cell::Time(*ts),
        Value::String(s) => Cell::Text(s.clone()),
        Value::Array(values) => values
            .iter()
            .map(value_to_cell)
            .find(|c| matches!(c, Cell::Number(_)))
            .unwrap_or(Cell::Missing),
        Value::Invalid => Cell::Missing,
        other => fit_value_to_f64(other).map(Cell::Number).unwrap_or(Cell::Missing),
    }
}

fn fit_value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::UInt8z(v) => Some(*v as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::Enum(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::UInt16z(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::UInt32z(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::UInt64z(v) => Some(*v as f64),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    const CRC_TABLE: [u16; 16] = [
        0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
        0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
    ];

    fn fit_crc(bytes: &[u8]) -> u16 {
        let mut crc: u16 = 0;
        for &byte in bytes {
            let tmp = CRC_TABLE[(crc & 0xF) as usize];
            crc = (crc >> 4) & 0x0FFF;
            crc = crc ^ tmp ^ CRC_TABLE[(byte & 0xF) as usize];
            let tmp = CRC_TABLE[(crc & 0xF) as usize];
            crc = (crc >> 4) & 0x0FFF;
            crc = crc ^ tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize];
        }
        crc
    }

    /// Minimal FIT file holding `record` messages with timestamp, heart rate and distance.
    /// Distance is raw centimetres (profile scale 100).
    pub(crate) fn build_fit(samples: &[(u32, u8, u32)]) -> Vec<u8> {
        let mut data: Vec<u8> = vec![
            0x40, // definition, local message 0
            0x00, // reserved
            0x00, // little endian
            20, 0, // global message: record
            3,  // field count
            253, 4, 0x86, // timestamp: uint32
            3, 1, 0x02, // heart_rate: uint8
            5, 4, 0x86, // distance: uint32
        ];
        for &(ts, hr, dist) in samples {
            data.push(0x00);
            data.extend_from_slice(&ts.to_le_bytes());
            data.push(hr);
            data.extend_from_slice(&dist.to_le_bytes());
        }

        let mut file: Vec<u8> = vec![14, 0x10];
        file.extend_from_slice(&2132u16.to_le_bytes());
        file.extend_from_slice(&(data.len() as u32).to_le_bytes());
        file.extend_from_slice(b".FIT");
        let header_crc = fit_crc(&file);
        file.extend_from_slice(&header_crc.to_le_bytes());
        file.extend_from_slice(&data);
        let crc = fit_crc(&file);
        file.extend_from_slice(&crc.to_le_bytes());
        file
    }

    #[test]
    fn decodes_record_messages() {
        let bytes = build_fit(&[(1_000_000_000, 120, 0), (1_000_000_001, 125, 1234)]);
        let records = decode_records(&bytes).unwrap();
        assert_eq!(records.len(), 2);

        let names: Vec<&str> = records[0].iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"timestamp"));
        assert!(names.contains(&"heart_rate"));
        assert!(names.contains(&"distance"));

        let hr = records[1].iter().find(|f| f.name == "heart_rate").unwrap();
        assert_eq!(hr.value, Cell::Number(125.0));
        assert_eq!(hr.units, "bpm");

        let dist = records[1].iter().find(|f| f.name == "distance").unwrap();
        let metres = dist.value.as_f64().unwrap();
        assert!((metres - 12.34).abs() < 1e-9);
        assert_eq!(dist.units, "m");

        let ts = records[0].iter().find(|f| f.name == "timestamp").unwrap();
        assert!(matches!(ts.value, Cell::Time(_)));
    }

    #[test]
    fn rejects_garbage() {
        let err = decode_records(b"definitely not a fit file").unwrap_err();
        assert!(matches!(err, FitError::Decode(_)));
    }

    #[test]
    fn load_activity_builds_frame() {
        let mut file = tempfile::Builder::new().suffix(".fit").tempfile().unwrap();
        file.write_all(&build_fit(&[(1_000_000_000, 100, 0), (1_000_000_001, 101, 250)]))
            .unwrap();

        let activity = load_activity(file.path()).unwrap();
        assert_eq!(activity.frame.len(), 2);
        assert!(activity.frame.column("Timestamp").is_some());
        assert!(activity.frame.column("Heart Rate").is_some());
        assert_eq!(activity.frame.units("Heart Rate"), "bpm");
    }

    #[test]
    fn load_activity_without_records_fails() {
        let mut file = tempfile::Builder::new().suffix(".fit").tempfile().unwrap();
        file.write_all(&build_fit(&[])).unwrap();

        let err = load_activity(file.path()).unwrap_err();
        assert!(matches!(err, FitError::NoRecords));
    }

    #[test]
    fn load_activity_missing_file_is_io_error() {
        let err = load_activity(Path::new("/nonexistent/ride.fit")).unwrap_err();
        assert!(matches!(err, FitError::Io { .. }));
    }

    #[test]
    fn arrays_use_first_numeric_element() {
        let value = Value::Array(vec![Value::Invalid, Value::UInt16(7), Value::UInt16(9)]);
        assert_eq!(value_to_cell(&value), Cell::Number(7.0));
        assert_eq!(value_to_cell(&Value::Invalid), Cell::Missing);
        assert_eq!(
            value_to_cell(&Value::String("cycling".into())),
            Cell::Text("cycling".into())
        );
    }
}

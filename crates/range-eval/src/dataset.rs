//! CSV Dataset Loading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use data_validator::{AmbientTemp, RawRecord, Scalar, VehicleClass};

use crate::EvalError;

/// Labelled rows of one vehicle class
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Raw feature rows, target column removed
    pub records: Vec<RawRecord>,
    /// Target range per row, same order
    pub targets: Vec<f64>,
    /// Rows skipped for an unreadable record or target
    pub skipped: usize,
}

impl Dataset {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a dataset from a CSV file with a header row
pub fn load_dataset(
    path: &Path,
    vehicle: VehicleClass,
    bucket_numeric_ambient: bool,
) -> Result<Dataset, EvalError> {
    read_dataset(File::open(path)?, vehicle, bucket_numeric_ambient)
}

/// Read a dataset from CSV.
///
/// The class's target column is split off; every other non-empty cell becomes
/// a raw scalar. With `bucket_numeric_ambient`, a numeric `ambient_temp` cell
/// is read as Celsius and replaced by its bucket name. Malformed rows are
/// skipped with a warning and counted in [`Dataset::skipped`].
pub fn read_dataset<R: Read>(
    reader: R,
    vehicle: VehicleClass,
    bucket_numeric_ambient: bool,
) -> Result<Dataset, EvalError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let target_column = vehicle.target_column();
    let target = headers
        .iter()
        .position(|h| h == target_column)
        .ok_or(EvalError::MissingTarget(target_column))?;

    let mut dataset = Dataset::default();
    for (row, result) in rdr.records().enumerate() {
        let cells = match result {
            Ok(cells) => cells,
            Err(e) => {
                warn!("[{}] Skipping row {}: {}", vehicle, row, e);
                dataset.skipped += 1;
                continue;
            }
        };

        let raw_target = cells.get(target).unwrap_or_default();
        let value = match raw_target.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                warn!(
                    "[{}] Skipping row {}: {}",
                    vehicle,
                    row,
                    EvalError::InvalidTarget {
                        row,
                        value: raw_target.to_string(),
                    }
                );
                dataset.skipped += 1;
                continue;
            }
        };

        let mut record = RawRecord::new();
        for (index, (name, cell)) in headers.iter().zip(cells.iter()).enumerate() {
            if index == target {
                continue;
            }
            let Some(scalar) = Scalar::from_cell(cell) else {
                continue;
            };
            let scalar = match scalar {
                Scalar::Number(celsius) if bucket_numeric_ambient && name == "ambient_temp" => {
                    Scalar::from(AmbientTemp::from_celsius(celsius).as_str())
                }
                other => other,
            };
            record.insert(name, scalar);
        }

        dataset.records.push(record);
        dataset.targets.push(value);
    }

    if dataset.is_empty() {
        return Err(EvalError::EmptyDataset);
    }
    debug!(
        "[{}] Read {} labelled row(s), skipped {}",
        vehicle,
        dataset.len(),
        dataset.skipped
    );
    Ok(dataset)
}

// 📂 Data Loader - CSV → Dataset
//
// Runs once at startup. Structural problems (missing file, missing columns,
// broken CSV) are fatal; individual bad rows are skipped and reported.

use crate::merchant::{Dataset, MerchantRecord, VoucherType};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// ERRORS
// ============================================================================

/// Fatal startup failure: no partial dataset is ever returned alongside one.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read data file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("data file {} is missing required columns: {}", path.display(), columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Why a single row was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedReason {
    #[error("name is empty")]
    EmptyName,

    #[error("{field} '{value}' is not a number")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("unknown voucher type '{0}'")]
    UnknownVoucherType(String),
}

/// A row that was skipped during load
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {reason}")]
pub struct MalformedRecord {
    /// 1-based line in the source file (header is line 1)
    pub line: u64,
    pub reason: MalformedReason,
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Required columns, each with the header names accepted for it, in order of
/// preference
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("name", &["name"]),
    ("category", &["category"]),
    ("address", &["address"]),
    ("lat", &["lat", "latitude"]),
    ("lon", &["lon", "longitude"]),
    ("type", &["type"]),
];

/// Position of each required column in the header record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    name: usize,
    category: usize,
    address: usize,
    lat: usize,
    lon: usize,
    voucher_type: usize,
}

impl ColumnIndex {
    /// Resolve every required column to one header, taking the first accepted
    /// name that is present. Returns the missing column names on failure.
    fn resolve(headers: &csv::StringRecord) -> Result<Self, Vec<String>> {
        let find = |accepted: &[&str]| {
            accepted
                .iter()
                .find_map(|name| headers.iter().position(|h| h == *name))
        };

        let mut found = Vec::with_capacity(REQUIRED_COLUMNS.len());
        let mut missing = Vec::new();
        for (column, accepted) in REQUIRED_COLUMNS {
            match find(*accepted) {
                Some(i) => found.push(i),
                None => missing.push(column.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(ColumnIndex {
            name: found[0],
            category: found[1],
            address: found[2],
            lat: found[3],
            lon: found[4],
            voucher_type: found[5],
        })
    }

    fn read<'r>(&self, row: &'r csv::StringRecord) -> RawRow<'r> {
        let field = |i: usize| row.get(i).unwrap_or_default();
        RawRow {
            name: field(self.name),
            category: field(self.category),
            address: field(self.address),
            lat: field(self.lat),
            lon: field(self.lon),
            voucher_type: field(self.voucher_type),
        }
    }
}

/// Row as it appears on disk, before validation
#[derive(Debug)]
struct RawRow<'r> {
    name: &'r str,
    category: &'r str,
    address: &'r str,
    lat: &'r str,
    lon: &'r str,
    voucher_type: &'r str,
}

impl RawRow<'_> {
    fn into_record(self) -> Result<MerchantRecord, MalformedReason> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MalformedReason::EmptyName);
        }

        let latitude = parse_coordinate("lat", self.lat)?;
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(MalformedReason::LatitudeOutOfRange(latitude));
        }

        let longitude = parse_coordinate("lon", self.lon)?;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(MalformedReason::LongitudeOutOfRange(longitude));
        }

        let voucher_type: VoucherType = self
            .voucher_type
            .parse()
            .map_err(|_| MalformedReason::UnknownVoucherType(self.voucher_type.to_string()))?;

        Ok(MerchantRecord {
            name,
            category: self.category.trim().to_string(),
            address: self.address.trim().to_string(),
            latitude,
            longitude,
            voucher_type,
        })
    }
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, MalformedReason> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MalformedReason::InvalidCoordinate {
            field,
            value: value.to_string(),
        }),
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Everything a load produced: the usable dataset and the rows left out of it
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub malformed: Vec<MalformedRecord>,
}

/// Load the merchant table at `path`, skipping malformed rows.
pub fn load(path: &Path) -> Result<Dataset, DataLoadError> {
    load_report(path).map(|report| report.dataset)
}

/// Like [`load`], but also returns the rows that were skipped.
pub fn load_report(path: &Path) -> Result<LoadReport, DataLoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DataLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let report = load_from_reader(file, path)?;
    info!(
        "Loaded {} merchants from {} ({} skipped)",
        report.dataset.len(),
        path.display(),
        report.malformed.len()
    );
    Ok(report)
}

/// Parse CSV from any reader. `origin` only labels errors and log lines.
pub fn load_from_reader<R: Read>(reader: R, origin: &Path) -> Result<LoadReport, DataLoadError> {
    let csv_error = |source: csv::Error| DataLoadError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    let columns = ColumnIndex::resolve(&headers).map_err(|missing| DataLoadError::MissingColumns {
        path: origin.to_path_buf(),
        columns: missing,
    })?;
    debug!("CSV headers: {:?}", headers);

    let mut records = Vec::new();
    let mut malformed = Vec::new();

    for result in rdr.records() {
        let row = result.map_err(csv_error)?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        match columns.read(&row).into_record() {
            Ok(record) => records.push(record),
            Err(reason) => {
                let rejected = MalformedRecord { line, reason };
                warn!("Skipping row in {}: {}", origin.display(), rejected);
                malformed.push(rejected);
            }
        }
    }

    Ok(LoadReport {
        dataset: Dataset::new(records),
        malformed,
    })
}

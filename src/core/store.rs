//! Append-only training file.
//!
//! One record per line, tab separated:
//! `source<TAB>label<TAB>hue<TAB>saturation<TAB>value<TAB>compactness`,
//! numbers with two decimals.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{FruitError, Result};
use crate::models::{FeatureVector, TrainingRecord};

const FIELD_COUNT: usize = 6;

#[derive(Debug, Clone)]
pub struct TrainingStore {
    path: PathBuf,
}

impl TrainingStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed.
    /// The line goes out in a single write so a failure leaves earlier records intact.
    pub fn append(&self, record: &TrainingRecord) -> Result<()> {
        let line = format_record(record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                FruitError::persistence(format!("cannot open {}", self.path.display()), e)
            })?;

        file.write_all(line.as_bytes()).map_err(|e| {
            FruitError::persistence(format!("cannot write to {}", self.path.display()), e)
        })?;
        file.flush().map_err(|e| {
            FruitError::persistence(format!("cannot flush {}", self.path.display()), e)
        })?;

        log::info!("Recorded '{}' from {} in {}", record.label, record.source, self.path.display());
        Ok(())
    }

    /// Read every record in file order. A missing file holds no records.
    pub fn load_all(&self) -> Result<Vec<TrainingRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("{} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(FruitError::persistence(
                    format!("cannot open {}", self.path.display()),
                    e,
                ));
            }
        };

        let mut records = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                FruitError::persistence(format!("cannot read {}", self.path.display()), e)
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let record = parse_record(line).map_err(|reason| FruitError::MalformedRecord {
                path: self.path.clone(),
                line: idx + 1,
                reason,
            })?;
            records.push(record);
        }

        log::debug!("Loaded {} training records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

fn check_field(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\t', '\n', '\r']) {
        return Err(FruitError::InvalidField {
            field,
            value: value.to_string(),
            reason: "tabs and line breaks are not allowed",
        });
    }
    if value.trim().is_empty() {
        return Err(FruitError::InvalidField {
            field,
            value: value.to_string(),
            reason: "must not be empty",
        });
    }
    Ok(())
}

/// Serialize a record as one newline-terminated line
pub fn format_record(record: &TrainingRecord) -> Result<String> {
    check_field("source", &record.source)?;
    check_field("label", &record.label)?;
    let f = &record.features;
    Ok(format!(
        "{}\t{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}\n",
        record.source,
        record.label,
        f.average_hue,
        f.average_saturation,
        f.average_value,
        f.compactness
    ))
}

/// Parse one line (without its terminator)
pub fn parse_record(line: &str) -> std::result::Result<TrainingRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!("expected {} fields, found {}", FIELD_COUNT, fields.len()));
    }

    let mut values = [0.0f64; FeatureVector::LEN];
    for (i, (value, raw)) in values.iter_mut().zip(&fields[2..]).enumerate() {
        *value = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| format!("{} is not a number: {:?}", FeatureVector::NAMES[i], raw))?;
    }

    Ok(TrainingRecord::new(fields[0], fields[1], FeatureVector::from(values)))
}

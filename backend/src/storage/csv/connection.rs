use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::entities::{EntityDescriptor, FieldKind};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{FieldValue, Record};

const SEQUENCES_FILE: &str = "sequences.yaml";

/// CsvConnection manages the data directory holding one CSV file per table
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection, creating the base directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created CSV data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn table_path(&self, descriptor: &EntityDescriptor) -> PathBuf {
        self.base_directory.join(format!("{}.csv", descriptor.table))
    }

    fn sequences_path(&self) -> PathBuf {
        self.base_directory.join(SEQUENCES_FILE)
    }

    /// Every row of the table; a table never written to reads as empty
    pub fn read_table(&self, descriptor: &EntityDescriptor) -> RecordResult<Vec<Record>> {
        let path = self.table_path(descriptor);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.clone();
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;
            let mut by_column = headers.iter().zip(row.iter());

            let id = by_column
                .next()
                .filter(|(name, _)| *name == "id")
                .and_then(|(_, raw)| raw.parse::<i64>().ok())
                .ok_or_else(|| {
                    RecordError::Store(format!("{} has a row without a valid id", path.display()))
                })?;

            let mut record = Record::new(id);
            for (name, raw) in by_column {
                let spec = descriptor.field(name).ok_or_else(|| {
                    RecordError::Store(format!("{} has unknown column {}", path.display(), name))
                })?;
                record.values.insert(spec.name.to_string(), decode(spec.kind, raw)?);
            }
            records.push(record);
        }

        debug!("Read {} rows from {}", records.len(), path.display());
        Ok(records)
    }

    /// Replace the table file with `records`, via a temp file and rename
    pub fn write_table(&self, descriptor: &EntityDescriptor, records: &[Record]) -> RecordResult<()> {
        let path = self.table_path(descriptor);
        let temp_path = path.with_extension("csv.tmp");

        {
            let mut writer = csv::Writer::from_path(&temp_path)?;
            let mut header = vec!["id"];
            header.extend(descriptor.column_names());
            writer.write_record(&header)?;

            for record in records {
                let mut row = vec![record.id.to_string()];
                for spec in descriptor.fields {
                    row.push(record.value(spec.name).map(|v| v.to_string()).unwrap_or_default());
                }
                writer.write_record(&row)?;
            }
            writer.flush()?;
        }

        fs::rename(&temp_path, &path)?;
        debug!("Wrote {} rows to {}", records.len(), path.display());
        Ok(())
    }

    /// Next identifier for a table. Never hands out a value at or below
    /// `floor`, so ids stay ahead of existing rows even if the sequence file
    /// was lost.
    pub fn next_id(&self, descriptor: &EntityDescriptor, floor: i64) -> RecordResult<i64> {
        let path = self.sequences_path();
        let mut sequences: BTreeMap<String, i64> = if path.exists() {
            serde_yaml::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };

        let last = sequences.get(descriptor.table).copied().unwrap_or(0).max(floor);
        let next = last + 1;
        sequences.insert(descriptor.table.to_string(), next);

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, serde_yaml::to_string(&sequences)?)?;
        fs::rename(&temp_path, &path)?;

        Ok(next)
    }
}

fn decode(kind: FieldKind, raw: &str) -> RecordResult<FieldValue> {
    let bad = || RecordError::Store(format!("cannot read {:?} value '{}'", kind, raw));
    match kind {
        FieldKind::Text | FieldKind::Sku | FieldKind::CreatedAt => Ok(FieldValue::Text(raw.to_string())),
        FieldKind::Integer | FieldKind::PositiveInteger => {
            raw.parse().map(FieldValue::Integer).map_err(|_| bad())
        }
        FieldKind::Decimal => raw.parse().map(FieldValue::Decimal).map_err(|_| bad()),
        FieldKind::Flag => match raw {
            "1" => Ok(FieldValue::Flag(true)),
            "0" => Ok(FieldValue::Flag(false)),
            _ => Err(bad()),
        },
    }
}

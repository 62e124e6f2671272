use crate::assembly::next_id;
use crate::model::{Record, StorageError};

use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Output column order.
pub const COLUMNS: [&str; 8] = [
    "book_id",
    "isbn",
    "book_name",
    "author",
    "source",
    "price",
    "scrape_ts",
    "url",
];

const ID_COLUMN: &str = "book_id";

/// Counts reported after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub added: usize,
    pub total: usize,
}

/// The append-only output dataset, one CSV file rewritten on every save.
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when there is a prior dataset to build on.
    fn has_prior(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Id for the next record. Unreadable data counts as no data, which
    /// matches `append` moving such a file aside.
    pub fn next_id(&self) -> Result<u64, StorageError> {
        match self.read_ids() {
            Ok(ids) => next_id(ids),
            Err(e) => {
                warn!("Could not read ids from {}: {}", self.path.display(), e);
                Ok(1)
            }
        }
    }

    /// Every id in the prior dataset. Blank cells are skipped.
    pub fn read_ids(&self) -> Result<Vec<u64>, StorageError> {
        self.load_prior().map(|(_, ids)| ids)
    }

    fn read_prior(&self) -> Result<(StringRecord, Vec<StringRecord>), StorageError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok((headers, rows))
    }

    /// Prior rows laid out in `COLUMNS` order, with their ids. Cell values
    /// are kept as read. Fails when the id column is missing or any id cell
    /// is not a whole non-negative number.
    fn load_prior(&self) -> Result<(Vec<StringRecord>, Vec<u64>), StorageError> {
        if !self.has_prior() {
            return Ok((Vec::new(), Vec::new()));
        }
        let (headers, rows) = self.read_prior()?;
        let mapping: Vec<Option<usize>> = COLUMNS
            .iter()
            .map(|col| headers.iter().position(|h| h.trim() == *col))
            .collect();
        if mapping[0].is_none() {
            return Err(StorageError::Corrupt(format!("no `{ID_COLUMN}` column")));
        }
        let dropped: Vec<&str> = headers
            .iter()
            .filter(|h| !COLUMNS.contains(&h.trim()))
            .collect();
        if !dropped.is_empty() {
            warn!("Dropping unknown columns from prior data: {:?}", dropped);
        }

        let mut ids = Vec::with_capacity(rows.len());
        let mut aligned = Vec::with_capacity(rows.len());
        for row in &rows {
            let row: StringRecord = mapping
                .iter()
                .map(|idx| idx.and_then(|i| row.get(i)).unwrap_or_default())
                .collect();
            let cell = row.get(0).unwrap_or_default().trim();
            if !cell.is_empty() {
                let id = parse_id(cell)
                    .ok_or_else(|| StorageError::Corrupt(format!("bad {ID_COLUMN} `{cell}`")))?;
                ids.push(id);
            }
            aligned.push(row);
        }
        Ok((aligned, ids))
    }

    /// Appends `records` after the prior rows and rewrites the whole file.
    ///
    /// A prior file that cannot be read is moved to `<path>.bak` and a fresh
    /// file is written in its place.
    pub fn append(&self, records: &[Record]) -> Result<SaveSummary, StorageError> {
        let prior = if self.has_prior() {
            match self.load_prior() {
                Ok((rows, _)) => rows,
                Err(e) => {
                    let backup = self.backup_path();
                    warn!(
                        "Prior data unreadable ({}), moving it to {}",
                        e,
                        backup.display()
                    );
                    fs::rename(&self.path, &backup)?;
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(COLUMNS)?;
        for row in &prior {
            writer.write_record(row)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        let summary = SaveSummary {
            added: records.len(),
            total: prior.len() + records.len(),
        };
        info!(
            "Saved {} new records to {} ({} total)",
            summary.added,
            self.path.display(),
            summary.total
        );
        Ok(summary)
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }
}

/// Reads an id cell. Whole-valued decimals such as `3.0` are accepted, as
/// spreadsheet tools write integer columns that way.
fn parse_id(cell: &str) -> Option<u64> {
    if let Ok(id) = cell.parse::<u64>() {
        return Some(id);
    }
    let value = cell.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64)
        .then_some(value as u64)
}

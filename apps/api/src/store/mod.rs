//! CSV-backed profile table keyed by email address.
//!
//! Inserts append a single row; overwrites read the whole table and rewrite
//! it through a temp file in the same directory. There is no cross-process
//! locking: concurrent external writers can race.

pub mod record;

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::Profile;
use record::{COLUMNS, EMAIL_COLUMN};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on profile store: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error on profile store: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode profile row: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Profile has no email_id and cannot be stored")]
    MissingEmail,

    #[error("A profile for {0} already exists")]
    Duplicate(String),
}

/// A stored row that could not be read, excluded from scan results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorruptRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct TableScan {
    pub rows: Vec<Profile>,
    pub corrupt: Vec<CorruptRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Inserted,
    /// A row with the same email exists; nothing was written. `existing` is
    /// `None` when that row is stored but cannot be decoded.
    AwaitingConfirmation { existing: Option<Profile> },
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Creates the file with only the header row. No-op when it already exists.
    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut writer = WriterBuilder::new().from_writer(file);
        writer.write_record(COLUMNS)?;
        writer.flush()?;
        info!("Initialized profile store at {}", self.path.display());
        Ok(())
    }

    /// Reads every row. Unreadable rows are collected in `corrupt` rather
    /// than failing the scan; a missing file is an empty table.
    pub fn load(&self) -> Result<TableScan, StoreError> {
        let mut scan = TableScan::default();
        if !self.exists() {
            return Ok(scan);
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let headers = reader.headers()?.clone();
        if headers.iter().ne(COLUMNS) {
            warn!(
                "Profile store {} has unexpected headers; reading by position",
                self.path.display()
            );
        }

        for result in reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    if let csv::ErrorKind::Io(_) = e.kind() {
                        return Err(e.into());
                    }
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    scan.corrupt.push(CorruptRow {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            match record::decode(&record) {
                Ok(profile) => scan.rows.push(profile),
                Err(reason) => {
                    warn!("Skipping corrupt profile row at line {line}: {reason}");
                    scan.corrupt.push(CorruptRow { line, reason });
                }
            }
        }

        debug!(
            "Loaded {} profile rows ({} corrupt)",
            scan.rows.len(),
            scan.corrupt.len()
        );
        Ok(scan)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let email = email.trim();
        Ok(self
            .load()?
            .rows
            .into_iter()
            .find(|row| row.email() == Some(email)))
    }

    /// Whether any stored row is keyed by `email`, decodable or not.
    pub fn contains_email(&self, email: &str) -> Result<bool, StoreError> {
        if !self.exists() {
            return Ok(false);
        }
        let email = email.trim();
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            if is_keyed_by(&record, email) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Appends one row. Fails with `Duplicate` when the email is already stored.
    pub fn insert(&self, profile: &Profile) -> Result<(), StoreError> {
        let email = profile.email().ok_or(StoreError::MissingEmail)?;
        self.ensure_initialized()?;
        if self.contains_email(email)? {
            return Err(StoreError::Duplicate(email.to_string()));
        }

        let row = record::encode(profile)?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;

        info!("Inserted profile for {email}");
        Ok(())
    }

    /// Drops every row keyed by `email` and appends `profile` in their place.
    /// Rows that cannot be decoded are carried over untouched.
    pub fn overwrite(&self, email: &str, profile: &Profile) -> Result<(), StoreError> {
        let email = email.trim();
        self.ensure_initialized()?;
        let replacement = record::encode(profile)?;

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;
        let headers = reader.byte_headers()?.clone();

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = tempfile::NamedTempFile::new_in(dir)?;
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_writer(staged.reopen()?);
        writer.write_byte_record(&headers)?;

        let mut removed = 0usize;
        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            if is_keyed_by(&record, email) {
                removed += 1;
                continue;
            }
            writer.write_byte_record(&record)?;
        }
        writer.write_record(&replacement)?;
        writer.flush()?;
        drop(writer);

        staged.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        info!("Overwrote profile for {email} (replaced {removed} row(s))");
        Ok(())
    }

    /// Inserts when the email is new; otherwise reports the existing row and
    /// writes nothing, leaving the overwrite decision to the caller.
    pub fn save(&self, profile: &Profile) -> Result<SaveOutcome, StoreError> {
        let email = profile.email().ok_or(StoreError::MissingEmail)?;
        self.ensure_initialized()?;

        if self.contains_email(email)? {
            let existing = self.find_by_email(email)?;
            if existing.is_none() {
                warn!("Stored row for {email} cannot be decoded; awaiting confirmation to replace it");
            } else {
                debug!("Profile for {email} already stored, awaiting confirmation");
            }
            return Ok(SaveOutcome::AwaitingConfirmation { existing });
        }

        self.insert(profile)?;
        Ok(SaveOutcome::Inserted)
    }

    /// Number of data rows, corrupt ones included.
    pub fn row_count(&self) -> Result<usize, StoreError> {
        if !self.exists() {
            return Ok(0);
        }
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(File::open(&self.path)?);
        Ok(reader.byte_records().count())
    }
}

fn is_keyed_by(record: &ByteRecord, email: &str) -> bool {
    record
        .get(EMAIL_COLUMN)
        .and_then(|cell| std::str::from_utf8(cell).ok())
        .is_some_and(|cell| cell.trim() == email)
}

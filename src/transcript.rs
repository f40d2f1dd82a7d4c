//! Append-only, per-day transcript of every partial and final translation

use crate::error::Result;
use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

pub struct TranscriptLog {
    path: PathBuf,
    /// Serializes appends from concurrent callbacks
    write_lock: Mutex<()>,
}

impl TranscriptLog {
    /// `<dir>/<YYYY-MM-DD>_translations.txt` for the given date
    pub fn for_date(dir: impl AsRef<Path>, date: NaiveDate) -> Self {
        let file_name = format!("{}_translations.txt", date.format("%Y-%m-%d"));
        Self {
            path: dir.as_ref().join(file_name),
            write_lock: Mutex::new(()),
        }
    }

    /// Log file named after the local calendar day
    pub fn for_today(dir: impl AsRef<Path>) -> Self {
        Self::for_date(dir, Local::now().date_naive())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file, or truncate it if it already exists
    pub fn reset(&self) -> Result<()> {
        File::create(&self.path)?;
        info!("Transcript log ready at {}", self.path.display());
        Ok(())
    }

    /// Open, append one line, close. No handle is held between calls.
    pub fn append(&self, line: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

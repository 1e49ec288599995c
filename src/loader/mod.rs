//! Offline bulk loader
//!
//! Reads TLE text files and writes their records to a [`RecordStore`] in
//! one transaction per file. Sets whose lines cannot be parsed are
//! reported as rejections alongside the constraint failures the store
//! reports.

mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::observability::{log_event_with_fields, Event};
use crate::store::{LoadMode, LoadSummary, Record, RecordStore, Rejection, StoreError};

pub use parser::{parse_tle_text, TleEntry};

pub type LoaderResult<T> = Result<T, LoaderError>;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Loader<'a> {
    store: &'a RecordStore,
    classified: bool,
    mode: LoadMode,
}

impl<'a> Loader<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self {
            store,
            classified: false,
            mode: LoadMode::InsertOnly,
        }
    }

    /// Flags every loaded record as classified
    pub fn classified(mut self, classified: bool) -> Self {
        self.classified = classified;
        self
    }

    pub fn mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn load_file(&self, path: &Path) -> LoaderResult<LoadSummary> {
        let text = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = path.display().to_string();
        self.load_text(&file, &text)
    }

    /// Loads already-read text; `source` only labels log lines
    pub fn load_text(&self, source: &str, text: &str) -> LoaderResult<LoadSummary> {
        let entries = parse_tle_text(text);
        let entry_count = entries.len().to_string();
        log_event_with_fields(
            Event::LoadFileParsed,
            &[("entries", &entry_count), ("file", source)],
        );

        let mut rejected = Vec::new();
        let mut records = Vec::with_capacity(entries.len());
        for entry in &entries {
            match Record::from_tle(&entry.name, &entry.line1, &entry.line2, self.classified) {
                Ok(record) => records.push(record),
                Err(err) => rejected.push(Rejection {
                    label: entry.label(),
                    reason: err.to_string(),
                }),
            }
        }
        for rejection in &rejected {
            log_event_with_fields(
                Event::RecordRejected,
                &[
                    ("file", source),
                    ("object", &rejection.label),
                    ("reason", &rejection.reason),
                ],
            );
        }

        let mut summary = self.store.bulk_load(&records, self.mode)?;
        self.store.metrics().add_records_rejected(rejected.len() as u64);
        rejected.append(&mut summary.rejected);
        summary.rejected = rejected;
        Ok(summary)
    }

    /// Loads every file, stopping at the first unreadable one.
    ///
    /// `on_file` sees each file's summary as soon as it is committed.
    pub fn load_files<P, F>(&self, paths: &[P], mut on_file: F) -> LoaderResult<LoadSummary>
    where
        P: AsRef<Path>,
        F: FnMut(&Path, &LoadSummary),
    {
        let file_count = paths.len().to_string();
        log_event_with_fields(Event::LoadBegin, &[("files", &file_count)]);

        let mut total = LoadSummary::default();
        for path in paths {
            let summary = self.load_file(path.as_ref())?;
            on_file(path.as_ref(), &summary);
            total.merge(summary);
        }

        let inserted = total.inserted.to_string();
        let rejected = total.rejected.len().to_string();
        log_event_with_fields(
            Event::LoadComplete,
            &[("inserted", &inserted), ("rejected", &rejected)],
        );
        Ok(total)
    }
}

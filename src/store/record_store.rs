//! SQLite-backed record store
//!
//! One writer connection behind a mutex. File-backed stores run in WAL
//! mode with a small round-robin pool of read connections, so reads only
//! see committed rows and never wait on the writer. In-memory stores route
//! everything through the writer.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{
    params, params_from_iter, Connection, ErrorCode, OpenFlags, OptionalExtension,
    TransactionBehavior,
};
use serde::Serialize;
use serde_json::Value;

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::record::{AddPayload, CatalogKind, LoadMode, LoadSummary, Record, Rejection};
use super::sql;
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::query::Predicate;
use crate::schema::{SchemaRegistry, CREATE_INDEXES_SQL, CREATE_TABLE_SQL};

const SQLITE_CONSTRAINT_PRIMARYKEY: i32 = 1555;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

/// Smallest and largest stored value of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRange {
    pub min: Value,
    pub max: Value,
}

pub struct RecordStore {
    config: StoreConfig,
    registry: SchemaRegistry,
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    next_reader: AtomicUsize,
    metrics: MetricsRegistry,
}

impl RecordStore {
    /// Opens (creating if needed) the database and its schema
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let mut writer = match &config.path {
            Some(_) => open_connection(&config, false)?,
            None => {
                let writer = Connection::open_in_memory()?;
                writer.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
                writer
            }
        };
        // the schema must exist before readers prepare statements
        if initialize_schema(&mut writer)? {
            log_event_with_fields(Event::StoreInitialized, &[("database", &config.describe())]);
        }

        let mut readers = Vec::new();
        if config.path.is_some() {
            for _ in 0..config.read_pool_size {
                readers.push(Mutex::new(open_connection(&config, true)?));
            }
        }

        let readers_field = readers.len().to_string();
        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("database", &config.describe()),
                ("read_connections", &readers_field),
            ],
        );

        Ok(Self {
            config,
            registry: SchemaRegistry::tles(),
            writer: Mutex::new(writer),
            readers,
            next_reader: AtomicUsize::new(0),
            metrics: MetricsRegistry::new(),
        })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreConfig::in_memory())
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Closes every connection, reporting the writer's close error
    pub fn close(self) -> StoreResult<()> {
        drop(self.readers);
        let writer = self
            .writer
            .into_inner()
            .map_err(|_| StoreError::Unavailable("writer lock poisoned".to_string()))?;
        writer.close().map_err(|(_, err)| StoreError::from(err))?;
        log_event_with_fields(Event::StoreClosed, &[("database", &self.config.describe())]);
        Ok(())
    }

    /// Drops and recreates the table
    pub fn reset(&self) -> StoreResult<()> {
        self.with_writer(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute_batch("DROP TABLE IF EXISTS tles;")?;
            tx.execute_batch(CREATE_TABLE_SQL)?;
            tx.execute_batch(CREATE_INDEXES_SQL)?;
            tx.commit()?;
            Ok(())
        })?;
        log_event_with_fields(Event::StoreReset, &[("database", &self.config.describe())]);
        Ok(())
    }

    // ==================
    // Reads
    // ==================

    pub fn count(&self) -> StoreResult<u64> {
        self.with_reader(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tles", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
    }

    /// MIN/MAX of one rangeable column, or of all of them.
    ///
    /// An empty table yields nulls.
    pub fn range(&self, column: Option<&str>) -> StoreResult<BTreeMap<String, ColumnRange>> {
        let columns = match column {
            Some(name) => vec![self
                .registry
                .rangeable_column(name)
                .ok_or_else(|| StoreError::UnknownColumn(name.to_string()))?],
            None => self.registry.rangeable(),
        };
        let statement = sql::range_sql(&columns);

        self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(&statement)?;
            let ranges = stmt.query_row([], |row| {
                let mut ranges = BTreeMap::new();
                for (idx, descriptor) in columns.iter().enumerate() {
                    ranges.insert(
                        descriptor.name().to_string(),
                        ColumnRange {
                            min: sql::json_value(row.get_ref(idx * 2)?),
                            max: sql::json_value(row.get_ref(idx * 2 + 1)?),
                        },
                    );
                }
                Ok(ranges)
            })?;
            Ok(ranges)
        })
    }

    /// Rows matching `predicate`, ordered by its column then catalog number
    pub fn search(&self, predicate: &Predicate) -> StoreResult<Vec<Record>> {
        let statement = sql::search_sql(predicate);
        let records = self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(&statement)?;
            let rows = stmt.query_map(params_from_iter(predicate.values().iter()), |row| {
                Record::from_row(row)
            })?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })?;
        self.metrics.increment_queries_executed();
        Ok(records)
    }

    /// Looks a record up by catalog number
    pub fn get(&self, norad_catalog: i64) -> StoreResult<Option<Record>> {
        let statement = format!(
            "SELECT {} FROM tles WHERE norad_catalog = ?1",
            sql::RECORD_COLUMNS
        );
        self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(&statement)?;
            let record = stmt
                .query_row(params![norad_catalog], |row| Record::from_row(row))
                .optional()?;
            Ok(record)
        })
    }

    // ==================
    // Mutations
    // ==================

    /// Inserts a new record. Fails with `DuplicateKey` if its catalog
    /// number or international designator is already present.
    pub fn add(&self, payload: &AddPayload) -> StoreResult<Record> {
        let result = payload.to_record().and_then(|record| {
            self.insert_new(&record)?;
            Ok(record)
        });

        match &result {
            Ok(record) => {
                self.metrics.add_records_added(1);
                log_event_with_fields(
                    Event::RecordAdded,
                    &[
                        ("classified", if record.classified { "1" } else { "0" }),
                        ("intldes", &record.intldes),
                        ("norad_catalog", &record.norad_catalog.to_string()),
                    ],
                );
            }
            Err(err @ (StoreError::DuplicateKey { .. } | StoreError::MalformedPayload(_))) => {
                self.metrics.add_records_rejected(1);
                log_event_with_fields(
                    Event::RecordRejected,
                    &[("code", err.code()), ("reason", &err.to_string())],
                );
            }
            Err(_) => {}
        }
        result
    }

    fn insert_new(&self, record: &Record) -> StoreResult<()> {
        let duplicate = || StoreError::DuplicateKey {
            norad_catalog: record.norad_catalog,
            intldes: record.intldes.clone(),
        };

        self.with_writer(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM tles WHERE norad_catalog = ?1 OR intldes = ?2)",
                params![record.norad_catalog, record.intldes],
                |row| row.get(0),
            )?;
            if exists {
                return Err(duplicate());
            }

            match insert_record(&tx, record, false) {
                Ok(()) => {}
                Err(InsertFailure::Unique) => return Err(duplicate()),
                Err(InsertFailure::Check) => {
                    let violated = record.violated_constraints();
                    return Err(if violated.is_empty() {
                        StoreError::MalformedPayload("violated table constraint".to_string())
                    } else {
                        StoreError::constraints(&violated)
                    });
                }
                Err(InsertFailure::Sqlite(err)) => return Err(err.into()),
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// Removes the record whose `catalog` column equals `id`
    pub fn delete(&self, catalog: &str, id: &str) -> StoreResult<()> {
        let kind = CatalogKind::parse(catalog)?;
        let not_found = || StoreError::NotFound {
            catalog: kind.as_str(),
            id: id.to_string(),
        };

        let statement = format!("DELETE FROM tles WHERE {} = ?1", kind.as_str());
        let removed = match kind {
            CatalogKind::NoradCatalog => {
                // a non-numeric catalog number cannot match any row
                let number: i64 = id.parse().map_err(|_| not_found())?;
                self.with_writer(|conn| Ok(conn.execute(&statement, params![number])?))?
            }
            CatalogKind::Intldes => {
                self.with_writer(|conn| Ok(conn.execute(&statement, params![id])?))?
            }
        };

        if removed == 0 {
            return Err(not_found());
        }
        self.metrics.increment_records_deleted();
        log_event_with_fields(Event::RecordDeleted, &[("catalog", kind.as_str()), ("id", id)]);
        Ok(())
    }

    /// Writes many records in one transaction.
    ///
    /// Records violating table constraints, or colliding with stored rows
    /// under [`LoadMode::InsertOnly`], are skipped and reported.
    pub fn bulk_load(&self, records: &[Record], mode: LoadMode) -> StoreResult<LoadSummary> {
        let summary = self.with_writer(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut summary = LoadSummary::default();

            for record in records {
                let violated = record.violated_constraints();
                if !violated.is_empty() {
                    summary.rejected.push(Rejection {
                        label: record.norad_catalog.to_string(),
                        reason: format!("violated constraints: {}", violated.join(", ")),
                    });
                    continue;
                }

                match insert_record(&tx, record, mode == LoadMode::Replace) {
                    Ok(()) => summary.inserted += 1,
                    Err(InsertFailure::Unique) => summary.rejected.push(Rejection {
                        label: record.norad_catalog.to_string(),
                        reason: "already present".to_string(),
                    }),
                    Err(InsertFailure::Check) => summary.rejected.push(Rejection {
                        label: record.norad_catalog.to_string(),
                        reason: "violated table constraint".to_string(),
                    }),
                    Err(InsertFailure::Sqlite(err)) => return Err(err.into()),
                }
            }

            tx.commit()?;
            Ok(summary)
        })?;

        self.metrics.add_records_added(summary.inserted as u64);
        self.metrics.add_records_rejected(summary.rejected.len() as u64);
        for rejection in &summary.rejected {
            log_event_with_fields(
                Event::RecordRejected,
                &[
                    ("norad_catalog", &rejection.label),
                    ("reason", &rejection.reason),
                ],
            );
        }
        Ok(summary)
    }

    // ==================
    // Connections
    // ==================

    fn with_reader<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        self.metrics.increment_store_calls();
        if self.readers.is_empty() {
            let conn = lock(&self.writer)?;
            return f(&conn);
        }
        let index = self.next_reader.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = lock(&self.readers[index])?;
        f(&conn)
    }

    fn with_writer<T>(&self, f: impl FnOnce(&mut Connection) -> StoreResult<T>) -> StoreResult<T> {
        self.metrics.increment_store_calls();
        let mut conn = lock(&self.writer)?;
        f(&mut conn)
    }
}

fn lock(connection: &Mutex<Connection>) -> StoreResult<MutexGuard<'_, Connection>> {
    connection.lock().map_err(|_| {
        log_event_with_fields(Event::StoreUnavailable, &[("reason", "connection lock poisoned")]);
        StoreError::Unavailable("connection lock poisoned".to_string())
    })
}

enum InsertFailure {
    Unique,
    Check,
    Sqlite(rusqlite::Error),
}

fn insert_record(
    conn: &Connection,
    record: &Record,
    replace: bool,
) -> Result<(), InsertFailure> {
    let statement = sql::insert_sql(replace);
    let mut stmt = conn.prepare_cached(&statement).map_err(InsertFailure::Sqlite)?;
    let result = stmt.execute(params![
        record.norad_catalog,
        i64::from(record.classified),
        record.inclination,
        record.period,
        record.apogee,
        record.perigee,
        record.mean_motion,
        record.eccentricity,
        record.semimajor_axis,
        record.epoch,
        record.intldes,
        record.name,
        record.line1,
        record.line2,
    ]);

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            match err.extended_code {
                SQLITE_CONSTRAINT_PRIMARYKEY | SQLITE_CONSTRAINT_UNIQUE => {
                    Err(InsertFailure::Unique)
                }
                _ => Err(InsertFailure::Check),
            }
        }
        Err(err) => Err(InsertFailure::Sqlite(err)),
    }
}

/// Opens a file-backed connection. Readers are restricted to queries.
fn open_connection(config: &StoreConfig, read_only: bool) -> StoreResult<Connection> {
    let path = config
        .path
        .as_ref()
        .ok_or_else(|| StoreError::Unavailable("no database path configured".to_string()))?;
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(path, flags)?;

    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    if read_only {
        connection.execute_batch("PRAGMA query_only = ON;")?;
    } else {
        connection.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
    }
    Ok(connection)
}

/// Creates the table and indexes if missing; true when the table was created
fn initialize_schema(connection: &mut Connection) -> StoreResult<bool> {
    let tx = connection.transaction()?;
    let existed: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tles')",
        [],
        |row| row.get(0),
    )?;
    tx.execute_batch(CREATE_TABLE_SQL)?;
    tx.execute_batch(CREATE_INDEXES_SQL)?;
    tx.commit()?;
    Ok(!existed)
}

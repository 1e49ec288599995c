//! Observable events
//!
//! Events are explicit and typed; every log line names one of these.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    ConfigLoaded,
    ServerStarting,
    Serving,
    ShutdownStart,
    ShutdownComplete,

    // Store
    StoreOpened,
    StoreInitialized,
    StoreReset,
    StoreClosed,
    StoreUnavailable,

    // Mutation
    RecordAdded,
    RecordDeleted,
    RecordRejected,

    // Query
    QueryExecuted,
    QueryRejected,

    // Bulk load
    LoadBegin,
    LoadFileParsed,
    LoadComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerStarting => "SERVER_STARTING",
            Event::Serving => "TLEDB_SERVING",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreInitialized => "STORE_INITIALIZED",
            Event::StoreReset => "STORE_RESET",
            Event::StoreClosed => "STORE_CLOSED",
            Event::StoreUnavailable => "STORE_UNAVAILABLE",

            Event::RecordAdded => "RECORD_ADDED",
            Event::RecordDeleted => "RECORD_DELETED",
            Event::RecordRejected => "RECORD_REJECTED",

            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",

            Event::LoadBegin => "LOAD_BEGIN",
            Event::LoadFileParsed => "LOAD_FILE_PARSED",
            Event::LoadComplete => "LOAD_COMPLETE",
        }
    }

    /// Events that indicate the process cannot continue
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::StoreUnavailable)
    }

    /// Events reporting a rejected client request
    pub fn is_rejection(&self) -> bool {
        matches!(self, Event::RecordRejected | Event::QueryRejected)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Counters
//! - Typed lifecycle events
//!
//! Observability is read-only: it never changes the outcome of the
//! operation being observed.
//!
//! ```ignore
//! use tledb::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::RecordAdded, &[("norad_catalog", "25544")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_rejection() {
        Severity::Warn
    } else {
        Severity::Info
    }
}

/// Logs a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(severity_for(event), event.as_str(), &[]);
}

/// Logs a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

//! Instrumentation sources - where sensor and hardware records come from
//!
//! A source answers one kind of request: run a [`Query`] and hand back the
//! matching records. The production source is WMI; tests use an in-memory one.

pub mod query;
pub mod wmi;
pub mod worker;

#[cfg(test)]
pub mod memory;

use std::collections::BTreeMap;

pub use self::query::Query;
pub use self::wmi::WmiSource;
pub use self::worker::SourceWorker;

/// Namespace the hardware monitor service publishes into
pub const DEFAULT_NAMESPACE: &str = r"root\xZenithHardwareMonitor";

/// One instance returned by the instrumentation layer, keyed by property name
pub type Record = BTreeMap<String, serde_json::Value>;

/// Failures surfaced by the instrumentation layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Hardware monitor service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("WMI is only available on Windows")]
    Unsupported,

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Source worker stopped")]
    Worker,
}

/// Anything that can run a [`Query`] against an instrumentation namespace
pub trait InstrumentationSource {
    /// Run the query and return matching records in provider order
    fn query(&self, query: &Query) -> Result<Vec<Record>, QueryError>;
}

impl<T: InstrumentationSource + ?Sized> InstrumentationSource for &T {
    fn query(&self, query: &Query) -> Result<Vec<Record>, QueryError> {
        (**self).query(query)
    }
}

impl<T: InstrumentationSource + ?Sized> InstrumentationSource for Box<T> {
    fn query(&self, query: &Query) -> Result<Vec<Record>, QueryError> {
        (**self).query(query)
    }
}

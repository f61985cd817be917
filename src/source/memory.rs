//! In-memory source for tests

use super::{InstrumentationSource, Query, QueryError, Record};
use std::cell::Cell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemorySource {
    classes: HashMap<String, Vec<Record>>,
    failure: Option<QueryError>,
    ignore_filters: bool,
    queries: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, class: &str, record: Record) -> Self {
        self.classes.entry(class.to_string()).or_default().push(record);
        self
    }

    /// Every query fails with this error
    pub fn failing(error: QueryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Return every instance of the class, like a provider that ignores WHERE
    pub fn ignoring_filters(mut self) -> Self {
        self.ignore_filters = true;
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.get()
    }
}

impl InstrumentationSource for MemorySource {
    fn query(&self, query: &Query) -> Result<Vec<Record>, QueryError> {
        self.queries.set(self.queries.get() + 1);
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        Ok(self
            .classes
            .get(query.class())
            .map(|records| {
                records
                    .iter()
                    .filter(|r| self.ignore_filters || query.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Build a `Sensor` record
pub fn sensor(identifier: &str, sensor_type: &str, parent: &str, value: Option<f64>) -> Record {
    let mut record = Record::new();
    record.insert("Identifier".into(), identifier.into());
    record.insert("Name".into(), identifier.rsplit('/').next().unwrap_or(identifier).into());
    record.insert("SensorType".into(), sensor_type.into());
    record.insert("Parent".into(), parent.into());
    record.insert("Index".into(), 0.into());
    record.insert(
        "Value".into(),
        value.map(serde_json::Value::from).unwrap_or(serde_json::Value::Null),
    );
    record.insert("Min".into(), serde_json::Value::Null);
    record.insert("Max".into(), serde_json::Value::Null);
    record
}

/// Build a `Hardware` record
pub fn hardware(identifier: &str, name: &str, hardware_type: &str, parent: &str) -> Record {
    let mut record = Record::new();
    record.insert("Identifier".into(), identifier.into());
    record.insert("Name".into(), name.into());
    record.insert("HardwareType".into(), hardware_type.into());
    record.insert("Parent".into(), parent.into());
    record
}

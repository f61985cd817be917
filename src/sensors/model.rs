//! Sensor and hardware records as published by the hardware monitor
//!
//! Both types keep every property the provider sent, so nothing is lost when a
//! provider publishes more than the accessors below know about.

use crate::shared::format_property;
use crate::source::Record;
use serde::Serialize;
use std::fmt;

/// A sensor instance (`Sensor` class)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sensor {
    properties: Record,
}

/// A hardware instance (`Hardware` class)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Hardware {
    properties: Record,
}

impl From<Record> for Sensor {
    fn from(properties: Record) -> Self {
        Self { properties }
    }
}

impl From<Record> for Hardware {
    fn from(properties: Record) -> Self {
        Self { properties }
    }
}

fn text<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(|v| v.as_str())
}

fn number(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(|v| v.as_f64())
}

impl Sensor {
    pub fn identifier(&self) -> Option<&str> {
        text(&self.properties, "Identifier")
    }

    pub fn name(&self) -> Option<&str> {
        text(&self.properties, "Name")
    }

    pub fn sensor_type(&self) -> Option<&str> {
        text(&self.properties, "SensorType")
    }

    /// Identifier of the hardware this sensor belongs to
    pub fn parent(&self) -> Option<&str> {
        text(&self.properties, "Parent")
    }

    pub fn index(&self) -> Option<i64> {
        self.properties.get("Index").and_then(|v| v.as_i64())
    }

    pub fn value(&self) -> Option<f64> {
        number(&self.properties, "Value")
    }

    pub fn min(&self) -> Option<f64> {
        number(&self.properties, "Min")
    }

    pub fn max(&self) -> Option<f64> {
        number(&self.properties, "Max")
    }
}

impl Hardware {
    pub fn identifier(&self) -> Option<&str> {
        text(&self.properties, "Identifier")
    }

    pub fn name(&self) -> Option<&str> {
        text(&self.properties, "Name")
    }

    pub fn hardware_type(&self) -> Option<&str> {
        text(&self.properties, "HardwareType")
    }

    pub fn parent(&self) -> Option<&str> {
        text(&self.properties, "Parent")
    }
}

fn write_record(f: &mut fmt::Formatter<'_>, class: &str, record: &Record) -> fmt::Result {
    write!(f, "{} {{", class)?;
    for (key, value) in record {
        write!(f, " {} = {};", key, format_property(value))?;
    }
    write!(f, " }}")
}

// Single line per record; string values are JSON-escaped so embedded newlines
// cannot split a record across lines.
impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, "Sensor", &self.properties)
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_record(f, "Hardware", &self.properties)
    }
}

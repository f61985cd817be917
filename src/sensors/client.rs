//! Sensor query client
//!
//! Builds the queries for the hardware monitor's `Sensor` and `Hardware`
//! classes and turns the records into typed values.

use super::model::{Hardware, Sensor};
use super::report::{build_report, HardwareNode};
use crate::source::{InstrumentationSource, Query, QueryError, Record};
use std::io::{self, Write};

pub const SENSOR_CLASS: &str = "Sensor";
pub const HARDWARE_CLASS: &str = "Hardware";
pub const CONTROL_SENSOR_TYPE: &str = "Control";

pub struct SensorQueryClient<S> {
    source: S,
}

impl<S: InstrumentationSource> SensorQueryClient<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Sensors whose `SensorType` is `Control` (fan and pump duty outputs)
    pub fn list_control_sensors(&self) -> Result<Vec<Sensor>, QueryError> {
        self.list_sensors(Some(CONTROL_SENSOR_TYPE))
    }

    /// All sensors, or only those of one `SensorType`
    pub fn list_sensors(&self, sensor_type: Option<&str>) -> Result<Vec<Sensor>, QueryError> {
        let query = sensor_query(sensor_type);
        Ok(self.fetch(&query)?.into_iter().map(Sensor::from).collect())
    }

    pub fn list_hardware(&self) -> Result<Vec<Hardware>, QueryError> {
        let query = Query::new(HARDWARE_CLASS);
        Ok(self.fetch(&query)?.into_iter().map(Hardware::from).collect())
    }

    /// Hardware tree with each sensor attached to its parent hardware
    pub fn report(&self) -> Result<Vec<HardwareNode>, QueryError> {
        let hardware = self.list_hardware()?;
        let sensors = self.list_sensors(None)?;
        Ok(build_report(hardware, sensors))
    }

    fn fetch(&self, query: &Query) -> Result<Vec<Record>, QueryError> {
        let records = self.source.query(query)?;
        let total = records.len();

        // Re-check the WHERE clause locally
        let matching: Vec<Record> = records.into_iter().filter(|r| query.matches(r)).collect();
        if matching.len() != total {
            tracing::warn!(
                "Provider returned {} records outside filter for {}",
                total - matching.len(),
                query.to_wql()
            );
        }

        tracing::debug!("{} -> {} records", query.class(), matching.len());
        Ok(matching)
    }
}

pub fn sensor_query(sensor_type: Option<&str>) -> Query {
    let query = Query::new(SENSOR_CLASS);
    match sensor_type {
        Some(t) => query.filter("SensorType", t),
        None => query,
    }
}

/// Write one line per sensor; returns the number of lines written
pub fn write_sensors<W: Write>(out: &mut W, sensors: &[Sensor]) -> io::Result<usize> {
    for sensor in sensors {
        writeln!(out, "{}", sensor)?;
    }
    Ok(sensors.len())
}

pub fn write_hardware<W: Write>(out: &mut W, hardware: &[Hardware]) -> io::Result<usize> {
    for hw in hardware {
        writeln!(out, "{}", hw)?;
    }
    Ok(hardware.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::{self, MemorySource};

    fn two_sensor_service() -> MemorySource {
        MemorySource::new()
            .with(SENSOR_CLASS, memory::sensor("fan1", "Control", "/lpc", Some(35.0)))
            .with(SENSOR_CLASS, memory::sensor("temp1", "Temperature", "/lpc", Some(48.0)))
    }

    fn render(sensors: &[Sensor]) -> String {
        let mut out = Vec::new();
        write_sensors(&mut out, sensors).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lists_control_sensors_only() {
        let client = SensorQueryClient::new(two_sensor_service());

        let output = render(&client.list_control_sensors().unwrap());

        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"fan1\""));
        assert!(!output.contains("temp1"));
    }

    #[test]
    fn test_filter_enforced_when_provider_ignores_where() {
        let client = SensorQueryClient::new(two_sensor_service().ignoring_filters());

        let sensors = client.list_control_sensors().unwrap();

        assert_eq!(sensors.len(), 1);
        assert!(sensors.iter().all(|s| s.sensor_type() == Some("Control")));
    }

    #[test]
    fn test_no_control_sensors_prints_nothing() {
        let source = MemorySource::new()
            .with(SENSOR_CLASS, memory::sensor("temp1", "Temperature", "/cpu/0", Some(51.0)));
        let client = SensorQueryClient::new(source);

        let sensors = client.list_control_sensors().unwrap();
        let mut out = Vec::new();

        assert_eq!(write_sensors(&mut out, &sensors).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_line_per_sensor_in_provider_order() {
        let source = MemorySource::new()
            .with(SENSOR_CLASS, memory::sensor("/lpc/control/2", "Control", "/lpc", Some(80.0)))
            .with(SENSOR_CLASS, memory::sensor("/lpc/control/0", "Control", "/lpc", Some(20.0)))
            .with(SENSOR_CLASS, memory::sensor("/gpu/0/control/0", "Control", "/gpu/0", None));
        let client = SensorQueryClient::new(source);

        let output = render(&client.list_control_sensors().unwrap());
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("/lpc/control/2"));
        assert!(lines[1].contains("/lpc/control/0"));
        assert!(lines[2].contains("/gpu/0/control/0"));
    }

    #[test]
    fn test_repeated_queries_are_fresh_and_identical() {
        let client = SensorQueryClient::new(two_sensor_service());

        let first = render(&client.list_control_sensors().unwrap());
        let second = render(&client.list_control_sensors().unwrap());

        assert_eq!(first, second);
        assert_eq!(client.source.query_count(), 2);
    }

    #[test]
    fn test_service_unavailable_propagates() {
        let client = SensorQueryClient::new(MemorySource::failing(
            QueryError::ServiceUnavailable("Sensor class not registered".into()),
        ));

        let err = client.list_control_sensors().unwrap_err();

        assert!(matches!(err, QueryError::ServiceUnavailable(_)));
        assert!(err.to_string().contains("Sensor class not registered"));
    }

    #[test]
    fn test_list_sensors_by_type_and_all() {
        let client = SensorQueryClient::new(two_sensor_service());

        assert_eq!(client.list_sensors(None).unwrap().len(), 2);
        let temps = client.list_sensors(Some("Temperature")).unwrap();
        assert_eq!(temps.len(), 1);
        assert_eq!(temps[0].identifier(), Some("temp1"));
    }

    #[test]
    fn test_list_hardware() {
        let source = MemorySource::new()
            .with(HARDWARE_CLASS, memory::hardware("/amdcpu/0", "AMD Ryzen 7 5800X", "Cpu", ""));
        let client = SensorQueryClient::new(source);

        let hardware = client.list_hardware().unwrap();
        let mut out = Vec::new();

        assert_eq!(write_hardware(&mut out, &hardware).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains("AMD Ryzen 7 5800X"));
    }

    #[test]
    fn test_client_over_borrowed_source() {
        let source = two_sensor_service();
        let client = SensorQueryClient::new(&source as &dyn InstrumentationSource);

        assert_eq!(client.list_control_sensors().unwrap().len(), 1);
    }

    #[test]
    fn test_sensor_query() {
        assert_eq!(sensor_query(None).to_wql(), "SELECT * FROM Sensor");
        assert_eq!(
            sensor_query(Some(CONTROL_SENSOR_TYPE)).to_wql(),
            "SELECT * FROM Sensor WHERE SensorType = 'Control'"
        );
    }
}

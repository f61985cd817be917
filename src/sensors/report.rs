//! Hardware report - the full hardware tree with current readings

use super::model::{Hardware, Sensor};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HardwareNode {
    pub hardware_type: String,
    pub name: String,
    pub identifier: String,
    pub sub_hardware: Vec<HardwareNode>,
    pub sensors: Vec<SensorReading>,
}

/// Missing readings are reported as 0.0
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SensorReading {
    pub sensor_type: String,
    pub name: String,
    pub index: i64,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&Sensor> for SensorReading {
    fn from(sensor: &Sensor) -> Self {
        Self {
            sensor_type: sensor.sensor_type().unwrap_or_default().to_string(),
            name: sensor.name().unwrap_or_default().to_string(),
            index: sensor.index().unwrap_or(0),
            value: sensor.value().unwrap_or(0.0),
            min: sensor.min().unwrap_or(0.0),
            max: sensor.max().unwrap_or(0.0),
        }
    }
}

/// Assemble the hardware tree
///
/// Hardware whose `Parent` is empty or unknown becomes a root. Sensors attach to
/// the hardware named by their `Parent`; sensors without one are dropped, and so
/// are sensors whose hardware cannot be reached from a root. Only the first
/// hardware with a given `Identifier` is kept. Provider order is kept at every
/// level.
pub fn build_report(hardware: Vec<Hardware>, sensors: Vec<Sensor>) -> Vec<HardwareNode> {
    let mut known: HashMap<&str, usize> = HashMap::new();
    for (i, hw) in hardware.iter().enumerate() {
        if let Some(id) = hw.identifier() {
            known.entry(id).or_insert(i);
        }
    }

    let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (i, hw) in hardware.iter().enumerate() {
        if let Some(id) = hw.identifier() {
            if known[id] != i {
                tracing::debug!("Skipping duplicate hardware {}", id);
                continue;
            }
        }
        match hw.parent().filter(|p| known.contains_key(p)) {
            Some(parent) => children.entry(parent).or_default().push(i),
            None => roots.push(i),
        }
    }

    let mut readings: HashMap<&str, Vec<SensorReading>> = HashMap::new();
    for sensor in &sensors {
        match sensor.parent().filter(|p| known.contains_key(p)) {
            Some(parent) => readings.entry(parent).or_default().push(sensor.into()),
            None => tracing::debug!(
                "Dropping sensor {} with no known parent",
                sensor.identifier().unwrap_or("<unnamed>")
            ),
        }
    }

    let report = roots
        .into_iter()
        .map(|i| build_node(i, &hardware, &children, &mut readings))
        .collect();

    // Whatever is left hangs off hardware that no root leads to
    for (parent, left) in &readings {
        tracing::debug!(
            "Dropping {} sensors under unreachable hardware {}",
            left.len(),
            parent
        );
    }

    report
}

fn build_node<'a>(
    index: usize,
    hardware: &'a [Hardware],
    children: &HashMap<&'a str, Vec<usize>>,
    readings: &mut HashMap<&'a str, Vec<SensorReading>>,
) -> HardwareNode {
    let hw = &hardware[index];
    let identifier = hw.identifier().unwrap_or_default();

    let sub_hardware = children
        .get(identifier)
        .map(|kids| {
            kids.iter()
                .map(|&k| build_node(k, hardware, children, readings))
                .collect()
        })
        .unwrap_or_default();

    HardwareNode {
        hardware_type: hw.hardware_type().unwrap_or_default().to_string(),
        name: hw.name().unwrap_or_default().to_string(),
        identifier: identifier.to_string(),
        sub_hardware,
        sensors: readings.remove(identifier).unwrap_or_default(),
    }
}

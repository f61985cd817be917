//! MCP tool functions over the source worker

use super::client::{SensorQueryClient, CONTROL_SENSOR_TYPE};
use super::model::{Hardware, Sensor};
use crate::shared::{format_reading, internal_error};
use crate::source::SourceWorker;
use rmcp::{model::*, ErrorData as McpError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// === Parameter Types ===

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SensorTypeParams {
    #[schemars(
        description = "Sensor type to filter by (e.g. \"Control\", \"Temperature\", \"Fan\", \"Load\"). Omit for all sensors."
    )]
    #[serde(default)]
    pub sensor_type: Option<String>,
}

// === Formatting ===

fn format_sensor_list(sensors: &[Sensor], sensor_type: Option<&str>) -> String {
    let label = sensor_type.unwrap_or("all");
    if sensors.is_empty() {
        return format!("No sensors found (type: {})", label);
    }

    let mut output = format!("{} sensor(s) (type: {}):\n\n", sensors.len(), label);
    output.push_str(&format!(
        "{:<36} {:<24} {:<12} {:>8} {:>8} {:>8}\n",
        "Identifier", "Name", "Type", "Value", "Min", "Max"
    ));
    output.push_str(&format!("{:-<101}\n", ""));

    for s in sensors {
        output.push_str(&format!(
            "{:<36} {:<24} {:<12} {:>8} {:>8} {:>8}\n",
            s.identifier().unwrap_or("?"),
            s.name().unwrap_or("?"),
            s.sensor_type().unwrap_or("?"),
            format_reading(s.value()),
            format_reading(s.min()),
            format_reading(s.max()),
        ));
    }
    output
}

fn format_hardware_list(hardware: &[Hardware]) -> String {
    if hardware.is_empty() {
        return "No hardware found".to_string();
    }

    let mut output = format!("{} hardware item(s):\n\n", hardware.len());
    for hw in hardware {
        output.push_str(&format!(
            "  {} [{}] - {}\n",
            hw.name().unwrap_or("?"),
            hw.hardware_type().unwrap_or("?"),
            hw.identifier().unwrap_or("?")
        ));
    }
    output
}

// === Tool Functions ===

pub async fn list_control_sensors(worker: &SourceWorker) -> Result<CallToolResult, McpError> {
    match worker
        .with_source(|source| SensorQueryClient::new(source).list_control_sensors())
        .await
    {
        Ok(sensors) => Ok(CallToolResult::success(vec![Content::text(
            format_sensor_list(&sensors, Some(CONTROL_SENSOR_TYPE)),
        )])),
        Err(e) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Failed to query control sensors: {}",
            e
        ))])),
    }
}

pub async fn list_sensors(
    worker: &SourceWorker,
    params: SensorTypeParams,
) -> Result<CallToolResult, McpError> {
    let sensor_type = params.sensor_type.clone();
    match worker
        .with_source(move |source| {
            SensorQueryClient::new(source).list_sensors(sensor_type.as_deref())
        })
        .await
    {
        Ok(sensors) => Ok(CallToolResult::success(vec![Content::text(
            format_sensor_list(&sensors, params.sensor_type.as_deref()),
        )])),
        Err(e) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Failed to query sensors: {}",
            e
        ))])),
    }
}

pub async fn list_hardware(worker: &SourceWorker) -> Result<CallToolResult, McpError> {
    match worker
        .with_source(|source| SensorQueryClient::new(source).list_hardware())
        .await
    {
        Ok(hardware) => Ok(CallToolResult::success(vec![Content::text(
            format_hardware_list(&hardware),
        )])),
        Err(e) => Ok(CallToolResult::success(vec![Content::text(format!(
            "Failed to query hardware: {}",
            e
        ))])),
    }
}

pub async fn get_hardware_report(worker: &SourceWorker) -> Result<CallToolResult, McpError> {
    let report = match worker
        .with_source(|source| SensorQueryClient::new(source).report())
        .await
    {
        Ok(r) => r,
        Err(e) => {
            return Ok(CallToolResult::success(vec![Content::text(format!(
                "Failed to build hardware report: {}",
                e
            ))]))
        }
    };

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| internal_error(format!("Failed to serialize report: {}", e)))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

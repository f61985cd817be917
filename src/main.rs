//! hwmon-query: query sensors published by a local hardware monitor over WMI
//!
//! With no arguments, prints every `Control` sensor in
//! `root\xZenithHardwareMonitor`, one per line. Subcommands list other sensor
//! types and hardware, build a JSON hardware report, poll sensors, or serve the
//! same queries as MCP tools.
//!
//! Make sure the hardware monitor service is running first.

use clap::{Parser, Subcommand};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters, ServerHandler},
    model::*,
    ErrorData as McpError,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// === Modules ===

mod config;
mod sensors;
mod shared;
mod source;

use sensors::client::{write_hardware, write_sensors, SensorQueryClient};
use sensors::watch::watch_loop;
use source::{InstrumentationSource, SourceWorker, WmiSource, DEFAULT_NAMESPACE};

// === CLI ===

#[derive(Parser)]
#[command(name = "hwmon-query")]
#[command(about = "Query sensors published by a local hardware monitor over WMI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List sensors, optionally of a single type
    Sensors {
        /// Sensor type (e.g. Control, Temperature, Fan, Load)
        #[arg(long = "type", value_name = "SENSOR_TYPE")]
        sensor_type: Option<String>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List hardware items
    Hardware {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the hardware tree with sensor readings as JSON
    Report,
    /// Re-query sensors on an interval until Ctrl-C
    Watch {
        /// Sensor type to watch
        #[arg(long = "type", value_name = "SENSOR_TYPE", default_value = "Control")]
        sensor_type: String,
        /// Refresh interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Run the MCP server on stdio
    Serve,
    /// Open the config file in your editor
    Config,
}

// === Common Parameter Types ===

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EmptyParams {}

// === Server ===

#[derive(Debug)]
pub struct HwmonServer {
    pub tool_router: ToolRouter<Self>,
    pub worker: SourceWorker,
}

impl HwmonServer {
    pub fn new(config: &config::Config) -> Self {
        let mut tool_router = Self::tool_router();

        let disabled = config.disabled_tools();
        for &tool_name in &disabled {
            if tool_router.has_route(tool_name) {
                tool_router.remove_route(tool_name);
                tracing::info!("Disabled tool: {}", tool_name);
            }
        }
        for tool_name in config.unknown_disabled() {
            tracing::warn!(
                "Config disables unknown tool: {} (known: {})",
                tool_name,
                config::all_tool_names().join(", ")
            );
        }

        if !disabled.is_empty() {
            tracing::info!(
                "Loaded config: {} tools disabled, {} tools active",
                disabled.len(),
                tool_router.map.len()
            );
        }

        let namespace = config.namespace.clone();
        let worker = SourceWorker::spawn(move || {
            WmiSource::connect(&namespace)
                .map(|s| Box::new(s) as Box<dyn InstrumentationSource>)
        });

        Self { tool_router, worker }
    }
}

#[rmcp::tool_router]
impl HwmonServer {
    #[rmcp::tool(description = "List control sensors (fan and pump duty outputs) published by the hardware monitor")]
    pub async fn list_control_sensors(
        &self,
        Parameters(_params): Parameters<EmptyParams>,
    ) -> Result<CallToolResult, McpError> {
        sensors::tools::list_control_sensors(&self.worker).await
    }

    #[rmcp::tool(description = "List hardware monitor sensors, optionally filtered by sensor type (Control, Temperature, Fan, Load, Voltage, ...)")]
    pub async fn list_sensors(
        &self,
        Parameters(params): Parameters<sensors::tools::SensorTypeParams>,
    ) -> Result<CallToolResult, McpError> {
        sensors::tools::list_sensors(&self.worker, params).await
    }

    #[rmcp::tool(description = "List hardware items known to the hardware monitor (CPU, GPU, motherboard, SuperIO, storage)")]
    pub async fn list_hardware(
        &self,
        Parameters(_params): Parameters<EmptyParams>,
    ) -> Result<CallToolResult, McpError> {
        sensors::tools::list_hardware(&self.worker).await
    }

    #[rmcp::tool(description = "Get the full hardware tree with every sensor's type, value, min and max as JSON")]
    pub async fn get_hardware_report(
        &self,
        Parameters(_params): Parameters<EmptyParams>,
    ) -> Result<CallToolResult, McpError> {
        sensors::tools::get_hardware_report(&self.worker).await
    }
}

#[rmcp::tool_handler]
impl ServerHandler for HwmonServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "hwmon-query: sensors and hardware published by the local hardware monitor \
                 service over WMI."
                    .to_string(),
            ),
        }
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            init_tracing("warn");
            run_list_control_sensors()?;
        }
        Some(Commands::Sensors { sensor_type, json }) => {
            init_tracing("warn");
            run_sensors(&config::Config::load(), sensor_type.as_deref(), json)?;
        }
        Some(Commands::Hardware { json }) => {
            init_tracing("warn");
            run_hardware(&config::Config::load(), json)?;
        }
        Some(Commands::Report) => {
            init_tracing("warn");
            run_report(&config::Config::load())?;
        }
        Some(Commands::Watch {
            sensor_type,
            interval_ms,
        }) => {
            init_tracing("info");
            let mut config = config::Config::load();
            if let Some(ms) = interval_ms {
                config.interval_ms = ms;
            }
            run_watch(&config, &sensor_type).await?;
        }
        Some(Commands::Serve) => {
            init_tracing("info");
            run_server(&config::Config::load()).await?;
        }
        Some(Commands::Config) => {
            run_config_command()?;
        }
    }

    Ok(())
}

/// The fixed query: every `Control` sensor in the default namespace
fn run_list_control_sensors() -> anyhow::Result<()> {
    let client = SensorQueryClient::new(WmiSource::connect(DEFAULT_NAMESPACE)?);
    let sensors = client.list_control_sensors()?;

    let mut stdout = std::io::stdout().lock();
    write_sensors(&mut stdout, &sensors)?;
    stdout.flush()?;
    Ok(())
}

fn run_sensors(
    config: &config::Config,
    sensor_type: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let client = SensorQueryClient::new(WmiSource::connect(&config.namespace)?);
    let sensors = client.list_sensors(sensor_type)?;

    let mut stdout = std::io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&sensors)?)?;
    } else {
        write_sensors(&mut stdout, &sensors)?;
    }
    stdout.flush()?;
    Ok(())
}

fn run_hardware(config: &config::Config, json: bool) -> anyhow::Result<()> {
    let client = SensorQueryClient::new(WmiSource::connect(&config.namespace)?);
    let hardware = client.list_hardware()?;

    let mut stdout = std::io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&hardware)?)?;
    } else {
        write_hardware(&mut stdout, &hardware)?;
    }
    stdout.flush()?;
    Ok(())
}

fn run_report(config: &config::Config) -> anyhow::Result<()> {
    let client = SensorQueryClient::new(WmiSource::connect(&config.namespace)?);
    let report = client.report()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Poll sensors until Ctrl-C; the connection stays open between rounds
async fn run_watch(config: &config::Config, sensor_type: &str) -> anyhow::Result<()> {
    let source = WmiSource::connect(&config.namespace)?;
    tracing::info!(
        "Watching {} sensors in {} every {:?}",
        sensor_type,
        source.namespace(),
        config.interval()
    );
    let client = SensorQueryClient::new(source);

    // One Ctrl-C listener for the whole run, held by the loop
    watch_loop(
        &mut std::io::stdout(),
        &client,
        sensor_type,
        config.interval(),
        tokio::signal::ctrl_c(),
    )
    .await?;
    Ok(())
}

/// Open config file in user's editor
fn run_config_command() -> anyhow::Result<()> {
    let config_path = config::Config::path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    // Create config file from template if it doesn't exist
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let template = include_str!("../config.toml.example");
        std::fs::write(&config_path, template)?;
        println!("Created config file: {}", config_path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            #[cfg(target_os = "windows")]
            { "notepad".to_string() }
            #[cfg(not(target_os = "windows"))]
            { "nano".to_string() }
        });

    println!("Opening {} with {}", config_path.display(), editor);

    std::process::Command::new(&editor)
        .arg(&config_path)
        .status()?;

    Ok(())
}

/// Run the MCP server
async fn run_server(config: &config::Config) -> anyhow::Result<()> {
    tracing::info!("Starting hwmon-query server for {}", config.namespace);

    let server = HwmonServer::new(config);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;

    tracing::info!("hwmon-query server stopped");
    Ok(())
}

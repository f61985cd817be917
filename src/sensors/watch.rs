//! Repeated sensor queries for `hwmon-query watch`

use super::client::{write_sensors, SensorQueryClient};
use crate::source::InstrumentationSource;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

/// Query once, then print a timestamped header and one line per sensor
///
/// Returns the number of sensor lines written.
pub fn write_watch_round<W: Write, S: InstrumentationSource>(
    out: &mut W,
    client: &SensorQueryClient<S>,
    sensor_type: &str,
) -> anyhow::Result<usize> {
    let sensors = client.list_sensors(Some(sensor_type))?;
    writeln!(
        out,
        "--- {} ({} sensors)",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        sensors.len()
    )?;
    let written = write_sensors(out, &sensors)?;
    out.flush()?;
    Ok(written)
}

/// Run a round every `interval` until `stop` resolves or a query fails
///
/// `stop` is polled across the whole loop, so a stop that fires while a round
/// is being written ends the loop before the next one. Returns the number of
/// rounds written.
pub async fn watch_loop<W, S, F>(
    out: &mut W,
    client: &SensorQueryClient<S>,
    sensor_type: &str,
    interval: Duration,
    stop: F,
) -> anyhow::Result<usize>
where
    W: Write,
    S: InstrumentationSource,
    F: Future,
{
    tokio::pin!(stop);

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut rounds = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => {
                tracing::info!("Stopping watch after {} rounds", rounds);
                break;
            }
            _ = ticker.tick() => {
                write_watch_round(out, client, sensor_type)?;
                rounds += 1;
            }
        }
    }

    Ok(rounds)
}

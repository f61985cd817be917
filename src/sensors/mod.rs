//! Sensors module - hardware monitor sensors and hardware over WMI

pub mod client;
pub mod model;
pub mod report;
pub mod tools;
pub mod watch;

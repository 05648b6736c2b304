//! Background polling of the process table.

mod monitor;
mod scanner;

pub use monitor::{GitMonitor, MonitorOptions, MonitorStatus};
pub use scanner::{ScanLoop, TickReport};

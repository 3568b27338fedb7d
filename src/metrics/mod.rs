pub mod collector;
pub mod exporter;
pub mod report;

pub use collector::CounterSnapshot;
pub use exporter::PrometheusExporter;
pub use report::{OutputFormat, Reporter};

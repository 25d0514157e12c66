pub mod metrics;
pub mod monitor;
pub mod registry;
pub mod stopwatch;

pub use metrics::WorkerMetrics;
pub use monitor::PipelineMonitor;
pub use registry::{MetricsRegistry, MetricsSnapshot};
pub use stopwatch::Stopwatch;

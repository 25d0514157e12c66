pub mod collector;
pub mod extract;
pub mod generator;
pub mod pipeline;
pub mod queue;
pub mod state;

pub use collector::Collector;
pub use extract::{extract, extract_channels};
pub use generator::{channel_identity, Generator, GeneratorConfig, RateTier};
pub use pipeline::{IngestPipeline, IngestReport, PipelineConfig};
pub use queue::{sample_queue, SampleConsumer, SampleProducer};
pub use state::IngestState;

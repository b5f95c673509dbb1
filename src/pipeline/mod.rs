//! The concurrent aggregation pipeline: task derivation, fan-out/fan-in
//! execution, redundancy resolution, context assembly, and progress
//! streaming.

pub mod aggregator;
pub mod context;
pub mod events;
pub mod executor;
pub mod merge;
pub mod tasks;

pub use aggregator::Aggregator;
pub use events::{PipelineEvent, Phase, ProgressEvent, TaskState};

//! Palisade Batch - feeding parallel executors
//!
//! A batch job carries a list of registered data requests in its
//! configuration. The split planner registers each with the coordinator,
//! partitions every response round-robin into at most the hinted number of
//! splits, and hands each split to one executor worker. Workers open a
//! record reader against the data node named in the split.

#![deny(unsafe_code)]

mod config;
mod error;
mod planner;
mod reader;
mod split;

pub use config::{
    JobConfig, SerialiserDescriptor, MAX_MAP_HINT_KEY, REGISTER_REQUESTS_KEY, SERIALISER_KEY,
};
pub use error::{PlannerError, PlannerResult, ReaderError};
pub use planner::{to_input_splits, SplitPlanner};
pub use reader::{PalisadeRecordReader, RecordReader};
pub use split::PalisadeInputSplit;

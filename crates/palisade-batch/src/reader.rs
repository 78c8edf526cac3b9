//! The record reader contract
//!
//! Executor frameworks hand readers a type-erased split, so initialisation
//! re-establishes the concrete type. Record-level rules run on the data
//! node; a reader only ever sees already-filtered records.

use crate::{PalisadeInputSplit, ReaderError};
use palisade_types::{DataRequestResponse, LeafResource, Record};
use std::any::Any;

/// Streaming contract for one input split
pub trait RecordReader: Send {
    type Key;
    type Value;

    /// Binds the reader to a split.
    ///
    /// # Errors
    ///
    /// [`ReaderError::SplitTypeMismatch`] for a foreign split type;
    /// [`ReaderError::EmptySplit`] when there is nothing to read.
    fn initialize(&mut self, split: &dyn Any) -> Result<(), ReaderError>;

    /// Advances to the next record; `false` once exhausted.
    fn next_key_value(&mut self) -> Result<bool, ReaderError>;

    fn current_key(&self) -> Option<&Self::Key>;

    fn current_value(&self) -> Option<&Self::Value>;

    /// Fraction of the split consumed, in `[0, 1]`.
    fn progress(&self) -> f32;

    /// Releases any stream held open against the data node.
    fn close(&mut self) -> Result<(), ReaderError>;
}

/// Reader carrying the Palisade side of the data-node contract
///
/// Streaming belongs to the data node; this reader validates the split and
/// holds the response whose token the node will redeem.
#[derive(Default)]
pub struct PalisadeRecordReader {
    details: Option<DataRequestResponse>,
}

impl PalisadeRecordReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// The response this reader was initialised with, if any.
    pub fn request_response(&self) -> Option<&DataRequestResponse> {
        self.details.as_ref()
    }
}

impl RecordReader for PalisadeRecordReader {
    type Key = LeafResource;
    type Value = Record;

    fn initialize(&mut self, split: &dyn Any) -> Result<(), ReaderError> {
        let split = split
            .downcast_ref::<PalisadeInputSplit>()
            .ok_or(ReaderError::SplitTypeMismatch)?;
        if split.is_empty() {
            return Err(ReaderError::EmptySplit);
        }
        self.details = Some(split.response().clone());
        Ok(())
    }

    fn next_key_value(&mut self) -> Result<bool, ReaderError> {
        Ok(false)
    }

    fn current_key(&self) -> Option<&Self::Key> {
        None
    }

    fn current_value(&self) -> Option<&Self::Value> {
        None
    }

    fn progress(&self) -> f32 {
        0.0
    }

    fn close(&mut self) -> Result<(), ReaderError> {
        self.details = None;
        Ok(())
    }
}

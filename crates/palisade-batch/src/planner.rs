//! Split planning

use crate::{JobConfig, PalisadeInputSplit, PlannerError, PlannerResult};
use indexmap::IndexMap;
use palisade_coordinator::PalisadeService;
use palisade_types::{DataRequestResponse, ResourceMap};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Turns registered data requests into input splits for a parallel executor
#[derive(Default)]
pub struct SplitPlanner {
    coordinator: Option<Arc<dyn PalisadeService>>,
}

impl SplitPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coordinator(mut self, coordinator: Arc<dyn PalisadeService>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    pub fn set_coordinator(&mut self, coordinator: Arc<dyn PalisadeService>) {
        self.coordinator = Some(coordinator);
    }

    /// Plans splits for every request in the job configuration.
    ///
    /// Registrations fan out concurrently; results are consumed and splits
    /// emitted in request order. The first failure fails the whole plan and
    /// aborts the registrations still in flight (already-committed cache
    /// writes expire via their TTL).
    ///
    /// # Errors
    ///
    /// [`PlannerError::MissingCoordinator`] without a bound coordinator,
    /// [`PlannerError::NoRequests`] for an empty request list,
    /// [`PlannerError::InvalidHint`] for a negative stored hint, and any
    /// registration failure with its own kind.
    #[instrument(skip_all)]
    pub async fn get_splits(&self, config: &JobConfig) -> PlannerResult<Vec<PalisadeInputSplit>> {
        let coordinator = self
            .coordinator
            .clone()
            .ok_or(PlannerError::MissingCoordinator)?;
        let requests = config.data_requests()?;
        if requests.is_empty() {
            return Err(PlannerError::NoRequests);
        }
        let hint = config.max_map_hint()?;

        let mut handles = Vec::with_capacity(requests.len());
        for request in requests {
            let coordinator = coordinator.clone();
            handles.push(tokio::spawn(async move {
                coordinator.register_data_request(request).await
            }));
        }

        let mut responses = Vec::with_capacity(handles.len());
        let mut failure: Option<PlannerError> = None;
        for handle in handles {
            if failure.is_some() {
                handle.abort();
                continue;
            }
            match handle.await {
                Ok(Ok(response)) => responses.push(response),
                Ok(Err(error)) => failure = Some(PlannerError::Registration(error)),
                Err(join_error) => failure = Some(PlannerError::Cancelled(join_error.to_string())),
            }
        }
        if let Some(failure) = failure {
            return Err(failure);
        }

        let mut splits = Vec::new();
        for response in &responses {
            let resources = response.resources.len();
            let count = if hint == 0 {
                resources
            } else {
                resources.min(hint)
            };
            splits.extend(to_input_splits(response, (0..count).cycle()));
        }

        info!(
            requests = responses.len(),
            splits = splits.len(),
            max_map_hint = hint,
            "planned input splits"
        );
        Ok(splits)
    }
}

/// Partitions one response by the given index stream.
///
/// The resource at position `i` of the map's insertion order goes into the
/// bucket named by the `i`-th yielded index; buckets become splits in
/// first-occurrence order. The stream must yield an index per resource;
/// planning always supplies a cycling `0..k` stream.
pub fn to_input_splits(
    response: &DataRequestResponse,
    indices: impl IntoIterator<Item = usize>,
) -> Vec<PalisadeInputSplit> {
    let mut indices = indices.into_iter();
    let mut buckets: IndexMap<usize, ResourceMap> = IndexMap::new();

    for (leaf, connection) in &response.resources {
        let Some(slot) = indices.next() else {
            warn!(token = %response.token, "index stream ran dry; remaining resources unassigned");
            break;
        };
        buckets
            .entry(slot)
            .or_default()
            .insert(leaf.clone(), connection.clone());
    }

    buckets
        .into_values()
        .map(|resources| {
            PalisadeInputSplit::new(DataRequestResponse {
                token: response.token.clone(),
                resources,
            })
        })
        .collect()
}

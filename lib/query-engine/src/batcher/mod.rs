mod dispatch;
pub mod error;

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, PoisonError},
    task::{Context, Poll},
};

use query_engine_config::batching::BatchingConfig;
use serde_json::{Map, Value};
use tokio::sync::oneshot;
use tracing::debug;

use crate::{batcher::error::FetchError, graphql::GraphQLRequest, transport::Transport};

pub type FetchResult = Result<Value, FetchError>;

struct QueueEntry {
    request: GraphQLRequest,
    responder: oneshot::Sender<FetchResult>,
}

type Queue = Arc<Mutex<Vec<QueueEntry>>>;

/// Groups operations issued close together into a single transport call.
///
/// The first operation added to an empty queue schedules a dispatch after
/// `batch_interval` (or right away when batching is disabled). Everything queued until
/// then is sent together, split into slices of at most `max_batch_size`, and every
/// caller receives exactly one result through its [`PendingResponse`].
///
/// Clones share the same queue.
#[derive(Clone)]
pub struct QueryBatcher {
    transport: Arc<dyn Transport>,
    config: BatchingConfig,
    queue: Queue,
}

impl QueryBatcher {
    pub fn new(transport: Arc<dyn Transport>, config: BatchingConfig) -> Self {
        QueryBatcher {
            transport,
            config,
            queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &BatchingConfig {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Queues `request` and returns a future for its result.
    ///
    /// The request is queued when this is called, not when the future is first polled.
    /// Must be called from within a tokio runtime.
    pub fn fetch(&self, request: GraphQLRequest) -> PendingResponse {
        let (responder, receiver) = oneshot::channel();
        let is_first = {
            let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            queue.push(QueueEntry { request, responder });
            queue.len() == 1
        };

        if is_first {
            self.schedule_dispatch();
        }

        PendingResponse { receiver }
    }

    pub fn fetch_parts(
        &self,
        query: impl Into<String>,
        variables: Option<Map<String, Value>>,
        operation_name: Option<String>,
    ) -> PendingResponse {
        self.fetch(GraphQLRequest {
            query: query.into(),
            variables,
            operation_name,
        })
    }

    /// Sends `request` on its own, right away, bypassing the shared queue.
    /// Must be called from within a tokio runtime.
    pub fn force_fetch(&self, request: GraphQLRequest) -> PendingResponse {
        QueryBatcher::new(self.transport.clone(), self.config.unbatched()).fetch(request)
    }

    fn schedule_dispatch(&self) {
        let queue = self.queue.clone();
        let transport = self.transport.clone();
        let delay = self.config.should_batch.then_some(self.config.batch_interval);
        let max_batch_size = self.config.max_batch_size;
        debug!(delay = ?delay, "dispatch scheduled");

        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let entries = take_queue(&queue);
            dispatch::dispatch(transport.as_ref(), entries, max_batch_size).await;
        });
    }
}

/// Swaps the queue for an empty one. Callers arriving afterwards start a new batch.
fn take_queue(queue: &Mutex<Vec<QueueEntry>>) -> Vec<QueueEntry> {
    std::mem::take(&mut *queue.lock().unwrap_or_else(PoisonError::into_inner))
}

/// Resolves with the data of one operation, or with the error that rejected it.
pub struct PendingResponse {
    receiver: oneshot::Receiver<FetchResult>,
}

impl Future for PendingResponse {
    type Output = FetchResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(FetchError::Dropped)))
    }
}

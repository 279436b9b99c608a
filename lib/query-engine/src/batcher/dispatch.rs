use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{
    batcher::{error::FetchError, FetchResult, QueueEntry},
    graphql::{GraphQLRequest, GraphQLResponse},
    transport::{Transport, TransportBody},
};

pub(super) async fn dispatch(
    transport: &dyn Transport,
    entries: Vec<QueueEntry>,
    max_batch_size: usize,
) {
    if entries.is_empty() {
        return;
    }

    let slices = into_slices(entries, max_batch_size);
    debug!(slices = slices.len(), "dispatching queued operations");

    join_all(
        slices
            .into_iter()
            .map(|slice| dispatch_slice(transport, slice)),
    )
    .await;
}

/// Consecutive slices of at most `max_batch_size` entries. `0` keeps everything together.
fn into_slices(entries: Vec<QueueEntry>, max_batch_size: usize) -> Vec<Vec<QueueEntry>> {
    if max_batch_size == 0 || entries.len() <= max_batch_size {
        return vec![entries];
    }

    let mut slices = Vec::with_capacity(entries.len().div_ceil(max_batch_size));
    let mut entries = entries.into_iter();
    loop {
        let slice: Vec<QueueEntry> = entries.by_ref().take(max_batch_size).collect();
        if slice.is_empty() {
            break;
        }
        slices.push(slice);
    }

    slices
}

#[instrument(level = "trace", name = "batch_dispatch", skip_all, fields(operations = entries.len()))]
async fn dispatch_slice(transport: &dyn Transport, entries: Vec<QueueEntry>) {
    let (requests, responders): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .map(|entry| (entry.request, entry.responder))
        .unzip();

    let results = send_slice(transport, requests).await;
    for (responder, result) in responders.into_iter().zip(results) {
        // the caller may have dropped its PendingResponse
        let _ = responder.send(result);
    }
}

async fn send_slice(transport: &dyn Transport, requests: Vec<GraphQLRequest>) -> Vec<FetchResult> {
    let expected = requests.len();
    let body = match <[GraphQLRequest; 1]>::try_from(requests) {
        Ok([request]) => TransportBody::Single(request),
        Err(requests) => TransportBody::Batch(requests),
    };

    let reply = match transport.send(body).await {
        Ok(reply) => reply,
        Err(err) => {
            debug!(error = %err, "transport failed, rejecting the whole batch");
            return vec![Err(FetchError::Transport(err)); expected];
        }
    };

    match split_reply(reply, expected) {
        Ok(replies) => replies.into_iter().map(into_result).collect(),
        Err(err) => {
            warn!(error = %err, "rejecting the whole batch");
            vec![Err(err); expected]
        }
    }
}

/// One reply per request, in request order. A single request may be answered with a
/// bare object or an array of one.
fn split_reply(reply: Value, expected: usize) -> Result<Vec<Value>, FetchError> {
    match reply {
        Value::Array(replies) if replies.len() == expected => Ok(replies),
        Value::Array(replies) => Err(FetchError::BatchLengthMismatch {
            expected,
            received: replies.len(),
        }),
        Value::Object(_) if expected == 1 => Ok(vec![reply]),
        _ if expected == 1 => Err(FetchError::MalformedReply(
            "expected a response object".to_string(),
        )),
        _ => Err(FetchError::MalformedReply(format!(
            "expected an array of {} responses",
            expected
        ))),
    }
}

fn into_result(reply: Value) -> FetchResult {
    let response: GraphQLResponse =
        serde_json::from_value(reply).map_err(|e| FetchError::MalformedReply(e.to_string()))?;

    if response.has_errors() {
        return Err(FetchError::GraphQL {
            errors: response.errors.unwrap_or_default(),
            data: response.data,
        });
    }

    Ok(response.data.unwrap_or(Value::Null))
}

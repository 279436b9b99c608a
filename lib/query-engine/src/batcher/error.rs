use serde_json::Value;

use crate::{graphql::GraphQLError, transport::TransportError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("GraphQL request failed: {}", join_messages(.errors))]
    GraphQL {
        errors: Vec<GraphQLError>,
        /// Partial data returned alongside the errors, if any.
        data: Option<Value>,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Batch response length mismatch: sent {expected} operations, received {received} results")]
    BatchLengthMismatch { expected: usize, received: usize },
    #[error("Malformed transport reply: {0}")]
    MalformedReply(String),
    #[error("The request was dropped before a response was delivered")]
    Dropped,
}

fn join_messages(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

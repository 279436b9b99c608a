pub mod http;

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::graphql::GraphQLRequest;

pub use self::http::HttpTransport;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Failed to send request: {0}")]
    Request(String),
    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response body: {0}")]
    Decode(String),
    #[error("Failed to serialize request body: {0}")]
    Serialize(String),
    #[error("Failed to build transport: {0}")]
    Build(String),
}

/// One operation on its own, or several sent together.
/// Serialized as a bare object or as an array respectively.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransportBody {
    Single(GraphQLRequest),
    Batch(Vec<GraphQLRequest>),
}

impl TransportBody {
    pub fn len(&self) -> usize {
        match self {
            TransportBody::Single(_) => 1,
            TransportBody::Batch(requests) => requests.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Performs the network round-trip. For a [`TransportBody::Batch`], the reply is
/// expected to be an array in request order; for a single request, a bare object
/// (an array of one element is accepted too).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, body: TransportBody) -> Result<Value, TransportError>;

    fn to_arc(self) -> Arc<dyn Transport>
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

type SendFn = dyn Fn(TransportBody) -> BoxFuture<'static, Result<Value, TransportError>> + Send + Sync;

/// A [`Transport`] backed by an async closure.
pub struct FnTransport {
    send: Box<SendFn>,
}

impl FnTransport {
    pub fn new<F, Fut>(send: F) -> Self
    where
        F: Fn(TransportBody) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, TransportError>> + Send + 'static,
    {
        FnTransport {
            send: Box::new(move |body| Box::pin(send(body))),
        }
    }
}

#[async_trait]
impl Transport for FnTransport {
    async fn send(&self, body: TransportBody) -> Result<Value, TransportError> {
        (self.send)(body).await
    }
}

pub mod batcher;
pub mod client;
pub mod generator;
pub mod graphql;
pub mod request;
pub mod schema;
pub mod transport;

#[cfg(test)]
mod tests;

pub use batcher::{error::FetchError, FetchResult, PendingResponse, QueryBatcher};
pub use client::{ClientError, GraphQLClient};
pub use generator::{error::GenerateError, OperationKind, QueryGenerator};
pub use graphql::{GraphQLError, GraphQLRequest, GraphQLResponse};
pub use request::{RequestNode, RequestParseError, Selection, FRAGMENT_PREFIX};
pub use schema::{Schema, SchemaError};
pub use transport::{FnTransport, HttpTransport, Transport, TransportBody, TransportError};

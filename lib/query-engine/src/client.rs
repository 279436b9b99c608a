use std::sync::Arc;

use query_engine_config::EngineConfig;
use tracing::{debug, info};

use crate::{
    batcher::{PendingResponse, QueryBatcher},
    generator::{error::GenerateError, OperationKind, QueryGenerator},
    request::RequestNode,
    schema::{Schema, SchemaError},
    transport::{HttpTransport, Transport, TransportError},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Failed to read the schema: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Generates operations from request trees and sends them through a shared
/// [`QueryBatcher`].
///
/// Generation errors are returned right away; fetch errors surface when the
/// returned [`PendingResponse`] is awaited.
#[derive(Clone)]
pub struct GraphQLClient {
    schema: Arc<Schema>,
    batcher: QueryBatcher,
}

impl GraphQLClient {
    pub fn new(schema: Arc<Schema>, batcher: QueryBatcher) -> Self {
        GraphQLClient { schema, batcher }
    }

    /// Loads the schema file and builds an HTTP-backed batcher.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ClientError> {
        let raw_schema = config.schema.load(config.root_directory())?;
        let schema = Schema::from_json(&raw_schema)?;
        debug!(types = schema.len(), path = %config.schema.path, "schema loaded");

        let transport = HttpTransport::new(&config.transport)?;
        info!(endpoint = transport.endpoint(), "using HTTP transport");
        let batcher = QueryBatcher::new(transport.to_arc(), config.batching.clone());

        Ok(GraphQLClient::new(Arc::new(schema), batcher))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn batcher(&self) -> &QueryBatcher {
        &self.batcher
    }

    /// Generates a query and queues it on the batcher.
    ///
    /// Must be called from within a tokio runtime, the dispatch runs as a spawned task.
    pub fn query(&self, request: &RequestNode) -> Result<PendingResponse, GenerateError> {
        let operation = QueryGenerator::new(&self.schema).generate_query(request)?;
        Ok(self.batcher.fetch(operation))
    }

    /// Generates a mutation and queues it on the batcher.
    ///
    /// Must be called from within a tokio runtime, the dispatch runs as a spawned task.
    pub fn mutate(&self, request: &RequestNode) -> Result<PendingResponse, GenerateError> {
        let operation = QueryGenerator::new(&self.schema).generate_mutation(request)?;
        Ok(self.batcher.fetch(operation))
    }

    /// Like [`GraphQLClient::query`], but skips the batching queue.
    ///
    /// Must be called from within a tokio runtime, the dispatch runs as a spawned task.
    pub fn force_query(&self, request: &RequestNode) -> Result<PendingResponse, GenerateError> {
        let operation = QueryGenerator::new(&self.schema).generate_query(request)?;
        Ok(self.batcher.force_fetch(operation))
    }

    /// Sends an operation of `kind` rooted at `root_type`, for schemas that do not use
    /// the default `Query`/`Mutation` root names.
    ///
    /// Must be called from within a tokio runtime, the dispatch runs as a spawned task.
    pub fn execute(
        &self,
        kind: OperationKind,
        root_type: &str,
        request: &RequestNode,
    ) -> Result<PendingResponse, GenerateError> {
        let operation = QueryGenerator::new(&self.schema).generate(kind, root_type, request)?;
        Ok(self.batcher.fetch(operation))
    }
}

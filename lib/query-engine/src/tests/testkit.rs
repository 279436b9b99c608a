use std::path::PathBuf;
use std::sync::{Arc, Mutex, Once};

use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::graphql::GraphQLRequest;
use crate::schema::Schema;
use crate::transport::{FnTransport, Transport, TransportBody, TransportError};

fn init_test_logger_internal() {
    let tree_layer = tracing_tree::HierarchicalLayer::new(2)
        .with_bracketed_fields(true)
        .with_deferred_spans(false)
        .with_wraparound(25)
        .with_indent_lines(true)
        .with_timer(tracing_tree::time::Uptime::default())
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_targets(false);

    tracing_subscriber::registry()
        .with(tree_layer)
        .with(EnvFilter::from_default_env())
        .init();
}

lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn init_logger() {
    TRACING_INIT.call_once(|| {
        init_test_logger_internal();
    });
}

pub fn read_fixture(fixture_path: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(fixture_path);
    std::fs::read_to_string(path).expect("Unable to read fixture file")
}

pub fn read_schema(fixture_path: &str) -> Schema {
    Schema::from_json(&read_fixture(fixture_path)).expect("failed to link schema")
}

pub fn anilist_schema() -> Schema {
    read_schema("fixture/anilist.schema.json")
}

pub type SentBodies = Arc<Mutex<Vec<TransportBody>>>;

pub fn sent(bodies: &SentBodies) -> Vec<TransportBody> {
    bodies.lock().expect("sent bodies lock").clone()
}

/// Records every body it is given, then answers with `reply`.
pub fn recording_transport<F>(reply: F) -> (Arc<dyn Transport>, SentBodies)
where
    F: Fn(&TransportBody) -> Result<Value, TransportError> + Send + Sync + 'static,
{
    let bodies = SentBodies::default();
    let recorded = bodies.clone();
    let transport = FnTransport::new(move |body: TransportBody| {
        recorded.lock().expect("sent bodies lock").push(body.clone());
        let result = reply(&body);
        async move { result }
    });

    (transport.to_arc(), bodies)
}

/// Answers every operation with `{"data": {"echo": <query>}}`.
pub fn echo_transport() -> (Arc<dyn Transport>, SentBodies) {
    recording_transport(|body| Ok(echo_reply(body)))
}

pub fn echo_reply(body: &TransportBody) -> Value {
    match body {
        TransportBody::Single(request) => echo_data(request),
        TransportBody::Batch(requests) => Value::Array(requests.iter().map(echo_data).collect()),
    }
}

fn echo_data(request: &GraphQLRequest) -> Value {
    json!({ "data": { "echo": request.query } })
}

pub fn queries(body: &TransportBody) -> Vec<&str> {
    match body {
        TransportBody::Single(request) => vec![request.query.as_str()],
        TransportBody::Batch(requests) => requests.iter().map(|r| r.query.as_str()).collect(),
    }
}

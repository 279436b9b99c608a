mod logger;

use std::env;
use std::process;

use anyhow::Context;
use query_engine::{
    GraphQLClient, GraphQLRequest, OperationKind, QueryGenerator, RequestNode, Schema,
};
use query_engine_config::{load_config, log::LoggingConfig};
use tracing::debug;

use crate::logger::configure_logging;

const USAGE: &str = "Usage: qe-dev-cli <command> [...]

Commands:
  schema <schema_path>                                print the linked schema
  generate <schema_path> <request_path> [--mutation]  print the generated operation
  fetch <request_path> [--mutation]                   send the request to the configured endpoint";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Schema {
        schema_path: String,
    },
    Generate {
        schema_path: String,
        request_path: String,
        kind: OperationKind,
    },
    Fetch {
        request_path: String,
        kind: OperationKind,
    },
}

impl Command {
    /// Parses the arguments after the binary name.
    fn parse(args: &[String]) -> Result<Command, String> {
        let kind = if args.iter().any(|arg| arg == "--mutation") {
            OperationKind::Mutation
        } else {
            OperationKind::Query
        };
        let positional = args
            .iter()
            .filter(|arg| *arg != "--mutation")
            .map(String::as_str)
            .collect::<Vec<_>>();

        match positional.as_slice() {
            ["schema", schema_path] => Ok(Command::Schema {
                schema_path: schema_path.to_string(),
            }),
            ["generate", schema_path, request_path] => Ok(Command::Generate {
                schema_path: schema_path.to_string(),
                request_path: request_path.to_string(),
                kind,
            }),
            ["fetch", request_path] => Ok(Command::Fetch {
                request_path: request_path.to_string(),
                kind,
            }),
            [] => Err("missing <command>".to_string()),
            ["schema" | "generate" | "fetch", ..] => {
                Err(format!("wrong arguments for '{}'", positional[0]))
            }
            [command, ..] => Err(format!("unknown command: {}", command)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}\n\n{}", message, USAGE);
            process::exit(1);
        }
    };

    match command {
        Command::Schema { schema_path } => {
            configure_logging(&LoggingConfig::default());
            print!("{}", read_schema(&schema_path)?);
        }
        Command::Generate {
            schema_path,
            request_path,
            kind,
        } => {
            configure_logging(&LoggingConfig::default());
            let operation = generate_operation(&schema_path, &request_path, kind)?;

            println!("{}", serde_json::to_string_pretty(&operation)?);
        }
        Command::Fetch { request_path, kind } => {
            let config_path = env::var("ENGINE_CONFIG_FILE_PATH").ok();
            let config = load_config(config_path)?;
            configure_logging(&config.log);

            let client = GraphQLClient::from_config(&config)?;
            let request = read_request(&request_path)?;
            let pending = match kind {
                OperationKind::Query => client.query(&request)?,
                OperationKind::Mutation => client.mutate(&request)?,
            };
            let data = pending.await?;

            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}

fn generate_operation(
    schema_path: &str,
    request_path: &str,
    kind: OperationKind,
) -> anyhow::Result<GraphQLRequest> {
    let schema = read_schema(schema_path)?;
    let request = read_request(request_path)?;

    Ok(QueryGenerator::new(&schema).generate(kind, kind.default_root_type(), &request)?)
}

fn read_schema(path: &str) -> anyhow::Result<Schema> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read schema file {}", path))?;
    let schema = Schema::from_json(&raw)?;
    debug!(types = schema.len(), "schema linked");

    Ok(schema)
}

fn read_request(path: &str) -> anyhow::Result<RequestNode> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read request file {}", path))?;

    Ok(RequestNode::from_json(&raw)?)
}

#[cfg(test)]
mod tests {
    use query_engine::OperationKind;

    use super::{generate_operation, read_schema, Command};

    const SCHEMA: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../lib/query-engine/fixture/anilist.schema.json"
    );
    const REQUEST: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixture/viewer.request.json");

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn mutation_flag_is_accepted_anywhere() {
        assert_eq!(
            Command::parse(&args(&["fetch", "--mutation", "req.json"])),
            Ok(Command::Fetch {
                request_path: "req.json".to_string(),
                kind: OperationKind::Mutation,
            })
        );
        assert_eq!(
            Command::parse(&args(&["generate", "s.json", "r.json"])),
            Ok(Command::Generate {
                schema_path: "s.json".to_string(),
                request_path: "r.json".to_string(),
                kind: OperationKind::Query,
            })
        );
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(
            Command::parse(&args(&["generate", "s.json"])),
            Err("wrong arguments for 'generate'".to_string())
        );
        assert_eq!(
            Command::parse(&args(&["serve", "x"])),
            Err("unknown command: serve".to_string())
        );
        assert_eq!(Command::parse(&[]), Err("missing <command>".to_string()));
    }

    // schema and generate only touch the files they are given
    #[test]
    fn offline_commands_read_only_their_files() {
        let schema = read_schema(SCHEMA).expect("schema should link");
        assert!(schema.to_string().contains("Viewer"));

        let operation = generate_operation(SCHEMA, REQUEST, OperationKind::Query)
            .expect("operation should generate");
        assert_eq!(operation.query, "query{Viewer{id}}");
    }
}

use crate::{error::JoinEngineError, opt::JoinEngineOpt, JoinEngineResult};
use join_core::{AmbientContext, JoinExecutor};
use memory_connector::MemoryConnector;
use request_handlers::{render_graphql_schema, GQLResponse, GraphqlBody, RequestHandler};
use std::{
    io::Read,
    path::{Path, PathBuf},
};

pub struct ExecuteRequest {
    datamodel: PathBuf,
    body: GraphqlBody,
}

pub struct PrintSchemaRequest {
    datamodel: PathBuf,
}

pub enum CliCommand {
    ExecuteRequest(ExecuteRequest),
    PrintSchema(PrintSchemaRequest),
}

impl CliCommand {
    /// Create a CLI command from a `JoinEngineOpt` instance.
    pub fn from_opt(opts: &JoinEngineOpt) -> JoinEngineResult<CliCommand> {
        let datamodel = opts.datamodel.clone();

        if opts.print_schema {
            return Ok(CliCommand::PrintSchema(PrintSchemaRequest { datamodel }));
        }

        let query = match (&opts.query, &opts.query_file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => read_query(path)?,
            (None, None) => {
                return Err(JoinEngineError::InvocationError(
                    "Either --query or --query-file must be given.".to_owned(),
                ))
            }
        };

        let mut body = GraphqlBody::new(query);

        if let Some(operation_name) = &opts.operation_name {
            body = body.with_operation_name(operation_name);
        }

        if let Some(variables) = &opts.variables {
            let variables: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(variables).map_err(|err| JoinEngineError::JsonDecodeError(err.into()))?;

            for (name, value) in variables {
                body = body.with_variable(name, value);
            }
        }

        Ok(CliCommand::ExecuteRequest(ExecuteRequest { datamodel, body }))
    }

    pub async fn execute(self) -> JoinEngineResult<()> {
        match self {
            CliCommand::ExecuteRequest(request) => {
                let response = Self::execute_request(request).await?;
                println!("{}", serde_json::to_string(&response)?);
            }
            CliCommand::PrintSchema(request) => {
                let connector = MemoryConnector::load(&request.datamodel)?;
                println!("{}", render_graphql_schema(&connector.query_schema()));
            }
        }

        Ok(())
    }

    async fn execute_request(request: ExecuteRequest) -> JoinEngineResult<GQLResponse> {
        let connector = MemoryConnector::load(&request.datamodel)?;
        let query_schema = connector.query_schema();
        let executor = JoinExecutor::new();
        let handler = RequestHandler::new(&executor, &query_schema);

        let response = handler.handle(request.body, AmbientContext::empty()).await;

        info!(
            fetches = connector.database().fetch_log().len(),
            errors = response.errors().count(),
            "Executed request"
        );

        Ok(response)
    }
}

fn read_query(path: &Path) -> JoinEngineResult<String> {
    if path == Path::new("-") {
        let mut query = String::new();
        std::io::stdin().read_to_string(&mut query)?;
        Ok(query)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use structopt::StructOpt;

    const LIBRARY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/library.toml");

    fn opts(args: &[&str]) -> JoinEngineOpt {
        JoinEngineOpt::from_iter_safe(["join-engine", "--datamodel", LIBRARY].iter().chain(args).copied()).unwrap()
    }

    #[test]
    fn queries_are_required_unless_printing_the_schema() {
        let err = CliCommand::from_opt(&opts(&[])).err().unwrap();
        assert_eq!(err.to_string(), "Either --query or --query-file must be given.");

        assert!(matches!(
            CliCommand::from_opt(&opts(&["--print-schema"])).unwrap(),
            CliCommand::PrintSchema(_)
        ));
    }

    #[test]
    fn log_format_defaults_to_text() {
        assert_eq!(opts(&[]).log_format(), LogFormat::Text);
        assert_eq!(opts(&["--log-format", "json"]).log_format(), LogFormat::Json);
    }

    #[test]
    fn invalid_variables_are_rejected() {
        let err = CliCommand::from_opt(&opts(&["--query", "{ books { id } }", "--variables", "[1]"]))
            .err()
            .unwrap();

        assert!(matches!(err, JoinEngineError::JsonDecodeError(_)));
    }

    #[tokio::test]
    async fn executes_queries_with_variables() {
        let command = CliCommand::from_opt(&opts(&[
            "--query",
            "query ($id: Int!) { author(id: $id) { name books { title } } }",
            "--variables",
            r#"{ "id": 2 }"#,
        ]))
        .unwrap();

        let request = match command {
            CliCommand::ExecuteRequest(request) => request,
            CliCommand::PrintSchema(_) => unreachable!(),
        };

        let response = CliCommand::execute_request(request).await.unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "data": { "author": { "name": "Joseph Heller", "books": [{ "title": "Catch-22" }] } } })
        );
    }
}

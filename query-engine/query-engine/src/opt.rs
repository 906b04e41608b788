use crate::LogFormat;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "join-engine", about = "Resolves GraphQL queries against a declarative datamodel")]
pub struct JoinEngineOpt {
    /// Path to the datamodel, a TOML or JSON file.
    #[structopt(long, short = "d", env = "JE_DATAMODEL", parse(from_os_str))]
    pub datamodel: PathBuf,

    /// The GraphQL query to execute.
    #[structopt(long, short = "q", conflicts_with = "query-file")]
    pub query: Option<String>,

    /// Read the GraphQL query from a file, `-` for stdin.
    #[structopt(long, parse(from_os_str))]
    pub query_file: Option<PathBuf>,

    /// Variables of the query, as a JSON object.
    #[structopt(long)]
    pub variables: Option<String>,

    /// The operation to execute in a document with several operations.
    #[structopt(long)]
    pub operation_name: Option<String>,

    /// Set the log format.
    #[structopt(long = "log-format", env = "JE_LOG_FORMAT", default_value = "text", possible_values = &["text", "json"])]
    log_format: String,

    /// Print the schema of the datamodel as GraphQL SDL instead of executing a query.
    #[structopt(long)]
    pub print_schema: bool,
}

impl JoinEngineOpt {
    pub fn log_format(&self) -> LogFormat {
        match self.log_format.as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

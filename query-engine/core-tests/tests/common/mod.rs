#![allow(dead_code)]

use join_core::{AmbientContext, JoinExecutor};
use memory_connector::{Datamodel, FetchLog, MemoryConnector};
use request_handlers::{GraphqlBody, RequestHandler};

pub const LIBRARY: &str = include_str!("../../../../demos/library.toml");

/// A datamodel loaded into a memory connector, queried through the request
/// handler the way the binary does it.
pub struct TestEngine {
    connector: MemoryConnector,
}

impl TestEngine {
    pub fn new(datamodel: &str) -> Self {
        Self {
            connector: MemoryConnector::from_toml_str(datamodel).unwrap(),
        }
    }

    pub fn from_datamodel(datamodel: Datamodel) -> Self {
        Self {
            connector: MemoryConnector::from_datamodel(datamodel).unwrap(),
        }
    }

    pub fn library() -> Self {
        Self::new(LIBRARY)
    }

    pub async fn query(&self, query: &str) -> serde_json::Value {
        self.request(GraphqlBody::new(query)).await
    }

    pub async fn request(&self, body: GraphqlBody) -> serde_json::Value {
        let query_schema = self.connector.query_schema();
        let executor = JoinExecutor::new();
        let handler = RequestHandler::new(&executor, &query_schema);

        let response = handler.handle(body, AmbientContext::empty()).await;

        serde_json::to_value(&response).unwrap()
    }

    /// The data of a successful query.
    pub async fn data(&self, query: &str) -> serde_json::Value {
        let response = self.query(query).await;

        assert!(response.get("errors").is_none(), "unexpected errors: {response}");
        response["data"].clone()
    }

    /// The first error of a failed query, as `(error code, message)`.
    pub async fn error(&self, query: &str) -> (String, String) {
        let response = self.query(query).await;

        assert!(response.get("data").is_none(), "unexpected data: {response}");

        let error = &response["errors"][0];
        let code = error["user_facing_error"]["error_code"].as_str().unwrap_or_default().to_owned();
        let message = error["error"].as_str().unwrap().to_owned();

        (code, message)
    }

    pub fn fetches(&self, table: &str) -> usize {
        self.connector.database().fetch_count(table)
    }

    pub fn fetch_log(&self) -> Vec<FetchLog> {
        self.connector.database().fetch_log()
    }

    pub fn reset(&self) {
        self.connector.database().clear_fetch_log()
    }
}

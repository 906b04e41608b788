use super::GraphQLProtocolAdapter;
use crate::HandlerError;
use indexmap::IndexMap;
use join_core::Operation;
use join_value::JoinValue;
use serde::{Deserialize, Deserializer, Serialize};

/// A GraphQL request as it arrives over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlBody {
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_variables",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub variables: IndexMap<String, serde_json::Value>,
}

impl GraphqlBody {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Parses the query text and converts the selected operation.
    pub fn into_operation(self) -> crate::Result<Operation> {
        let gql_doc = graphql_parser::parse_query::<String>(&self.query)?;
        let mut variables = IndexMap::with_capacity(self.variables.len());

        for (name, value) in self.variables {
            match JoinValue::try_from(value) {
                Ok(value) => {
                    variables.insert(name, value);
                }
                Err(err) => {
                    return Err(HandlerError::query_conversion(format!(
                        "Invalid value for variable `${name}`: {err}"
                    )))
                }
            }
        }

        GraphQLProtocolAdapter::convert(&gql_doc, self.operation_name, variables)
    }
}

fn deserialize_variables<'de, D>(deserializer: D) -> Result<IndexMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IndexMap<String, serde_json::Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

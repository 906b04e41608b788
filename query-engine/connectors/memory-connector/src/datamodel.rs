//! The serialized form of a datamodel.
//!
//! ```toml
//! [[tables]]
//! name = "authors"
//! columns = [
//!   { name = "id", type = "int" },
//!   { name = "name", type = "string" },
//! ]
//! rows = [{ id = 1, name = "PG Wodehouse" }]
//! relationships = [{ name = "books", target = "books" }]
//!
//! [[query]]
//! name = "author"
//! target = "authors"
//! cardinality = "single_or_null"
//! arguments = [{ name = "id", column = "id", required = true }]
//! ```

use crate::{DatamodelError, Result};
use indexmap::IndexMap;
use join_core::{schema::ScalarType, Cardinality};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Datamodel {
    #[serde(default)]
    pub tables: Vec<TableDefinition>,

    /// Fields of the root entity.
    #[serde(default)]
    pub query: Vec<RelationshipDefinition>,
}

impl Datamodel {
    /// Reads a datamodel file, TOML or JSON depending on its extension.
    pub fn load(path: &Path) -> Result<Datamodel> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let contents = std::fs::read_to_string(path)?;

        match extension {
            "toml" => Self::from_toml_str(&contents),
            "json" => Self::from_json_str(&contents),
            other => Err(DatamodelError::UnsupportedFormat(other.to_owned())),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Datamodel> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Datamodel> {
        Ok(serde_json::from_str(contents)?)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TableDefinition {
    pub name: String,

    /// Name of the entity, the table name in UpperCamelCase by default.
    #[serde(default)]
    pub entity: Option<String>,

    pub columns: Vec<ColumnDefinition>,

    #[serde(default)]
    pub rows: Vec<IndexMap<String, serde_json::Value>>,

    #[serde(default)]
    pub relationships: Vec<RelationshipDefinition>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColumnDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,

    #[serde(default)]
    pub nullable: bool,

    /// Foreign key, as `table.column`.
    #[serde(default)]
    pub references: Option<String>,

    #[serde(default)]
    pub internal: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int,
    Float,
    String,
    Boolean,
    Id,
}

impl From<ColumnType> for ScalarType {
    fn from(typ: ColumnType) -> Self {
        match typ {
            ColumnType::Int => ScalarType::Int,
            ColumnType::Float => ScalarType::Float,
            ColumnType::String => ScalarType::String,
            ColumnType::Boolean => ScalarType::Boolean,
            ColumnType::Id => ScalarType::ID,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RelationshipDefinition {
    /// Name of the field, used as is.
    pub name: String,

    /// Name of the target table.
    pub target: String,

    #[serde(default)]
    pub cardinality: CardinalityDefinition,

    /// Column pairs to join on. Inferred from the foreign keys between the
    /// tables when absent.
    #[serde(default)]
    pub join: Option<Vec<JoinDefinition>>,

    #[serde(default)]
    pub arguments: Vec<ArgumentDefinition>,

    /// Equality conditions always applied to the target rows.
    #[serde(default)]
    pub filter: Vec<FilterDefinition>,

    #[serde(default)]
    pub internal: bool,

    /// Field of the target to extract.
    #[serde(default)]
    pub extract: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityDefinition {
    #[default]
    Many,
    Single,
    SingleOrNull,
    FirstOrNull,
}

impl From<CardinalityDefinition> for Cardinality {
    fn from(cardinality: CardinalityDefinition) -> Self {
        match cardinality {
            CardinalityDefinition::Many => Cardinality::Many,
            CardinalityDefinition::Single => Cardinality::Single,
            CardinalityDefinition::SingleOrNull => Cardinality::SingleOrNull,
            CardinalityDefinition::FirstOrNull => Cardinality::FirstOrNull,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JoinDefinition {
    /// Column of the table declaring the relationship.
    pub parent: String,

    /// Column of the target table.
    pub child: String,
}

/// An argument restricting the target rows to those whose `column` equals
/// the given value, or one of the given values for list arguments.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArgumentDefinition {
    pub name: String,
    pub column: String,

    /// Type of the argument, the column type by default.
    #[serde(default, rename = "type")]
    pub argument_type: Option<ColumnType>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub list: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterDefinition {
    pub column: String,
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn toml_and_json_datamodels_are_equivalent() {
        let toml = Datamodel::from_toml_str(indoc! {r#"
            [[tables]]
            name = "authors"
            columns = [{ name = "id", type = "int" }]
            rows = [{ id = 1 }]

            [[query]]
            name = "author"
            target = "authors"
            cardinality = "single_or_null"
            arguments = [{ name = "id", column = "id", required = true }]
        "#})
        .unwrap();

        let json = Datamodel::from_json_str(indoc! {r#"
            {
              "tables": [
                { "name": "authors", "columns": [{ "name": "id", "type": "int" }], "rows": [{ "id": 1 }] }
              ],
              "query": [
                {
                  "name": "author",
                  "target": "authors",
                  "cardinality": "single_or_null",
                  "arguments": [{ "name": "id", "column": "id", "required": true }]
                }
              ]
            }
        "#})
        .unwrap();

        assert_eq!(toml, json);
        assert_eq!(toml.query[0].cardinality, CardinalityDefinition::SingleOrNull);
        assert_eq!(toml.tables[0].relationships, vec![]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Datamodel::from_toml_str(indoc! {r#"
            [[tables]]
            name = "authors"
            columns = []
            colour = "blue"
        "#})
        .unwrap_err();

        assert!(matches!(err, DatamodelError::Toml(_)));
    }
}

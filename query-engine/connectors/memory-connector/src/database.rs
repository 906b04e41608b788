use crate::{Condition, TableQuery};
use async_trait::async_trait;
use indexmap::IndexMap;
use join_core::{
    schema::ScalarType, AmbientContext, CoreError, CoreResult, ErrorKind, FetchImmediates,
    QueryContext, Request, Row,
};
use join_value::JoinValue;
use parking_lot::Mutex;
use std::{collections::HashSet, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ScalarType,
    pub nullable: bool,

    /// Foreign key as `(table, column)`.
    pub references: Option<(String, String)>,
    pub internal: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,

    /// Rows, positionally aligned to `columns`.
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// One call of a table fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchLog {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: usize,
}

#[derive(Debug, Default)]
pub struct Database {
    tables: IndexMap<String, Table>,
    log: Mutex<Vec<FetchLog>>,
}

impl Database {
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables.into_iter().map(|table| (table.name.clone(), table)).collect(),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn table(&self, name: &str) -> CoreResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| ErrorKind::TableDoesNotExist(name.to_owned()).into())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Every fetch served so far, in order.
    pub fn fetch_log(&self) -> Vec<FetchLog> {
        self.log.lock().clone()
    }

    pub fn fetch_count(&self, table: &str) -> usize {
        self.log.lock().iter().filter(|entry| entry.table == table).count()
    }

    pub fn clear_fetch_log(&self) {
        self.log.lock().clear();
    }

    /// The rows of the query's table satisfying all its conditions, in table
    /// order.
    pub fn select(&self, query: &TableQuery) -> CoreResult<Vec<&Row>> {
        let table = self.table(&query.table)?;
        let mut rows: Vec<&Row> = table.rows.iter().collect();

        for condition in &query.conditions {
            match condition {
                Condition::Equals { column, value } => {
                    let idx = column_index(table, column)?;
                    rows.retain(|row| !value.is_null() && &row[idx] == value);
                }

                Condition::OneOf { column, values } => {
                    let idx = column_index(table, column)?;
                    rows.retain(|row| !row[idx].is_null() && values.contains(&row[idx]));
                }

                Condition::In {
                    column,
                    subquery,
                    subquery_column,
                } => {
                    let idx = column_index(table, column)?;
                    let sub_idx = column_index(self.table(&subquery.table)?, subquery_column)?;

                    let values: HashSet<&JoinValue> = self
                        .select(subquery)?
                        .into_iter()
                        .map(|row| &row[sub_idx])
                        .filter(|value| !value.is_null())
                        .collect();

                    rows.retain(|row| values.contains(&row[idx]));
                }
            }
        }

        Ok(rows)
    }

    fn record(&self, entry: FetchLog) {
        self.log.lock().push(entry);
    }
}

fn column_index(table: &Table, column: &str) -> CoreResult<usize> {
    table.column_index(column).ok_or_else(|| {
        ErrorKind::ColumnDoesNotExist {
            table: table.name.clone(),
            column: column.to_owned(),
        }
        .into()
    })
}

/// Fetches the rows of one table, reading the column of each requested
/// immediate field.
#[derive(Debug, Clone)]
pub struct TableFetcher {
    database: Arc<Database>,
    table: String,
}

impl TableFetcher {
    pub fn new(database: Arc<Database>, table: impl Into<String>) -> Self {
        Self {
            database,
            table: table.into(),
        }
    }
}

#[async_trait]
impl FetchImmediates for TableFetcher {
    async fn fetch_immediates(
        &self,
        selections: &[Request],
        query: &QueryContext,
        _ambient: &AmbientContext,
    ) -> CoreResult<Vec<Row>> {
        let query = match query.downcast_ref::<TableQuery>() {
            Some(query) if query.table == self.table => query.clone(),
            Some(_) => return Err(ErrorKind::UnexpectedQueryContext("TableQuery of the fetched table").into()),
            None if query.is_empty() => TableQuery::all(&self.table),
            None => return Err(ErrorKind::UnexpectedQueryContext("TableQuery").into()),
        };

        let table = self.database.table(&self.table)?;

        let columns = selections
            .iter()
            .map(|request| {
                let field = request
                    .field()
                    .as_immediate()
                    .ok_or_else(|| CoreError::from(ErrorKind::NotAColumn(request.key().to_owned())))?;

                column_index(table, field.column()).map(|idx| (field.column().to_owned(), idx))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let rows: Vec<Row> = self
            .database
            .select(&query)?
            .into_iter()
            .map(|row| columns.iter().map(|(_, idx)| row[*idx].clone()).collect())
            .collect();

        trace!(table = %self.table, conditions = query.conditions.len(), "Selected rows");

        self.database.record(FetchLog {
            table: self.table.clone(),
            columns: columns.into_iter().map(|(name, _)| name).collect(),
            rows: rows.len(),
        });

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn column(name: &str, references: Option<(&str, &str)>) -> Column {
        Column {
            name: name.to_owned(),
            column_type: ScalarType::Int,
            nullable: true,
            references: references.map(|(t, c)| (t.to_owned(), c.to_owned())),
            internal: false,
        }
    }

    fn database() -> Database {
        Database::new([
            Table {
                name: "authors".to_owned(),
                columns: vec![column("id", None)],
                rows: vec![vec![JoinValue::Int(1)], vec![JoinValue::Int(2)], vec![JoinValue::Int(3)]],
            },
            Table {
                name: "books".to_owned(),
                columns: vec![column("id", None), column("author_id", Some(("authors", "id")))],
                rows: vec![
                    vec![JoinValue::Int(1), JoinValue::Int(1)],
                    vec![JoinValue::Int(2), JoinValue::Int(3)],
                    vec![JoinValue::Int(3), JoinValue::Null],
                ],
            },
        ])
    }

    #[test]
    fn subqueries_restrict_rows_to_the_parent_values() {
        let database = database();
        let books = TableQuery::all("books").and(Condition::one_of("id", vec![JoinValue::Int(2), JoinValue::Int(3)]));
        let authors = TableQuery::all("authors").and(Condition::in_subquery("id", books, "author_id"));

        let selected = database.select(&authors).unwrap();

        assert_eq!(selected, vec![&vec![JoinValue::Int(3)]]);
    }

    #[test]
    fn unknown_columns_are_connector_errors() {
        let database = database();
        let err = database
            .select(&TableQuery::all("books").and(Condition::equals("isbn", JoinValue::Int(1))))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error in connector: Column `isbn` does not exist on table `books`."
        );
    }
}

use crate::{
    schema::QuerySchemaRef, AmbientContext, Cardinality, CoreError, CoreResult, Operation, QueryContext,
    QueryDocumentParser, ResponseData,
};
use async_trait::async_trait;
use tracing_futures::Instrument;

/// Central query executor and main entry point into the query core.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Validates the whole selection tree of `operation` against the entities
    /// of `query_schema`, then resolves it starting from the root entity.
    async fn execute(
        &self,
        operation: Operation,
        query_schema: QuerySchemaRef,
        ambient: AmbientContext,
    ) -> CoreResult<ResponseData>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JoinExecutor;

impl JoinExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QueryExecutor for JoinExecutor {
    async fn execute(
        &self,
        operation: Operation,
        query_schema: QuerySchemaRef,
        ambient: AmbientContext,
    ) -> CoreResult<ResponseData> {
        let span = info_span!("execute", operation = operation.name().unwrap_or("<anonymous>"));

        async move {
            let root = query_schema.root();
            let requests = QueryDocumentParser::parse(root, operation.selections)?;
            let query = QueryContext::empty();

            let records = root.fetch(&requests, &[], &query, &ambient).await?;
            let value = Cardinality::Single.apply(records.into_iter().map(|record| record.value).collect())?;

            let data = value
                .into_map()
                .ok_or_else(|| CoreError::schema_error("The root entity did not produce an object."))?;

            Ok(ResponseData::new(data))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::{test_fixtures::Library, *};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn invalid_documents_fetch_nothing() {
        let library = Library::new();
        let err = library
            .execute(vec![Selection::new("books").with_selections([
                Selection::new("title"),
                Selection::new("author").with_selection(Selection::new("age")),
            ])])
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::QueryParserError(_)));
        assert_eq!(library.book_fetches(), 0);
        assert_eq!(library.author_fetches(), 0);
    }

    #[tokio::test]
    async fn missing_single_or_null_values_are_null() {
        let library = Library::new();
        let data = library
            .execute(vec![Selection::new("author")
                .with_argument("id", 100)
                .with_selection(Selection::new("name"))])
            .await
            .unwrap();

        assert_eq!(data, json!({ "author": null }));
    }

    #[tokio::test]
    async fn extraction_unwraps_scalars_and_objects() {
        let library = Library::new();
        let data = library
            .execute(vec![
                Selection::new("bookTitles"),
                Selection::new("books").with_selections([
                    Selection::new("title"),
                    Selection::new("booksBySameAuthor").with_selection(Selection::new("title")),
                ]),
            ])
            .await
            .unwrap();

        assert_eq!(
            data["bookTitles"],
            json!(["Leave It to Psmith", "Right Ho, Jeeves", "Catch-22"])
        );
        assert_eq!(
            data["books"][2],
            json!({ "title": "Catch-22", "booksBySameAuthor": [{ "title": "Catch-22" }] })
        );
        assert_eq!(
            data["books"][0]["booksBySameAuthor"],
            json!([{ "title": "Leave It to Psmith" }, { "title": "Right Ho, Jeeves" }])
        );
    }

    #[tokio::test]
    async fn single_relationships_without_a_match_fail() {
        let library = Library::with_books(vec![(1, "Orphan", 42)]);
        let err = library
            .execute(vec![Selection::new("books")
                .with_selection(Selection::new("author").with_selection(Selection::new("name")))])
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Expected 1 value but got 0");
    }
}

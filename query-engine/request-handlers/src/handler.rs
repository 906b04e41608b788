use crate::{introspection, GQLError, GQLResponse, GraphqlBody};
use futures::FutureExt;
use join_core::{schema::QuerySchemaRef, AmbientContext, Operation, QueryExecutor, ResponseData};
use std::{fmt, panic::AssertUnwindSafe};

pub struct RequestHandler<'a> {
    executor: &'a (dyn QueryExecutor + 'a),
    query_schema: &'a QuerySchemaRef,
}

impl<'a> fmt::Debug for RequestHandler<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler").finish()
    }
}

impl<'a> RequestHandler<'a> {
    pub fn new(executor: &'a (dyn QueryExecutor + 'a), query_schema: &'a QuerySchemaRef) -> Self {
        Self { executor, query_schema }
    }

    /// Runs one request to completion. Failures, panics of the collaborators
    /// included, are reported in the response.
    pub async fn handle(&self, body: GraphqlBody, ambient: AmbientContext) -> GQLResponse {
        debug!("Incoming GraphQL query: {:?}", &body);

        match AssertUnwindSafe(self.handle_request(body, ambient)).catch_unwind().await {
            Ok(Ok(response)) => response.into(),
            Ok(Err(err)) => err.into(),
            Err(err) => {
                // panicked
                GQLError::from_panic_payload(err).into()
            }
        }
    }

    async fn handle_request(&self, body: GraphqlBody, ambient: AmbientContext) -> crate::Result<ResponseData> {
        let operation = body.into_operation()?;
        let (selections, meta_selections) =
            introspection::split(self.query_schema.query().name(), operation.selections)?;

        let introspected = meta_selections
            .iter()
            .map(|selection| Ok((selection.key().to_owned(), introspection::resolve(self.query_schema, selection)?)))
            .collect::<crate::Result<Vec<_>>>()?;

        let mut response = self
            .executor
            .execute(
                Operation::new(operation.name, selections),
                self.query_schema.clone(),
                ambient,
            )
            .await?;

        for (key, item) in introspected {
            response.insert(key, item);
        }

        Ok(response)
    }
}

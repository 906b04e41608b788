use crate::{
    AmbientContext, CoreError, CoreResult, EntityType, FetchedRecord, Item, Map, QueryContext, RelationshipResults,
    Request,
};
use futures::future::{BoxFuture, FutureExt};
use itertools::Itertools;
use std::collections::HashMap;
use tracing_futures::Instrument;

/// Fetches the rows of `entity` with a single call to its fetcher and
/// assembles one record per row.
///
/// Every relationship among `selections` is resolved once for all rows. The
/// fetcher additionally receives `join_selections` (exposed as the records'
/// join values) and the parent side join fields of those relationships.
pub(crate) fn fetch<'a>(
    entity: &'a EntityType,
    selections: &'a [Request],
    join_selections: &'a [Request],
    query: &'a QueryContext,
    ambient: &'a AmbientContext,
) -> BoxFuture<'a, CoreResult<Vec<FetchedRecord>>> {
    let span = info_span!("fetch_entity", entity = entity.name());

    let fut = async move {
        let (relationships, immediates): (Vec<&Request>, Vec<&Request>) =
            selections.iter().partition(|request| request.field().is_relationship());

        let mut parent_join_selections = Vec::new();

        for request in &relationships {
            if let Some(relationship) = request.field().as_relationship() {
                parent_join_selections.extend(relationship.parent_join_selections(entity)?);
            }
        }

        let fetch_selections: Vec<Request> = immediates
            .into_iter()
            .cloned()
            .chain(join_selections.iter().cloned())
            .chain(parent_join_selections)
            .unique_by(|request| request.key().to_owned())
            .collect();

        let rows = entity
            .fetcher()
            .fetch_immediates(&fetch_selections, query, ambient)
            .await?;

        debug!(
            entity = entity.name(),
            selections = fetch_selections.len(),
            rows = rows.len(),
            "Fetched immediates"
        );

        if let Some(row) = rows.iter().find(|row| row.len() != fetch_selections.len()) {
            return Err(CoreError::inconsistent_row(
                entity.name(),
                fetch_selections.len(),
                row.len(),
            ));
        }

        let positions: HashMap<&str, usize> = fetch_selections
            .iter()
            .enumerate()
            .map(|(idx, request)| (request.key(), idx))
            .collect();

        let position = |key: &str| {
            positions
                .get(key)
                .copied()
                .ok_or_else(|| CoreError::MissingJoinValue { key: key.to_owned() })
        };

        let mut resolved: HashMap<&str, (Vec<usize>, RelationshipResults)> = HashMap::new();

        for request in relationships {
            if let Some(relationship) = request.field().as_relationship() {
                let key_positions = relationship
                    .parent_join_keys()
                    .map(|key| position(&key))
                    .collect::<CoreResult<Vec<_>>>()?;

                let results = relationship.fetch(request, query, ambient).await?;
                resolved.insert(request.key(), (key_positions, results));
            }
        }

        let join_positions = join_selections
            .iter()
            .map(|request| position(request.key()))
            .collect::<CoreResult<Vec<_>>>()?;

        rows.into_iter()
            .map(|row| {
                let mut map = Map::with_capacity(selections.len());

                for request in selections {
                    let item = match resolved.get(request.key()) {
                        Some((key_positions, results)) => {
                            let join_key: Vec<_> = key_positions.iter().map(|idx| row[*idx].clone()).collect();
                            results.get(&join_key)?
                        }
                        None => Item::Value(row[position(request.key())?].clone()),
                    };

                    map.insert(request.key().to_owned(), item);
                }

                let join_values = join_positions.iter().map(|idx| row[*idx].clone()).collect();

                Ok(FetchedRecord {
                    value: Item::Map(map),
                    join_values,
                })
            })
            .collect::<CoreResult<Vec<_>>>()
    };

    fut.instrument(span).boxed()
}

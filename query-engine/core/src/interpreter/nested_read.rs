use crate::{
    AmbientContext, Cardinality, CoreResult, FetchedRecord, Item, ItemRef, QueryContext, RelationshipField, Request,
};
use itertools::Itertools;
use join_value::JoinValue;
use std::{collections::HashMap, sync::Arc};
use tracing_futures::Instrument;

/// Resolves one relationship selection for all parent rows of a fetch with a
/// single fetch of the target.
pub(crate) async fn resolve(
    relationship: &RelationshipField,
    request: &Request,
    parent_query: &QueryContext,
    ambient: &AmbientContext,
) -> CoreResult<RelationshipResults> {
    let span = info_span!("resolve_relationship", field = request.field_name(), key = request.key());

    async move {
        let query = relationship
            .build_child_query(request.arguments(), parent_query, ambient)
            .await?;

        let join_selections = relationship.child_join_selections()?;

        let records = relationship
            .target()
            .fetch(request.selections(), &join_selections, &query, ambient)
            .await?;

        debug!(records = records.len(), "Resolved relationship");

        RelationshipResults::new(relationship.cardinality(), records)
    }
    .instrument(span)
    .await
}

/// The related values of every parent, keyed by join key.
#[derive(Debug)]
pub struct RelationshipResults {
    cardinality: Cardinality,
    groups: HashMap<Vec<JoinValue>, ItemRef>,
}

impl RelationshipResults {
    /// Groups `records` by their join values, keeping fetch order inside each
    /// group, and applies `cardinality` to every group.
    pub fn new(cardinality: Cardinality, mut records: Vec<FetchedRecord>) -> CoreResult<Self> {
        records.sort_by(|a, b| a.join_values.cmp(&b.join_values));

        let mut groups = HashMap::new();

        for (join_key, group) in &records.into_iter().group_by(|record| record.join_values.clone()) {
            let values = group.map(|record| record.value).collect();
            groups.insert(join_key, Arc::new(cardinality.apply(values)?));
        }

        Ok(Self { cardinality, groups })
    }

    /// The value for the parent with join key `join_key`, matched by value
    /// equality of the whole key. Parents without related records get the
    /// value of an empty group.
    pub fn get(&self, join_key: &[JoinValue]) -> CoreResult<Item> {
        match self.groups.get(join_key) {
            Some(item) => Ok(Item::Ref(item.clone())),
            None => self.cardinality.apply(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(title: &str, author_id: i64) -> FetchedRecord {
        FetchedRecord {
            value: Item::Value(title.into()),
            join_values: vec![JoinValue::Int(author_id)],
        }
    }

    fn titles(item: Item) -> Vec<String> {
        item.as_list()
            .unwrap()
            .iter()
            .map(|item| match item {
                Item::Value(JoinValue::String(s)) => s.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn groups_keep_fetch_order() {
        let results = RelationshipResults::new(
            Cardinality::Many,
            vec![record("T3", 2), record("T1", 1), record("T2", 1)],
        )
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(titles(results.get(&[JoinValue::Int(1)]).unwrap()), vec!["T1", "T2"]);
        assert_eq!(titles(results.get(&[JoinValue::Int(2)]).unwrap()), vec!["T3"]);
    }

    #[test]
    fn unmatched_keys_get_the_empty_value() {
        let many = RelationshipResults::new(Cardinality::Many, vec![record("T1", 1)]).unwrap();
        assert_eq!(many.get(&[JoinValue::Int(9)]).unwrap(), Item::List(vec![]));
        assert_eq!(many.get(&[JoinValue::Null]).unwrap(), Item::List(vec![]));

        let optional = RelationshipResults::new(Cardinality::SingleOrNull, vec![record("T1", 1)]).unwrap();
        assert!(optional.get(&[JoinValue::Int(9)]).unwrap().is_null());

        let single = RelationshipResults::new(Cardinality::Single, vec![record("T1", 1)]).unwrap();
        assert!(single.get(&[JoinValue::Int(9)]).unwrap_err().is_cardinality_violation());
    }

    #[test]
    fn null_keys_match_null_keys() {
        let null_keyed = |title: &str| FetchedRecord {
            value: Item::Value(title.into()),
            join_values: vec![JoinValue::Int(1), JoinValue::Null],
        };

        let results = RelationshipResults::new(Cardinality::Many, vec![null_keyed("T1"), record("T2", 1)]).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(
            titles(results.get(&[JoinValue::Int(1), JoinValue::Null]).unwrap()),
            vec!["T1"]
        );
        assert_eq!(titles(results.get(&[JoinValue::Null]).unwrap()), Vec::<String>::new());
        assert_eq!(titles(results.get(&[JoinValue::Int(1)]).unwrap()), vec!["T2"]);
    }

    #[test]
    fn several_values_for_a_single_relationship_are_rejected() {
        let err = RelationshipResults::new(Cardinality::SingleOrNull, vec![record("T1", 1), record("T2", 1)])
            .unwrap_err();

        assert_eq!(err.to_string(), "Expected 1 value but got 2");
    }

    #[test]
    fn parents_sharing_a_key_share_the_value() {
        let results = RelationshipResults::new(Cardinality::FirstOrNull, vec![record("T1", 1)]).unwrap();

        match (results.get(&[JoinValue::Int(1)]).unwrap(), results.get(&[JoinValue::Int(1)]).unwrap()) {
            (Item::Ref(a), Item::Ref(b)) => assert!(Arc::ptr_eq(&a, &b)),
            other => panic!("unexpected {other:?}"),
        }
    }
}

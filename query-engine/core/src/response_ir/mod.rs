//! Response IR (Intermediate Representation).
//!
//! Assembled values of a resolution pass. The IR serializes to plain JSON.

use indexmap::IndexMap;
use join_value::JoinValue;
use serde::{Serialize, Serializer};
use std::sync::Arc;

/// A `key -> value` map to an IR item
pub type Map = IndexMap<String, Item>;

/// A list of IR items
pub type List = Vec<Item>;

/// Convenience type wrapper for Arc<Item>.
pub type ItemRef = Arc<Item>;

/// An IR item that either expands to a subtype or leaf-record.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Map(Map),
    List(List),
    Value(JoinValue),

    /// Wrapper type to allow multiple parent records
    /// to claim the same item without copying data
    /// (serialization can then choose how to copy if necessary).
    Ref(ItemRef),
}

impl Item {
    pub fn null() -> Self {
        Item::Value(JoinValue::Null)
    }

    pub fn is_null(&self) -> bool {
        match self {
            Item::Value(JoinValue::Null) => true,
            Item::Ref(item) => item.is_null(),
            _ => false,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Item::Map(m) => Some(m),
            Item::Ref(item) => item.as_map(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Item::List(l) => Some(l),
            Item::Ref(item) => item.as_list(),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Map> {
        match self {
            Item::Map(m) => Some(m),
            Item::Ref(item) => Self::unwrap_ref(item).into_map(),
            _ => None,
        }
    }

    /// Takes the value of `key` out of a map. A list yields the list of the
    /// values of `key` of each of its items, null stays null.
    pub fn take_field(self, key: &str) -> Item {
        match self {
            Item::Map(mut m) => m.swap_remove(key).unwrap_or_else(Item::null),
            Item::List(items) => Item::List(items.into_iter().map(|item| item.take_field(key)).collect()),
            Item::Ref(item) => Self::unwrap_ref(item).take_field(key),
            value @ Item::Value(_) => value,
        }
    }

    fn unwrap_ref(item: ItemRef) -> Item {
        Arc::try_unwrap(item).unwrap_or_else(|shared| (*shared).clone())
    }
}

impl From<JoinValue> for Item {
    fn from(value: JoinValue) -> Self {
        Item::Value(value)
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Item::Map(map) => map.serialize(serializer),
            Item::List(list) => list.serialize(serializer),
            Item::Value(value) => value.serialize(serializer),
            Item::Ref(item) => item.serialize(serializer),
        }
    }
}

/// One assembled row of an entity fetch, together with the values the caller
/// asked this level to expose for correlating it with its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub value: Item,
    pub join_values: Vec<JoinValue>,
}

/// The assembled value of the root entity.
#[derive(Debug, Default, PartialEq)]
pub struct ResponseData {
    pub data: Map,
}

impl ResponseData {
    pub fn new(data: Map) -> Self {
        Self { data }
    }

    pub fn insert(&mut self, key: impl Into<String>, item: Item) {
        self.data.insert(key.into(), item);
    }

    pub fn into_map(self) -> Map {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn book(id: i64, title: &str) -> Item {
        Item::Map(Map::from([
            ("id".to_owned(), Item::Value(JoinValue::Int(id))),
            ("title".to_owned(), Item::Value(JoinValue::from(title))),
        ]))
    }

    #[test]
    fn shared_items_serialize_like_their_content() {
        let shared = Arc::new(book(1, "T1"));
        let item = Item::List(vec![Item::Ref(shared.clone()), Item::Ref(shared)]);

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!([{ "id": 1, "title": "T1" }, { "id": 1, "title": "T1" }])
        );
    }

    #[test]
    fn taking_a_field_maps_over_lists_and_keeps_null() {
        let books = Item::List(vec![book(1, "T1"), book(2, "T2")]);

        assert_eq!(
            books.take_field("title"),
            Item::List(vec![Item::Value("T1".into()), Item::Value("T2".into())])
        );
        assert_eq!(Item::null().take_field("title"), Item::null());
        assert_eq!(Item::Ref(Arc::new(book(3, "T3"))).take_field("id"), Item::Value(JoinValue::Int(3)));
    }
}

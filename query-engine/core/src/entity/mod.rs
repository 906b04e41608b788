//! Entity descriptors: named field registries with a flat fetch function.

mod field;
mod relationship;

pub use field::*;
pub use relationship::*;

use crate::{
    interpreter, AmbientContext, CoreError, CoreResult, FetchImmediates, FetchedRecord, QueryContext, Request, Row,
};
use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use join_value::JoinValue;
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::RwLock;
use std::{
    fmt,
    sync::{Arc, Weak},
};

pub type EntityRef = Arc<EntityType>;
pub type FieldMap = IndexMap<String, FieldRef>;

type FieldsFn = Box<dyn FnOnce() -> FieldMap + Send>;

pub struct EntityType {
    name: String,

    /// Built on first access. Fields may refer to entities that are declared
    /// later, or to the entity itself.
    fields: Lazy<FieldMap, FieldsFn>,
    fetcher: Arc<dyn FetchImmediates>,
}

impl EntityType {
    pub fn new<F, I, K>(name: impl Into<String>, fetcher: impl FetchImmediates + 'static, fields: F) -> EntityRef
    where
        F: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        let fields_fn: FieldsFn = Box::new(move || {
            fields()
                .into_iter()
                .map(|(name, field)| (name.into(), Arc::new(field)))
                .collect()
        });

        Arc::new(EntityType {
            name: name.into(),
            fields: Lazy::new(fields_fn),
            fetcher: Arc::new(fetcher),
        })
    }

    /// The entity a query starts from. It has exactly one row, so its fields
    /// are relationships to the entities a query can select at the top level.
    pub fn root<F, I, K>(fields: F) -> EntityRef
    where
        F: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = (K, Field)>,
        K: Into<String>,
    {
        Self::new("Query", RootFetcher, fields)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields().get(name)
    }

    pub fn fetcher(&self) -> &dyn FetchImmediates {
        self.fetcher.as_ref()
    }

    /// Fetches all rows `query` describes, with `selections` assembled into
    /// each record's value and `join_selections` exposed as its join values.
    pub fn fetch<'a>(
        &'a self,
        selections: &'a [Request],
        join_selections: &'a [Request],
        query: &'a QueryContext,
        ambient: &'a AmbientContext,
    ) -> BoxFuture<'a, CoreResult<Vec<FetchedRecord>>> {
        interpreter::read::fetch(self, selections, join_selections, query, ambient)
    }
}

impl fmt::Debug for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType").field("name", &self.name).finish_non_exhaustive()
    }
}

struct RootFetcher;

#[async_trait]
impl FetchImmediates for RootFetcher {
    async fn fetch_immediates(
        &self,
        selections: &[Request],
        _query: &QueryContext,
        _ambient: &AmbientContext,
    ) -> CoreResult<Vec<Row>> {
        Ok(vec![vec![JoinValue::Null; selections.len()]])
    }
}

type Resolver = Arc<dyn Fn() -> CoreResult<EntityRef> + Send + Sync>;

/// An entity reference resolved on first use and memoized afterwards.
#[derive(Clone)]
pub struct LazyEntity {
    cell: Arc<OnceCell<EntityRef>>,
    resolver: Resolver,
}

impl LazyEntity {
    pub fn new(resolver: impl Fn() -> CoreResult<EntityRef> + Send + Sync + 'static) -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            resolver: Arc::new(resolver),
        }
    }

    pub fn get(&self) -> CoreResult<&EntityRef> {
        self.cell.get_or_try_init(|| (self.resolver)())
    }
}

impl From<EntityRef> for LazyEntity {
    fn from(entity: EntityRef) -> Self {
        let resolved = entity.clone();

        Self {
            cell: Arc::new(OnceCell::with_value(entity)),
            resolver: Arc::new(move || Ok(resolved.clone())),
        }
    }
}

impl fmt::Debug for LazyEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(entity) => f.debug_tuple("LazyEntity").field(&entity.name()).finish(),
            None => f.write_str("LazyEntity(<unresolved>)"),
        }
    }
}

/// Name based lookup of entities, for declaring mutually recursive entities
/// in any order.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: Arc<RwLock<IndexMap<String, EntityRef>>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, entity: EntityRef) -> CoreResult<EntityRef> {
        let mut entities = self.entities.write();

        if entities.contains_key(entity.name()) {
            return Err(CoreError::schema_error(format!(
                "Entity `{}` is already registered.",
                entity.name()
            )));
        }

        entities.insert(entity.name().to_owned(), entity.clone());
        Ok(entity)
    }

    pub fn get(&self, name: &str) -> Option<EntityRef> {
        self.entities.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.entities.read().keys().cloned().collect()
    }

    /// A reference to the entity registered as `name`, looked up on first use.
    pub fn lazy(&self, name: impl Into<String>) -> LazyEntity {
        let name = name.into();
        let entities: Weak<RwLock<IndexMap<String, EntityRef>>> = Arc::downgrade(&self.entities);

        LazyEntity::new(move || {
            entities
                .upgrade()
                .and_then(|entities| {
                    let entity = entities.read().get(&name).cloned();
                    entity
                })
                .ok_or_else(|| CoreError::schema_error(format!("Entity `{name}` is not registered.")))
        })
    }
}

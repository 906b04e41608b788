use crate::{
    interpreter,
    schema::{Argument, OutputType},
    AmbientContext, Arguments, BuildQuery, Cardinality, CoreError, CoreResult, EntityRef, EntityType, FetchedRecord,
    Field, FieldMap, LazyEntity, QueryContext, RelationshipResults, Request,
};
use futures::future::{BoxFuture, FutureExt};
use join_value::JoinValue;
use once_cell::sync::Lazy;
use std::{fmt, sync::Arc};

/// Key prefix of the parent side join columns added to a parent fetch.
pub const JOIN_TO_CHILDREN_PREFIX: &str = "__join_to_children_";

/// Key prefix of the child side join columns added to a child fetch.
pub const JOIN_TO_PARENT_PREFIX: &str = "__join_to_parent_";

pub type Refiner = Arc<dyn Fn(QueryContext, &JoinValue, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync>;
pub type QueryFilter = Arc<dyn Fn(QueryContext, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync>;

static NO_FIELDS: Lazy<FieldMap> = Lazy::new(FieldMap::default);

/// An argument of a relationship, with the function splicing its value into
/// the child query.
#[derive(Clone)]
pub struct RelationshipArgument {
    argument: Argument,
    refiner: Refiner,
}

impl RelationshipArgument {
    pub fn argument(&self) -> &Argument {
        &self.argument
    }
}

/// A field whose values are rows of another entity, correlated with the rows
/// of the parent through the join columns.
#[derive(Clone)]
pub struct RelationshipField {
    target: RelationshipTarget,
    join: Vec<(String, String)>,
    cardinality: Cardinality,
    build_query: Arc<dyn BuildQuery>,
    filter: Option<QueryFilter>,
    arguments: Vec<RelationshipArgument>,
    internal: bool,
}

impl RelationshipField {
    pub fn new(
        target: impl Into<RelationshipTarget>,
        cardinality: Cardinality,
        build_query: impl BuildQuery + 'static,
    ) -> Self {
        Self {
            target: target.into(),
            join: Vec::new(),
            cardinality,
            build_query: Arc::new(build_query),
            filter: None,
            arguments: Vec::new(),
            internal: false,
        }
    }

    pub fn single(target: impl Into<RelationshipTarget>, build_query: impl BuildQuery + 'static) -> Self {
        Self::new(target, Cardinality::Single, build_query)
    }

    pub fn single_or_null(target: impl Into<RelationshipTarget>, build_query: impl BuildQuery + 'static) -> Self {
        Self::new(target, Cardinality::SingleOrNull, build_query)
    }

    pub fn first_or_null(target: impl Into<RelationshipTarget>, build_query: impl BuildQuery + 'static) -> Self {
        Self::new(target, Cardinality::FirstOrNull, build_query)
    }

    pub fn many(target: impl Into<RelationshipTarget>, build_query: impl BuildQuery + 'static) -> Self {
        Self::new(target, Cardinality::Many, build_query)
    }

    /// Correlates `parent_field` of the parent with `child_field` of the
    /// target. Pairs are compared in the order they are added.
    pub fn join(mut self, parent_field: impl Into<String>, child_field: impl Into<String>) -> Self {
        self.join.push((parent_field.into(), child_field.into()));
        self
    }

    /// Declares an argument. `refiner` is applied to the child query, in
    /// declaration order, whenever a query supplies the argument.
    pub fn argument<R>(mut self, argument: Argument, refiner: R) -> Self
    where
        R: Fn(QueryContext, &JoinValue, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync + 'static,
    {
        self.arguments.push(RelationshipArgument {
            argument,
            refiner: Arc::new(refiner),
        });
        self
    }

    /// A refinement of the child query applied on every fetch.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(QueryContext, &AmbientContext) -> CoreResult<QueryContext> + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// The same relationship, with each related value replaced by the value
    /// of its field `field_name`.
    pub fn extract(&self, field_name: impl Into<String>) -> RelationshipField {
        let mut extracted = self.clone();

        extracted.target = RelationshipTarget::Extract {
            target: Box::new(self.target.clone()),
            field_name: field_name.into(),
        };
        extracted
    }

    pub fn target(&self) -> &RelationshipTarget {
        &self.target
    }

    pub fn join_fields(&self) -> &[(String, String)] {
        &self.join
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().map(|arg| &arg.argument)
    }

    pub fn output_type(&self) -> CoreResult<OutputType> {
        Ok(self.cardinality.wrap_type(self.target.output_type()?))
    }

    /// Fields of `parent` this relationship correlates on, as selections keyed
    /// so they cannot collide with user keys.
    pub(crate) fn parent_join_selections(&self, parent: &EntityType) -> CoreResult<Vec<Request>> {
        self.join
            .iter()
            .map(|(parent_field, _)| join_selection(parent.fields(), parent.name(), parent_field, JOIN_TO_CHILDREN_PREFIX))
            .collect()
    }

    pub(crate) fn parent_join_keys(&self) -> impl Iterator<Item = String> + '_ {
        self.join
            .iter()
            .map(|(parent_field, _)| format!("{JOIN_TO_CHILDREN_PREFIX}{parent_field}"))
    }

    pub(crate) fn child_join_selections(&self) -> CoreResult<Vec<Request>> {
        let target = self.target.entity()?;

        self.join
            .iter()
            .map(|(_, child_field)| join_selection(target.fields(), target.name(), child_field, JOIN_TO_PARENT_PREFIX))
            .collect()
    }

    /// Resolves `request`, a selection of this relationship, for every row
    /// `parent_query` describes.
    pub async fn fetch(
        &self,
        request: &Request,
        parent_query: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<RelationshipResults> {
        interpreter::nested_read::resolve(self, request, parent_query, ambient).await
    }

    /// Builds the query of the target: the query builder first, then the
    /// static filter, then the refiner of every supplied argument.
    pub(crate) async fn build_child_query(
        &self,
        arguments: &Arguments,
        parent_query: &QueryContext,
        ambient: &AmbientContext,
    ) -> CoreResult<QueryContext> {
        let mut query = self.build_query.build_query(arguments, parent_query, ambient).await?;

        if let Some(filter) = &self.filter {
            query = filter(query, ambient)?;
        }

        for arg in &self.arguments {
            if let Some(value) = arguments.get(&arg.argument.name) {
                query = (arg.refiner)(query, value, ambient)?;
            }
        }

        Ok(query)
    }
}

fn join_selection(fields: &FieldMap, entity: &str, field_name: &str, prefix: &str) -> CoreResult<Request> {
    match fields.get(field_name) {
        Some(field) if !field.is_relationship() => Ok(Request::new(
            format!("{prefix}{field_name}"),
            field_name,
            field.clone(),
        )),
        Some(_) => Err(CoreError::schema_error(format!(
            "Join field `{entity}.{field_name}` is not an immediate field."
        ))),
        None => Err(CoreError::schema_error(format!(
            "Join field `{entity}.{field_name}` does not exist."
        ))),
    }
}

impl fmt::Debug for RelationshipField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipField")
            .field("target", &self.target)
            .field("join", &self.join)
            .field("cardinality", &self.cardinality)
            .field("internal", &self.internal)
            .finish_non_exhaustive()
    }
}

/// What a relationship fetches: rows of an entity, or one field of the values
/// of another target.
#[derive(Debug, Clone)]
pub enum RelationshipTarget {
    Entity(LazyEntity),
    Extract {
        target: Box<RelationshipTarget>,
        field_name: String,
    },
}

impl RelationshipTarget {
    /// The entity whose rows are fetched and joined on.
    pub fn entity(&self) -> CoreResult<&EntityRef> {
        match self {
            RelationshipTarget::Entity(entity) => entity.get(),
            RelationshipTarget::Extract { target, .. } => target.entity(),
        }
    }

    /// Fields a query can select below a relationship with this target.
    pub fn fields(&self) -> CoreResult<&FieldMap> {
        match self {
            RelationshipTarget::Entity(entity) => Ok(entity.get()?.fields()),
            RelationshipTarget::Extract { .. } => match self.extracted_field()?.as_ref() {
                Field::Immediate(_) => Ok(&NO_FIELDS),
                Field::Relationship(relationship) => relationship.target().fields(),
            },
        }
    }

    /// Name of the type selections below a relationship with this target are
    /// made on.
    pub fn type_name(&self) -> CoreResult<String> {
        Ok(self.output_type()?.named_type())
    }

    /// Whether the values of this target are scalars, which admit no selections.
    pub fn is_leaf(&self) -> CoreResult<bool> {
        match self {
            RelationshipTarget::Entity(_) => Ok(false),
            RelationshipTarget::Extract { .. } => match self.extracted_field()?.as_ref() {
                Field::Immediate(_) => Ok(true),
                Field::Relationship(relationship) => relationship.target().is_leaf(),
            },
        }
    }

    /// Published type of one related value.
    pub fn output_type(&self) -> CoreResult<OutputType> {
        match self {
            RelationshipTarget::Entity(entity) => Ok(OutputType::object(entity.get()?.name()).non_null()),
            RelationshipTarget::Extract { .. } => match self.extracted_field()?.as_ref() {
                Field::Immediate(immediate) => Ok(immediate.field_type()),
                Field::Relationship(relationship) => relationship.output_type(),
            },
        }
    }

    fn extracted_field(&self) -> CoreResult<&crate::FieldRef> {
        match self {
            RelationshipTarget::Extract { target, field_name } => target.fields()?.get(field_name).ok_or_else(|| {
                CoreError::schema_error(format!(
                    "Cannot extract `{}`: no such field on `{}`.",
                    field_name,
                    target.type_name().unwrap_or_default()
                ))
            }),
            RelationshipTarget::Entity(entity) => Err(CoreError::schema_error(format!(
                "`{}` is not an extraction.",
                entity.get()?.name()
            ))),
        }
    }

    /// Fetches the related values for `selections`, exposing `join_selections`
    /// of the underlying entity as join values.
    pub fn fetch<'a>(
        &'a self,
        selections: &'a [Request],
        join_selections: &'a [Request],
        query: &'a QueryContext,
        ambient: &'a AmbientContext,
    ) -> BoxFuture<'a, CoreResult<Vec<FetchedRecord>>> {
        let fut = async move {
            match self {
                RelationshipTarget::Entity(entity) => {
                    entity.get()?.fetch(selections, join_selections, query, ambient).await
                }

                RelationshipTarget::Extract { target, field_name } => {
                    let field = self.extracted_field()?.clone();
                    let request = Request::new(field_name.clone(), field_name.clone(), field)
                        .with_selections(selections.to_vec());
                    let requests = [request];

                    let records = target.fetch(&requests, join_selections, query, ambient).await?;

                    Ok(records
                        .into_iter()
                        .map(|record| FetchedRecord {
                            value: record.value.take_field(field_name),
                            join_values: record.join_values,
                        })
                        .collect())
                }
            }
        };

        fut.boxed()
    }
}

impl From<LazyEntity> for RelationshipTarget {
    fn from(entity: LazyEntity) -> Self {
        RelationshipTarget::Entity(entity)
    }
}

impl From<EntityRef> for RelationshipTarget {
    fn from(entity: EntityRef) -> Self {
        RelationshipTarget::Entity(entity.into())
    }
}

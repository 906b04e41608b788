//! Projection of entity descriptors into the externally visible schema.

mod input_types;
mod merge;
mod output_types;
mod subtype;

pub use input_types::*;
pub use merge::{greatest_common_subtype, MergedSchema};
pub use output_types::*;
pub use subtype::{is_subtype, SchemaTypes};

use crate::{CoreError, CoreResult, EntityRef, EntityType, Field};
use indexmap::IndexMap;
use std::{collections::VecDeque, sync::Arc};

pub type QuerySchemaRef = Arc<QuerySchema>;

/// The schema built from a root entity.
///
/// Building it forces every lazily declared field registry and relationship
/// target reachable from the root, so declaration errors surface here and not
/// while a query runs.
#[derive(Debug)]
pub struct QuerySchema {
    root: EntityRef,
    query: ObjectType,
    types: IndexMap<String, ObjectType>,
}

impl QuerySchema {
    pub fn build(root: EntityRef) -> CoreResult<QuerySchema> {
        let mut visited: IndexMap<String, EntityRef> = IndexMap::new();
        let mut queue = VecDeque::from([root.clone()]);
        let mut types = IndexMap::new();

        while let Some(entity) = queue.pop_front() {
            match visited.get(entity.name()) {
                Some(existing) if Arc::ptr_eq(existing, &entity) => continue,
                Some(_) => {
                    return Err(CoreError::schema_error(format!(
                        "Two different entities share the name `{}`.",
                        entity.name()
                    )))
                }
                None => {
                    visited.insert(entity.name().to_owned(), entity.clone());
                }
            }

            let object_type = project_entity(&entity, &mut queue)?;
            types.insert(object_type.name.clone(), object_type);
        }

        let query = types
            .shift_remove(root.name())
            .ok_or_else(|| CoreError::schema_error("The root entity was not projected."))?;

        debug!(types = types.len() + 1, "Built query schema");

        Ok(QuerySchema { root, query, types })
    }

    pub fn root(&self) -> &EntityRef {
        &self.root
    }

    /// The type of the root entity.
    pub fn query(&self) -> &ObjectType {
        &self.query
    }

    /// All object types, the query type first.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        std::iter::once(&self.query).chain(self.types.values())
    }

    pub fn find_object_type(&self, name: &str) -> Option<&ObjectType> {
        if self.query.name == name {
            Some(&self.query)
        } else {
            self.types.get(name)
        }
    }

    /// Whether this schema can replace `other` without breaking any query
    /// that is valid against `other`.
    pub fn is_subtype_of(&self, other: &dyn SchemaTypes) -> bool {
        is_subtype(
            self,
            &OutputType::object(self.query.name.clone()),
            other,
            &OutputType::object(other.query_type().name.clone()),
        )
    }
}

fn project_entity(entity: &EntityType, queue: &mut VecDeque<EntityRef>) -> CoreResult<ObjectType> {
    let mut fields = Vec::with_capacity(entity.fields().len());

    for (name, field) in entity.fields() {
        match field.as_ref() {
            Field::Immediate(immediate) => {
                if !immediate.is_internal() {
                    fields.push(OutputField {
                        name: name.clone(),
                        arguments: immediate.arguments().to_vec(),
                        field_type: immediate.field_type(),
                    });
                }
            }

            Field::Relationship(relationship) => {
                let target = relationship.target().entity()?;

                for (parent_field, child_field) in relationship.join_fields() {
                    check_join_field(entity, name, entity, parent_field)?;
                    check_join_field(entity, name, target, child_field)?;
                }

                let field_type = relationship.output_type()?;
                queue.push_back(target.clone());

                if !relationship.is_internal() {
                    fields.push(OutputField {
                        name: name.clone(),
                        arguments: relationship.arguments().cloned().collect(),
                        field_type,
                    });
                }
            }
        }
    }

    Ok(ObjectType::new(entity.name(), fields))
}

fn check_join_field(parent: &EntityType, relationship: &str, side: &EntityType, join_field: &str) -> CoreResult<()> {
    match side.field(join_field).map(|f| f.as_ref()) {
        Some(Field::Immediate(_)) => Ok(()),
        Some(Field::Relationship(_)) => Err(CoreError::schema_error(format!(
            "Relationship `{}.{}` joins on `{}.{}`, which is not an immediate field.",
            parent.name(),
            relationship,
            side.name(),
            join_field
        ))),
        None => Err(CoreError::schema_error(format!(
            "Relationship `{}.{}` joins on `{}.{}`, which does not exist.",
            parent.name(),
            relationship,
            side.name(),
            join_field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_fixtures::*, EntityRegistry, ImmediateField, RelationshipField};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::AtomicUsize;

    fn field_types(schema: &QuerySchema, type_name: &str) -> Vec<(String, String)> {
        schema
            .find_object_type(type_name)
            .unwrap()
            .get_fields()
            .iter()
            .map(|field| (field.name.clone(), field.field_type.to_string()))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn projects_every_reachable_entity() {
        let library = Library::new();
        let schema = library.schema();

        assert_eq!(
            schema.object_types().map(ObjectType::name).collect::<Vec<_>>(),
            vec!["Query", "Book", "Author"]
        );
        assert_eq!(
            field_types(&schema, "Query"),
            pairs(&[("books", "[Book!]!"), ("bookTitles", "[String!]!"), ("author", "Author")])
        );
        assert_eq!(
            field_types(&schema, "Book"),
            pairs(&[
                ("id", "Int!"),
                ("title", "String!"),
                ("authorId", "Int!"),
                ("author", "Author!"),
                ("booksBySameAuthor", "[Book!]!"),
            ])
        );
        assert_eq!(
            schema.query().find_field("author").unwrap().arguments(),
            &[Argument::new("id", InputType::scalar(ScalarType::Int).non_null())]
        );
    }

    #[test]
    fn internal_fields_are_not_projected() {
        let schema = QuerySchema::build(EntityType::root(|| {
            vec![
                ("visible", Field::from(ImmediateField::int("visible"))),
                ("hidden", ImmediateField::int("hidden").internal().into()),
            ]
        }))
        .unwrap();

        assert_eq!(field_types(&schema, "Query"), pairs(&[("visible", "Int")]));
    }

    #[test]
    fn extractions_keep_the_visibility_of_their_relationship() {
        let registry = EntityRegistry::new();
        let target = registry.lazy("Target");

        registry
            .register(EntityType::new(
                "Target",
                table(vec![], Arc::new(AtomicUsize::new(0))),
                || vec![("id", Field::from(ImmediateField::int("id")))],
            ))
            .unwrap();

        let root = EntityType::root(move || {
            let targets = RelationshipField::many(target, all_rows);

            vec![
                ("ids", Field::from(targets.extract("id"))),
                ("hiddenIds", targets.internal().extract("id").into()),
            ]
        });

        let schema = QuerySchema::build(root).unwrap();
        let names: Vec<&str> = schema.query().get_fields().iter().map(OutputField::name).collect();

        assert_eq!(names, vec!["ids"]);
    }

    #[test]
    fn joins_on_missing_fields_are_rejected_at_build_time() {
        let registry = EntityRegistry::new();
        let target = registry.lazy("Target");

        registry
            .register(EntityType::new(
                "Target",
                table(vec![], Arc::new(AtomicUsize::new(0))),
                || vec![("id", Field::from(ImmediateField::int("id")))],
            ))
            .unwrap();

        let root = EntityType::root(move || {
            vec![(
                "targets",
                Field::from(RelationshipField::many(target, all_rows).join("id", "missing")),
            )]
        });

        assert_eq!(
            QuerySchema::build(root).unwrap_err().to_string(),
            "Error in schema construction: Relationship `Query.targets` joins on `Query.id`, which does not exist."
        );
    }

    #[test]
    fn unregistered_targets_are_rejected_at_build_time() {
        let registry = EntityRegistry::new();
        let missing = registry.lazy("Missing");
        let root = EntityType::root(move || vec![("missing", Field::from(RelationshipField::many(missing, all_rows)))]);

        assert_eq!(
            QuerySchema::build(root).unwrap_err().to_string(),
            "Error in schema construction: Entity `Missing` is not registered."
        );
    }

    #[test]
    fn distinct_entities_need_distinct_names() {
        let entity = |name: &'static str| {
            EntityType::new(name, table(vec![], Arc::new(AtomicUsize::new(0))), || {
                vec![("id", Field::from(ImmediateField::int("id")))]
            })
        };
        let (a, b) = (entity("Twin"), entity("Twin"));

        let root = EntityType::root(move || {
            vec![
                ("a", Field::from(RelationshipField::many(a, all_rows))),
                ("b", Field::from(RelationshipField::many(b, all_rows))),
            ]
        });

        assert_eq!(
            QuerySchema::build(root).unwrap_err().to_string(),
            "Error in schema construction: Two different entities share the name `Twin`."
        );
    }
}

use super::{is_subtype, Argument, InputType, ObjectType, OutputField, OutputType, QuerySchema, SchemaTypes};
use crate::{CoreError, CoreResult};
use indexmap::IndexMap;

/// Object types merged from several schemas. Every query valid against one of
/// the merged schemas is valid against this one.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSchema {
    query: ObjectType,
    types: IndexMap<String, ObjectType>,
}

impl MergedSchema {
    pub fn query(&self) -> &ObjectType {
        &self.query
    }

    /// All object types, the query type first.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectType> {
        std::iter::once(&self.query).chain(self.types.values())
    }

    pub fn is_subtype_of(&self, other: &dyn SchemaTypes) -> bool {
        is_subtype(
            self,
            &OutputType::object(self.query.name.clone()),
            other,
            &OutputType::object(other.query_type().name.clone()),
        )
    }

    fn merge(self, other: MergedSchema) -> CoreResult<MergedSchema> {
        let query = common_object_type(&self.query, &other.query)?;
        let mut types = self.types;

        for (name, right) in other.types {
            let merged = match types.get(&name) {
                Some(left) => common_object_type(left, &right)?,
                None => right,
            };

            types.insert(name, merged);
        }

        Ok(MergedSchema { query, types })
    }
}

impl SchemaTypes for MergedSchema {
    fn query_type(&self) -> &ObjectType {
        &self.query
    }

    fn find_object_type(&self, name: &str) -> Option<&ObjectType> {
        if self.query.name == name {
            Some(&self.query)
        } else {
            self.types.get(name)
        }
    }
}

impl From<&QuerySchema> for MergedSchema {
    fn from(schema: &QuerySchema) -> Self {
        Self {
            query: schema.query().clone(),
            types: schema
                .object_types()
                .skip(1)
                .map(|object_type| (object_type.name.clone(), object_type.clone()))
                .collect(),
        }
    }
}

/// Merges `schemas` into the schema that is a subtype of each of them.
///
/// Object types get the union of their fields. A field present on both sides
/// gets the common subtype of its types and the union of its arguments, an
/// argument present on both sides the common supertype of its types.
pub fn greatest_common_subtype<'a>(schemas: impl IntoIterator<Item = &'a QuerySchema>) -> CoreResult<MergedSchema> {
    let mut schemas = schemas.into_iter().map(MergedSchema::from);
    let first = schemas
        .next()
        .ok_or_else(|| CoreError::schema_error("There are no schemas to merge."))?;

    schemas.try_fold(first, MergedSchema::merge)
}

fn common_object_type(left: &ObjectType, right: &ObjectType) -> CoreResult<ObjectType> {
    if left.name != right.name {
        return Err(CoreError::schema_error(format!(
            "Cannot merge the object types `{}` and `{}`.",
            left.name, right.name
        )));
    }

    let mut fields = Vec::with_capacity(left.get_fields().len());

    for field in left.get_fields() {
        fields.push(match right.find_field(&field.name) {
            Some(other) => common_field(field, other)?,
            None => field.clone(),
        });
    }

    fields.extend(
        right
            .get_fields()
            .iter()
            .filter(|field| left.find_field(&field.name).is_none())
            .cloned(),
    );

    Ok(ObjectType::new(left.name.clone(), fields))
}

fn common_field(left: &OutputField, right: &OutputField) -> CoreResult<OutputField> {
    let mut arguments: Vec<Argument> = Vec::with_capacity(left.arguments().len());

    for argument in left.arguments() {
        arguments.push(match right.find_argument(&argument.name) {
            Some(other) => Argument::new(
                argument.name.clone(),
                common_supertype(&argument.argument_type, &other.argument_type)?,
            ),
            None => argument.clone(),
        });
    }

    arguments.extend(
        right
            .arguments()
            .iter()
            .filter(|argument| left.find_argument(&argument.name).is_none())
            .cloned(),
    );

    Ok(OutputField {
        name: left.name.clone(),
        arguments,
        field_type: common_subtype(&left.field_type, &right.field_type)?,
    })
}

fn common_subtype(left: &OutputType, right: &OutputType) -> CoreResult<OutputType> {
    let merged = match (left, right) {
        _ if left == right => left.clone(),
        (OutputType::NonNull(left), OutputType::NonNull(right)) => common_subtype(left, right)?.non_null(),
        (OutputType::NonNull(left), right) => common_subtype(left, right)?.non_null(),
        (left, OutputType::NonNull(right)) => common_subtype(left, right)?.non_null(),
        (OutputType::List(left), OutputType::List(right)) => OutputType::list(common_subtype(left, right)?),
        _ => {
            return Err(CoreError::schema_error(format!(
                "Cannot find a common subtype of `{left}` and `{right}`."
            )))
        }
    };

    Ok(merged)
}

fn common_supertype(left: &InputType, right: &InputType) -> CoreResult<InputType> {
    let merged = match (left, right) {
        _ if left == right => left.clone(),
        (InputType::NonNull(left), InputType::NonNull(right)) => common_supertype(left, right)?.non_null(),
        (InputType::NonNull(left), right) => common_supertype(left, right)?,
        (left, InputType::NonNull(right)) => common_supertype(left, right)?,
        (InputType::List(left), InputType::List(right)) => InputType::list(common_supertype(left, right)?),
        _ => {
            return Err(CoreError::schema_error(format!(
                "Cannot find a common supertype of `{left}` and `{right}`."
            )))
        }
    };

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema::ScalarType, test_fixtures::Library, EntityType, Field, ImmediateField};
    use pretty_assertions::assert_eq;

    fn schema(fields: Vec<(&'static str, Field)>) -> QuerySchema {
        QuerySchema::build(EntityType::root(move || fields)).unwrap()
    }

    fn int() -> OutputType {
        OutputType::scalar(ScalarType::Int)
    }

    fn int_input() -> InputType {
        InputType::scalar(ScalarType::Int)
    }

    fn object(name: &str, fields: Vec<(&str, OutputType)>) -> ObjectType {
        ObjectType::new(
            name,
            fields
                .into_iter()
                .map(|(name, field_type)| OutputField {
                    name: name.to_owned(),
                    arguments: vec![],
                    field_type,
                })
                .collect(),
        )
    }

    /// Merges in both orders, checks both give `expected` and that the result
    /// can replace every input.
    fn assert_merge(schemas: [&QuerySchema; 2], expected: &[(&str, &str)]) {
        let merged = greatest_common_subtype(schemas).unwrap();
        let reversed = greatest_common_subtype(schemas.into_iter().rev()).unwrap();

        for merged in [&merged, &reversed] {
            let mut fields: Vec<(String, String)> = merged
                .query()
                .get_fields()
                .iter()
                .map(|field| (field.name.clone(), field_signature(field)))
                .collect();
            fields.sort();

            let mut expected: Vec<(String, String)> =
                expected.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect();
            expected.sort();

            assert_eq!(fields, expected);

            for schema in schemas {
                assert!(merged.is_subtype_of(schema));
            }
        }
    }

    fn field_signature(field: &OutputField) -> String {
        let mut arguments: Vec<String> = field
            .arguments()
            .iter()
            .map(|arg| format!("{}: {}", arg.name, arg.argument_type))
            .collect();
        arguments.sort();

        if arguments.is_empty() {
            field.field_type.to_string()
        } else {
            format!("({}) {}", arguments.join(", "), field.field_type)
        }
    }

    #[test]
    fn a_schema_merged_with_itself_is_unchanged() {
        let schema = Library::new().schema();
        let merged = greatest_common_subtype([&*schema, &*schema]).unwrap();

        assert_eq!(merged, MergedSchema::from(&*schema));
        assert!(merged.is_subtype_of(&*schema));
        assert!(schema.is_subtype_of(&merged));
    }

    #[test]
    fn merged_object_types_have_the_union_of_fields() {
        let a = schema(vec![("id", ImmediateField::int("id").into())]);
        let b = schema(vec![("name", ImmediateField::string("name").into())]);

        assert_merge([&a, &b], &[("id", "Int"), ("name", "String")]);
    }

    #[test]
    fn field_types_merge_to_their_common_subtype() {
        let required = schema(vec![("id", ImmediateField::int("id").required().into())]);
        let nullable = schema(vec![("id", ImmediateField::int("id").into())]);

        assert_merge([&required, &nullable], &[("id", "Int!")]);
        assert_merge([&required, &required], &[("id", "Int!")]);
    }

    #[test]
    fn field_arguments_are_the_union_of_the_arguments() {
        let a = schema(vec![(
            "id",
            ImmediateField::int("id").argument(Argument::new("id", int_input())).into(),
        )]);
        let b = schema(vec![(
            "id",
            ImmediateField::int("id")
                .argument(Argument::new("id", int_input()))
                .argument(Argument::new("name", InputType::scalar(ScalarType::String)))
                .into(),
        )]);

        assert_merge([&a, &b], &[("id", "(id: Int, name: String) Int")]);
    }

    #[test]
    fn argument_types_merge_to_their_common_supertype() {
        let required = schema(vec![(
            "id",
            ImmediateField::int("id").argument(Argument::new("id", int_input().non_null())).into(),
        )]);
        let nullable = schema(vec![(
            "id",
            ImmediateField::int("id").argument(Argument::new("id", int_input())).into(),
        )]);

        assert_merge([&required, &nullable], &[("id", "(id: Int) Int")]);
    }

    #[test]
    fn types_inside_non_null_and_list_types_are_merged() {
        assert_eq!(
            common_subtype(&OutputType::list(int().non_null()), &OutputType::list(int())).unwrap(),
            OutputType::list(int().non_null())
        );
        assert_eq!(
            common_subtype(&OutputType::list(int()).non_null(), &OutputType::list(int())).unwrap(),
            OutputType::list(int()).non_null()
        );
        assert_eq!(
            common_supertype(&InputType::list(int_input().non_null()), &InputType::list(int_input())).unwrap(),
            InputType::list(int_input())
        );
        assert_eq!(
            common_supertype(&int_input().non_null(), &int_input().non_null()).unwrap(),
            int_input().non_null()
        );
    }

    #[test]
    fn object_types_of_the_same_name_are_merged_across_schemas() {
        let left = MergedSchema {
            query: object("Query", vec![("author", OutputType::object("Author"))]),
            types: IndexMap::from([("Author".to_owned(), object("Author", vec![("id", int())]))]),
        };
        let right = MergedSchema {
            query: object("Query", vec![("author", OutputType::object("Author").non_null())]),
            types: IndexMap::from([(
                "Author".to_owned(),
                object("Author", vec![("name", OutputType::scalar(ScalarType::String))]),
            )]),
        };

        let merged = left.clone().merge(right.clone()).unwrap();

        assert_eq!(
            merged.query().find_field("author").unwrap().field_type,
            OutputType::object("Author").non_null()
        );
        assert_eq!(
            merged.find_object_type("Author").unwrap(),
            &object("Author", vec![("id", int()), ("name", OutputType::scalar(ScalarType::String))])
        );
        assert!(merged.is_subtype_of(&left));
        assert!(merged.is_subtype_of(&right));
    }

    #[test]
    fn incompatible_types_cannot_be_merged() {
        let int_field = schema(vec![("id", ImmediateField::int("id").into())]);
        let string_field = schema(vec![("id", ImmediateField::string("id").into())]);

        assert_eq!(
            greatest_common_subtype([&int_field, &string_field]).unwrap_err().to_string(),
            "Error in schema construction: Cannot find a common subtype of `Int` and `String`."
        );
        assert!(greatest_common_subtype(Vec::<&QuerySchema>::new()).is_err());
    }
}

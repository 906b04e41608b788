//! Answers the `__schema` and `__type` meta fields from the projected schema.
//!
//! Introspection never reaches the entities: it is resolved against the
//! `QuerySchema` alone and its results are added to the response after the
//! regular selections.

use crate::{HandlerError, Result};
use join_core::{
    merge_selections,
    schema::{Argument, InputType, ObjectType, OutputField, OutputType, QuerySchema, ScalarType},
    CoreError, Item, JoinValue, Map, QueryParserError, QueryParserErrorKind, QueryPath, Selection,
};

const SCHEMA_FIELD: &str = "__schema";
const TYPE_FIELD: &str = "__type";
const TYPENAME_FIELD: &str = "__typename";

struct DirectiveDefinition {
    name: &'static str,
    description: &'static str,
    locations: &'static [&'static str],
}

static DIRECTIVES: [DirectiveDefinition; 2] = [
    DirectiveDefinition {
        name: "include",
        description: "Directs the executor to include this field or fragment only when the `if` argument is true.",
        locations: &["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
    },
    DirectiveDefinition {
        name: "skip",
        description: "Directs the executor to skip this field or fragment when the `if` argument is true.",
        locations: &["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
    },
];

/// Merges the root selections and separates the regular ones from the
/// introspection ones, in this order.
pub(crate) fn split(root: &str, selections: Vec<Selection>) -> Result<(Vec<Selection>, Vec<Selection>)> {
    let merged = merge_selections(selections).map_err(|conflict| {
        CoreError::from(QueryParserError::new(
            QueryPath::new(root).add(conflict.key.clone()),
            QueryParserErrorKind::ConflictingSelectionsError(conflict.to_string()),
        ))
    })?;

    Ok(merged
        .into_iter()
        .partition(|selection| !matches!(selection.name(), SCHEMA_FIELD | TYPE_FIELD)))
}

pub(crate) fn resolve(query_schema: &QuerySchema, selection: &Selection) -> Result<Item> {
    let introspector = Introspector { query_schema };
    let path = format!("{}.{}", query_schema.query().name(), selection.key());

    match selection.name() {
        SCHEMA_FIELD => introspector.object(&path, &Node::Schema, selection.nested_selections()),

        TYPE_FIELD => {
            let name = match selection.arguments() {
                [(arg, JoinValue::String(name))] if arg == "name" => name,
                _ => {
                    return Err(HandlerError::introspection(
                        path,
                        "`__type` requires exactly one String argument `name`.",
                    ))
                }
            };

            match introspector.named_type(name) {
                Some(typ) => introspector.object(&path, &Node::Type(typ), selection.nested_selections()),
                None => Ok(Item::null()),
            }
        }

        other => Err(HandlerError::introspection(
            path,
            format!("`{other}` is not an introspection field."),
        )),
    }
}

#[derive(Debug, Clone)]
enum IntrospectedType<'a> {
    Object(&'a ObjectType),
    Scalar(ScalarType),
    List(Box<IntrospectedType<'a>>),
    NonNull(Box<IntrospectedType<'a>>),
}

impl<'a> IntrospectedType<'a> {
    fn kind(&self) -> &'static str {
        match self {
            IntrospectedType::Object(_) => "OBJECT",
            IntrospectedType::Scalar(_) => "SCALAR",
            IntrospectedType::List(_) => "LIST",
            IntrospectedType::NonNull(_) => "NON_NULL",
        }
    }

    fn name(&self) -> Option<String> {
        match self {
            IntrospectedType::Object(object_type) => Some(object_type.name().to_owned()),
            IntrospectedType::Scalar(scalar) => Some(scalar.to_string()),
            IntrospectedType::List(_) | IntrospectedType::NonNull(_) => None,
        }
    }
}

enum Node<'a> {
    Schema,
    Type(IntrospectedType<'a>),
    Field(&'a OutputField),
    InputValue { name: &'a str, input_type: InputType },
    Directive(&'a DirectiveDefinition),
}

impl<'a> Node<'a> {
    fn type_name(&self) -> &'static str {
        match self {
            Node::Schema => "__Schema",
            Node::Type(_) => "__Type",
            Node::Field(_) => "__Field",
            Node::InputValue { .. } => "__InputValue",
            Node::Directive(_) => "__Directive",
        }
    }

    fn argument(argument: &'a Argument) -> Self {
        Node::InputValue {
            name: &argument.name,
            input_type: argument.argument_type.clone(),
        }
    }
}

struct Introspector<'a> {
    query_schema: &'a QuerySchema,
}

impl<'a> Introspector<'a> {
    fn named_type(&self, name: &str) -> Option<IntrospectedType<'a>> {
        self.query_schema
            .find_object_type(name)
            .map(IntrospectedType::Object)
            .or_else(|| {
                ScalarType::ALL
                    .into_iter()
                    .find(|scalar| scalar.to_string() == name)
                    .map(IntrospectedType::Scalar)
            })
    }

    fn all_types(&self) -> impl Iterator<Item = IntrospectedType<'a>> {
        self.query_schema
            .object_types()
            .map(IntrospectedType::Object)
            .chain(ScalarType::ALL.into_iter().map(IntrospectedType::Scalar))
    }

    fn output_type(&self, path: &str, output_type: &OutputType) -> Result<IntrospectedType<'a>> {
        Ok(match output_type {
            OutputType::Scalar(scalar) => IntrospectedType::Scalar(*scalar),
            OutputType::Object(name) => self
                .query_schema
                .find_object_type(name)
                .map(IntrospectedType::Object)
                .ok_or_else(|| HandlerError::introspection(path, format!("Type `{name}` is not part of the schema.")))?,
            OutputType::List(inner) => IntrospectedType::List(Box::new(self.output_type(path, inner)?)),
            OutputType::NonNull(inner) => IntrospectedType::NonNull(Box::new(self.output_type(path, inner)?)),
        })
    }

    fn input_type(input_type: &InputType) -> IntrospectedType<'a> {
        match input_type {
            InputType::Scalar(scalar) => IntrospectedType::Scalar(*scalar),
            InputType::List(inner) => IntrospectedType::List(Box::new(Self::input_type(inner))),
            InputType::NonNull(inner) => IntrospectedType::NonNull(Box::new(Self::input_type(inner))),
        }
    }

    fn object(&self, path: &str, node: &Node<'a>, selections: &[Selection]) -> Result<Item> {
        if selections.is_empty() {
            return Err(HandlerError::introspection(
                path,
                format!("A value of type `{}` needs a selection set.", node.type_name()),
            ));
        }

        let merged =
            merge_selections(selections.to_vec()).map_err(|conflict| HandlerError::introspection(path, conflict))?;
        let mut map = Map::with_capacity(merged.len());

        for selection in &merged {
            let field_path = format!("{path}.{}", selection.key());
            let value = self.field(&field_path, node, selection)?;

            map.insert(selection.key().to_owned(), value);
        }

        Ok(Item::Map(map))
    }

    fn list(&self, path: &str, nodes: impl Iterator<Item = Node<'a>>, selections: &[Selection]) -> Result<Item> {
        nodes
            .map(|node| self.object(path, &node, selections))
            .collect::<Result<Vec<_>>>()
            .map(Item::List)
    }

    fn field(&self, path: &str, node: &Node<'a>, selection: &Selection) -> Result<Item> {
        let nested = selection.nested_selections();

        match (node, selection.name()) {
            (Node::Schema, "queryType") => {
                self.object(path, &Node::Type(IntrospectedType::Object(self.query_schema.query())), nested)
            }
            (Node::Schema, "types") => self.list(path, self.all_types().map(Node::Type), nested),
            (Node::Schema, "directives") => self.list(path, DIRECTIVES.iter().map(Node::Directive), nested),
            (Node::Schema, "mutationType" | "subscriptionType" | "description") => leaf(path, selection, Item::null()),

            (Node::Type(typ), "kind") => leaf(path, selection, enum_value(typ.kind())),
            (Node::Type(typ), "name") => leaf(path, selection, typ.name().map(string).unwrap_or_else(Item::null)),
            (&Node::Type(IntrospectedType::Object(object_type)), "fields") => {
                self.list(path, object_type.get_fields().iter().map(Node::Field), nested)
            }
            (Node::Type(IntrospectedType::Object(_)), "interfaces") => Ok(Item::List(Vec::new())),
            (Node::Type(IntrospectedType::List(inner) | IntrospectedType::NonNull(inner)), "ofType") => {
                self.object(path, &Node::Type((**inner).clone()), nested)
            }
            (
                Node::Type(_),
                "description" | "specifiedByURL" | "fields" | "interfaces" | "possibleTypes" | "enumValues"
                | "inputFields" | "ofType",
            ) => Ok(Item::null()),

            (&Node::Field(field), "name") => leaf(path, selection, string(field.name())),
            (&Node::Field(field), "args") => self.list(path, field.arguments().iter().map(Node::argument), nested),
            (&Node::Field(field), "type") => {
                self.object(path, &Node::Type(self.output_type(path, field.field_type())?), nested)
            }
            (Node::Field(_), "isDeprecated") => leaf(path, selection, Item::Value(JoinValue::Boolean(false))),
            (Node::Field(_), "description" | "deprecationReason") => leaf(path, selection, Item::null()),

            (Node::InputValue { name, .. }, "name") => leaf(path, selection, string(*name)),
            (Node::InputValue { input_type, .. }, "type") => {
                self.object(path, &Node::Type(Self::input_type(input_type)), nested)
            }
            (Node::InputValue { .. }, "description" | "defaultValue") => leaf(path, selection, Item::null()),

            (&Node::Directive(directive), "name") => leaf(path, selection, string(directive.name)),
            (&Node::Directive(directive), "description") => leaf(path, selection, string(directive.description)),
            (&Node::Directive(directive), "locations") => leaf(
                path,
                selection,
                Item::List(directive.locations.iter().map(|location| enum_value(location)).collect()),
            ),
            (Node::Directive(_), "args") => {
                let condition = Node::InputValue {
                    name: "if",
                    input_type: InputType::scalar(ScalarType::Boolean).non_null(),
                };

                self.list(path, std::iter::once(condition), nested)
            }
            (Node::Directive(_), "isRepeatable") => leaf(path, selection, Item::Value(JoinValue::Boolean(false))),

            (node, TYPENAME_FIELD) => leaf(path, selection, string(node.type_name())),

            (node, name) => Err(HandlerError::introspection(
                path,
                format!("Field `{name}` does not exist on `{}`.", node.type_name()),
            )),
        }
    }
}

fn leaf(path: &str, selection: &Selection, value: Item) -> Result<Item> {
    if selection.nested_selections().is_empty() {
        Ok(value)
    } else {
        Err(HandlerError::introspection(
            path,
            format!("`{}` is a scalar and cannot have a selection set.", selection.name()),
        ))
    }
}

fn string(value: impl Into<String>) -> Item {
    Item::Value(JoinValue::String(value.into()))
}

fn enum_value(value: &str) -> Item {
    Item::Value(JoinValue::Enum(value.to_owned()))
}

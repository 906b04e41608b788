use super::{Argument, InputType, ObjectType, OutputField, OutputType, QuerySchema};
use std::collections::{BTreeSet, HashSet};

/// Object types of a projected schema, by name.
pub trait SchemaTypes {
    /// The type of the root entity.
    fn query_type(&self) -> &ObjectType;

    fn find_object_type(&self, name: &str) -> Option<&ObjectType>;
}

impl SchemaTypes for QuerySchema {
    fn query_type(&self) -> &ObjectType {
        self.query()
    }

    fn find_object_type(&self, name: &str) -> Option<&ObjectType> {
        QuerySchema::find_object_type(self, name)
    }
}

/// Checks that `sub`, resolved against `sub_schema`, can stand in for `sup`,
/// resolved against `sup_schema`.
///
/// Object types must keep every field of the supertype with a subtype of its
/// type. Arguments are contravariant, and arguments the supertype does not
/// know about must be nullable.
pub fn is_subtype(
    sub_schema: &dyn SchemaTypes,
    sub: &OutputType,
    sup_schema: &dyn SchemaTypes,
    sup: &OutputType,
) -> bool {
    let mut check = SubtypeCheck {
        sub_schema,
        sup_schema,
        seen: HashSet::new(),
    };

    check.output_type(sub, sup)
}

struct SubtypeCheck<'a> {
    sub_schema: &'a dyn SchemaTypes,
    sup_schema: &'a dyn SchemaTypes,
    seen: HashSet<(String, String)>,
}

impl<'a> SubtypeCheck<'a> {
    fn output_type(&mut self, sub: &OutputType, sup: &OutputType) -> bool {
        match (sub, sup) {
            (OutputType::NonNull(sub), OutputType::NonNull(sup)) => self.output_type(sub, sup),
            (OutputType::NonNull(sub), sup) => self.output_type(sub, sup),
            (OutputType::List(sub), OutputType::List(sup)) => self.output_type(sub, sup),
            (OutputType::Scalar(sub), OutputType::Scalar(sup)) => sub == sup,
            (OutputType::Object(sub), OutputType::Object(sup)) => self.object_type(sub, sup),
            _ => false,
        }
    }

    fn object_type(&mut self, sub: &str, sup: &str) -> bool {
        if sub != sup {
            return false;
        }

        // Recursive types are assumed compatible while their check is in progress.
        if !self.seen.insert((sub.to_owned(), sup.to_owned())) {
            return true;
        }

        let (sub_schema, sup_schema) = (self.sub_schema, self.sup_schema);
        let (sub_type, sup_type) = match (sub_schema.find_object_type(sub), sup_schema.find_object_type(sup)) {
            (Some(sub_type), Some(sup_type)) => (sub_type, sup_type),
            _ => return false,
        };

        sup_type
            .get_fields()
            .iter()
            .all(|sup_field| match sub_type.find_field(&sup_field.name) {
                Some(sub_field) => self.field(sub_field, sup_field),
                None => false,
            })
    }

    fn field(&mut self, sub: &OutputField, sup: &OutputField) -> bool {
        let names: BTreeSet<&str> = sub
            .arguments()
            .iter()
            .chain(sup.arguments())
            .map(|arg| arg.name.as_str())
            .collect();

        self.output_type(&sub.field_type, &sup.field_type)
            && names
                .into_iter()
                .all(|name| argument(sub.find_argument(name), sup.find_argument(name)))
    }
}

fn argument(sub: Option<&Argument>, sup: Option<&Argument>) -> bool {
    match (sub, sup) {
        (Some(sub), None) => sub.argument_type.is_nullable(),
        (None, _) => false,
        (Some(sub), Some(sup)) => input_type(&sup.argument_type, &sub.argument_type),
    }
}

fn input_type(sub: &InputType, sup: &InputType) -> bool {
    match (sub, sup) {
        (InputType::NonNull(sub), InputType::NonNull(sup)) => input_type(sub, sup),
        (InputType::NonNull(sub), sup) => input_type(sub, sup),
        (InputType::List(sub), InputType::List(sup)) => input_type(sub, sup),
        (InputType::Scalar(sub), InputType::Scalar(sup)) => sub == sup,
        _ => false,
    }
}

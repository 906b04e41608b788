use super::*;
use crate::{
    schema::{Argument, InputType, ScalarType},
    CoreResult, EntityType, Field, FieldMap,
};
use bigdecimal::BigDecimal;
use join_value::JoinValue;

/// Resolves selection trees against field registries. The full tree is
/// validated before anything is fetched.
pub struct QueryDocumentParser;

impl QueryDocumentParser {
    pub fn parse(root: &EntityType, selections: Vec<Selection>) -> CoreResult<Vec<Request>> {
        Self::parse_selections(&QueryPath::new(root.name()), root.name(), root.fields(), selections)
    }

    fn parse_selections(
        path: &QueryPath,
        type_name: &str,
        fields: &FieldMap,
        selections: Vec<Selection>,
    ) -> CoreResult<Vec<Request>> {
        let merged = merge_selections(selections).map_err(|conflict| {
            QueryParserError::new(
                path.add(conflict.key.clone()),
                QueryParserErrorKind::ConflictingSelectionsError(conflict.to_string()),
            )
        })?;

        merged
            .into_iter()
            .map(|selection| Self::parse_selection(path, type_name, fields, selection))
            .collect()
    }

    fn parse_selection(
        parent_path: &QueryPath,
        type_name: &str,
        fields: &FieldMap,
        selection: Selection,
    ) -> CoreResult<Request> {
        let key = selection.key().to_owned();
        let path = parent_path.add(key.clone());

        if key.starts_with("__") {
            return Err(QueryParserError::new(path, QueryParserErrorKind::ReservedKeyError).into());
        }

        let (name, arguments, nested_selections) = selection.into_parts();

        let field = fields.get(&name).filter(|field| !field.is_internal()).ok_or_else(|| {
            QueryParserError::new(
                path.clone(),
                QueryParserErrorKind::FieldNotFoundError {
                    type_name: type_name.to_owned(),
                },
            )
        })?;

        let arguments = Self::parse_arguments(&path, &field.arguments(), arguments)?;

        let selections = match field.as_ref() {
            Field::Immediate(immediate) => {
                Self::expect_leaf(&path, &immediate.scalar_type().to_string(), &nested_selections)?;
                Vec::new()
            }

            Field::Relationship(relationship) => {
                let target = relationship.target();
                let target_type = target.type_name()?;

                if target.is_leaf()? {
                    Self::expect_leaf(&path, &target_type, &nested_selections)?;
                    Vec::new()
                } else if nested_selections.is_empty() {
                    return Err(QueryParserError::new(
                        path,
                        QueryParserErrorKind::MissingSelectionSetError { type_name: target_type },
                    )
                    .into());
                } else {
                    Self::parse_selections(&path, &target_type, target.fields()?, nested_selections)?
                }
            }
        };

        Ok(Request::new(key, name, field.clone())
            .with_arguments(arguments)
            .with_selections(selections))
    }

    fn expect_leaf(path: &QueryPath, type_name: &str, nested_selections: &[Selection]) -> QueryParserResult<()> {
        if nested_selections.is_empty() {
            Ok(())
        } else {
            Err(QueryParserError::new(
                path.clone(),
                QueryParserErrorKind::SelectionSetOnScalarError {
                    type_name: type_name.to_owned(),
                },
            ))
        }
    }

    fn parse_arguments(
        path: &QueryPath,
        declared: &[&Argument],
        given: Vec<(String, JoinValue)>,
    ) -> QueryParserResult<Arguments> {
        let mut arguments = Arguments::with_capacity(given.len());

        for (name, value) in given {
            let arg_path = path.add(name.clone());

            let argument = declared
                .iter()
                .find(|arg| arg.name == name)
                .ok_or_else(|| QueryParserError::new(arg_path.clone(), QueryParserErrorKind::ArgumentNotFoundError))?;

            if arguments.contains_key(&name) {
                return Err(QueryParserError::new(
                    arg_path,
                    QueryParserErrorKind::DuplicateArgumentError,
                ));
            }

            let value = Self::coerce_value(&arg_path, &argument.argument_type, value)?;
            arguments.insert(name, value);
        }

        for argument in declared {
            if argument.is_required() && !arguments.contains_key(&argument.name) {
                return Err(QueryParserError::new(
                    path.add(argument.name.clone()),
                    QueryParserErrorKind::RequiredValueNotSetError,
                ));
            }
        }

        Ok(arguments)
    }

    fn coerce_value(path: &QueryPath, typ: &InputType, value: JoinValue) -> QueryParserResult<JoinValue> {
        match (typ, value) {
            (InputType::NonNull(_), JoinValue::Null) => Err(QueryParserError::new(
                path.clone(),
                QueryParserErrorKind::RequiredValueNotSetError,
            )),
            (InputType::NonNull(inner), value) => Self::coerce_value(path, inner, value),
            (_, JoinValue::Null) => Ok(JoinValue::Null),
            (InputType::List(inner), JoinValue::List(values)) => values
                .into_iter()
                .map(|value| Self::coerce_value(path, inner, value))
                .collect::<QueryParserResult<Vec<_>>>()
                .map(JoinValue::List),
            // A single value is accepted where a list is expected.
            (InputType::List(inner), value) => Ok(JoinValue::List(vec![Self::coerce_value(path, inner, value)?])),
            (InputType::Scalar(scalar), value) => Self::coerce_scalar(path, *scalar, value),
        }
    }

    fn coerce_scalar(path: &QueryPath, scalar: ScalarType, value: JoinValue) -> QueryParserResult<JoinValue> {
        match (scalar, value) {
            (ScalarType::Int, value @ JoinValue::Int(_)) => Ok(value),
            (ScalarType::Float, JoinValue::Int(i)) => Ok(JoinValue::Float(BigDecimal::from(i))),
            (ScalarType::Float, value @ JoinValue::Float(_)) => Ok(value),
            (ScalarType::String, value @ JoinValue::String(_)) => Ok(value),
            (ScalarType::Boolean, value @ JoinValue::Boolean(_)) => Ok(value),
            (ScalarType::ID, value @ JoinValue::String(_)) => Ok(value),
            (ScalarType::ID, JoinValue::Int(i)) => Ok(JoinValue::String(i.to_string())),
            (want, have) => Err(QueryParserError::new(
                path.clone(),
                QueryParserErrorKind::ValueTypeMismatchError {
                    have: have.type_name().to_owned(),
                    want: want.to_string(),
                },
            )),
        }
    }
}

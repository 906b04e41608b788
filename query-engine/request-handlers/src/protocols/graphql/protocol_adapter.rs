use crate::{HandlerError, Result};
use graphql_parser::query::{
    Definition, Directive, Document, FragmentDefinition, OperationDefinition, Selection as GqlSelection,
    SelectionSet, Type, Value, VariableDefinition,
};
use indexmap::IndexMap;
use join_core::{Operation, Selection};
use join_value::JoinValue;
use std::collections::HashMap;

/// Values of the declared variables of an operation. `None` marks a declared
/// variable that was neither provided nor defaulted: arguments referring to
/// it count as not given.
type VariableValues = IndexMap<String, Option<JoinValue>>;

/// Protocol adapter for GraphQL -> Operation.
///
/// GraphQL is mapped as following:
/// - The fields of a `query { ... }` or single selection block `{ ... }` become the root selections.
/// - If an operation name is given, only that operation is picked and the rest ignored.
///   Without one, the document must contain exactly one operation.
/// - Fragment spreads and inline fragments are expanded in place, recursively.
/// - `@skip(if:)` and `@include(if:)` are evaluated on fields and fragments before expansion.
/// - Variables are substituted by their provided or default values.
///
/// Type conditions are not checked: every position has exactly one possible type.
///
/// Currently unsupported features:
/// - Mutations.
/// - Subscription queries.
pub struct GraphQLProtocolAdapter;

impl GraphQLProtocolAdapter {
    pub fn convert(
        gql_doc: &Document<'_, String>,
        operation: Option<String>,
        variables: IndexMap<String, JoinValue>,
    ) -> Result<Operation> {
        let operation_definition = match operation {
            Some(ref op) => gql_doc
                .definitions
                .iter()
                .find(|def| Self::matches_operation(def, op))
                .ok_or_else(|| HandlerError::query_conversion(format!("Operation '{op}' does not match any query.")))?,

            None => {
                let mut operations = gql_doc
                    .definitions
                    .iter()
                    .filter(|def| matches!(def, Definition::Operation(_)));

                match (operations.next(), operations.next()) {
                    (Some(def), None) => def,
                    (None, _) => return Err(HandlerError::query_conversion("Document contained no operations.")),
                    (Some(_), Some(_)) => {
                        return Err(HandlerError::query_conversion(
                            "Document contains multiple operations, an operation name is required.",
                        ))
                    }
                }
            }
        };

        let mut converter = Converter {
            fragments: Self::collect_fragments(gql_doc)?,
            variables: VariableValues::new(),
            active_fragments: Vec::new(),
        };

        match operation_definition {
            Definition::Operation(OperationDefinition::SelectionSet(s)) => {
                Ok(Operation::new(None, converter.convert_selection_set(s)?))
            }

            Definition::Operation(OperationDefinition::Query(q)) => {
                converter.check_no_directives(&q.directives)?;
                converter.variables = Self::resolve_variables(&q.variable_definitions, variables)?;
                let selections = converter.convert_selection_set(&q.selection_set)?;

                Ok(Operation::new(q.name.clone(), selections))
            }

            Definition::Operation(OperationDefinition::Mutation(m)) => Err(HandlerError::unsupported_feature(
                "Mutation",
                format!("At position {}.", m.position),
            )),

            Definition::Operation(OperationDefinition::Subscription(s)) => Err(HandlerError::unsupported_feature(
                "Subscription query",
                format!("At position {}.", s.position),
            )),

            Definition::Fragment(f) => Err(HandlerError::query_conversion(format!(
                "Fragment '{}' is not an operation.",
                f.name
            ))),
        }
    }

    /// Checks if the given GraphQL definition matches the operation name that should be executed.
    fn matches_operation(def: &Definition<'_, String>, operation: &str) -> bool {
        let check = |n: Option<&String>| n.filter(|name| name.as_str() == operation).is_some();
        match def {
            Definition::Fragment(_) => false,
            Definition::Operation(op) => match op {
                OperationDefinition::Subscription(s) => check(s.name.as_ref()),
                OperationDefinition::SelectionSet(_) => false,
                OperationDefinition::Query(q) => check(q.name.as_ref()),
                OperationDefinition::Mutation(m) => check(m.name.as_ref()),
            },
        }
    }

    fn collect_fragments<'d, 'a>(
        gql_doc: &'d Document<'a, String>,
    ) -> Result<HashMap<&'d str, &'d FragmentDefinition<'a, String>>> {
        let mut fragments = HashMap::new();

        for def in &gql_doc.definitions {
            if let Definition::Fragment(fragment) = def {
                if fragments.insert(fragment.name.as_str(), fragment).is_some() {
                    return Err(HandlerError::query_conversion(format!(
                        "Fragment '{}' is defined more than once.",
                        fragment.name
                    )));
                }
            }
        }

        Ok(fragments)
    }

    fn resolve_variables(
        definitions: &[VariableDefinition<'_, String>],
        mut given: IndexMap<String, JoinValue>,
    ) -> Result<VariableValues> {
        let mut resolved = VariableValues::with_capacity(definitions.len());

        for definition in definitions {
            let value = match (given.swap_remove(&definition.name), &definition.default_value) {
                (Some(value), _) => Some(value),
                (None, Some(default)) => Self::convert_value(&VariableValues::new(), default)?,
                (None, None) if matches!(definition.var_type, Type::NonNullType(_)) => {
                    return Err(HandlerError::query_conversion(format!(
                        "Variable '${}' of required type '{}' was not provided.",
                        definition.name, definition.var_type
                    )))
                }
                (None, None) => None,
            };

            resolved.insert(definition.name.clone(), value);
        }

        Ok(resolved)
    }

    /// `Ok(None)` for a reference to a declared variable without a value.
    fn convert_value(variables: &VariableValues, value: &Value<'_, String>) -> Result<Option<JoinValue>> {
        let converted = match value {
            Value::Variable(name) => {
                return variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| HandlerError::query_conversion(format!("Variable '${name}' is not defined.")))
            }
            Value::Int(i) => match i.as_i64() {
                Some(i) => JoinValue::Int(i),
                None => {
                    return Err(HandlerError::query_conversion(format!(
                        "Invalid 64 bit integer: {i:?}"
                    )))
                }
            },
            Value::Float(f) => JoinValue::try_from(*f)
                .map_err(|_| HandlerError::query_conversion(format!("Invalid 64-bit float: {f:?}")))?,
            Value::String(s) => JoinValue::String(s.clone()),
            Value::Boolean(b) => JoinValue::Boolean(*b),
            Value::Null => JoinValue::Null,
            Value::Enum(e) => JoinValue::Enum(e.clone()),
            Value::List(values) => {
                let values = values
                    .iter()
                    .map(|v| Self::convert_value(variables, v).map(|v| v.unwrap_or(JoinValue::Null)))
                    .collect::<Result<Vec<JoinValue>>>()?;

                JoinValue::List(values)
            }
            Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());

                for (k, v) in map {
                    if let Some(v) = Self::convert_value(variables, v)? {
                        pairs.push((k.clone(), v));
                    }
                }

                JoinValue::Object(pairs)
            }
        };

        Ok(Some(converted))
    }
}

struct Converter<'d, 'a> {
    fragments: HashMap<&'d str, &'d FragmentDefinition<'a, String>>,
    variables: VariableValues,

    /// Fragments currently being expanded, innermost last.
    active_fragments: Vec<&'d str>,
}

impl<'d, 'a> Converter<'d, 'a> {
    fn convert_selection_set(&mut self, selection_set: &'d SelectionSet<'a, String>) -> Result<Vec<Selection>> {
        let mut selections = Vec::with_capacity(selection_set.items.len());

        for item in &selection_set.items {
            match item {
                GqlSelection::Field(f) => {
                    if !self.is_included(&f.directives)? {
                        continue;
                    }

                    let mut selection = Selection::new(f.name.clone());

                    if let Some(alias) = &f.alias {
                        selection = selection.with_alias(alias.clone());
                    }

                    for (name, value) in &f.arguments {
                        if let Some(value) = GraphQLProtocolAdapter::convert_value(&self.variables, value)? {
                            selection = selection.with_argument(name.clone(), value);
                        }
                    }

                    let nested = self.convert_selection_set(&f.selection_set)?;
                    selections.push(selection.with_selections(nested));
                }

                GqlSelection::FragmentSpread(fs) => {
                    if !self.is_included(&fs.directives)? {
                        continue;
                    }

                    let fragment = self.fragments.get(fs.fragment_name.as_str()).copied().ok_or_else(|| {
                        HandlerError::query_conversion(format!(
                            "Unknown fragment '{}', at position {}.",
                            fs.fragment_name, fs.position
                        ))
                    })?;

                    if self.active_fragments.contains(&fragment.name.as_str()) {
                        return Err(HandlerError::query_conversion(format!(
                            "Fragment '{}' spreads itself through {}.",
                            fragment.name,
                            self.active_fragments.join(" -> ")
                        )));
                    }

                    self.check_no_directives(&fragment.directives)?;
                    self.active_fragments.push(fragment.name.as_str());
                    let expanded = self.convert_selection_set(&fragment.selection_set)?;
                    self.active_fragments.pop();

                    selections.extend(expanded);
                }

                GqlSelection::InlineFragment(i) => {
                    if self.is_included(&i.directives)? {
                        selections.extend(self.convert_selection_set(&i.selection_set)?);
                    }
                }
            }
        }

        Ok(selections)
    }

    /// Evaluates `@skip` and `@include`. Both may be given, the selection is
    /// kept only if neither excludes it.
    fn is_included(&self, directives: &[Directive<'a, String>]) -> Result<bool> {
        let mut included = true;

        for directive in directives {
            match directive.name.as_str() {
                "skip" => included &= !self.condition(directive)?,
                "include" => included &= self.condition(directive)?,
                other => return Err(HandlerError::UnknownDirective(other.to_owned())),
            }
        }

        Ok(included)
    }

    fn condition(&self, directive: &Directive<'a, String>) -> Result<bool> {
        let value = match directive.arguments.iter().find(|(name, _)| name == "if") {
            Some((_, value)) => GraphQLProtocolAdapter::convert_value(&self.variables, value)?,
            None => None,
        };

        match value {
            Some(JoinValue::Boolean(b)) => Ok(b),
            Some(other) => Err(HandlerError::query_conversion(format!(
                "Argument 'if' of '@{}' must be a Boolean, got {}.",
                directive.name,
                other.type_name()
            ))),
            None => Err(HandlerError::query_conversion(format!(
                "Directive '@{}' requires a Boolean argument 'if'.",
                directive.name
            ))),
        }
    }

    fn check_no_directives(&self, directives: &[Directive<'a, String>]) -> Result<()> {
        match directives.first() {
            Some(directive) => Err(HandlerError::UnknownDirective(directive.name.clone())),
            None => Ok(()),
        }
    }
}

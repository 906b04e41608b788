use crate::{
    datamodel::*, Column, Condition, Database, DatamodelError, Result, Table, TableFetcher, TableQuery,
};
use bigdecimal::BigDecimal;
use heck::{ToLowerCamelCase, ToUpperCamelCase};
use join_core::{
    schema::{Argument, InputType, QuerySchema, QuerySchemaRef, ScalarType},
    AmbientContext, Arguments, CoreResult, EntityRegistry, EntityType, ErrorKind, Field, ImmediateField,
    QueryContext, RelationshipField,
};
use join_value::JoinValue;
use std::{collections::HashSet, path::Path, sync::Arc};

const ROOT: &str = "Query";

/// Entities and root fields built from a datamodel, over an in-memory
/// database holding its rows.
#[derive(Debug)]
pub struct MemoryConnector {
    database: Arc<Database>,
    query_schema: QuerySchemaRef,
    _registry: EntityRegistry,
}

impl MemoryConnector {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_datamodel(Datamodel::load(path)?)
    }

    pub fn from_toml_str(datamodel: &str) -> Result<Self> {
        Self::from_datamodel(Datamodel::from_toml_str(datamodel)?)
    }

    /// Validates the datamodel and builds the query schema. Every join is
    /// resolved here, so an ambiguous or broken join fails the load.
    pub fn from_datamodel(datamodel: Datamodel) -> Result<Self> {
        let mut seen = HashSet::new();

        for table in &datamodel.tables {
            if !seen.insert(table.name.as_str()) {
                return Err(DatamodelError::DuplicateTable(table.name.clone()));
            }
        }

        let tables = datamodel.tables.iter().map(build_table).collect::<Result<Vec<_>>>()?;
        let database = Arc::new(Database::new(tables));

        check_references(&database)?;

        let registry = EntityRegistry::new();

        for definition in &datamodel.tables {
            let table = database.table(&definition.name)?;
            let entity_name = entity_name(definition);
            let mut fields = FieldList::new(&entity_name);

            for column in &table.columns {
                fields.push(field_name(&column.name), immediate_field(column).into())?;
            }

            for relationship in &definition.relationships {
                let field = build_relationship(&datamodel, &database, &registry, Some(table), &entity_name, relationship)?;
                fields.push(relationship.name.clone(), field.into())?;
            }

            let fields = fields.into_fields();
            let fetcher = TableFetcher::new(database.clone(), &definition.name);

            registry.register(EntityType::new(entity_name, fetcher, move || fields))?;
        }

        let mut root_fields = FieldList::new(ROOT);

        for relationship in &datamodel.query {
            let field = build_relationship(&datamodel, &database, &registry, None, ROOT, relationship)?;
            root_fields.push(relationship.name.clone(), field.into())?;
        }

        let root_fields = root_fields.into_fields();
        let query_schema = Arc::new(QuerySchema::build(EntityType::root(move || root_fields))?);

        info!(
            tables = datamodel.tables.len(),
            root_fields = datamodel.query.len(),
            "Loaded datamodel"
        );

        Ok(Self {
            database,
            query_schema,
            _registry: registry,
        })
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    pub fn query_schema(&self) -> QuerySchemaRef {
        self.query_schema.clone()
    }
}

/// Exposed name of a column.
fn field_name(column: &str) -> String {
    column.to_lower_camel_case()
}

fn entity_name(table: &TableDefinition) -> String {
    table.entity.clone().unwrap_or_else(|| table.name.to_upper_camel_case())
}

fn entity_name_of(datamodel: &Datamodel, table: &str) -> Result<String> {
    datamodel
        .tables
        .iter()
        .find(|definition| definition.name == table)
        .map(entity_name)
        .ok_or_else(|| DatamodelError::UnknownTable(table.to_owned()))
}

struct FieldList {
    entity: String,
    fields: Vec<(String, Field)>,
}

impl FieldList {
    fn new(entity: &str) -> Self {
        Self {
            entity: entity.to_owned(),
            fields: Vec::new(),
        }
    }

    fn push(&mut self, name: String, field: Field) -> Result<()> {
        if self.fields.iter().any(|(existing, _)| *existing == name) {
            return Err(DatamodelError::DuplicateField {
                entity: self.entity.clone(),
                field: name,
            });
        }

        self.fields.push((name, field));
        Ok(())
    }

    fn into_fields(self) -> Vec<(String, Field)> {
        self.fields
    }
}

fn build_table(definition: &TableDefinition) -> Result<Table> {
    let columns = definition
        .columns
        .iter()
        .map(|column| {
            let references = column
                .references
                .as_deref()
                .map(|reference| {
                    reference
                        .split_once('.')
                        .map(|(table, column)| (table.to_owned(), column.to_owned()))
                        .ok_or_else(|| DatamodelError::InvalidReference(reference.to_owned()))
                })
                .transpose()?;

            Ok(Column {
                name: column.name.clone(),
                column_type: column.column_type.into(),
                nullable: column.nullable,
                references,
                internal: column.internal,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut table = Table {
        name: definition.name.clone(),
        columns,
        rows: Vec::with_capacity(definition.rows.len()),
    };

    for row in &definition.rows {
        if let Some(unknown) = row.keys().find(|key| table.column(key).is_none()) {
            return Err(DatamodelError::UnknownColumn {
                table: table.name.clone(),
                column: unknown.clone(),
            });
        }

        let values = table
            .columns
            .iter()
            .map(|column| cell(&table.name, column, row.get(&column.name).cloned()))
            .collect::<Result<Vec<_>>>()?;

        table.rows.push(values);
    }

    Ok(table)
}

fn cell(table: &str, column: &Column, value: Option<serde_json::Value>) -> Result<JoinValue> {
    let invalid = |message: String| DatamodelError::InvalidValue {
        table: table.to_owned(),
        column: column.name.clone(),
        message,
    };

    let value = match value {
        Some(value) => JoinValue::try_from(value).map_err(|err| invalid(err.to_string()))?,
        None => JoinValue::Null,
    };

    match (column.column_type, value) {
        (_, JoinValue::Null) if column.nullable => Ok(JoinValue::Null),
        (_, JoinValue::Null) => Err(invalid("the column is not nullable".to_owned())),
        (ScalarType::Int, value @ JoinValue::Int(_)) => Ok(value),
        (ScalarType::Float, JoinValue::Int(i)) => Ok(JoinValue::Float(BigDecimal::from(i))),
        (ScalarType::Float, value @ JoinValue::Float(_)) => Ok(value),
        (ScalarType::String, value @ JoinValue::String(_)) => Ok(value),
        (ScalarType::Boolean, value @ JoinValue::Boolean(_)) => Ok(value),
        (ScalarType::ID, value @ JoinValue::String(_)) => Ok(value),
        (ScalarType::ID, JoinValue::Int(i)) => Ok(JoinValue::String(i.to_string())),
        (expected, value) => Err(invalid(format!("expected {}, got {}", expected, value.type_name()))),
    }
}

fn check_references(database: &Database) -> Result<()> {
    for table in database.tables() {
        for (target_table, target_column) in table.columns.iter().filter_map(|column| column.references.as_ref()) {
            let target = database
                .tables()
                .find(|candidate| candidate.name == *target_table)
                .ok_or_else(|| DatamodelError::UnknownTable(target_table.clone()))?;

            if target.column(target_column).is_none() {
                return Err(DatamodelError::UnknownColumn {
                    table: target_table.clone(),
                    column: target_column.clone(),
                });
            }
        }
    }

    Ok(())
}

fn immediate_field(column: &Column) -> ImmediateField {
    let mut field = ImmediateField::new(&column.name, column.column_type);

    if !column.nullable {
        field = field.required();
    }

    if column.internal {
        field = field.internal();
    }

    field
}

fn build_relationship(
    datamodel: &Datamodel,
    database: &Database,
    registry: &EntityRegistry,
    parent: Option<&Table>,
    parent_entity: &str,
    definition: &RelationshipDefinition,
) -> Result<RelationshipField> {
    let target = database.table(&definition.target)?;
    let join = resolve_join(parent, parent_entity, target, definition)?;

    let build_query = {
        let target_table = target.name.clone();
        let join = join.clone();

        move |_: &Arguments, parent: &QueryContext, _: &AmbientContext| -> CoreResult<QueryContext> {
            let mut query = TableQuery::all(&target_table);

            if let Some(parent) = parent.downcast_ref::<TableQuery>() {
                for (parent_column, child_column) in &join {
                    query = query.and(Condition::in_subquery(child_column, parent.clone(), parent_column));
                }
            }

            Ok(QueryContext::new(query))
        }
    };

    let target_entity = registry.lazy(entity_name_of(datamodel, &definition.target)?);
    let mut relationship = RelationshipField::new(target_entity, definition.cardinality.into(), build_query);

    for (parent_column, child_column) in &join {
        relationship = relationship.join(field_name(parent_column), field_name(child_column));
    }

    for argument in &definition.arguments {
        let column = target.column(&argument.column).ok_or_else(|| DatamodelError::UnknownColumn {
            table: target.name.clone(),
            column: argument.column.clone(),
        })?;

        let scalar = argument.argument_type.map(ScalarType::from).unwrap_or(column.column_type);
        let mut argument_type = InputType::scalar(scalar);

        if argument.list {
            argument_type = InputType::list(argument_type.non_null());
        }

        if argument.required {
            argument_type = argument_type.non_null();
        }

        let column = column.name.clone();

        relationship = relationship.argument(
            Argument::new(&argument.name, argument_type),
            move |query: QueryContext, value: &JoinValue, _: &AmbientContext| {
                let table_query = table_query(&query)?;

                let condition = match value {
                    JoinValue::Null => return Ok(query),
                    JoinValue::List(values) => Condition::one_of(&column, values.clone()),
                    value => Condition::equals(&column, value.clone()),
                };

                Ok(QueryContext::new(table_query.and(condition)))
            },
        );
    }

    if !definition.filter.is_empty() {
        let conditions = definition
            .filter
            .iter()
            .map(|filter| {
                let column = target.column(&filter.column).ok_or_else(|| DatamodelError::UnknownColumn {
                    table: target.name.clone(),
                    column: filter.column.clone(),
                })?;

                Ok(Condition::equals(
                    &filter.column,
                    cell(&target.name, column, Some(filter.value.clone()))?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        relationship = relationship.filter(move |query: QueryContext, _: &AmbientContext| {
            let table_query = conditions
                .iter()
                .cloned()
                .fold(table_query(&query)?, TableQuery::and);

            Ok(QueryContext::new(table_query))
        });
    }

    if definition.internal {
        relationship = relationship.internal();
    }

    Ok(match &definition.extract {
        Some(field) => relationship.extract(field),
        None => relationship,
    })
}

fn table_query(query: &QueryContext) -> CoreResult<TableQuery> {
    query
        .downcast_ref::<TableQuery>()
        .cloned()
        .ok_or_else(|| ErrorKind::UnexpectedQueryContext("TableQuery").into())
}

/// Column pairs `(parent, child)` a relationship joins on. Without an explicit
/// join, the single foreign key between the two tables is used. Root fields
/// have nothing to join on.
fn resolve_join(
    parent: Option<&Table>,
    parent_entity: &str,
    target: &Table,
    definition: &RelationshipDefinition,
) -> Result<Vec<(String, String)>> {
    let parent = match (parent, &definition.join) {
        (None, None) => return Ok(Vec::new()),
        (None, Some(join)) => {
            return match join.first() {
                Some(pair) => Err(DatamodelError::UnknownColumn {
                    table: ROOT.to_owned(),
                    column: pair.parent.clone(),
                }),
                None => Ok(Vec::new()),
            }
        }
        (Some(parent), _) => parent,
    };

    if let Some(join) = &definition.join {
        return join
            .iter()
            .map(|pair| {
                for (table, column) in [(parent, &pair.parent), (target, &pair.child)] {
                    if table.column(column).is_none() {
                        return Err(DatamodelError::UnknownColumn {
                            table: table.name.clone(),
                            column: column.clone(),
                        });
                    }
                }

                Ok((pair.parent.clone(), pair.child.clone()))
            })
            .collect();
    }

    let references = |from: &Table, to: &Table| -> Vec<(String, String)> {
        from.columns
            .iter()
            .filter_map(|column| match &column.references {
                Some((table, referenced)) if *table == to.name => Some((column.name.clone(), referenced.clone())),
                _ => None,
            })
            .collect()
    };

    let mut candidates = references(parent, target);
    candidates.extend(
        references(target, parent)
            .into_iter()
            .map(|(child, parent)| (parent, child)),
    );

    match candidates.len() {
        1 => Ok(candidates),
        n => Err(DatamodelError::AmbiguousJoin {
            parent: parent_entity.to_owned(),
            relationship: definition.name.clone(),
            target: target.name.clone(),
            candidates: n,
        }),
    }
}

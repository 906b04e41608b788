use join_value::JoinValue;

/// The query context of table fetches: the rows of `table` satisfying every
/// condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals {
        column: String,
        value: JoinValue,
    },

    OneOf {
        column: String,
        values: Vec<JoinValue>,
    },

    /// `column` takes one of the values of `subquery_column` in the rows of
    /// `subquery`. Nulls never match.
    In {
        column: String,
        subquery: Box<TableQuery>,
        subquery_column: String,
    },
}

impl TableQuery {
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
        }
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

impl Condition {
    pub fn equals(column: impl Into<String>, value: JoinValue) -> Self {
        Condition::Equals {
            column: column.into(),
            value,
        }
    }

    pub fn one_of(column: impl Into<String>, values: Vec<JoinValue>) -> Self {
        Condition::OneOf {
            column: column.into(),
            values,
        }
    }

    pub fn in_subquery(column: impl Into<String>, subquery: TableQuery, subquery_column: impl Into<String>) -> Self {
        Condition::In {
            column: column.into(),
            subquery: Box::new(subquery),
            subquery_column: subquery_column.into(),
        }
    }
}

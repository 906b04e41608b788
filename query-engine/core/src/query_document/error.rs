use std::fmt;

pub type QueryParserResult<T> = std::result::Result<T, QueryParserError>;

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParserError {
    path: QueryPath,
    error_kind: QueryParserErrorKind,
}

impl QueryParserError {
    pub fn new(path: QueryPath, error_kind: QueryParserErrorKind) -> Self {
        Self { path, error_kind }
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }

    pub fn error_kind(&self) -> &QueryParserErrorKind {
        &self.error_kind
    }
}

impl fmt::Display for QueryParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query parsing/validation error at `{}`: {}",
            self.path, self.error_kind
        )
    }
}

impl std::error::Error for QueryParserError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPath {
    segments: Vec<String>,
}

impl QueryPath {
    pub fn new(initial_segment: impl Into<String>) -> Self {
        Self {
            segments: vec![initial_segment.into()],
        }
    }

    pub fn add(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(segment.into());
        path
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParserErrorKind {
    FieldNotFoundError { type_name: String },
    ArgumentNotFoundError,
    DuplicateArgumentError,
    RequiredValueNotSetError,
    ValueTypeMismatchError { have: String, want: String },
    ConflictingSelectionsError(String),
    MissingSelectionSetError { type_name: String },
    SelectionSetOnScalarError { type_name: String },
    ReservedKeyError,
}

impl fmt::Display for QueryParserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldNotFoundError { type_name } => write!(f, "Field does not exist on type `{type_name}`."),
            Self::ArgumentNotFoundError => write!(f, "Argument does not exist on enclosing type."),
            Self::DuplicateArgumentError => write!(f, "Argument is given more than once."),
            Self::RequiredValueNotSetError => write!(f, "A value is required but not set."),
            Self::ValueTypeMismatchError { have, want } => {
                write!(f, "Value types mismatch. Have: {have}, want: {want}")
            }
            Self::ConflictingSelectionsError(reason) => write!(f, "Conflicting selections: {reason}"),
            Self::MissingSelectionSetError { type_name } => {
                write!(f, "Field of type `{type_name}` must have a selection of subfields.")
            }
            Self::SelectionSetOnScalarError { type_name } => {
                write!(f, "Field of type `{type_name}` must not have a selection of subfields.")
            }
            Self::ReservedKeyError => write!(f, "Keys starting with `__` are reserved."),
        }
    }
}

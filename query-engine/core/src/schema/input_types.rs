use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Int,
    Float,
    String,
    Boolean,
    ID,
}

impl ScalarType {
    pub const ALL: [ScalarType; 5] = [
        ScalarType::Int,
        ScalarType::Float,
        ScalarType::String,
        ScalarType::Boolean,
        ScalarType::ID,
    ];
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let typ = match self {
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::String => "String",
            ScalarType::Boolean => "Boolean",
            ScalarType::ID => "ID",
        };

        f.write_str(typ)
    }
}

/// Type of an argument. Only scalars and lists of scalars are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputType {
    Scalar(ScalarType),
    List(Box<InputType>),
    NonNull(Box<InputType>),
}

impl InputType {
    pub fn scalar(scalar: ScalarType) -> Self {
        InputType::Scalar(scalar)
    }

    pub fn list(containing: InputType) -> Self {
        InputType::List(Box::new(containing))
    }

    pub fn non_null(self) -> Self {
        match self {
            InputType::NonNull(_) => self,
            other => InputType::NonNull(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, InputType::NonNull(_))
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Scalar(s) => s.fmt(f),
            InputType::List(inner) => write!(f, "[{inner}]"),
            InputType::NonNull(inner) => write!(f, "{inner}!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub argument_type: InputType,
}

impl Argument {
    pub fn new(name: impl Into<String>, argument_type: InputType) -> Self {
        Self {
            name: name.into(),
            argument_type,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.argument_type.is_nullable()
    }
}

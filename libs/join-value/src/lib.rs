mod error;

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde::ser::{Error as _, SerializeMap};
use serde::{ser::Serializer, Serialize};
use std::fmt;

pub use error::ConversionFailure;
pub type JoinValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type JoinListValue = Vec<JoinValue>;

/// A single cell of a fetched row, an argument value or a join key component.
///
/// Values are totally ordered and hashable: join keys are tuples of values
/// and have to be sortable and usable as map keys.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, PartialOrd, Ord)]
#[serde(untagged)]
pub enum JoinValue {
    String(String),
    Boolean(bool),
    Enum(String),
    Int(i64),

    #[serde(serialize_with = "serialize_decimal")]
    Float(BigDecimal),

    List(JoinListValue),

    /// A collections of key-value pairs constituting an object.
    #[serde(serialize_with = "serialize_object")]
    Object(Vec<(String, JoinValue)>),

    #[serde(serialize_with = "serialize_null")]
    Null,
}

impl TryFrom<serde_json::Value> for JoinValue {
    type Error = ConversionFailure;

    fn try_from(v: serde_json::Value) -> JoinValueResult<Self> {
        match v {
            serde_json::Value::String(s) => Ok(JoinValue::String(s)),
            serde_json::Value::Array(v) => {
                let vals: JoinValueResult<Vec<JoinValue>> = v.into_iter().map(JoinValue::try_from).collect();
                Ok(JoinValue::List(vals?))
            }
            serde_json::Value::Null => Ok(JoinValue::Null),
            serde_json::Value::Bool(b) => Ok(JoinValue::Boolean(b)),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(i) => Ok(JoinValue::Int(i)),
                None => num
                    .as_f64()
                    .and_then(BigDecimal::from_f64)
                    .map(|dec| JoinValue::Float(dec.normalized()))
                    .ok_or_else(|| ConversionFailure::new("JSON number", "JoinValue::Float")),
            },
            serde_json::Value::Object(obj) => {
                let pairs = obj
                    .into_iter()
                    .map(|(k, v)| JoinValue::try_from(v).map(|v| (k, v)))
                    .collect::<JoinValueResult<Vec<_>>>()?;

                Ok(JoinValue::Object(pairs))
            }
        }
    }
}

fn serialize_null<S>(serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Option::<u8>::None.serialize(serializer)
}

fn serialize_decimal<S>(decimal: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match decimal.to_f64() {
        Some(float) => float.serialize(serializer),
        None => Err(S::Error::custom(format!("{decimal} does not fit into a 64-bit float"))),
    }
}

fn serialize_object<S>(obj: &Vec<(String, JoinValue)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(obj.len()))?;

    for (k, v) in obj {
        map.serialize_entry(k, v)?;
    }

    map.end()
}

impl JoinValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            JoinValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum_value(&self) -> Option<&str> {
        match self {
            JoinValue::Enum(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            JoinValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<&bool> {
        match self {
            JoinValue::Boolean(bool) => Some(bool),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[JoinValue]> {
        match self {
            JoinValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JoinValue::Null)
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            JoinValue::String(s) => Some(s),
            JoinValue::Enum(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<JoinListValue> {
        match self {
            JoinValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<Vec<(String, JoinValue)>> {
        match self {
            JoinValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Name of the variant, used in conversion and validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            JoinValue::String(_) => "String",
            JoinValue::Boolean(_) => "Boolean",
            JoinValue::Enum(_) => "Enum",
            JoinValue::Int(_) => "Int",
            JoinValue::Float(_) => "Float",
            JoinValue::List(_) => "List",
            JoinValue::Object(_) => "Object",
            JoinValue::Null => "Null",
        }
    }
}

impl fmt::Display for JoinValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JoinValue::String(x) => x.fmt(f),
            JoinValue::Float(x) => x.fmt(f),
            JoinValue::Boolean(x) => x.fmt(f),
            JoinValue::Enum(x) => x.fmt(f),
            JoinValue::Int(x) => x.fmt(f),
            JoinValue::Null => "null".fmt(f),
            JoinValue::List(x) => {
                let joined = x.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
                write!(f, "[{joined}]")
            }
            JoinValue::Object(pairs) => {
                let joined = pairs
                    .iter()
                    .map(|(key, value)| format!(r#""{key}": {value}"#))
                    .collect::<Vec<_>>()
                    .join(", ");

                write!(f, "{{ {joined} }}")
            }
        }
    }
}

impl From<&str> for JoinValue {
    fn from(s: &str) -> Self {
        JoinValue::from(s.to_string())
    }
}

impl From<String> for JoinValue {
    fn from(s: String) -> Self {
        JoinValue::String(s)
    }
}

impl TryFrom<f64> for JoinValue {
    type Error = ConversionFailure;

    fn try_from(f: f64) -> JoinValueResult<JoinValue> {
        BigDecimal::from_f64(f)
            .map(JoinValue::Float)
            .ok_or_else(|| ConversionFailure::new("f64", "Decimal"))
    }
}

impl From<BigDecimal> for JoinValue {
    fn from(d: BigDecimal) -> Self {
        JoinValue::Float(d)
    }
}

impl From<bool> for JoinValue {
    fn from(b: bool) -> Self {
        JoinValue::Boolean(b)
    }
}

impl From<i32> for JoinValue {
    fn from(i: i32) -> Self {
        JoinValue::Int(i64::from(i))
    }
}

impl From<i64> for JoinValue {
    fn from(i: i64) -> Self {
        JoinValue::Int(i)
    }
}

impl From<JoinListValue> for JoinValue {
    fn from(s: JoinListValue) -> Self {
        JoinValue::List(s)
    }
}

impl<T> From<Option<T>> for JoinValue
where
    T: Into<JoinValue>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(JoinValue::Null)
    }
}

impl TryFrom<JoinValue> for i64 {
    type Error = ConversionFailure;

    fn try_from(value: JoinValue) -> JoinValueResult<i64> {
        match value {
            JoinValue::Int(i) => Ok(i),
            _ => Err(ConversionFailure::new("JoinValue", "i64")),
        }
    }
}

impl TryFrom<JoinValue> for String {
    type Error = ConversionFailure;

    fn try_from(value: JoinValue) -> JoinValueResult<String> {
        match value {
            JoinValue::String(s) => Ok(s),
            _ => Err(ConversionFailure::new("JoinValue", "String")),
        }
    }
}

use crate::HandlerError;
use join_core::{CoreError, Item, Map, ResponseData};

/// The response to one request: either the data of the operation or the
/// errors that prevented it, never both.
#[derive(Debug, serde::Serialize, Default, PartialEq)]
pub struct GQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Map>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<GQLError>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct GQLError {
    error: String,
    user_facing_error: user_facing_errors::Error,
}

impl GQLError {
    pub fn code(&self) -> Option<&str> {
        self.user_facing_error.as_known().map(|err| err.error_code.as_ref())
    }

    pub fn message(&self) -> &str {
        self.user_facing_error.message()
    }

    pub fn is_panic(&self) -> bool {
        self.user_facing_error.is_panic()
    }

    pub fn from_user_facing_error(err: user_facing_errors::Error) -> Self {
        GQLError {
            error: err.message().to_owned(),
            user_facing_error: err,
        }
    }

    pub fn from_core_error(err: CoreError) -> Self {
        GQLError {
            error: format!("{err}"),
            user_facing_error: user_facing_errors::Error::from(err),
        }
    }

    pub fn from_handler_error(err: HandlerError) -> Self {
        match err {
            HandlerError::Core(err) => Self::from_core_error(err),
            err => Self::from_user_facing_error(user_facing_errors::Error::from(err)),
        }
    }

    pub fn from_panic_payload(panic_payload: Box<dyn std::any::Any + Send + 'static>) -> Self {
        Self::from_user_facing_error(user_facing_errors::Error::from_panic_payload(panic_payload))
    }
}

impl GQLResponse {
    pub fn new(data: Map) -> Self {
        Self {
            data: Some(data),
            ..Default::default()
        }
    }

    /// Adding an error discards the data.
    pub fn insert_error(&mut self, error: impl Into<GQLError>) {
        self.data = None;
        self.errors.push(error.into());
    }

    pub fn data(&self) -> Option<&Map> {
        self.data.as_ref()
    }

    pub fn take_data(&mut self, key: impl AsRef<str>) -> Option<Item> {
        self.data.as_mut().and_then(|data| data.shift_remove(key.as_ref()))
    }

    pub fn errors(&self) -> impl Iterator<Item = &GQLError> {
        self.errors.iter()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_data(self) -> Option<Map> {
        self.data
    }
}

impl From<HandlerError> for GQLError {
    fn from(err: HandlerError) -> Self {
        Self::from_handler_error(err)
    }
}

impl From<user_facing_errors::Error> for GQLError {
    fn from(err: user_facing_errors::Error) -> Self {
        Self::from_user_facing_error(err)
    }
}

impl From<GQLError> for GQLResponse {
    fn from(err: GQLError) -> Self {
        let mut gql_response = Self::default();

        gql_response.insert_error(err);
        gql_response
    }
}

impl From<HandlerError> for GQLResponse {
    fn from(err: HandlerError) -> Self {
        GQLError::from(err).into()
    }
}

impl From<ResponseData> for GQLResponse {
    fn from(response: ResponseData) -> Self {
        GQLResponse::new(response.into_map())
    }
}

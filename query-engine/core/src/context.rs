//! Opaque values threaded through a resolution pass.
//!
//! The core never inspects either context. A `QueryContext` describes "the
//! fetch so far" for one entity and is refined into new values, never mutated.
//! An `AmbientContext` is supplied by the caller and handed unchanged to every
//! collaborator.

use std::{any::Any, fmt, sync::Arc};

#[derive(Clone, Default)]
struct Opaque(Option<Arc<dyn Any + Send + Sync>>);

impl Opaque {
    fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|value| value.downcast_ref::<T>())
    }
}

#[derive(Clone, Default)]
pub struct QueryContext(Opaque);

impl QueryContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Opaque::new(value))
    }

    /// The parent context of the root entity.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0 .0.is_none()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryContext").field("empty", &self.is_empty()).finish()
    }
}

#[derive(Clone, Default)]
pub struct AmbientContext(Opaque);

impl AmbientContext {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Opaque::new(value))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for AmbientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmbientContext").finish_non_exhaustive()
    }
}

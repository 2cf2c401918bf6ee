//! Delete parameter delivery.
//!
//! The backend accepts deletes in two shapes: by id in the query string
//! (`DELETE /datasets?id=5`) and in bulk through a JSON body
//! (`DELETE /datasets` with `[1, 2, 3]`). Callers say which one they mean
//! with [`DeleteParams`].

use serde_json::Value;

use crate::{Payload, Query, Result};

/// How a DELETE call transmits its parameters.
#[derive(Debug, Clone, Default)]
pub enum DeleteParams {
    /// Neither query string nor body.
    #[default]
    None,
    /// Parameters go into the query string.
    Query(Query),
    /// Parameters go into the request body.
    Body(Payload),
}

impl DeleteParams {
    /// Delete by id in the query string: `?id=<id>`.
    #[must_use]
    pub fn id(id: impl std::fmt::Display) -> Self {
        Self::Query(Query::new().param("id", id))
    }

    /// Delete with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn body<T: serde::Serialize>(value: &T) -> Result<Self> {
        Payload::json(value).map(Self::Body)
    }

    /// Chooses the delivery mode from the shape of `params`.
    ///
    /// - an object with exactly one key, named `id` or `ids`, goes into the
    ///   query string;
    /// - any other object, and any array, becomes the JSON body;
    /// - a bare scalar becomes `?id=<scalar>`, falsy ones included: `0`,
    ///   `""` and `false` send `?id=0`, `?id=` and `?id=false`, where the
    ///   legacy console sent no parameters at all;
    /// - `null` sends nothing.
    ///
    /// This reproduces the legacy console behavior. It silently turns a body
    /// that happens to be `{"id": 5}` into a query string, so new call sites
    /// should build [`DeleteParams::Query`] or [`DeleteParams::Body`]
    /// directly.
    ///
    /// # Errors
    ///
    /// Returns an error if an `id`/`ids` value cannot be used as a query
    /// parameter (a nested object).
    pub fn infer(params: Value) -> Result<Self> {
        match params {
            Value::Null => Ok(Self::None),
            Value::Object(map) if is_id_only(&map) => Query::from_serialize(&map).map(Self::Query),
            value @ (Value::Object(_) | Value::Array(_)) => Ok(Self::Body(Payload::from(value))),
            Value::String(id) => Ok(Self::id(id)),
            scalar => Ok(Self::id(scalar)),
        }
    }
}

fn is_id_only(map: &serde_json::Map<String, Value>) -> bool {
    map.len() == 1 && (map.contains_key("id") || map.contains_key("ids"))
}

impl From<Query> for DeleteParams {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl From<Payload> for DeleteParams {
    fn from(payload: Payload) -> Self {
        Self::Body(payload)
    }
}

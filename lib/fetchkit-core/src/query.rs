//! Query parameters.
//!
//! Absent values are dropped when the query is built, so a `None` page or a
//! JSON `null` filter never reaches the URL.

use serde_json::Value;

use crate::{Error, Result};

/// Ordered list of query parameters, already stringified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Creates an empty query.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.pairs.push((name.into(), value.to_string()));
        self
    }

    /// Appends a parameter when `value` is present.
    #[must_use]
    pub fn param_opt<V: std::fmt::Display>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Builds a query from any serializable map-like value.
    ///
    /// `null` fields are omitted. Strings are used verbatim, numbers and
    /// booleans are formatted, arrays are joined with `,`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `value` does not serialize to an
    /// object, or if a field holds a nested object.
    ///
    /// # Example
    ///
    /// ```
    /// use fetchkit_core::Query;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct TaskFilter {
    ///     status: Option<String>,
    ///     keyword: &'static str,
    ///     page: u32,
    /// }
    ///
    /// let filter = TaskFilter { status: None, keyword: "clean", page: 2 };
    /// let query = Query::from_serialize(&filter).unwrap();
    /// assert_eq!(query.to_string(), "keyword=clean&page=2");
    /// ```
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => {
                let mut query = Self::new();
                for (name, value) in map {
                    if let Some(value) = stringify(&name, &value)? {
                        query.pairs.push((name, value));
                    }
                }
                Ok(query)
            }
            other => Err(Error::invalid_request(format!(
                "query parameters must be an object, got {}",
                kind(&other)
            ))),
        }
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Value of the first parameter named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(key, _)| *key == name).map(|(_, value)| value)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Form-urlencoded rendering, without the leading `?`.
impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish();
        f.write_str(&encoded)
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

fn stringify(name: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Array(items) => {
            let mut joined = Vec::with_capacity(items.len());
            for item in items {
                joined.push(stringify(name, item)?.unwrap_or_default());
            }
            Ok(Some(joined.join(",")))
        }
        Value::Object(_) => Err(Error::invalid_request(format!(
            "query parameter `{name}` cannot be a nested object"
        ))),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

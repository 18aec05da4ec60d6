use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Query parameters appended to the request URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Ordered JSON mapping; values are rendered to text when serialized.
    Map(Map<String, Value>),
    /// Ordered name/value pairs. Repeated names are allowed.
    Pairs(Vec<(String, String)>),
    /// A query string that is already encoded.
    Query(String),
}

impl Params {
    /// Build map params from a JSON value; non-objects yield an empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Params::Map(map),
            _ => Params::Map(Map::new()),
        }
    }
}

impl From<Value> for Params {
    fn from(value: Value) -> Self { Params::from_value(value) }
}

impl From<Vec<(String, String)>> for Params {
    fn from(pairs: Vec<(String, String)>) -> Self { Params::Pairs(pairs) }
}

impl<const N: usize> From<[(&str, &str); N]> for Params {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Params::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<&str> for Params {
    fn from(query: &str) -> Self { Params::Query(query.to_string()) }
}

impl From<String> for Params {
    fn from(query: String) -> Self { Params::Query(query) }
}

/// A caller-supplied query serializer that replaces form encoding.
#[derive(Clone)]
pub struct ParamsSerializer(Arc<dyn Fn(&Params) -> String + Send + Sync>);

impl ParamsSerializer {
    pub fn new(f: impl Fn(&Params) -> String + Send + Sync + 'static) -> Self { Self(Arc::new(f)) }

    pub fn serialize(&self, params: &Params) -> String { (self.0)(params) }
}

impl fmt::Debug for ParamsSerializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("ParamsSerializer { ... }") }
}

use serde_json::{Map, Value};
use tiller_merge::deep_merge;

/// An ordered set of HTTP headers.
///
/// Names are stored as given; lookups are case-insensitive. Folding to one
/// lower-case entry per name happens when header sets are merged with
/// [`Headers::merged`], which is how the request pipeline composes them.
///
/// Values are JSON scalars so that numeric or boolean header values survive
/// merging unchanged; they render to their textual form on the wire. A list
/// holds the values of a repeated header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Map<String, Value>);

impl Headers {
    pub fn new() -> Self { Self::default() }

    /// Insert a header, replacing an entry with exactly the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder form of [`Headers::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Case-insensitive lookup. If several spellings exist the last one wins,
    /// matching what a fold would keep.
    pub fn get(&self, name: &str) -> Option<String> { self.lookup(name).map(render) }

    /// Every value of a header. A list value yields its elements separately,
    /// which is how repeated `set-cookie` lines are kept apart.
    pub fn get_all(&self, name: &str) -> Vec<String> {
        match self.lookup(name) {
            Some(Value::Array(items)) => items.iter().map(render).collect(),
            Some(value) => vec![render(value)],
            None => Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool { self.lookup(name).is_some() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Iterate `(name, rendered value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.0.iter().map(|(key, value)| (key.as_str(), render(value)))
    }

    /// Merge `overrides` on top of `self` with case-folded names.
    ///
    /// The result has exactly one lower-case entry per name; on collision the
    /// override's value wins.
    #[must_use]
    pub fn merged(&self, overrides: &Headers) -> Headers {
        let merged = deep_merge(&self.to_value(), &overrides.to_value(), true);
        Headers::from_value(merged)
    }

    pub fn to_value(&self) -> Value { Value::Object(self.0.clone()) }

    /// Build from a JSON mapping; any other value yields an empty set.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Lists render as their elements joined with `", "`.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

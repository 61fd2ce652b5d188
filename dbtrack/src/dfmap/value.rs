use thiserror::Error;

/// One node of the nested notation: a plain string, an ordered string-keyed
/// map, or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Map(MapValue),
    List(Vec<Value>),
}

impl Value {
    /// Shorthand for a string node.
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Map(_) => "map",
            Value::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Shape mismatch found while reading a parsed map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("missing required key '{0}'")]
    MissingKey(String),

    #[error("key '{key}' holds a {found}, expected a {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("key '{key}' holds an invalid value: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// String-keyed map that iterates in insertion order.
///
/// Keys are unique; inserting an existing key replaces the value in place,
/// keeping the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapValue {
    entries: Vec<(String, Value)>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Required string value; empty counts as present.
    pub fn required_str(&self, key: &str) -> Result<&str, ShapeError> {
        match self.get(key) {
            None => Err(ShapeError::MissingKey(key.to_string())),
            Some(Value::Str(s)) => Ok(s),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    /// Optional string value; an absent key and an empty value both read as `None`.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Str(s)) if s.is_empty() => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s)),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "string",
                found: other.type_name(),
            }),
        }
    }

    pub fn required_map(&self, key: &str) -> Result<&MapValue, ShapeError> {
        match self.get(key) {
            None => Err(ShapeError::MissingKey(key.to_string())),
            Some(Value::Map(m)) => Ok(m),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "map",
                found: other.type_name(),
            }),
        }
    }

    pub fn opt_map(&self, key: &str) -> Result<Option<&MapValue>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Map(m)) => Ok(Some(m)),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "map",
                found: other.type_name(),
            }),
        }
    }

    pub fn required_list(&self, key: &str) -> Result<&[Value], ShapeError> {
        match self.get(key) {
            None => Err(ShapeError::MissingKey(key.to_string())),
            Some(Value::List(items)) => Ok(items),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "list",
                found: other.type_name(),
            }),
        }
    }

    pub fn opt_list(&self, key: &str) -> Result<Option<&[Value]>, ShapeError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::List(items)) => Ok(Some(items)),
            Some(other) => Err(ShapeError::WrongType {
                key: key.to_string(),
                expected: "list",
                found: other.type_name(),
            }),
        }
    }
}

impl FromIterator<(String, Value)> for MapValue {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut map = MapValue::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

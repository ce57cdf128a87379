use serde_json::{Map, Value};

/// Name of the field injected into the first argument when a cache slot is populated.
pub const METHOD_INSTANCE_NAME: &str = "methodInstanceName";

/// Positional arguments passed to a wrapped target.
///
/// Arguments are plain JSON values. The first argument plays a special role:
/// when it is a JSON object it is treated as the target's options structure,
/// and the cache layer may hand the target an augmented copy of it that carries
/// the cache name the result is being stored under.
///
/// # Examples
///
/// ```
/// use module_context_core::Arguments;
/// use serde_json::json;
///
/// let args = Arguments::new().with(json!({ "port": 8080 })).with(json!("extra"));
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.options().and_then(|o| o.get("port")), Some(&json!(8080)));
/// assert_eq!(args.method_instance_name(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Appends an argument and returns the list (builder style).
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Appends an argument in place.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Returns the first argument when it is a keyed structure (a JSON object).
    ///
    /// Primitives, arrays and `null` are not options structures.
    pub fn options(&self) -> Option<&Map<String, Value>> {
        self.values.first().and_then(Value::as_object)
    }

    /// Returns the `methodInstanceName` carried by the options structure, if any.
    ///
    /// Targets read this to learn the cache name their result is stored under.
    pub fn method_instance_name(&self) -> Option<&str> {
        self.options()
            .and_then(|options| options.get(METHOD_INSTANCE_NAME))
            .and_then(Value::as_str)
    }

    /// Returns a copy of these arguments with `methodInstanceName` merged into
    /// the options structure.
    ///
    /// The injected field is laid down first and the caller's fields are merged
    /// over it, so a caller that already supplies `methodInstanceName` keeps its
    /// own value. When the first argument is not an object the copy is identical
    /// to `self`. `self` is never modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use module_context_core::Arguments;
    /// use serde_json::json;
    ///
    /// let args = Arguments::new().with(json!({ "route": "/" }));
    /// let injected = args.inject_instance_name("middleware");
    ///
    /// assert_eq!(injected.method_instance_name(), Some("middleware"));
    /// assert_eq!(args.method_instance_name(), None);
    ///
    /// let positional = Arguments::new().with(json!(42));
    /// assert_eq!(positional.inject_instance_name("answer"), positional);
    /// ```
    pub fn inject_instance_name(&self, cache_name: &str) -> Arguments {
        let Some(options) = self.options() else {
            return self.clone();
        };

        let mut merged = Map::with_capacity(options.len() + 1);
        merged.insert(
            METHOD_INSTANCE_NAME.to_string(),
            Value::String(cache_name.to_string()),
        );
        for (key, value) in options {
            merged.insert(key.clone(), value.clone());
        }

        let mut values = Vec::with_capacity(self.values.len());
        values.push(Value::Object(merged));
        values.extend(self.values.iter().skip(1).cloned());
        Arguments { values }
    }

    pub fn into_inner(self) -> Vec<Value> {
        self.values
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        Self {
            values: vec![value],
        }
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Arguments {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_only_for_objects() {
        assert!(Arguments::new().options().is_none());
        assert!(Arguments::from(json!(null)).options().is_none());
        assert!(Arguments::from(json!([1, 2])).options().is_none());
        assert!(Arguments::from(json!("text")).options().is_none());
        assert!(Arguments::from(json!({})).options().is_some());
    }

    #[test]
    fn test_inject_into_object() {
        let args = Arguments::new()
            .with(json!({ "route": "/users" }))
            .with(json!(7));
        let injected = args.inject_instance_name("users");

        assert_eq!(
            injected.first(),
            Some(&json!({ "route": "/users", "methodInstanceName": "users" }))
        );
        assert_eq!(injected.get(1), Some(&json!(7)));
        // Caller's arguments are untouched
        assert_eq!(args.first(), Some(&json!({ "route": "/users" })));
    }

    #[test]
    fn test_caller_field_wins_over_injected() {
        let args = Arguments::from(json!({ "methodInstanceName": "mine" }));
        let injected = args.inject_instance_name("cache");
        assert_eq!(injected.method_instance_name(), Some("mine"));
    }

    #[test]
    fn test_non_object_first_argument_is_forwarded_verbatim() {
        for first in [json!(1), json!("s"), json!([1]), json!(null), json!(true)] {
            let args = Arguments::new().with(first).with(json!({ "second": true }));
            assert_eq!(args.inject_instance_name("name"), args);
        }
        assert_eq!(Arguments::new().inject_instance_name("name"), Arguments::new());
    }

    #[test]
    fn test_collect_and_iterate() {
        let args: Arguments = vec![json!(1), json!(2), json!(3)].into_iter().collect();
        let sum: i64 = args.iter().filter_map(Value::as_i64).sum();
        assert_eq!(sum, 6);
        assert_eq!(args.into_inner().len(), 3);
    }
}

//! Immutable, strict response envelopes
//!
//! A [`ResponseEnvelope`] wraps one decoded API object. Looking up a key the
//! API did not send is an error, never a silent `None`, so a typo in an
//! attribute name cannot be confused with the API returning `null`.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::money::Money;
use crate::value::{Object, Value};

/// Read-only view over one decoded response object.
///
/// Cloning is cheap; clones share the same underlying object.
///
/// # Example
///
/// ```
/// use buckybox::{ResponseEnvelope, Value};
///
/// let value = Value::from(serde_json::json!({"name": "Joe", "email": null}));
/// let customer = ResponseEnvelope::new(value).unwrap();
///
/// assert_eq!(customer.get_str("name").unwrap(), "Joe");
/// assert!(customer.get("email").unwrap().is_null());
/// assert!(customer.get("age").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    object: Arc<Object>,
}

impl ResponseEnvelope {
    /// Wrap a decoded object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if `value` is not an object. Arrays are
    /// wrapped element by element with [`ResponseEnvelope::wrap_all`].
    pub fn new(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Self {
                object: Arc::new(object),
            }),
            other => Err(Error::Argument(other.dump())),
        }
    }

    /// Wrap every element of a decoded array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] for the first element that is not an object.
    pub fn wrap_all(items: Vec<Value>) -> Result<Vec<Self>> {
        items.into_iter().map(Self::new).collect()
    }

    /// Look up an attribute.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Attribute`] if the key is absent. A key present with
    /// a `null` value returns `Ok(&Value::Null)`.
    pub fn get(&self, attribute: &str) -> Result<&Value> {
        self.object.get(attribute).ok_or_else(|| Error::Attribute {
            attribute: attribute.to_string(),
        })
    }

    /// Look up a string attribute.
    pub fn get_str(&self, attribute: &str) -> Result<&str> {
        let value = self.get(attribute)?;
        value.as_str().ok_or_else(|| mismatch(attribute, "string", value))
    }

    /// Look up an integer attribute.
    pub fn get_i64(&self, attribute: &str) -> Result<i64> {
        let value = self.get(attribute)?;
        value.as_i64().ok_or_else(|| mismatch(attribute, "integer", value))
    }

    /// Look up a boolean attribute.
    pub fn get_bool(&self, attribute: &str) -> Result<bool> {
        let value = self.get(attribute)?;
        value.as_bool().ok_or_else(|| mismatch(attribute, "boolean", value))
    }

    /// Look up an attribute coerced to [`Money`].
    pub fn get_money(&self, attribute: &str) -> Result<Money> {
        let value = self.get(attribute)?;
        value.as_money().ok_or_else(|| mismatch(attribute, "money", value))
    }

    /// Look up a nested object, wrapped in its own envelope.
    pub fn get_envelope(&self, attribute: &str) -> Result<ResponseEnvelope> {
        match self.get(attribute)? {
            Value::Object(object) => Ok(Self {
                object: Arc::new(object.clone()),
            }),
            other => Err(mismatch(attribute, "object", other)),
        }
    }

    /// Look up a nested array of objects, each wrapped in an envelope.
    pub fn get_list(&self, attribute: &str) -> Result<Vec<ResponseEnvelope>> {
        match self.get(attribute)? {
            Value::Array(items) => Self::wrap_all(items.clone()),
            other => Err(mismatch(attribute, "array", other)),
        }
    }

    /// Whether the response contains `attribute`.
    pub fn contains_key(&self, attribute: &str) -> bool {
        self.object.contains_key(attribute)
    }

    /// Attribute names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.object.keys().map(String::as_str)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.object.len()
    }

    /// Whether the object has no attributes.
    pub fn is_empty(&self) -> bool {
        self.object.is_empty()
    }

    /// Borrow the underlying object.
    pub fn as_object(&self) -> &Object {
        &self.object
    }

    /// A copy of the underlying object as a [`Value`].
    pub fn to_value(&self) -> Value {
        Value::Object(self.object.as_ref().clone())
    }
}

fn mismatch(attribute: &str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
        attribute: attribute.to_string(),
        expected,
        found: found.kind(),
    }
}

impl std::fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn joe() -> ResponseEnvelope {
        ResponseEnvelope::new(Value::from(json!({
            "name": "Joe",
            "id": 8859,
            "active": true,
            "email": null,
            "address": {"city": "Wellington"},
            "orders": [{"id": 1}, {"id": 2}],
        })))
        .unwrap()
    }

    #[test]
    fn test_get_present_key() {
        assert_eq!(joe().get("name").unwrap(), &Value::from("Joe"));
        assert_eq!(joe().get_str("name").unwrap(), "Joe");
        assert_eq!(joe().get_i64("id").unwrap(), 8859);
        assert!(joe().get_bool("active").unwrap());
    }

    #[test]
    fn test_get_unknown_key_fails() {
        assert_matches!(joe().get("age"), Err(Error::Attribute { attribute }) if attribute == "age");
    }

    #[test]
    fn test_null_is_distinct_from_absent() {
        let envelope = joe();
        assert!(envelope.get("email").unwrap().is_null());
        assert!(envelope.contains_key("email"));
        assert!(!envelope.contains_key("age"));
    }

    #[test]
    fn test_rejects_non_objects() {
        assert_matches!(ResponseEnvelope::new(Value::from(json!([1, 2]))), Err(Error::Argument(_)));
        assert_matches!(ResponseEnvelope::new(Value::Null), Err(Error::Argument(_)));
        let err = ResponseEnvelope::new(Value::from("Joe")).unwrap_err();
        assert_eq!(err.to_string(), r#""Joe" must be an object"#);
    }

    #[test]
    fn test_nested_object_and_list() {
        let envelope = joe();
        let address = envelope.get_envelope("address").unwrap();
        assert_eq!(address.get_str("city").unwrap(), "Wellington");
        assert!(address.get("zip").is_err());

        let orders = envelope.get_list("orders").unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].get_i64("id").unwrap(), 2);
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let err = joe().get_i64("name").unwrap_err();
        assert_eq!(err.to_string(), "attribute `name` is string, not integer");
        assert!(joe().get_money("name").is_err());
        assert!(joe().get_envelope("name").is_err());
    }

    #[test]
    fn test_wrap_all_fails_on_scalar_element() {
        let items = vec![Value::from(json!({"id": 1})), Value::from(2)];
        assert_matches!(ResponseEnvelope::wrap_all(items), Err(Error::Argument(_)));
    }

    #[test]
    fn test_keys_are_sorted() {
        let envelope = joe();
        let keys: Vec<&str> = envelope.keys().collect();
        assert_eq!(keys, vec!["active", "address", "email", "id", "name", "orders"]);
    }
}

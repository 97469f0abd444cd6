//! Attribute type coercion
//!
//! A [`TypeMap`] names the attributes of a response object that should be
//! turned into semantic types (e.g. `price` into [`Money`](crate::Money)).
//! [`coerce`] applies it to a decoded value, recursing through arrays.

use crate::error::{Error, Result};
use crate::value::Value;
use thiserror::Error as ThisError;

/// A single attribute coercion failed.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{reason}")]
pub struct CoercionError {
    reason: String,
}

impl CoercionError {
    /// Create a coercion error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the value was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Converts one attribute value into its semantic type.
pub type Coercion = fn(Value) -> std::result::Result<Value, CoercionError>;

/// Mapping from attribute name to the coercion applied to it.
///
/// # Example
///
/// ```
/// use buckybox::{Money, TypeMap};
///
/// let types = TypeMap::new().with("price", Money::coerce);
/// assert!(types.contains("price"));
/// ```
#[derive(Clone, Default)]
pub struct TypeMap {
    entries: Vec<(&'static str, Coercion)>,
}

impl TypeMap {
    /// An empty type map; values pass through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the coercion for `attribute`.
    pub fn with(mut self, attribute: &'static str, coercion: Coercion) -> Self {
        match self.entries.iter_mut().find(|(name, _)| *name == attribute) {
            Some(entry) => entry.1 = coercion,
            None => self.entries.push((attribute, coercion)),
        }
        self
    }

    /// Whether `attribute` has a coercion.
    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == attribute)
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute names, in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

impl std::fmt::Debug for TypeMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.attributes()).finish()
    }
}

/// Apply `types` to a decoded value.
///
/// Arrays are coerced element by element. For objects every mapped
/// attribute must be present. Keys outside the map are left untouched.
///
/// # Errors
///
/// - [`Error::MissingAttribute`] if a mapped attribute is absent (or the value
///   is a scalar while the map is non-empty)
/// - [`Error::Coercion`] if a coercion rejects the attribute's value
pub fn coerce(value: Value, types: &TypeMap) -> Result<Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| coerce(item, types))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(mut object) => {
            for (attribute, coercion) in &types.entries {
                let current = object
                    .remove(*attribute)
                    .ok_or_else(|| Error::MissingAttribute {
                        attribute: (*attribute).to_string(),
                    })?;
                let coerced = coercion(current).map_err(|source| Error::Coercion {
                    attribute: (*attribute).to_string(),
                    source,
                })?;
                object.insert((*attribute).to_string(), coerced);
            }
            Ok(Value::Object(object))
        }
        scalar => match types.attributes().next() {
            None => Ok(scalar),
            Some(attribute) => Err(Error::MissingAttribute {
                attribute: attribute.to_string(),
            }),
        },
    }
}

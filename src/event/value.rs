//! Type-erased payload values.

use crate::{Error, Result};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A keyed mapping payload shape
pub type ValueMap = HashMap<String, Value>;

/// An ordered sequence payload shape
pub type ValueList = Vec<Value>;

#[derive(Clone)]
struct Erased {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// A nullable, type-erased value.
///
/// `Value` is what an [`Event`](crate::Event) carries as its payload and what
/// [`ValueMap`] and [`ValueList`] hold as elements. Cloning is cheap: the
/// wrapped value sits behind an `Arc` and is shared, never copied or mutated.
///
/// ```rust
/// use tokio_dispatch::Value;
///
/// let value = Value::new(42u32);
/// assert!(value.is::<u32>());
/// assert_eq!(value.downcast_ref::<u32>(), Some(&42));
/// assert!(Value::nil().is_nil());
/// ```
#[derive(Clone, Default)]
pub struct Value(Option<Erased>);

impl Value {
    /// The absent value
    pub fn nil() -> Self {
        Self(None)
    }

    /// Wrap a concrete value.
    ///
    /// Wrapping a `Value` returns it as-is rather than nesting it.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let mut slot = Some(value);
        if let Some(existing) = (&mut slot as &mut dyn Any).downcast_mut::<Option<Value>>() {
            return existing.take().unwrap_or_default();
        }

        match slot {
            Some(value) => Self(Some(Erased {
                inner: Arc::new(value),
                type_name: type_name::<T>(),
            })),
            None => Self::nil(),
        }
    }

    /// Wrap an optional value, mapping `None` to nil
    pub fn from_option<T: Any + Send + Sync>(value: Option<T>) -> Self {
        value.map(Self::new).unwrap_or_default()
    }

    /// Build a [`ValueMap`] payload
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let map: ValueMap = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::new(map)
    }

    /// Build a [`ValueList`] payload
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self::new(items.into_iter().collect::<ValueList>())
    }

    /// Whether this value is absent
    pub fn is_nil(&self) -> bool {
        self.0.is_none()
    }

    /// Whether this value holds exactly a `T`
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    /// Borrow the wrapped value as a `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|erased| (*erased.inner).downcast_ref::<T>())
    }

    /// Name of the concrete type held, `None` for nil
    pub fn type_name(&self) -> Option<&'static str> {
        self.0.as_ref().map(|erased| erased.type_name)
    }

    /// Convert decoded JSON into a value.
    ///
    /// Objects become [`ValueMap`], arrays [`ValueList`], integers `i64`
    /// (`u64` past `i64::MAX`), other numbers `f64`, and `null` nil.
    pub fn from_json(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::nil(),
            Json::Bool(b) => Self::new(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::new(i)
                } else if let Some(u) = n.as_u64() {
                    Self::new(u)
                } else {
                    Self::new(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Self::new(s),
            Json::Array(items) => Self::list(items.into_iter().map(Self::from_json)),
            Json::Object(fields) => Self::map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v))),
            ),
        }
    }

    /// Render this value as JSON, `None` for nil.
    ///
    /// Supports JSON values, strings, booleans, the common integer and
    /// float types, and nested [`ValueMap`] / [`ValueList`] containers.
    pub fn to_json(&self) -> Result<Option<serde_json::Value>> {
        use serde_json::Value as Json;

        let Some(erased) = &self.0 else {
            return Ok(None);
        };
        let any = &*erased.inner;

        macro_rules! scalar {
            ($($ty:ty),*) => {
                $(
                    if let Some(v) = any.downcast_ref::<$ty>() {
                        return Ok(Some(serde_json::json!(v)));
                    }
                )*
            };
        }

        if let Some(v) = any.downcast_ref::<Json>() {
            return Ok(Some(v.clone()));
        }
        scalar!(String, &'static str, bool, i64, i32, i16, i8, u64, u32, u16, u8, f64, f32);

        if let Some(map) = any.downcast_ref::<ValueMap>() {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.clone(), value.to_json()?.unwrap_or(Json::Null));
            }
            return Ok(Some(Json::Object(object)));
        }

        if let Some(list) = any.downcast_ref::<ValueList>() {
            let items = list
                .iter()
                .map(|v| v.to_json().map(|j| j.unwrap_or(Json::Null)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Some(Json::Array(items)));
        }

        Err(Error::serialization(format!(
            "payload of type {} has no JSON representation",
            erased.type_name
        )))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name() {
            Some(name) => write!(f, "Value({})", name),
            None => f.write_str("Value(nil)"),
        }
    }
}

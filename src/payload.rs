//! Typed access to event payloads.
//!
//! Payloads travel as [`Value`]s of unknown type. The functions here recover a
//! caller-chosen type `T` from them and report absent or mismatched data as
//! [`Error`] values rather than panicking. [`must_payload_as`] is the one
//! exception and is meant for call sites that already guarantee the type.
//!
//! ```rust
//! use tokio_dispatch::{payload, Event, Value};
//!
//! let event = Event::new("user.created", Value::new("ada".to_string()));
//! assert_eq!(payload::payload_as::<String>(&event).unwrap(), "ada");
//! assert!(payload::payload_as::<u32>(&event).is_err());
//! ```

use crate::event::{Value, ValueMap};
use crate::{Error, Event, Result};
use std::any::{type_name, Any};
use std::collections::HashMap;

fn mismatch<T>(value: &Value) -> Error {
    Error::InvalidPayloadType {
        expected: type_name::<T>(),
        found: value.type_name().unwrap_or("nil"),
    }
}

fn cast<T: Any>(value: &Value) -> Result<&T> {
    if value.is_nil() {
        return Err(Error::NilPayload);
    }
    value.downcast_ref::<T>().ok_or_else(|| mismatch::<T>(value))
}

/// Borrow the payload as a `T`.
///
/// Fails with [`Error::NilPayload`] when the event has no payload and
/// [`Error::InvalidPayloadType`] when it holds something other than `T`.
pub fn payload_as<T: Any>(event: &Event) -> Result<&T> {
    cast(event.payload())
}

/// Borrow the payload as a `T`, panicking on failure.
///
/// # Panics
///
/// Panics with the [`payload_as`] error message if the payload is nil or not
/// a `T`.
pub fn must_payload_as<T: Any>(event: &Event) -> &T {
    match payload_as(event) {
        Ok(value) => value,
        Err(e) => panic!("{}", e),
    }
}

/// Whether the payload is present and of type `T`. Never fails.
pub fn is_payload_type<T: Any>(event: &Event) -> bool {
    event.payload().is::<T>()
}

/// Borrow the payload as a [`ValueMap`]
pub fn payload_as_map(event: &Event) -> Result<&ValueMap> {
    let payload = event.payload();
    if payload.is_nil() {
        return Err(Error::NilPayload);
    }
    payload.downcast_ref::<ValueMap>().ok_or(Error::NotAMap)
}

/// Borrow the payload as a slice of [`Value`]s
pub fn payload_as_slice(event: &Event) -> Result<&[Value]> {
    let payload = event.payload();
    if payload.is_nil() {
        return Err(Error::NilPayload);
    }
    payload
        .downcast_ref::<Vec<Value>>()
        .map(Vec::as_slice)
        .ok_or(Error::NotASlice)
}

/// Convert a map payload into a map of `T`.
///
/// Nil entries are left out of the result. The first non-nil entry that is
/// not a `T` fails the whole conversion with [`Error::InvalidKeyType`].
pub fn payload_map_as<T: Any + Clone>(event: &Event) -> Result<HashMap<String, T>> {
    let map = payload_as_map(event)?;
    let mut out = HashMap::with_capacity(map.len());

    for (key, value) in map {
        if value.is_nil() {
            continue;
        }
        let typed = value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::InvalidKeyType {
                key: key.clone(),
                expected: type_name::<T>(),
                found: value.type_name().unwrap_or("nil"),
            })?;
        out.insert(key.clone(), typed.clone());
    }

    Ok(out)
}

/// Convert a sequence payload into a `Vec<T>`.
///
/// Nil elements are skipped. Errors report the index in the original
/// sequence, not in the filtered output.
pub fn payload_slice_as<T: Any + Clone>(event: &Event) -> Result<Vec<T>> {
    let items = payload_as_slice(event)?;
    let mut out = Vec::with_capacity(items.len());

    for (index, value) in items.iter().enumerate() {
        if value.is_nil() {
            continue;
        }
        let typed = value
            .downcast_ref::<T>()
            .ok_or_else(|| Error::InvalidIndexType {
                index,
                expected: type_name::<T>(),
                found: value.type_name().unwrap_or("nil"),
            })?;
        out.push(typed.clone());
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
    }

    const ITEM_A: Item = Item { name: "a" };
    const ITEM_C: Item = Item { name: "c" };

    #[test]
    fn test_payload_as_round_trip() {
        let event = Event::new("x", Value::new(ITEM_A));
        assert_eq!(payload_as::<Item>(&event).unwrap(), &ITEM_A);

        let event = Event::new("x", Value::new(17i64));
        assert_eq!(payload_as::<i64>(&event).unwrap(), &17);
    }

    #[test]
    fn test_payload_as_nil() {
        let event = Event::new("x", Value::nil());
        let err = payload_as::<Item>(&event).unwrap_err();
        assert!(err.to_string().contains("payload is nil"));
    }

    #[test]
    fn test_payload_as_wrong_type() {
        let event = Event::new("x", Value::new("not-an-item"));
        let err = payload_as::<Item>(&event).unwrap_err();
        assert!(err.to_string().contains("invalid payload type"));
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_must_payload_as() {
        let event = Event::new("x", Value::new(ITEM_C));
        assert_eq!(must_payload_as::<Item>(&event).name, "c");
    }

    #[test]
    #[should_panic(expected = "payload is nil")]
    fn test_must_payload_as_panics_on_nil() {
        let event = Event::new("x", Value::nil());
        must_payload_as::<Item>(&event);
    }

    #[test]
    #[should_panic(expected = "invalid payload type")]
    fn test_must_payload_as_panics_on_mismatch() {
        let event = Event::new("x", Value::new(1u8));
        must_payload_as::<Item>(&event);
    }

    #[test]
    fn test_is_payload_type() {
        assert!(is_payload_type::<Item>(&Event::new("x", Value::new(ITEM_A))));
        assert!(!is_payload_type::<String>(&Event::new("x", Value::new(ITEM_A))));
        assert!(!is_payload_type::<Item>(&Event::new("x", Value::nil())));
    }

    #[test]
    fn test_payload_as_map() {
        let event = Event::new("x", Value::map([("k", Value::new(1u8))]));
        assert_eq!(payload_as_map(&event).unwrap().len(), 1);

        let err = payload_as_map(&Event::new("x", Value::nil())).unwrap_err();
        assert_eq!(err, Error::NilPayload);

        let err = payload_as_map(&Event::new("x", Value::new(3u8))).unwrap_err();
        assert_eq!(err.to_string(), "payload is not a map");

        // Only string-keyed value maps count as maps
        let other: HashMap<u32, Value> = HashMap::new();
        let err = payload_as_map(&Event::new("x", Value::new(other))).unwrap_err();
        assert_eq!(err, Error::NotAMap);
    }

    #[test]
    fn test_payload_as_slice() {
        let event = Event::new("x", Value::list([Value::new(1u8), Value::nil()]));
        assert_eq!(payload_as_slice(&event).unwrap().len(), 2);

        let err = payload_as_slice(&Event::new("x", Value::nil())).unwrap_err();
        assert_eq!(err, Error::NilPayload);

        let err = payload_as_slice(&Event::new("x", Value::new("abc"))).unwrap_err();
        assert_eq!(err.to_string(), "payload is not a slice");
    }

    #[test]
    fn test_payload_slice_as_skips_nil() {
        let event = Event::new(
            "x",
            Value::list([Value::new(ITEM_A), Value::nil(), Value::new(ITEM_C)]),
        );
        assert_eq!(payload_slice_as::<Item>(&event).unwrap(), vec![ITEM_A, ITEM_C]);
    }

    #[test]
    fn test_payload_slice_as_reports_original_index() {
        let event = Event::new("x", Value::list([Value::new(ITEM_A), Value::new("wrong")]));
        let err = payload_slice_as::<Item>(&event).unwrap_err();
        assert!(err.to_string().contains("invalid type at index 1"));

        let event = Event::new(
            "x",
            Value::list([Value::nil(), Value::nil(), Value::new(7u8)]),
        );
        let err = payload_slice_as::<Item>(&event).unwrap_err();
        assert!(matches!(err, Error::InvalidIndexType { index: 2, .. }));
    }

    #[test]
    fn test_payload_map_as_skips_nil() {
        let event = Event::new(
            "x",
            Value::map([
                ("a", Value::new(ITEM_A)),
                ("nil", Value::nil()),
                ("c", Value::new(ITEM_C)),
            ]),
        );
        let map = payload_map_as::<Item>(&event).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], ITEM_A);
        assert_eq!(map["c"], ITEM_C);
        assert!(!map.contains_key("nil"));
    }

    #[test]
    fn test_payload_map_as_reports_key() {
        let event = Event::new(
            "x",
            Value::map([("a", Value::new(ITEM_A)), ("bad", Value::new("wrong"))]),
        );
        let err = payload_map_as::<Item>(&event).unwrap_err();
        assert!(err.to_string().contains("invalid type for key \"bad\""));
    }

    #[test]
    fn test_collection_conversions_propagate_shape_errors() {
        let nil = Event::new("x", Value::nil());
        assert_eq!(payload_map_as::<Item>(&nil).unwrap_err(), Error::NilPayload);
        assert_eq!(payload_slice_as::<Item>(&nil).unwrap_err(), Error::NilPayload);

        let scalar = Event::new("x", Value::new(ITEM_A));
        assert_eq!(payload_map_as::<Item>(&scalar).unwrap_err(), Error::NotAMap);
        assert_eq!(payload_slice_as::<Item>(&scalar).unwrap_err(), Error::NotASlice);
    }
}

//! Strict scalar and object value conversion at the boundary between
//! [`ResolvedValue`] (the engine-agnostic resolver result domain) and
//! `async_graphql::Value`/`async_graphql::dynamic::FieldValue` (the engine's
//! own domain). Spec.md §4.6: "Named scalar types use strict conversion."

use async_graphql::dynamic::FieldValue;
use async_graphql::{Number, Value};

use crate::compiled::ResolvedValue;
use crate::error::ResolverError;
use crate::spec::TypeSpec;

/// Converts a [`ResolvedValue`] into the engine's dynamic `FieldValue`,
/// guided by the field's declared [`TypeSpec`] so non-null violations and
/// scalar-shape mismatches are caught with the current path attached by the
/// caller (spec.md §4.6).
pub fn to_field_value(
    value: ResolvedValue,
    type_spec: &TypeSpec,
) -> Result<FieldValue<'static>, ResolverError> {
    match (&value, type_spec) {
        (ResolvedValue::Null, _) => {
            if type_spec.nullable() {
                Ok(FieldValue::NULL)
            } else {
                Err(ResolverError::TypeMismatch {
                    expected: format!("non-null {type_spec}"),
                })
            }
        }
        (_, TypeSpec::List { element, .. }) => match value {
            ResolvedValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(to_field_value(item, element)?);
                }
                Ok(FieldValue::list(out))
            }
            _ => Err(ResolverError::TypeMismatch {
                expected: format!("a list for {type_spec}"),
            }),
        },
        (_, TypeSpec::Named { name, .. }) if is_builtin_scalar(name) => {
            to_scalar_field_value(value, name)
        }
        (ResolvedValue::Object { type_name, handle }, _) => {
            Ok(FieldValue::owned_any(handle.clone()).with_type(type_name.clone()))
        }
        (ResolvedValue::String(s), TypeSpec::Union { .. }) => {
            // Enum-backed union discriminants resolve through here too; treat
            // as an opaque scalar passthrough only if no object tag is present.
            Ok(FieldValue::value(Value::String(s.clone())))
        }
        _ => Err(ResolverError::TypeMismatch {
            expected: type_spec.to_string(),
        }),
    }
}

fn is_builtin_scalar(name: &str) -> bool {
    crate::spec::BUILTIN_SCALARS.contains(&name)
}

fn to_scalar_field_value(
    value: ResolvedValue,
    scalar_name: &str,
) -> Result<FieldValue<'static>, ResolverError> {
    let gql_value = match (scalar_name, value) {
        ("String", ResolvedValue::String(s)) => Value::String(s),
        ("ID", ResolvedValue::String(s)) => Value::String(s),
        ("ID", ResolvedValue::Int(i)) => Value::String(i.to_string()),
        ("Int", ResolvedValue::Int(i)) => Value::Number(Number::from(i)),
        ("Float", ResolvedValue::Float(f)) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| ResolverError::TypeMismatch {
                expected: "a finite Float".into(),
            })?,
        ("Float", ResolvedValue::Int(i)) => Value::Number(Number::from(i)),
        ("Boolean", ResolvedValue::Boolean(b)) => Value::Boolean(b),
        (name, other) => {
            return Err(ResolverError::TypeMismatch {
                expected: format!("{name} from a matching host value, found {other:?}"),
            });
        }
    };
    Ok(FieldValue::value(gql_value))
}

/// Strict coercion of an engine-side `Value` into a primitive used when
/// building [`crate::compiled::KwArgs`] for a resolver invocation (the
/// inverse direction of `to_field_value`; spec.md §4.6, §8 boundary
/// behaviors: "An argument of integer type accepts values in the
/// signed-64-bit range").
pub fn int_from_value(value: &serde_json::Value) -> Result<i64, ResolverError> {
    value
        .as_i64()
        .ok_or_else(|| ResolverError::TypeMismatch {
            expected: "Int in the signed-64-bit range".into(),
        })
}

pub fn float_from_value(value: &serde_json::Value) -> Result<f64, ResolverError> {
    value
        .as_f64()
        .ok_or_else(|| ResolverError::TypeMismatch {
            expected: "a float-convertible value".into(),
        })
}

pub fn bool_from_value(value: &serde_json::Value) -> Result<bool, ResolverError> {
    value
        .as_bool()
        .ok_or_else(|| ResolverError::TypeMismatch {
            expected: "a Boolean".into(),
        })
}

pub fn string_from_value(value: &serde_json::Value) -> Result<String, ResolverError> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ResolverError::TypeMismatch {
            expected: "a String".into(),
        })
}

/// `ID` accepts either a string or an int host value (spec.md §4.6).
pub fn id_from_value(value: &serde_json::Value) -> Result<String, ResolverError> {
    if let Some(s) = value.as_str() {
        return Ok(s.to_owned());
    }
    if let Some(i) = value.as_i64() {
        return Ok(i.to_string());
    }
    Err(ResolverError::TypeMismatch {
        expected: "an ID (string or int)".into(),
    })
}

/// Converts a query/mutation-root data field's literal default into
/// [`ResolvedValue`] (spec.md §4.4 step 1: "queries have no parent to read
/// from", so a root data field's value is its declared default rather than
/// an attribute read). Recurses through JSON arrays; a JSON object has no
/// [`ResolvedValue::Object`] equivalent here since a root default can only
/// ever be a literal, never a class instance.
pub fn resolved_value_from_json(value: &serde_json::Value) -> ResolvedValue {
    match value {
        serde_json::Value::Null => ResolvedValue::Null,
        serde_json::Value::Bool(b) => ResolvedValue::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ResolvedValue::Int(i)
            } else {
                ResolvedValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        serde_json::Value::String(s) => ResolvedValue::String(s.clone()),
        serde_json::Value::Array(items) => {
            ResolvedValue::List(items.iter().map(resolved_value_from_json).collect())
        }
        serde_json::Value::Object(_) => ResolvedValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, nullable: bool) -> TypeSpec {
        TypeSpec::Named {
            name: name.to_string(),
            nullable,
        }
    }

    #[test]
    fn null_rejected_for_non_null_position() {
        let err = to_field_value(ResolvedValue::Null, &named("String", false)).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn null_accepted_for_nullable_position() {
        assert!(to_field_value(ResolvedValue::Null, &named("String", true)).is_ok());
    }

    #[test]
    fn int_accepts_full_signed_64_bit_range() {
        let huge = ResolvedValue::Int(i64::from(i32::MAX) + 1);
        assert!(to_scalar_field_value(huge, "Int").is_ok());
        assert!(to_scalar_field_value(ResolvedValue::Int(i64::MIN), "Int").is_ok());
    }

    #[test]
    fn id_accepts_string_or_int() {
        assert_eq!(
            id_from_value(&serde_json::json!("abc")).unwrap(),
            "abc".to_string()
        );
        assert_eq!(id_from_value(&serde_json::json!(7)).unwrap(), "7".to_string());
    }
}

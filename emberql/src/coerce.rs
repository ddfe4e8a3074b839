//! Input coercion: converting the engine's argument value domain into
//! instances of `#[derive(InputObject)]` types, recursing into nested inputs
//! and lists (spec.md §4.2 step 4, §8 round-trip law).

use std::sync::Arc;

use crate::error::ResolverError;

/// Implemented by `emberql_codegen`'s `#[derive(InputObject)]` output for
/// every registered input type. `from_coerced` builds an instance from a
/// decoded JSON object (the engine's argument map, already defaulted);
/// `to_coerced` is its inverse, used by the round-trip law of spec.md §8.
pub trait InputCoerce: Sized + Send + Sync + 'static {
    fn from_coerced(value: &serde_json::Value) -> Result<Self, ResolverError>;
    fn to_coerced(&self) -> serde_json::Value;
}

/// A boxed coercer installed on an [`crate::spec::ArgSpec`] whose analyzed
/// type refers to a compiled input class (spec.md §4.2 step 4). Kept
/// type-erased so [`crate::compiled::CompiledResolverField`] does not need a
/// type parameter per argument.
pub type Coercer =
    Arc<dyn Fn(&serde_json::Value) -> Result<serde_json::Value, ResolverError> + Send + Sync>;

/// Builds a [`Coercer`] for an input type `T`: round-trips the raw value
/// through `T::from_coerced`/`to_coerced` so coercion errors (missing
/// required fields, type mismatches in nested inputs) surface before the
/// resolver is entered, matching the coercer's job in spec.md §4.2 step 4.
pub fn coercer_for<T: InputCoerce>() -> Coercer {
    Arc::new(|raw| T::from_coerced(raw).map(|v| v.to_coerced()))
}

/// Coerces a list-valued raw argument element-wise, rejecting non-list host
/// values including tuples (spec.md §4.6, §8: "A list argument rejects a
/// non-list host value").
pub fn coerce_list(
    raw: &serde_json::Value,
    element: &Coercer,
) -> Result<serde_json::Value, ResolverError> {
    let arr = raw.as_array().ok_or_else(|| ResolverError::TypeMismatch {
        expected: "a list".into(),
    })?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(element(item)?);
    }
    Ok(serde_json::Value::Array(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Clone)]
    struct AddUserInput {
        name: String,
        title: Option<String>,
    }

    impl InputCoerce for AddUserInput {
        fn from_coerced(value: &serde_json::Value) -> Result<Self, ResolverError> {
            let obj = value.as_object().ok_or_else(|| ResolverError::TypeMismatch {
                expected: "an input object".into(),
            })?;
            let name = obj
                .get("name")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ResolverError::ArgumentCoercion {
                    name: "name".into(),
                    detail: "required field missing".into(),
                })?
                .to_owned();
            let title = obj.get("title").and_then(|v| v.as_str()).map(str::to_owned);
            Ok(AddUserInput { name, title })
        }

        fn to_coerced(&self) -> serde_json::Value {
            serde_json::json!({ "name": self.name, "title": self.title })
        }
    }

    #[test]
    fn round_trip_is_idempotent() {
        let raw = serde_json::json!({"name": "Gromit", "title": "Mr."});
        let once = coercer_for::<AddUserInput>()(&raw).unwrap();
        let twice = coercer_for::<AddUserInput>()(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_required_field_errors() {
        let raw = serde_json::json!({"title": "Mr."});
        assert!(AddUserInput::from_coerced(&raw).is_err());
    }

    #[test]
    fn list_rejects_non_array() {
        let elem: Coercer = Arc::new(|v| Ok(v.clone()));
        assert!(coerce_list(&serde_json::json!("not a list"), &elem).is_err());
    }
}

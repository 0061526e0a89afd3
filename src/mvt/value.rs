// Property value typing and dictionary interning keys.
//
// Input property values are dynamically typed (serde_json::Value). Each
// value classifies into exactly one wire variant, and a textual interning
// key `<runtime type>:<string form>` drives dictionary deduplication. The
// key never reaches the wire; only its collision boundary matters: 1 and
// 1.0 share an entry, while the string "true" and the boolean true do not.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value as JsonValue;

use super::proto;

// ---------------------------------------------------------------------------
// Typed values
// ---------------------------------------------------------------------------

/// A property value classified into its wire variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    String(String),
    Double(f64),
    Uint(u64),
    Sint(i64),
    Bool(bool),
}

impl TypedValue {
    /// Classifies a dynamic value.
    ///
    /// Strings and booleans map directly. Numbers with a non-zero
    /// fractional part become `Double`; integral negatives become `Sint`;
    /// integral non-negatives become `Uint`. Integral magnitudes beyond
    /// the u64/i64 range stay `Double` so the value is never altered.
    /// Everything else (objects, arrays, null) is stored as its compact
    /// JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else if let Some(i) = n.as_i64() {
                    Self::Sint(i)
                } else {
                    match n.as_f64() {
                        Some(f) => match (integral_u64(f), integral_i64(f)) {
                            (Some(u), _) => Self::Uint(u),
                            (_, Some(i)) => Self::Sint(i),
                            _ => Self::Double(f),
                        },
                        // unreachable without serde_json's arbitrary_precision
                        None => Self::Double(f64::NAN),
                    }
                }
            }
            other => Self::String(other.to_string()),
        }
    }
}

/// The string form used inside interning keys.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Double(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Sint(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Classifies a value and derives its interning key.
pub fn wrap(value: &JsonValue) -> (TypedValue, String) {
    let wrapped = TypedValue::from_json(value);
    let key = format!("{}:{}", type_name(value), wrapped);
    (wrapped, key)
}

/// Runtime type tag of the original (pre-classification) value.
fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::String(_) => "string",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        _ => "object",
    }
}

/// Feature-id filter: integer-valued, non-negative numbers survive;
/// everything else drops.
pub fn integer_id(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral_u64)),
        _ => None,
    }
}

#[inline]
fn integral_u64(f: f64) -> Option<u64> {
    // u64::MAX as f64 rounds up to 2^64, making the bound exclusive.
    (f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64).then_some(f as u64)
}

#[inline]
fn integral_i64(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f < 0.0 && f >= i64::MIN as f64).then_some(f as i64)
}

// ---------------------------------------------------------------------------
// Wire conversion
// ---------------------------------------------------------------------------

impl<'a> From<&'a TypedValue> for proto::Value<'a> {
    fn from(value: &'a TypedValue) -> Self {
        let mut out = proto::Value::default();
        match value {
            TypedValue::String(s) => out.string_value = Some(Cow::Borrowed(s.as_str())),
            TypedValue::Double(v) => out.double_value = Some(*v),
            TypedValue::Uint(v) => out.uint_value = Some(*v),
            TypedValue::Sint(v) => out.sint_value = Some(*v),
            TypedValue::Bool(v) => out.bool_value = Some(*v),
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_classify_by_runtime_type() {
        assert_eq!(TypedValue::from_json(&json!("x")), TypedValue::String("x".into()));
        assert_eq!(TypedValue::from_json(&json!(true)), TypedValue::Bool(true));
        assert_eq!(TypedValue::from_json(&json!(5)), TypedValue::Uint(5));
        assert_eq!(TypedValue::from_json(&json!(-5)), TypedValue::Sint(-5));
        assert_eq!(TypedValue::from_json(&json!(5.5)), TypedValue::Double(5.5));
    }

    #[test]
    fn integral_floats_collapse_to_integers() {
        assert_eq!(TypedValue::from_json(&json!(5.0)), TypedValue::Uint(5));
        assert_eq!(TypedValue::from_json(&json!(-5.0)), TypedValue::Sint(-5));
        assert_eq!(TypedValue::from_json(&json!(-0.0)), TypedValue::Uint(0));
    }

    #[test]
    fn huge_integral_floats_stay_double() {
        assert_eq!(TypedValue::from_json(&json!(1e300)), TypedValue::Double(1e300));
        assert_eq!(
            TypedValue::from_json(&json!(-1e300)),
            TypedValue::Double(-1e300)
        );
    }

    #[test]
    fn large_integers_keep_full_precision() {
        assert_eq!(
            TypedValue::from_json(&json!(39953616224u64)),
            TypedValue::Uint(39953616224)
        );
        assert_eq!(
            TypedValue::from_json(&json!(u64::MAX)),
            TypedValue::Uint(u64::MAX)
        );
        assert_eq!(
            TypedValue::from_json(&json!(i64::MIN)),
            TypedValue::Sint(i64::MIN)
        );
    }

    #[test]
    fn composites_become_json_text() {
        assert_eq!(
            TypedValue::from_json(&json!({"hello": "world"})),
            TypedValue::String("{\"hello\":\"world\"}".into())
        );
        assert_eq!(
            TypedValue::from_json(&json!([1, 2, 3])),
            TypedValue::String("[1,2,3]".into())
        );
        assert_eq!(
            TypedValue::from_json(&JsonValue::Null),
            TypedValue::String("null".into())
        );
    }

    #[test]
    fn intern_keys_carry_runtime_type_and_string_form() {
        assert_eq!(wrap(&json!(5)).1, "number:5");
        assert_eq!(wrap(&json!(-5)).1, "number:-5");
        assert_eq!(wrap(&json!(331.75415)).1, "number:331.75415");
        assert_eq!(wrap(&json!("5")).1, "string:5");
        assert_eq!(wrap(&json!(true)).1, "boolean:true");
        assert_eq!(wrap(&json!({"a": 1})).1, "object:{\"a\":1}");
        assert_eq!(wrap(&JsonValue::Null).1, "object:null");
    }

    #[test]
    fn intern_key_collision_boundary() {
        // Same runtime type, same string form: collide.
        assert_eq!(wrap(&json!(1)).1, wrap(&json!(1.0)).1);
        assert_eq!(wrap(&json!(-0.0)).1, wrap(&json!(0)).1);
        // Different runtime type, same string form: distinct.
        assert_ne!(wrap(&json!(5)).1, wrap(&json!("5")).1);
        assert_ne!(wrap(&json!(true)).1, wrap(&json!("true")).1);
        assert_ne!(wrap(&json!({"a": 1})).1, wrap(&json!("{\"a\":1}")).1);
    }

    #[test]
    fn id_filter_keeps_non_negative_integers_only() {
        assert_eq!(integer_id(&json!(123)), Some(123));
        assert_eq!(integer_id(&json!(0)), Some(0));
        assert_eq!(integer_id(&json!(4.0)), Some(4));
        assert_eq!(integer_id(&json!(u64::MAX)), Some(u64::MAX));
        assert_eq!(integer_id(&json!(-5)), None);
        assert_eq!(integer_id(&json!(1.5)), None);
        assert_eq!(integer_id(&json!("Hello")), None);
        assert_eq!(integer_id(&json!("123")), None);
        assert_eq!(integer_id(&json!(true)), None);
        assert_eq!(integer_id(&JsonValue::Null), None);
    }

    #[test]
    fn wire_conversion_sets_exactly_one_field() {
        let value = proto::Value::from(&TypedValue::Uint(7));
        assert_eq!(value.uint_value, Some(7));
        assert_eq!(value.string_value, None);
        assert_eq!(value.double_value, None);

        let typed = TypedValue::String("hi".into());
        let value = proto::Value::from(&typed);
        assert_eq!(value.string_value.as_deref(), Some("hi"));
        assert_eq!(value.uint_value, None);

        let value = proto::Value::from(&TypedValue::Sint(-3));
        assert_eq!(value.sint_value, Some(-3));

        let value = proto::Value::from(&TypedValue::Double(0.5));
        assert_eq!(value.double_value, Some(0.5));

        let value = proto::Value::from(&TypedValue::Bool(true));
        assert_eq!(value.bool_value, Some(true));
    }
}

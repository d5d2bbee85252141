//! Strict binding of decoded JSON values onto Rust types

use serde_json::Value;

/// Trait for types that can be bound from a decoded snapshot value.
///
/// Binding is strict about shape: a value of the wrong kind yields `None`
/// rather than a coerced guess.
pub trait Bind: Sized {
    /// Human readable name of the accepted JSON shape.
    const EXPECTED: &'static str;

    /// Bind a value, or `None` when its shape does not match.
    fn bind(value: &Value) -> Option<Self>;

    /// Bind a value that sits inside a sequence. Records override this so a
    /// single malformed entry degrades instead of discarding the sequence.
    fn bind_element(value: &Value) -> Option<Self> {
        Self::bind(value)
    }
}

impl Bind for bool {
    const EXPECTED: &'static str = "boolean";

    fn bind(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl Bind for f64 {
    const EXPECTED: &'static str = "number";

    fn bind(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl Bind for String {
    const EXPECTED: &'static str = "string";

    fn bind(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

macro_rules! bind_integer {
    ($($ty:ty),*) => {
        $(
            impl Bind for $ty {
                const EXPECTED: &'static str = "integer";

                fn bind(value: &Value) -> Option<Self> {
                    match value.as_i64() {
                        Some(n) => <$ty>::try_from(n).ok(),
                        None => value.as_u64().and_then(|n| <$ty>::try_from(n).ok()),
                    }
                }
            }
        )*
    };
}

bind_integer!(i8, u8, i16, u16, i32, u32, i64);

impl<T: Bind> Bind for Vec<T> {
    const EXPECTED: &'static str = "array";

    fn bind(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::bind_element).collect()
    }
}

/// JSON type name of a value, for validation messages.
pub fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

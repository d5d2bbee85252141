//! Declarative record schemas with optional-everywhere fields

/// Declare a record whose every field is independently optional.
///
/// Each field maps a simulator field name onto an `Option<T>` where `T: Bind`.
/// Missing keys and mismatched shapes leave the field `None`; the record
/// itself only fails to bind when the value is not an object. Inside a
/// sequence, a non-object entry becomes an entry with every field absent.
///
/// ```rust
/// use rf2_pitwall::adapters::Bind;
/// use serde_json::json;
///
/// rf2_pitwall::record! {
///     /// Example record
///     pub struct Lap {
///         /// Lap time in seconds
///         "mLapTime" => lap_time: f64,
///     }
/// }
///
/// let lap = Lap::bind(&json!({ "mLapTime": "fast" })).unwrap();
/// assert_eq!(lap.lap_time, None);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $key:literal => $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default, Debug, Clone, PartialEq, ::serde::Serialize)]
        #[cfg_attr(feature = "tauri", derive(specta::Type))]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(rename = $key)]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::adapters::Bind for $name {
            const EXPECTED: &'static str = "object";

            fn bind(value: &::serde_json::Value) -> Option<Self> {
                let object = value.as_object()?;
                Some(Self {
                    $(
                        $field: object
                            .get($key)
                            .and_then(<$ty as $crate::adapters::Bind>::bind),
                    )*
                })
            }

            fn bind_element(value: &::serde_json::Value) -> Option<Self> {
                Some(Self::bind(value).unwrap_or_default())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::adapters::Bind;
    use serde_json::json;

    crate::record! {
        pub struct Point {
            "mX" => x: f64,
            "mTag" => tag: String,
        }
    }

    crate::record! {
        pub struct Track {
            "mPoints" => points: Vec<Point>,
            "mCount" => count: i32,
        }
    }

    #[test]
    fn missing_and_mismatched_fields_are_absent() {
        let point = Point::bind(&json!({ "mX": "east", "mOther": 1 })).unwrap();
        assert_eq!(point, Point { x: None, tag: None });
    }

    #[test]
    fn non_object_is_not_a_record() {
        assert_eq!(Point::bind(&json!(4)), None);
        let track = Track::bind(&json!({ "mPoints": 4, "mCount": 2 })).unwrap();
        assert_eq!(track.points, None);
        assert_eq!(track.count, Some(2));
    }

    #[test]
    fn malformed_entries_degrade_in_place() {
        let track = Track::bind(&json!({
            "mPoints": [{ "mX": 1.0, "mTag": "a" }, 7, { "mX": true }]
        }))
        .unwrap();

        let points = track.points.unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point { x: Some(1.0), tag: Some("a".into()) });
        assert_eq!(points[1], Point::default());
        assert_eq!(points[2], Point::default());
    }

    #[test]
    fn serializes_with_simulator_names() {
        let point = Point { x: Some(2.0), tag: None };
        assert_eq!(serde_json::to_value(&point).unwrap(), json!({ "mX": 2.0, "mTag": null }));
    }
}

use crate::{error::InternalError, model::SqlType};
use std::fmt;
use time::OffsetDateTime;

///
/// Value
///
/// Runtime value flowing through bindings, rows, and records.
/// Values are engine-neutral; connections convert them at the boundary.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Timestamp(OffsetDateTime),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Coerce a raw engine value into the shape declared by `ty`.
    ///
    /// Engines without native booleans or timestamps hand back integers and
    /// text; this reverses the encoding applied by [`Value::to_storage`].
    pub fn coerce(self, ty: SqlType) -> Result<Self, InternalError> {
        match (ty, self) {
            (_, Self::Null) => Ok(Self::Null),
            (SqlType::Integer, v @ Self::Int(_))
            | (SqlType::Text, v @ Self::Text(_))
            | (SqlType::Boolean, v @ Self::Bool(_))
            | (SqlType::Timestamp, v @ Self::Timestamp(_)) => Ok(v),
            (SqlType::Boolean, Self::Int(v)) => Ok(Self::Bool(v != 0)),
            (SqlType::Timestamp, Self::Int(nanos)) => {
                OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
                    .map(Self::Timestamp)
                    .map_err(|err| {
                        InternalError::mapping_unsupported(format!(
                            "invalid timestamp {nanos}: {err}"
                        ))
                    })
            }
            (ty, other) => Err(InternalError::mapping_unsupported(format!(
                "cannot read {} value as {ty}",
                other.kind_label()
            ))),
        }
    }

    /// Encode into the portable storage subset (null, integer, text).
    ///
    /// Timestamps become UTC nanoseconds since the Unix epoch, so integer
    /// order on the column is chronological order regardless of the offset
    /// the value carried.
    pub fn to_storage(&self) -> Result<Self, InternalError> {
        match self {
            Self::Bool(v) => Ok(Self::Int(i64::from(*v))),
            Self::Timestamp(ts) => i64::try_from(ts.unix_timestamp_nanos())
                .map(Self::Int)
                .map_err(|_| {
                    InternalError::mapping_unsupported(format!(
                        "timestamp {ts} is outside the storable range"
                    ))
                }),
            other => Ok(other.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
            Self::Timestamp(v) => write!(f, "{v}"),
        }
    }
}

// ----------------------------------------------------------------------
// Conversions into Value
// ----------------------------------------------------------------------

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

///
/// FromValue
///
/// Typed extraction used by entity mappers.
///

pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|v| Self::try_from(v).ok())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(ToString::to_string)
    }
}

impl FromValue for OffsetDateTime {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, UtcOffset};

    #[test]
    fn booleans_round_trip_through_storage_integers() {
        let stored = Value::Bool(true).to_storage().unwrap();
        assert_eq!(stored, Value::Int(1));
        assert_eq!(stored.coerce(SqlType::Boolean).unwrap(), Value::Bool(true));
        assert_eq!(
            Value::Int(0).coerce(SqlType::Boolean).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn timestamps_round_trip_through_storage_nanos() {
        let ts = OffsetDateTime::from_unix_timestamp(1_375_000_000).unwrap()
            + Duration::milliseconds(123);
        let stored = Value::Timestamp(ts).to_storage().unwrap();

        assert_eq!(stored, Value::Int(1_375_000_000_123_000_000));
        assert_eq!(
            stored.coerce(SqlType::Timestamp).unwrap(),
            Value::Timestamp(ts)
        );
    }

    #[test]
    fn stored_timestamps_sort_chronologically() {
        let base = OffsetDateTime::from_unix_timestamp(1_375_000_000).unwrap();
        let plus_two = UtcOffset::from_hms(2, 0, 0).unwrap();
        let instants = [
            base + Duration::milliseconds(123),
            base,
            base + Duration::milliseconds(100),
            // Earlier instant written with a later wall-clock time.
            (base - Duration::minutes(30)).to_offset(plus_two),
        ];

        let mut stored: Vec<i64> = instants
            .iter()
            .map(|ts| Value::Timestamp(*ts).to_storage().unwrap().as_i64().unwrap())
            .collect();
        stored.sort_unstable();

        let restored: Vec<OffsetDateTime> = stored
            .into_iter()
            .map(|nanos| match Value::Int(nanos).coerce(SqlType::Timestamp).unwrap() {
                Value::Timestamp(ts) => ts,
                other => panic!("expected timestamp, got {other:?}"),
            })
            .collect();
        let mut expected = instants.to_vec();
        expected.sort_unstable();

        assert_eq!(restored, expected);
        assert_eq!(restored[0], base - Duration::minutes(30));
        assert_eq!(restored[3], base + Duration::milliseconds(123));
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        let far = OffsetDateTime::from_unix_timestamp(1_375_000_000).unwrap()
            + Duration::days(365 * 300);

        let err = Value::Timestamp(far).to_storage().unwrap_err();
        assert_eq!(err.class, crate::error::ErrorClass::Unsupported);
    }

    #[test]
    fn mismatched_coercion_is_rejected() {
        let err = Value::Text("x".into()).coerce(SqlType::Integer).unwrap_err();
        assert_eq!(err.message, "cannot read text value as INTEGER");
    }

    #[test]
    fn optional_extraction_accepts_null() {
        assert_eq!(Option::<i64>::from_value(&Value::Null), Some(None));
        assert_eq!(Option::<i64>::from_value(&Value::Int(7)), Some(Some(7)));
        assert_eq!(Option::<i64>::from_value(&Value::Text("7".into())), None);
    }
}

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single (timestamp, value) observation from a sensor.
///
/// `value` is NaN when the sensor dropped out for that sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Milliseconds since the generator started
    pub timestamp: f64,

    /// Measured value, NaN on dropout
    #[serde(with = "nan_as_null")]
    pub value: f64,
}

impl Reading {
    pub fn new(timestamp: f64, value: f64) -> Self {
        Self { timestamp, value }
    }

    pub fn is_nan(&self) -> bool {
        self.value.is_nan()
    }

    /// Orders two readings by timestamp only.
    pub fn cmp_timestamp(&self, other: &Reading) -> Ordering {
        self.timestamp.total_cmp(&other.timestamp)
    }

    /// Field-wise equality where two NaN values compare equal.
    pub fn same_as(&self, other: &Reading) -> bool {
        let values_match = (self.value.is_nan() && other.value.is_nan()) || self.value == other.value;
        self.timestamp == other.timestamp && values_match
    }
}

/// A reading tagged with the identity of the channel it came from, as it
/// travels from the generator to a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestedSample {
    pub id: u16,
    pub name: String,
    pub unit: String,
    pub reading: Reading,
}

impl IngestedSample {
    pub fn new(id: u16, name: impl Into<String>, unit: impl Into<String>, reading: Reading) -> Self {
        Self {
            id,
            name: name.into(),
            unit: unit.into(),
            reading,
        }
    }
}

/// JSON has no NaN, so dropouts are written as `null` and read back as NaN.
pub(crate) mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_nan() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_serializes_as_null() {
        let reading = Reading::new(2.0, f64::NAN);
        let json = serde_json::to_string(&reading).unwrap();
        assert_eq!(json, r#"{"timestamp":2.0,"value":null}"#);

        let back: Reading = serde_json::from_str(&json).unwrap();
        assert!(back.is_nan());
        assert!(back.same_as(&reading));
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let result = serde_json::from_str::<Reading>(r#"{"timestamp":2.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_cmp_timestamp_ignores_value() {
        let a = Reading::new(1.0, 99.0);
        let b = Reading::new(2.0, 1.0);
        assert_eq!(a.cmp_timestamp(&b), Ordering::Less);
        assert_eq!(b.cmp_timestamp(&a), Ordering::Greater);
    }
}

use crate::Value;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;

/// A single inbound record.
///
/// Any other fields of the record are ignored.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(bound(deserialize = "F: Value"))]
pub struct Measurement<F> {
    /// Group key
    pub station: String,

    /// Value to average, decoded in the width of `F`
    #[serde(deserialize_with = "deserialize_temperature")]
    pub temperature: F,
}

// serde's f32 goes through f64 first, so take the number text instead
fn deserialize_temperature<'de, D, F>(deserializer: D) -> Result<F, D::Error>
where
    D: Deserializer<'de>,
    F: Value,
{
    let raw = Box::<RawValue>::deserialize(deserializer)?;

    F::parse_number(raw.get()).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "temperature {} is not a finite f{} number",
            raw.get(),
            F::BITS,
        ))
    })
}

/// Mean temperature of one station, formatted to a fixed number of digits.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Average {
    /// Group key
    pub station: String,

    /// Mean, with exactly five fractional digits
    pub temperature: String,
}

/// Response of an aggregation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Report {
    /// Identity of the serving process
    #[serde(rename = "racerId")]
    pub racer_id: String,

    /// Averages, sorted by station
    pub averages: Vec<Average>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum WireTimestamp {
    Seconds(f64),
    Text(String),
}

fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64)
}

fn parse_wire<E: serde::de::Error>(wire: WireTimestamp) -> Result<DateTime<Utc>, E> {
    match wire {
        WireTimestamp::Seconds(seconds) => from_epoch_seconds(seconds)
            .ok_or_else(|| E::custom(format!("timestamp out of range: {}", seconds))),
        WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| E::custom(format!("invalid timestamp '{}': {}", text, e))),
    }
}

pub fn to_epoch_seconds(time: &DateTime<Utc>) -> f64 {
    time.timestamp_micros() as f64 / 1_000_000.0
}

/// Timestamps as fractional epoch seconds, the AWS JSON protocol encoding.
/// RFC 3339 strings are also accepted on input.
pub mod epoch_seconds {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_epoch_seconds(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        parse_wire(WireTimestamp::deserialize(deserializer)?)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};
        use super::super::{parse_wire, to_epoch_seconds, WireTimestamp};

        pub fn serialize<S: Serializer>(time: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.serialize_some(&to_epoch_seconds(time)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<WireTimestamp>::deserialize(deserializer)? {
                Some(wire) => parse_wire(wire).map(Some),
                None => Ok(None),
            }
        }
    }
}

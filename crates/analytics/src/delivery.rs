// Copyright (C) 2026-present The Translytics Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Delivery event and output record models, and the decode step turning one
//! line of the event log into a [`DeliveryEvent`].
//!
//! Each line of the log is a JSON object carrying at least a `timestamp` and
//! a `duration` field; any other fields are ignored. Timestamps are naive
//! (the log fixes the zone) and use `YYYY-MM-DD HH:MM:SS`, with optional
//! fractional seconds accepted on input.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format shared by the event log and the emitted records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parsing variant of [`TIMESTAMP_FORMAT`] that also accepts (and discards)
/// fractional seconds.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a raw timestamp string from the event log.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_PARSE_FORMAT)
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamp fields.
pub mod timestamp_format {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Errors when decoding a single event-log line
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum EventDecodeError {
    /// The line is not a valid JSON delivery event (bad JSON, missing fields
    /// or a negative duration).
    MalformedEvent(String),
    /// The line is valid JSON but its timestamp string does not match the
    /// expected format.
    MalformedTimestamp(String),
}

impl std::fmt::Display for EventDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEvent(reason) => {
                write!(f, "malformed delivery event: {reason}")
            }
            Self::MalformedTimestamp(raw) => {
                write!(f, "malformed timestamp {raw:?}, expected `YYYY-MM-DD HH:MM:SS`")
            }
        }
    }
}

impl std::error::Error for EventDecodeError {}

/// Wire shape of one log line before timestamp validation. The log carries
/// more fields per event (translation id, languages, client, word count),
/// none of which are needed for the aggregation.
#[derive(Debug, Deserialize)]
struct RawEvent {
    timestamp: String,
    duration: u64,
}

/// A single translation delivery read from the event log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,
    duration: u64,
}

impl DeliveryEvent {
    pub const fn new(timestamp: NaiveDateTime, duration: u64) -> Self {
        Self {
            timestamp,
            duration,
        }
    }

    /// The minute the translation was delivered, at log precision.
    pub const fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// How long the delivery took.
    pub const fn duration(&self) -> u64 {
        self.duration
    }

    /// Decode a single line of the event log.
    ///
    /// The timestamp gets its own decode pass (and error variant) so a
    /// structurally valid event with a bad timestamp is distinguishable from
    /// a line that is not a delivery event at all.
    pub fn from_log_line(line: &str) -> Result<Self, EventDecodeError> {
        let raw: RawEvent = serde_json::from_str(line)
            .map_err(|e| EventDecodeError::MalformedEvent(e.to_string()))?;
        let timestamp = parse_timestamp(&raw.timestamp)
            .map_err(|_| EventDecodeError::MalformedTimestamp(raw.timestamp))?;
        Ok(Self {
            timestamp,
            duration: raw.duration,
        })
    }
}

/// One aggregated output record: the moving average of delivery durations
/// for deliveries completed by the given minute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    #[serde(with = "timestamp_format")]
    date: NaiveDateTime,
    average_delivery_time: f64,
}

impl AverageRecord {
    pub const fn new(date: NaiveDateTime, average_delivery_time: f64) -> Self {
        Self {
            date,
            average_delivery_time,
        }
    }

    pub const fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub const fn average_delivery_time(&self) -> f64 {
        self.average_delivery_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_decode_full_event_line() {
        let line = r#"{"timestamp": "2018-12-26 18:11:08.509654","translation_id": "5aa5b2f39f7254a75aa5","source_language": "en","target_language": "fr","client_name": "airliberty","event_name": "translation_delivered","nr_words": 30, "duration": 20}"#;
        let event = DeliveryEvent::from_log_line(line).unwrap();
        // Fractional seconds are accepted and kept at sub-second precision;
        // minute bucketing drops them later.
        assert_eq!(event.timestamp().date(), ts(2018, 12, 26, 18, 11, 8).date());
        assert_eq!(event.timestamp().format(TIMESTAMP_FORMAT).to_string(), "2018-12-26 18:11:08");
        assert_eq!(event.duration(), 20);
    }

    #[test]
    fn test_decode_minimal_event_line() {
        let line = r#"{"timestamp": "2020-01-01 00:00:00", "duration": 100}"#;
        assert_eq!(
            DeliveryEvent::from_log_line(line),
            Ok(DeliveryEvent::new(ts(2020, 1, 1, 0, 0, 0), 100)),
        );
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let result = DeliveryEvent::from_log_line("not a json line");
        assert!(matches!(result, Err(EventDecodeError::MalformedEvent(_))));
    }

    #[test]
    fn test_decode_rejects_missing_duration() {
        let result = DeliveryEvent::from_log_line(r#"{"timestamp": "2020-01-01 00:00:00"}"#);
        assert!(matches!(result, Err(EventDecodeError::MalformedEvent(_))));
    }

    #[test]
    fn test_decode_rejects_negative_duration() {
        let result =
            DeliveryEvent::from_log_line(r#"{"timestamp": "2020-01-01 00:00:00", "duration": -3}"#);
        assert!(matches!(result, Err(EventDecodeError::MalformedEvent(_))));
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let result =
            DeliveryEvent::from_log_line(r#"{"timestamp": "26/12/2018 18:11", "duration": 20}"#);
        assert_eq!(
            result,
            Err(EventDecodeError::MalformedTimestamp(
                "26/12/2018 18:11".to_string()
            )),
        );
    }

    #[test]
    fn test_average_record_serialization() {
        let record = AverageRecord::new(ts(2018, 12, 26, 18, 16, 0), 25.5);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"date":"2018-12-26 18:16:00","average_delivery_time":25.5}"#,
        );
    }

    #[test]
    fn test_average_record_zero_serialization() {
        let record = AverageRecord::new(ts(2018, 12, 26, 18, 11, 0), 0.0);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"date":"2018-12-26 18:11:00","average_delivery_time":0.0}"#,
        );
    }

    #[test]
    fn test_average_record_roundtrip() {
        let record = AverageRecord::new(ts(2018, 12, 26, 18, 24, 0), 42.5);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(serde_json::from_str::<AverageRecord>(&json).unwrap(), record);
    }
}

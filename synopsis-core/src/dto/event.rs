//! Storage event notification DTOs
//!
//! A run is triggered by an object-created notification. Only the bucket
//! name and object key are read; everything else in the record is ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::document::ObjectLocation;

/// Event notification envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,
}

/// Reasons a trigger payload cannot be turned into an object location
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("event could not be read: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("event is not a valid notification: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("event contains no records")]
    NoRecords,

    #[error("event contains {0} records, expected exactly one")]
    MultipleRecords(usize),

    #[error("event record has an empty {0}")]
    EmptyField(&'static str),

    #[error("object key '{0}' is not valid percent-encoding")]
    InvalidKey(String),
}

impl StorageEvent {
    /// Parses a raw notification payload
    pub fn from_json(payload: &str) -> Result<Self, TriggerError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Extracts the single object location this event refers to
    ///
    /// Object keys arrive form-encoded (`+` for space, `%XX` escapes) and
    /// are decoded here.
    pub fn into_location(self) -> Result<ObjectLocation, TriggerError> {
        let mut records = self.records;
        let record = match records.len() {
            0 => return Err(TriggerError::NoRecords),
            1 => records.remove(0),
            n => return Err(TriggerError::MultipleRecords(n)),
        };

        let bucket = record.s3.bucket.name;
        if bucket.is_empty() {
            return Err(TriggerError::EmptyField("bucket name"));
        }

        let raw_key = record.s3.object.key;
        let key = urlencoding::decode(&raw_key.replace('+', " "))
            .map_err(|_| TriggerError::InvalidKey(raw_key.clone()))?
            .into_owned();
        if key.is_empty() {
            return Err(TriggerError::EmptyField("object key"));
        }

        Ok(ObjectLocation::new(bucket, key))
    }
}

/// Parses a trigger payload straight into an object location
pub fn parse_trigger(payload: &str) -> Result<ObjectLocation, TriggerError> {
    StorageEvent::from_json(payload)?.into_location()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(records: &[(&str, &str)]) -> String {
        let records: Vec<_> = records
            .iter()
            .map(|(bucket, key)| {
                serde_json::json!({
                    "eventName": "ObjectCreated:Put",
                    "s3": { "bucket": { "name": bucket }, "object": { "key": key, "size": 11 } }
                })
            })
            .collect();
        serde_json::json!({ "Records": records }).to_string()
    }

    #[test]
    fn test_single_record() {
        let location = parse_trigger(&event(&[("in", "a.txt")])).unwrap();
        assert_eq!(location, ObjectLocation::new("in", "a.txt"));
    }

    #[test]
    fn test_key_is_form_decoded() {
        let location = parse_trigger(&event(&[("in", "talks/team+sync%282024%29.txt")])).unwrap();
        assert_eq!(location.key, "talks/team sync(2024).txt");
    }

    #[test]
    fn test_no_records() {
        assert!(matches!(parse_trigger(&event(&[])), Err(TriggerError::NoRecords)));
    }

    #[test]
    fn test_multiple_records_rejected() {
        let payload = event(&[("in", "a.txt"), ("in", "b.txt")]);
        assert!(matches!(
            parse_trigger(&payload),
            Err(TriggerError::MultipleRecords(2))
        ));
    }

    #[test]
    fn test_structurally_invalid() {
        assert!(matches!(
            parse_trigger(r#"{"Records": [{"s3": {"bucket": {}}}]}"#),
            Err(TriggerError::InvalidFormat(_))
        ));
        assert!(matches!(parse_trigger("not json"), Err(TriggerError::InvalidFormat(_))));
        assert!(matches!(parse_trigger("{}"), Err(TriggerError::InvalidFormat(_))));
    }

    #[test]
    fn test_empty_fields() {
        assert!(matches!(
            parse_trigger(&event(&[("", "a.txt")])),
            Err(TriggerError::EmptyField("bucket name"))
        ));
        assert!(matches!(
            parse_trigger(&event(&[("in", "")])),
            Err(TriggerError::EmptyField("object key"))
        ));
    }

    #[test]
    fn test_invalid_percent_encoding() {
        assert!(matches!(
            parse_trigger(&event(&[("in", "bad%FFkey")])),
            Err(TriggerError::InvalidKey(_))
        ));
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{LoopError, LoopResult};
use crate::types::timestamp::{Column, FieldValue, TimestampRecord, check_time, parse_time_field};

/// One record as it is stored in the sidecar file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimestamp {
    pub start_time: i64,
    pub end_time: i64,
    pub description: String,
}

/// Ordered timestamp records. Insertion order is file order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampCollection {
    records: Vec<TimestampRecord>,
}

impl TimestampCollection {
    pub fn from_records(records: Vec<TimestampRecord>) -> Self {
        Self { records }
    }

    /// Builds records from a JSON array of `{start_time, end_time, description}`
    /// objects. Times are milliseconds; fractional milliseconds are truncated
    /// and `H:MM:SS.mmm` strings are accepted for older files.
    pub fn parse(raw: &Value) -> LoopResult<Self> {
        let items = raw.as_array().ok_or_else(|| LoopError::MalformedTimestampData {
            index: 0,
            reason: "expected a list of timestamps".to_string(),
        })?;

        let records = items
            .iter()
            .enumerate()
            .map(|(index, item)| parse_record(index, item))
            .collect::<LoopResult<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    pub fn serialize(&self) -> Vec<RawTimestamp> {
        self.records
            .iter()
            .map(|record| RawTimestamp {
                start_time: record.start_ms,
                end_time: record.end_ms,
                description: record.description.clone(),
            })
            .collect()
    }

    /// Load a collection from a JSON sidecar file at the given path.
    pub fn load_from_file(path: &Path) -> LoopResult<Self> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        let raw: Value = serde_json::from_str(&json)?;
        Self::parse(&raw)
    }

    /// Rewrite the whole sidecar file at the given path.
    pub fn save_to_file(&self, path: &Path) -> LoopResult<()> {
        let json = serde_json::to_string_pretty(&self.serialize())?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&TimestampRecord> {
        self.records.get(row)
    }

    pub fn append(&mut self, record: TimestampRecord) {
        self.records.push(record);
    }

    pub fn sort_by_start(&mut self, reverse: bool) {
        if reverse {
            self.records.sort_by(|a, b| b.start_ms.cmp(&a.start_ms));
        } else {
            self.records.sort_by_key(|record| record.start_ms);
        }
    }

    pub fn set_field(&mut self, row: usize, column: Column, value: FieldValue) -> LoopResult<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(row)
            .ok_or(LoopError::RowOutOfRange { row, len })?;
        record.set(column, value)
    }
}

fn parse_record(index: usize, item: &Value) -> LoopResult<TimestampRecord> {
    let malformed = |reason: String| LoopError::MalformedTimestampData { index, reason };
    let object = item
        .as_object()
        .ok_or_else(|| malformed("expected an object".to_string()))?;

    let field = |name: &str| {
        object
            .get(name)
            .ok_or_else(|| malformed(format!("missing field `{}`", name)))
    };

    let start_ms = parse_raw_time(field("start_time")?, Column::Start)
        .ok_or_else(|| malformed("`start_time` is not a time".to_string()))?;
    let end_ms = parse_raw_time(field("end_time")?, Column::End)
        .ok_or_else(|| malformed("`end_time` is not a time".to_string()))?;
    check_time(start_ms, Column::Start)
        .map_err(|_| malformed(format!("negative `start_time` {}", start_ms)))?;
    check_time(end_ms, Column::End)
        .map_err(|_| malformed(format!("invalid `end_time` {}", end_ms)))?;

    let description = match field("description")? {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        _ => return Err(malformed("`description` is not text".to_string())),
    };

    Ok(TimestampRecord::new(start_ms, end_ms, description))
}

fn parse_raw_time(value: &Value, column: Column) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|ms| ms.trunc() as i64)),
        Value::String(text) => parse_time_field(text, column).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::UNBOUNDED;
    use serde_json::json;

    #[test]
    fn serialize_inverts_parse() {
        let raw = json!([
            {"start_time": 1000, "end_time": 5000, "description": "verse"},
            {"start_time": 0, "end_time": -1, "description": ""},
            {"start_time": 3_725_678, "end_time": 3_800_000, "description": "solo"}
        ]);
        let collection = TimestampCollection::parse(&raw).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(serde_json::to_value(collection.serialize()).unwrap(), raw);
    }

    #[test]
    fn serialize_inverts_parse_across_edge_values() {
        let cases = [
            ("empty list", json!([])),
            (
                "unbounded end",
                json!([{"start_time": 0, "end_time": -1, "description": "all"}]),
            ),
            (
                "large values",
                json!([
                    {"start_time": 359_999_999, "end_time": 360_000_000, "description": "100h"},
                    {"start_time": i64::MAX - 1, "end_time": i64::MAX, "description": "max"}
                ]),
            ),
            (
                "unicode description",
                json!([
                    {"start_time": 1500, "end_time": 2500, "description": "Größe ♪ 日本語"},
                    {"start_time": 2500, "end_time": -1, "description": "emoji 🎸 \"quoted\""}
                ]),
            ),
            (
                "start after end",
                json!([{"start_time": 9000, "end_time": 1000, "description": "odd"}]),
            ),
        ];

        for (name, raw) in cases {
            let collection = TimestampCollection::parse(&raw)
                .unwrap_or_else(|err| panic!("{}: {}", name, err));
            assert_eq!(
                serde_json::to_value(collection.serialize()).unwrap(),
                raw,
                "{}",
                name
            );
        }
    }

    #[test]
    fn fractional_millis_are_truncated() {
        let raw = json!([{"start_time": 1999.9, "end_time": 2500.4, "description": "x"}]);
        let collection = TimestampCollection::parse(&raw).unwrap();
        assert_eq!(collection.get(0).unwrap().start_ms, 1999);
        assert_eq!(collection.get(0).unwrap().end_ms, 2500);
    }

    #[test]
    fn legacy_text_times_are_accepted() {
        let raw = json!([{"start_time": "0:01:00.250", "end_time": "", "description": null}]);
        let collection = TimestampCollection::parse(&raw).unwrap();
        assert_eq!(
            collection.get(0).unwrap(),
            &TimestampRecord::new(60_250, UNBOUNDED, "")
        );
    }

    #[test]
    fn missing_or_non_numeric_fields_are_malformed() {
        let missing = json!([
            {"start_time": 0, "end_time": 10, "description": "ok"},
            {"start_time": 0, "description": "no end"}
        ]);
        let err = TimestampCollection::parse(&missing).unwrap_err();
        assert!(matches!(
            err,
            LoopError::MalformedTimestampData { index: 1, .. }
        ));

        let non_numeric = json!([{"start_time": true, "end_time": 10, "description": ""}]);
        assert!(matches!(
            TimestampCollection::parse(&non_numeric),
            Err(LoopError::MalformedTimestampData { index: 0, .. })
        ));

        let negative = json!([{"start_time": -5, "end_time": 10, "description": ""}]);
        assert!(TimestampCollection::parse(&negative).is_err());

        assert!(TimestampCollection::parse(&json!({"start_time": 0})).is_err());
    }

    #[test]
    fn sorts_by_start_time() {
        let mut collection = TimestampCollection::from_records(vec![
            TimestampRecord::new(3000, 4000, "c"),
            TimestampRecord::new(1000, 2000, "a"),
            TimestampRecord::new(2000, 3000, "b"),
        ]);
        collection.sort_by_start(false);
        let order: Vec<_> = (0..collection.len())
            .filter_map(|row| collection.get(row))
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(order, ["a", "b", "c"]);

        collection.sort_by_start(true);
        assert_eq!(collection.get(0).unwrap().description, "c");
    }

    #[test]
    fn set_field_checks_the_row() {
        let mut collection = TimestampCollection::default();
        collection.append(TimestampRecord::new(0, 1000, ""));
        collection
            .set_field(0, Column::Description, FieldValue::Text("chorus".into()))
            .unwrap();
        assert_eq!(collection.get(0).unwrap().description, "chorus");
        assert!(matches!(
            collection.set_field(4, Column::Start, FieldValue::Millis(0)),
            Err(LoopError::RowOutOfRange { row: 4, len: 1 })
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.tmsp");
        let collection = TimestampCollection::from_records(vec![
            TimestampRecord::new(0, 5000, "intro"),
            TimestampRecord::new(5000, -1, "rest"),
        ]);
        collection.save_to_file(&path).unwrap();

        let loaded = TimestampCollection::load_from_file(&path).unwrap();
        assert_eq!(loaded, collection);
    }
}

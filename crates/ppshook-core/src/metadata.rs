use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::message::Content;

/// Hook configuration keys and the message keys they are published under.
/// Validation walks this table in order, so `level` is reported first.
pub const MANDATORY_FIELDS: [(&str, &str); 3] = [
    ("level", "data_processing_level"),
    ("output_format", "format"),
    ("station", "station"),
];

/// Metadata describing one processed granule.
///
/// Fields the hook knows about are typed; anything else lands in `extra` and
/// is passed through to the message content untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub posttroll_topic: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub data_processing_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub sensor: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetadataRecord {
    /// Output format under either its configuration or its message name.
    pub fn output_format_value(&self) -> Option<&str> {
        self.output_format.as_deref().or(self.format.as_deref())
    }

    /// Processing level under either its configuration or its message name.
    pub fn level_value(&self) -> Option<&str> {
        self.level
            .as_deref()
            .or(self.data_processing_level.as_deref())
    }

    /// Looks up one of the `MANDATORY_FIELDS` configuration keys.
    pub fn mandatory_value(&self, key: &str) -> Option<&str> {
        match key {
            "level" => self.level_value(),
            "output_format" => self.output_format_value(),
            "station" => self.station.as_deref(),
            _ => None,
        }
    }

    /// Overwrites every field that `other` sets.
    pub fn merge(&mut self, other: &MetadataRecord) {
        fn take<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if let Some(value) = source {
                *target = Some(value.clone());
            }
        }

        take(&mut self.posttroll_topic, &other.posttroll_topic);
        take(&mut self.station, &other.station);
        take(&mut self.output_format, &other.output_format);
        take(&mut self.format, &other.format);
        take(&mut self.level, &other.level);
        take(&mut self.data_processing_level, &other.data_processing_level);
        take(&mut self.variant, &other.variant);
        take(&mut self.filename, &other.filename);
        take(&mut self.start_time, &other.start_time);
        take(&mut self.end_time, &other.end_time);
        take(&mut self.sensor, &other.sensor);
        take(&mut self.platform_name, &other.platform_name);
        for (key, value) in &other.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// Content mapping of every set field except `filename`.
    pub fn to_content(&self) -> Content {
        let mut content: Content = self.extra.clone();

        let strings = [
            ("posttroll_topic", &self.posttroll_topic),
            ("station", &self.station),
            ("output_format", &self.output_format),
            ("format", &self.format),
            ("level", &self.level),
            ("data_processing_level", &self.data_processing_level),
            ("variant", &self.variant),
            ("sensor", &self.sensor),
            ("platform_name", &self.platform_name),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                content.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        for (key, value) in [("start_time", &self.start_time), ("end_time", &self.end_time)] {
            if let Some(ts) = value {
                content.insert(key.to_string(), Value::String(format_timestamp(ts)));
            }
        }

        content.remove("filename");
        content
    }
}

/// ISO-8601 without zone; microseconds only when non-zero.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

// Configuration files write `level: 2` as often as `level: "2"`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(number) => number.to_string(),
        Scalar::Float(number) => number.to_string(),
        Scalar::Bool(flag) => flag.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn start_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 10, 28)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn deserializes_numbers_as_strings_and_keeps_unknown_keys() {
        let record: MetadataRecord = serde_json::from_value(json!({
            "station": "norrkoping",
            "level": 2,
            "start_time": "2020-10-28T12:00:00",
            "end_time": null,
            "orbit_number": 46562
        }))
        .expect("deserialize record");

        assert_eq!(record.level.as_deref(), Some("2"));
        assert_eq!(record.start_time, Some(start_time()));
        assert_eq!(record.end_time, None);
        assert_eq!(record.extra.get("orbit_number"), Some(&json!(46562)));
    }

    #[test]
    fn renamed_keys_satisfy_mandatory_lookups() {
        let record = MetadataRecord {
            format: Some("CF".into()),
            data_processing_level: Some("2".into()),
            ..Default::default()
        };

        assert_eq!(record.mandatory_value("output_format"), Some("CF"));
        assert_eq!(record.mandatory_value("level"), Some("2"));
        assert_eq!(record.mandatory_value("station"), None);
    }

    #[test]
    fn merge_overwrites_only_fields_that_are_set() {
        let mut granule = MetadataRecord {
            station: Some("kiruna".into()),
            sensor: Some("viirs".into()),
            ..Default::default()
        };
        let configured = MetadataRecord {
            station: Some("norrkoping".into()),
            level: Some("2".into()),
            ..Default::default()
        };

        granule.merge(&configured);

        assert_eq!(granule.station.as_deref(), Some("norrkoping"));
        assert_eq!(granule.sensor.as_deref(), Some("viirs"));
        assert_eq!(granule.level.as_deref(), Some("2"));
    }

    #[test]
    fn content_skips_filename_and_unset_fields() {
        let mut record = MetadataRecord {
            filename: Some("/tmp/xxx".into()),
            start_time: Some(start_time()),
            variant: Some("DR".into()),
            ..Default::default()
        };
        record.extra.insert("filename".into(), json!("/shadow"));

        let content = record.to_content();

        assert!(!content.contains_key("filename"));
        assert!(!content.contains_key("end_time"));
        assert_eq!(content.get("start_time"), Some(&json!("2020-10-28T12:00:00")));
        assert_eq!(content.get("variant"), Some(&json!("DR")));
    }
}

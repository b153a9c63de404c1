use crate::store::{Document, FieldValue, Fields};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Document as returned by the Firestore REST API.
#[derive(Deserialize, Debug)]
pub struct RawDocument {
  pub name: String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

/// Encodes everything except server-timestamp sentinels, whose field paths are
/// returned separately so they can be sent as `REQUEST_TIME` transforms.
pub fn encode_fields(fields: &Fields) -> (Map<String, Value>, Vec<String>) {
  let mut encoded = Map::new();
  let mut server_timestamps = Vec::new();

  for (key, value) in fields {
    match value {
      FieldValue::ServerTimestamp => server_timestamps.push(key.clone()),
      value => {
        encoded.insert(key.clone(), encode(value));
      }
    }
  }

  (encoded, server_timestamps)
}

pub fn encode(value: &FieldValue) -> Value {
  match value {
    FieldValue::Null | FieldValue::ServerTimestamp => json!({ "nullValue": null }),
    FieldValue::Bool(value) => json!({ "booleanValue": value }),
    FieldValue::String(value) => json!({ "stringValue": value }),
    FieldValue::Number(number) => match number.as_i64() {
      Some(integer) => json!({ "integerValue": integer.to_string() }),
      None => json!({ "doubleValue": number }),
    },
    FieldValue::Timestamp(timestamp) => {
      json!({ "timestampValue": timestamp.to_rfc3339_opts(SecondsFormat::Micros, true) })
    }
  }
}

/// Unsupported value kinds (maps, arrays, references, ...) decode as null.
pub fn decode(value: &Value) -> FieldValue {
  let Some(object) = value.as_object() else {
    return FieldValue::Null;
  };

  if let Some(value) = object.get("stringValue").and_then(Value::as_str) {
    return FieldValue::String(value.to_owned());
  }

  if let Some(value) = object.get("integerValue") {
    let parsed = match value {
      Value::String(raw) => raw.parse::<i64>().ok(),
      Value::Number(number) => number.as_i64(),
      _ => None,
    };
    return parsed
      .map(|integer| FieldValue::Number(integer.into()))
      .unwrap_or(FieldValue::Null);
  }

  if let Some(value) = object.get("doubleValue").and_then(Value::as_f64) {
    return serde_json::Number::from_f64(value)
      .map(FieldValue::Number)
      .unwrap_or(FieldValue::Null);
  }

  if let Some(value) = object.get("booleanValue").and_then(Value::as_bool) {
    return FieldValue::Bool(value);
  }

  if let Some(value) = object.get("timestampValue").and_then(Value::as_str) {
    return DateTime::parse_from_rfc3339(value)
      .map(|timestamp| FieldValue::Timestamp(timestamp.with_timezone(&Utc)))
      .unwrap_or(FieldValue::Null);
  }

  FieldValue::Null
}

pub fn decode_document(raw: RawDocument) -> Document {
  let id = raw.name.rsplit('/').next().unwrap_or_default().to_owned();
  let fields = raw
    .fields
    .iter()
    .map(|(key, value)| (key.clone(), decode(value)))
    .collect();

  Document { id, fields }
}

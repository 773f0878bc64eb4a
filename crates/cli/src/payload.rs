//! Input envelopes accepted by `resolve` and `daemon`.
//!
//! Two shapes are understood:
//!
//! ```text
//! { "requests" | "devices" | "intent_devices": [...], "entities": [...],
//!   "aliases"?: {...}, "thresholds"?: {...}, "intent"?: "...", "user_input"?: "..." }
//!
//! { "intention_data": { "data": { "devices": [...], "intent"?, "user_input"? } },
//!   "entities_data":  { "data": { "entities": [...] } },
//!   "aliases"?: {...}, "thresholds"?: {...} }
//! ```

use hubmatch_core::{AliasTable, Entity, IntentRequest, ThresholdConfig};
use serde_json::{Map, Value};

const REQUEST_KEYS: [&str; 3] = ["requests", "devices", "intent_devices"];

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("missing '{0}' field")]
    Missing(&'static str),

    #[error("'{field}' is malformed: {reason}")]
    Malformed { field: &'static str, reason: String },
}

/// A decoded resolution job.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub requests: Vec<IntentRequest>,
    pub entities: Vec<Entity>,
    /// Extra aliases merged over the configured table for this payload only.
    pub aliases: Option<AliasTable>,
    /// Thresholds replacing the configured ones for this payload only.
    pub thresholds: Option<ThresholdConfig>,
    pub intent: Option<String>,
    pub user_input: Option<String>,
}

impl Payload {
    pub fn parse(input: &str) -> Result<Self, PayloadError> {
        Self::from_value(serde_json::from_str(input)?)
    }

    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut root) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let aliases = take_typed(&mut root, "aliases")?;
        let thresholds = take_typed(&mut root, "thresholds")?;

        if root.contains_key("intention_data") || root.contains_key("entities_data") {
            let mut intention = nested_data(&mut root, "intention_data");
            let mut entities = nested_data(&mut root, "entities_data");
            return Ok(Self {
                requests: take_list(&mut intention, "devices", "intention_data.data.devices")?,
                entities: take_list(&mut entities, "entities", "entities_data.data.entities")?,
                aliases,
                thresholds,
                intent: take_string(&mut intention, "intent"),
                user_input: take_string(&mut intention, "user_input"),
            });
        }

        let key = REQUEST_KEYS
            .into_iter()
            .find(|k| root.contains_key(*k))
            .ok_or(PayloadError::Missing("requests"))?;

        Ok(Self {
            requests: take_list(&mut root, key, "requests")?,
            entities: take_list(&mut root, "entities", "entities")?,
            aliases,
            thresholds,
            intent: take_string(&mut root, "intent"),
            user_input: take_string(&mut root, "user_input")
                .or_else(|| take_string(&mut root, "user_query")),
        })
    }

    pub fn has_overrides(&self) -> bool {
        self.aliases.is_some() || self.thresholds.is_some()
    }
}

fn nested_data(root: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match root.remove(key) {
        Some(Value::Object(mut outer)) => match outer.remove("data") {
            Some(Value::Object(data)) => data,
            _ => Map::new(),
        },
        _ => Map::new(),
    }
}

fn take_list<T: serde::de::DeserializeOwned>(
    map: &mut Map<String, Value>,
    key: &str,
    field: &'static str,
) -> Result<Vec<T>, PayloadError> {
    match map.remove(key) {
        Some(Value::Null) | None => Err(PayloadError::Missing(field)),
        Some(value @ Value::Array(_)) => {
            serde_json::from_value(value).map_err(|e| PayloadError::Malformed {
                field,
                reason: e.to_string(),
            })
        }
        Some(_) => Err(PayloadError::Malformed {
            field,
            reason: "expected a list".into(),
        }),
    }
}

fn take_typed<T: serde::de::DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<T>, PayloadError> {
    match map.remove(field) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| PayloadError::Malformed {
                field,
                reason: e.to_string(),
            }),
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use hubmatch_core::Category;

    use super::*;

    #[test]
    fn flat_envelope_with_any_request_key() {
        for key in REQUEST_KEYS {
            let json = format!(
                r#"{{"{key}": [{{"room_name": "kitchen", "service": "light.turn_on"}}],
                    "entities": [{{"entity_id": "light.k", "room_name": "Kitchen"}}]}}"#
            );
            let payload = Payload::parse(&json).unwrap();
            assert_eq!(payload.requests.len(), 1);
            assert_eq!(payload.requests[0].field(Category::Room), Some("kitchen"));
            assert_eq!(payload.entities[0].entity_id, "light.k");
            assert!(!payload.has_overrides());
        }
    }

    #[test]
    fn wrapped_envelope() {
        let json = r#"{
            "intention_data": {"data": {"intent": "Control Device", "user_input": "开客厅灯",
                "devices": [{"room_name": "客厅", "device_type": "light"}]}},
            "entities_data": {"data": {"entities": [{"entity_id": "light.a"}, {"entity_id": "light.b"}]}}
        }"#;
        let payload = Payload::parse(json).unwrap();
        assert_eq!(payload.requests.len(), 1);
        assert_eq!(payload.entities.len(), 2);
        assert_eq!(payload.intent.as_deref(), Some("Control Device"));
        assert_eq!(payload.user_input.as_deref(), Some("开客厅灯"));
    }

    #[test]
    fn english_renderings_reach_the_request() {
        let json = r#"{"devices": [{"room_name": "客厅", "room_name_en": "Living Room",
            "device_name_en": "Floor Lamp"}], "entities": []}"#;
        let payload = Payload::parse(json).unwrap();
        let request = &payload.requests[0];
        assert_eq!(request.field(Category::Room), Some("Living Room"));
        assert_eq!(request.field(Category::DeviceName), Some("Floor Lamp"));
        assert!(request.extra.is_empty());
    }

    #[test]
    fn overrides_are_parsed() {
        let json = r#"{
            "devices": [], "entities": [],
            "aliases": {"rooms": {"den": ["snug"]}},
            "thresholds": {"room": 0.9}
        }"#;
        let payload = Payload::parse(json).unwrap();
        assert!(payload.has_overrides());
        assert_eq!(payload.aliases.unwrap().room["den"], vec!["snug"]);
        assert_eq!(payload.thresholds.unwrap().room, 0.9);
    }

    #[test]
    fn missing_entities_is_reported() {
        let err = Payload::parse(r#"{"requests": []}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Missing("entities")));

        let err = Payload::parse(r#"{"intention_data": {"data": {"devices": []}}}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Missing("entities_data.data.entities")));
    }

    #[test]
    fn non_list_requests_are_malformed() {
        let err = Payload::parse(r#"{"requests": {}, "entities": []}"#).unwrap_err();
        assert!(matches!(err, PayloadError::Malformed { field: "requests", .. }));
    }

    #[test]
    fn rejects_non_objects_and_bad_json() {
        assert!(matches!(Payload::parse("[]"), Err(PayloadError::NotAnObject)));
        assert!(matches!(Payload::parse("{"), Err(PayloadError::Json(_))));
    }
}

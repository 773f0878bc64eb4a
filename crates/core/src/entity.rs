//! Smart-home entities as handed over by the registry cache.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::category::Category;
use crate::error::RegistryError;

/// One controllable or queryable smart-home element.
///
/// Registry exports frequently carry `null` for missing areas, so every
/// free-text field tolerates `null` and treats it as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable unique key, conventionally `<domain>.<object_id>`.
    pub entity_id: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub floor_name: String,

    /// English floor label, when the registry carries a localized one.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub floor_name_en: String,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub floor_type: String,

    /// Numeric floor level; exports carry it as a number or a string.
    #[serde(default, deserialize_with = "scalar_as_string", skip_serializing_if = "String::is_empty")]
    pub level: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub room_name: String,

    /// English room label, when the registry carries a localized one.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub room_name_en: String,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "String::is_empty")]
    pub room_type: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub device_type: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub friendly_name: String,

    /// Label of the physical device that owns this entity, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// Raw state attributes; only `friendly_name` is read from here.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

impl Entity {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    pub fn with_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor_name = floor.into();
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room_name = room.into();
        self
    }

    pub fn with_room_en(mut self, room: impl Into<String>) -> Self {
        self.room_name_en = room.into();
        self
    }

    pub fn with_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = device_type.into();
        self
    }

    pub fn with_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = friendly_name.into();
        self
    }

    /// The domain prefix of the entity id (`light.kitchen` → `light`).
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or("")
    }

    /// Best display label: friendly name, then device name, then the id.
    pub fn label(&self) -> &str {
        if !self.friendly_name.is_empty() {
            return &self.friendly_name;
        }
        if let Some(name) = self.attribute_friendly_name() {
            return name;
        }
        match self.device_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.entity_id,
        }
    }

    /// Every non-empty text this entity offers for a level.
    ///
    /// The level matcher scores the request against each token and keeps
    /// the best one.
    pub fn tokens(&self, category: Category) -> Vec<&str> {
        let candidates: Vec<&str> = match category {
            Category::Floor => vec![
                self.floor_name_en.as_str(),
                self.floor_type.as_str(),
                self.floor_name.as_str(),
                self.level.as_str(),
            ],
            Category::Room => vec![
                self.room_name_en.as_str(),
                self.room_type.as_str(),
                self.room_name.as_str(),
            ],
            Category::DeviceType => vec![self.device_type.as_str(), self.domain()],
            Category::DeviceName => vec![
                self.friendly_name.as_str(),
                self.attribute_friendly_name().unwrap_or(""),
                self.device_name.as_deref().unwrap_or(""),
            ],
        };

        let mut tokens: Vec<&str> = Vec::with_capacity(candidates.len());
        for token in candidates {
            let token = token.trim();
            if !token.is_empty() && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    fn attribute_friendly_name(&self) -> Option<&str> {
        self.attributes
            .get("friendly_name")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Check the registry invariant: every entity has a unique, non-empty id.
pub fn validate_registry(entities: &[Entity]) -> Result<(), RegistryError> {
    let mut seen = HashSet::with_capacity(entities.len());
    for (index, entity) in entities.iter().enumerate() {
        if entity.entity_id.trim().is_empty() {
            return Err(RegistryError::MissingEntityId { index });
        }
        if !seen.insert(entity.entity_id.as_str()) {
            return Err(RegistryError::DuplicateEntityId(entity.entity_id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_entity_id_prefix() {
        assert_eq!(Entity::new("light.kitchen").domain(), "light");
        assert_eq!(Entity::new("no_domain").domain(), "");
    }

    #[test]
    fn null_fields_deserialize_as_empty() {
        let json = r#"{"entity_id":"switch.fan","floor_name":null,"room_name":"Kitchen"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.floor_name, "");
        assert_eq!(entity.room_name, "Kitchen");
        assert_eq!(entity.device_type, "");
    }

    #[test]
    fn type_tokens_include_domain() {
        let entity = Entity::new("light.desk").with_type("Light");
        assert_eq!(entity.tokens(Category::DeviceType), vec!["Light", "light"]);

        let untyped = Entity::new("light.desk");
        assert_eq!(untyped.tokens(Category::DeviceType), vec!["light"]);
    }

    #[test]
    fn name_tokens_read_attributes() {
        let json = r#"{"entity_id":"light.a","attributes":{"friendly_name":"Desk Lamp"},"device_name":"Hue Go"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.tokens(Category::DeviceName), vec!["Desk Lamp", "Hue Go"]);
        assert_eq!(entity.label(), "Desk Lamp");
    }

    #[test]
    fn locality_tokens_prefer_english_labels() {
        let json = r#"{"entity_id":"light.lr","floor_name":"一楼","floor_name_en":"First Floor",
            "level":1,"room_name":"客厅","room_name_en":"Living Room","room_type":"living_room"}"#;
        let entity: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(entity.level, "1");
        assert_eq!(
            entity.tokens(Category::Floor),
            vec!["First Floor", "一楼", "1"]
        );
        assert_eq!(
            entity.tokens(Category::Room),
            vec!["Living Room", "living_room", "客厅"]
        );
    }

    #[test]
    fn null_level_is_empty() {
        let entity: Entity =
            serde_json::from_str(r#"{"entity_id":"light.a","level":null,"floor_type":null}"#).unwrap();
        assert_eq!(entity.level, "");
        assert!(entity.tokens(Category::Floor).is_empty());
    }

    #[test]
    fn empty_levels_have_no_tokens() {
        let entity = Entity::new("sensor.t");
        assert!(entity.tokens(Category::Floor).is_empty());
        assert!(entity.tokens(Category::Room).is_empty());
    }

    #[test]
    fn registry_rejects_duplicates() {
        let entities = vec![Entity::new("light.a"), Entity::new("light.a")];
        assert_eq!(
            validate_registry(&entities),
            Err(RegistryError::DuplicateEntityId("light.a".into()))
        );
    }

    #[test]
    fn registry_rejects_missing_ids() {
        let entities = vec![Entity::new("light.a"), Entity::new(" ")];
        assert_eq!(
            validate_registry(&entities),
            Err(RegistryError::MissingEntityId { index: 1 })
        );
    }
}

//! Intent requests produced by the upstream language-understanding step.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::RequestError;

/// One resolution query: any subset of the four attribute levels plus an
/// opaque service payload that passes through unresolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    #[serde(default, alias = "floor", skip_serializing_if = "Option::is_none")]
    pub floor_name: Option<String>,

    /// English rendering of the floor; preferred over `floor_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_name_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_type: Option<String>,

    #[serde(default, alias = "room", skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,

    /// English rendering of the room; preferred over `room_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_name_en: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// English rendering of the device name; preferred over `device_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name_en: Option<String>,

    /// Service to invoke on the resolved targets, e.g. `light.turn_on`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_data: Option<serde_json::Value>,

    /// Any other fields (e.g. `automation`) travel with the request untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl IntentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for one attribute level.
    pub fn with(mut self, category: Category, value: impl Into<String>) -> Self {
        self.set(category, Some(value.into()));
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Every non-blank text the request carries for a level, most
    /// preferred first: English rendering, then type, then the plain field.
    pub fn fields(&self, category: Category) -> impl Iterator<Item = &str> {
        let raw: [Option<&str>; 3] = match category {
            Category::Floor => [
                self.floor_name_en.as_deref(),
                self.floor_type.as_deref(),
                self.floor_name.as_deref(),
            ],
            Category::Room => [
                self.room_name_en.as_deref(),
                self.room_type.as_deref(),
                self.room_name.as_deref(),
            ],
            Category::DeviceType => [self.device_type.as_deref(), None, None],
            Category::DeviceName => [
                self.device_name_en.as_deref(),
                self.device_name.as_deref(),
                None,
            ],
        };
        raw.into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The requested text for a level, or `None` when the level is absent
    /// or blank. Blank levels are never evaluated.
    pub fn field(&self, category: Category) -> Option<&str> {
        self.fields(category).next()
    }

    /// Replace the requested text for a level, clearing its alternate
    /// renderings.
    pub fn set(&mut self, category: Category, value: Option<String>) {
        match category {
            Category::Floor => {
                self.floor_name = value;
                self.floor_name_en = None;
                self.floor_type = None;
            }
            Category::Room => {
                self.room_name = value;
                self.room_name_en = None;
                self.room_type = None;
            }
            Category::DeviceType => self.device_type = value,
            Category::DeviceName => {
                self.device_name = value;
                self.device_name_en = None;
            }
        }
    }

    /// Levels this request actually specifies, in evaluation order.
    pub fn specified(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.field(*c).is_some())
            .collect()
    }

    /// Domain part of the service (`light.turn_on` → `light`).
    pub fn service_domain(&self) -> Option<&str> {
        self.service
            .as_deref()
            .and_then(|s| s.split_once('.').map(|(domain, _)| domain).or(Some(s)))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Reject requests with nothing to match on.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.specified().is_empty() && self.service_domain().is_none() {
            return Err(RequestError::Empty);
        }
        Ok(())
    }
}

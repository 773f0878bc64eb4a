//! Per-level acceptance thresholds and the selection policy.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::ThresholdError;

/// Minimum acceptance score per level, each within `[0, 1]`.
///
/// Room and device type default higher than floor: room/category
/// collisions are the dominant source of false positives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_floor")]
    pub floor: f64,

    #[serde(default = "default_room")]
    pub room: f64,

    #[serde(rename = "type", alias = "device_type", default = "default_type")]
    pub device_type: f64,

    #[serde(rename = "name", alias = "device_name", default = "default_name")]
    pub device_name: f64,
}

fn default_floor() -> f64 {
    0.70
}
fn default_room() -> f64 {
    0.85
}
fn default_type() -> f64 {
    0.65
}
fn default_name() -> f64 {
    0.75
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            room: default_room(),
            device_type: default_type(),
            device_name: default_name(),
        }
    }
}

impl ThresholdConfig {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Floor => self.floor,
            Category::Room => self.room,
            Category::DeviceType => self.device_type,
            Category::DeviceName => self.device_name,
        }
    }

    pub fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Floor => self.floor = value,
            Category::Room => self.room = value,
            Category::DeviceType => self.device_type = value,
            Category::DeviceName => self.device_name = value,
        }
    }

    /// Builder-style variant of [`ThresholdConfig::set`].
    pub fn with(mut self, category: Category, value: f64) -> Self {
        self.set(category, value);
        self
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        for level in Category::ALL {
            let value = self.get(level);
            if !(0.0..=1.0).contains(&value) {
                return Err(ThresholdError::OutOfRange { level, value });
            }
        }
        Ok(())
    }
}

/// How resolved candidates are turned into a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Combined minimum confidence for a request that names a single device.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Single-target results whose two best candidates are closer than this
    /// are flagged for disambiguation.
    #[serde(default = "default_disambiguation_gap")]
    pub disambiguation_gap: f64,

    /// Candidate diagnostics kept per result; `0` keeps all of them.
    #[serde(default = "default_diagnostics_limit")]
    pub diagnostics_limit: usize,

    /// Device names that describe a category rather than one device
    /// ("lights", "灯"). They never pin a unique target.
    #[serde(default = "default_generic_names")]
    pub generic_names: Vec<String>,
}

fn default_min_confidence() -> f64 {
    0.70
}
fn default_disambiguation_gap() -> f64 {
    0.08
}
fn default_diagnostics_limit() -> usize {
    10
}

fn default_generic_names() -> Vec<String> {
    [
        "light", "lights", "lamp", "lamps", "deng", "灯", "灯光", "灯具", "照明",
        "switch", "switches", "kaiguan", "开关",
        "socket", "sockets", "chazuo", "插座", "outlet", "plug",
        "ac", "aircon", "kongtiao", "空调", "冷气", "climate",
        "fan", "fans", "fengshan", "风扇",
        "cover", "covers", "chuanglian", "窗帘", "curtain", "blind",
        "lock", "locks", "suo", "锁", "门锁",
        "camera", "cameras", "cam", "shexiangtou", "摄像头", "监控",
        "sensor", "sensors", "chuanganqi", "传感器",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            disambiguation_gap: default_disambiguation_gap(),
            diagnostics_limit: default_diagnostics_limit(),
            generic_names: default_generic_names(),
        }
    }
}

impl SelectionPolicy {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ThresholdError::InvalidPolicy {
                field: "min_confidence",
                value: self.min_confidence,
            });
        }
        if !(0.0..=1.0).contains(&self.disambiguation_gap) {
            return Err(ThresholdError::InvalidPolicy {
                field: "disambiguation_gap",
                value: self.disambiguation_gap,
            });
        }
        Ok(())
    }
}

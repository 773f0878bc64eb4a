//! Attribute levels an entity can be matched on.

use serde::{Deserialize, Serialize};

/// One attribute level of the resolution hierarchy, coarse to fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Floor,
    Room,
    DeviceType,
    DeviceName,
}

impl Category {
    /// All levels in evaluation order.
    pub const ALL: [Category; 4] = [
        Category::Floor,
        Category::Room,
        Category::DeviceType,
        Category::DeviceName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Floor => "floor",
            Category::Room => "room",
            Category::DeviceType => "device_type",
            Category::DeviceName => "device_name",
        }
    }

    /// Floor and room describe where a device is, not what it is.
    pub fn is_locality(&self) -> bool {
        matches!(self, Category::Floor | Category::Room)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Built-in attribute kinds

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use uuid::Uuid;

use super::{Attribute, AttributeKind};
use crate::feature::FeatureType;
use crate::kernel::AngleType;

macro_rules! impl_attribute_kind {
    ($ty:ty, $guid:expr) => {
        impl AttributeKind for $ty {
            const GUID: Uuid = Uuid::from_u128($guid);
        }

        impl Attribute for $ty {
            fn guid(&self) -> Uuid {
                <$ty as AttributeKind>::GUID
            }

            fn copy(&self) -> Box<dyn Attribute> {
                Box::new(self.clone())
            }

            fn dump(&self) -> String {
                self.to_string()
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }
    };
}

/// Marks a face as belonging to a recognized feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureTag {
    pub feature_type: FeatureType,
    /// 1-based feature number within its type
    pub feature_id: u32,
}

impl FeatureTag {
    /// Create a feature tag
    pub fn new(feature_type: FeatureType, feature_id: u32) -> Self {
        Self {
            feature_type,
            feature_id,
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature {} #{}", self.feature_type, self.feature_id)
    }
}

impl_attribute_kind!(FeatureTag, 0x6f1c_2a4e_8d3b_4c71_9a0e_3b5d_7c21_f001);

/// Convexity of an arc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AngleTag {
    pub angle: AngleType,
}

impl AngleTag {
    /// Create an angle tag
    pub fn new(angle: AngleType) -> Self {
        Self { angle }
    }
}

impl fmt::Display for AngleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "angle {}", self.angle)
    }
}

impl_attribute_kind!(AngleTag, 0x6f1c_2a4e_8d3b_4c71_9a0e_3b5d_7c21_f002);

/// Index of the same-host group a face belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostTag {
    /// 1-based group number
    pub group: u32,
}

impl HostTag {
    /// Create a host tag
    pub fn new(group: u32) -> Self {
        Self { group }
    }
}

impl fmt::Display for HostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host group {}", self.group)
    }
}

impl_attribute_kind!(HostTag, 0x6f1c_2a4e_8d3b_4c71_9a0e_3b5d_7c21_f003);

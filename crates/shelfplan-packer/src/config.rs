//! Rack dimensions shared by packing, vacancy search and world mapping.

use serde::{Deserialize, Serialize};
use shelfplan_math::BoxDims;

use crate::{PackerError, Result};

/// Fixed physical dimensions of a rack unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RackSpec {
    /// Length of one rack unit along the aisle (metres).
    pub unit_width: f64,
    /// Depth of one rack, front to back (metres).
    pub rack_depth: f64,
    /// Inset of the usable shelf area from each rack edge (metres).
    pub post_inset: f64,
    /// Gap between adjacent boxes on both packing axes (metres).
    pub gap: f64,
    /// Substituted for missing or zero product box dimensions.
    pub fallback_box: BoxDims,
}

impl Default for RackSpec {
    fn default() -> Self {
        Self {
            unit_width: 3.0,
            rack_depth: 0.6,
            post_inset: 0.05,
            gap: 0.05,
            fallback_box: BoxDims::new(0.4, 0.3, 0.3),
        }
    }
}

impl RackSpec {
    /// Reject non-finite or non-positive dimensions.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("unit_width", self.unit_width),
            ("rack_depth", self.rack_depth),
            ("fallback_box.width", self.fallback_box.width),
            ("fallback_box.height", self.fallback_box.height),
            ("fallback_box.depth", self.fallback_box.depth),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PackerError::InvalidSpec(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return Err(PackerError::InvalidSpec(format!(
                "gap must be non-negative, got {}",
                self.gap
            )));
        }
        if !(self.post_inset.is_finite() && self.post_inset >= 0.0) {
            return Err(PackerError::InvalidSpec(format!(
                "post_inset must be non-negative, got {}",
                self.post_inset
            )));
        }
        if 2.0 * self.post_inset >= self.unit_width.min(self.rack_depth) {
            return Err(PackerError::InvalidSpec(
                "post_inset leaves no usable shelf area".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RackSpec::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let spec = RackSpec {
            unit_width: 0.0,
            ..RackSpec::default()
        };
        assert!(spec.validate().is_err());

        let spec = RackSpec {
            post_inset: 0.3,
            ..RackSpec::default()
        };
        assert!(spec.validate().is_err());

        let spec = RackSpec {
            gap: -0.01,
            ..RackSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let spec: RackSpec = toml::from_str("unit_width = 2.5").unwrap();
        assert_eq!(spec.unit_width, 2.5);
        assert_eq!(spec.rack_depth, RackSpec::default().rack_depth);
    }
}

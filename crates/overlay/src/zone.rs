//! Placement zones
//!
//! A zone is a rectangle on the verso page, described by offsets from the
//! page edges in millimetres. The wire form (`ZoneConfig`) leaves every field
//! optional; resolution fills in the defaults of a standard envelope-window
//! layout: name upper-left, address lower-right.

use crate::ValidationError;
use serde::{Deserialize, Serialize};

/// Millimetres to PDF points (1 pt = 1/72 inch)
pub const MM_TO_PT: f64 = 72.0 / 25.4;

/// Zone configuration as received from callers (JSON body, form field, CLI)
///
/// All distances are millimetres. Absent fields fall back to the defaults of
/// the zone being configured.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneConfig {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub bottom: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A fully resolved placement zone (millimetres)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    /// Distance from the left page edge; also the clamping bound for lines
    pub left: f64,
    /// Distance from the right page edge, when the zone is anchored there
    pub right: Option<f64>,
    /// Distance from the bottom page edge to the first line
    pub bottom: f64,
    /// Zone width, the wrap limit
    pub width: f64,
    /// Zone height
    pub height: f64,
}

/// Default name zone: upper-left area of the page
pub const NAME_ZONE_DEFAULT: Zone = Zone {
    left: 20.0,
    right: None,
    bottom: 250.0,
    width: 80.0,
    height: 30.0,
};

/// Default address zone: lower-right area, matching a DL envelope window
pub const ADDRESS_ZONE_DEFAULT: Zone = Zone {
    left: 95.0,
    right: Some(15.0),
    bottom: 20.0,
    width: 100.0,
    height: 40.0,
};

impl Zone {
    /// Left bound in points
    pub(crate) fn left_pt(&self) -> f64 {
        self.left * MM_TO_PT
    }

    /// First-line baseline in points
    pub(crate) fn bottom_pt(&self) -> f64 {
        self.bottom * MM_TO_PT
    }

    /// Wrap limit in points
    pub(crate) fn width_pt(&self) -> f64 {
        self.width * MM_TO_PT
    }

    /// Right reference: where a line's trailing edge sits, in points
    ///
    /// Zones anchored to the right page edge use `page_width - right`;
    /// otherwise the zone's own right edge (`left + width`) applies.
    pub(crate) fn right_ref_pt(&self, page_width_pt: f64) -> f64 {
        match self.right {
            Some(right) => page_width_pt - right * MM_TO_PT,
            None => (self.left + self.width) * MM_TO_PT,
        }
    }
}

impl ZoneConfig {
    /// Resolve against a default zone, validating every provided field
    pub fn resolve(&self, defaults: Zone) -> Result<Zone, ValidationError> {
        let field = |name: &'static str, value: Option<f64>, default: f64| {
            let value = value.unwrap_or(default);
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::BadZoneField { field: name, value });
            }
            Ok(value)
        };

        let right = match (self.right, defaults.right) {
            (None, None) => None,
            (value, default) => Some(field("right", value, default.unwrap_or(0.0))?),
        };

        Ok(Zone {
            left: field("left", self.left, defaults.left)?,
            right,
            bottom: field("bottom", self.bottom, defaults.bottom)?,
            width: field("width", self.width, defaults.width)?,
            height: field("height", self.height, defaults.height)?,
        })
    }
}

/// Resolve an optional name-zone configuration against its defaults
pub fn resolve_name_zone(config: Option<&ZoneConfig>) -> Result<Zone, ValidationError> {
    config
        .copied()
        .unwrap_or_default()
        .resolve(NAME_ZONE_DEFAULT)
}

/// Resolve an optional address-zone configuration against its defaults
pub fn resolve_address_zone(config: Option<&ZoneConfig>) -> Result<Zone, ValidationError> {
    config
        .copied()
        .unwrap_or_default()
        .resolve(ADDRESS_ZONE_DEFAULT)
}

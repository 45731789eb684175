//! User settings for a dogbone run.

use serde::{Deserialize, Serialize};

use crate::dihedral::AngleFilter;
use crate::error::{DogboneError, Result};
use crate::placement::{DogboneStyle, MortiseSide, PlacementParams};

/// Which plane the holes start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthMode {
    /// Start at the top face of the body and cut down through the corner.
    #[default]
    FromTop,
    /// Start at the selected face.
    FromSelectedFace,
}

/// How hole features are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleMode {
    /// One multi-point hole per distinct depth, with fixed values.
    #[default]
    Static,
    /// One hole per corner, dimensioned from the corner edges and cut to the
    /// far end of the dogbone edge.
    Parametric,
}

/// Settings for a dogbone run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DogboneSettings {
    /// Cutter diameter (mm).
    pub tool_diameter: f64,
    /// Added to the diameter to loosen (or tighten) the fit (mm).
    pub tool_diameter_offset: f64,
    /// Relief style.
    pub style: DogboneStyle,
    /// Edge to align with for mortise dogbones.
    pub mortise_side: MortiseSide,
    /// Extra offset for minimal dogbones, in percent of the radius.
    pub minimal_percentage: f64,
    /// Start plane of the holes.
    pub depth_mode: DepthMode,
    /// Feature layout.
    pub hole_mode: HoleMode,
    /// Log the run time at info level.
    pub benchmark: bool,
    /// Corner eligibility.
    pub angle_filter: AngleFilter,
}

impl Default for DogboneSettings {
    fn default() -> Self {
        Self {
            tool_diameter: 6.35,
            tool_diameter_offset: 0.0,
            style: DogboneStyle::Normal,
            mortise_side: MortiseSide::Long,
            minimal_percentage: 10.0,
            depth_mode: DepthMode::FromTop,
            hole_mode: HoleMode::Static,
            benchmark: false,
            angle_filter: AngleFilter::default(),
        }
    }
}

impl DogboneSettings {
    /// Cutter radius including the diameter offset.
    pub fn tool_radius(&self) -> f64 {
        (self.tool_diameter + self.tool_diameter_offset) / 2.0
    }

    /// Inputs for the placement engine.
    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            style: self.style,
            mortise_side: self.mortise_side,
            tool_radius: self.tool_radius(),
            minimal_percentage: self.minimal_percentage,
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.tool_diameter.is_finite() && self.tool_diameter > 0.0) {
            return Err(DogboneError::Configuration(
                "tool_diameter must be positive".into(),
            ));
        }
        if !self.tool_diameter_offset.is_finite() || self.tool_radius() <= 0.0 {
            return Err(DogboneError::Configuration(
                "tool_diameter + tool_diameter_offset must be positive".into(),
            ));
        }
        if !(self.minimal_percentage.is_finite() && self.minimal_percentage >= 0.0) {
            return Err(DogboneError::Configuration(
                "minimal_percentage must not be negative".into(),
            ));
        }
        let f = &self.angle_filter;
        if f.enabled && !(f.min_angle >= 0.0 && f.min_angle < f.max_angle && f.max_angle <= 360.0) {
            return Err(DogboneError::Configuration(format!(
                "angle window {}..{} is not within 0..360 degrees",
                f.min_angle, f.max_angle
            )));
        }
        self.placement_params().validate()
    }

    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DogboneError::Configuration(e.to_string()))
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| DogboneError::Configuration(e.to_string()))
    }

    /// Parse settings from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DogboneError::Configuration(e.to_string()))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| DogboneError::Configuration(e.to_string()))
    }
}

use serde::{Deserialize, Serialize};

fn enabled() -> bool {
    true
}

/// Switches for the checks that go beyond the structural invariants of the metadata models.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ValidationSettings {
    /// Require every scale and translation vector to have one entry per axis.
    #[serde(rename = "checkTransformationDimensions")]
    #[serde(default = "enabled")]
    pub check_transformation_dimensions: bool,

    /// Reject axes that break the type and ordering rules of OME-NGFF 0.4 instead of only logging
    /// a warning.
    #[serde(rename = "enforceAxesLayout")]
    #[serde(default)]
    pub enforce_axes_layout: bool,

    /// Check row and column names as well as the row and column references of wells.
    #[serde(rename = "checkPlateLayout")]
    #[serde(default = "enabled")]
    pub check_plate_layout: bool,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            check_transformation_dimensions: true,
            enforce_axes_layout: false,
            check_plate_layout: true,
        }
    }
}

impl ValidationSettings {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        assert_eq!(
            ValidationSettings::from_json_str("{}").unwrap(),
            ValidationSettings::default()
        );
    }

    #[test]
    fn dimension_check_can_be_relaxed() {
        let settings =
            ValidationSettings::from_json_str(r#"{"checkTransformationDimensions": false}"#).unwrap();
        assert!(!settings.check_transformation_dimensions);
        assert!(settings.check_plate_layout);
    }
}

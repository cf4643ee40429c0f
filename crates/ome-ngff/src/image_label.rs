use std::collections::BTreeSet;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::util::ensure_unique;

// https://ngff.openmicroscopy.org/0.4/#label-md

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(rename = "label-value")]
    pub label_value: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rgba: Option<[u8; 4]>,
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawImageLabel {
    pub version: Option<String>,

    #[serde(default)]
    pub colors: Vec<Color>,

    // an arbitrary number of key-value pairs may be present for each label
    #[serde(default)]
    pub properties: Vec<Map<String, Value>>,

    pub source: Option<Source>,
}

/// The `image-label` attributes of a label image.
/// Overlapping labels may be represented by using a specially assigned value, e.g. the highest
/// integer available in the pixel range.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageLabel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    pub colors: Vec<Color>,

    pub properties: Vec<Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl<'de> Deserialize<'de> for ImageLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawImageLabel::deserialize(deserializer)?;
        ImageLabel::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawImageLabel> for ImageLabel {
    type Error = ValidationError;

    fn try_from(raw: RawImageLabel) -> Result<Self, Self::Error> {
        let label_values: Vec<String> = raw.colors.iter().map(|c| c.label_value.to_string()).collect();
        ensure_unique("colors", label_values.iter().map(String::as_str))?;
        Ok(ImageLabel {
            version: raw.version,
            colors: raw.colors,
            properties: raw.properties,
            source: raw.source,
        })
    }
}

impl ImageLabel {
    pub fn max_label_value(&self) -> Option<u64> {
        self.colors.iter().map(|c| c.label_value).max()
    }

    /// All keys used by any entry of `properties`, sorted.
    pub fn property_names(&self) -> Vec<String> {
        self.properties
            .iter()
            .flat_map(|p| p.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

pub fn parse_image_label(raw: Value) -> Result<ImageLabel, ValidationError> {
    let raw: RawImageLabel = serde_json::from_value(raw)?;
    ImageLabel::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use serde_json::json;

    fn spec_example_json() -> Value {
        json!({
            "version": "0.4",
            "colors": [
                {"label-value": 1, "rgba": [255, 255, 255, 255]},
                {"label-value": 4, "rgba": [0, 255, 255, 128]}
            ],
            "properties": [
                {"label-value": 1, "area (pixels)": 1200, "class": "foo"},
                {"label-value": 4, "area (pixels)": 1650}
            ],
            "source": {"image": "../../"}
        })
    }

    #[test]
    fn spec_example_is_valid() {
        let label = parse_image_label(spec_example_json()).unwrap();
        assert_eq!(label.max_label_value(), Some(4));
        assert_eq!(label.property_names(), vec!["area (pixels)", "class", "label-value"]);
        assert_eq!(label.source.as_ref().and_then(|s| s.image.as_deref()), Some("../../"));
    }

    #[test]
    fn duplicate_label_values_fail() {
        let mut raw = spec_example_json();
        raw["colors"][1]["label-value"] = json!(1);
        assert!(matches!(
            parse_image_label(raw),
            Err(ValidationError::Structure(StructureError::DuplicateEntry { key, .. })) if key == "1"
        ));
    }

    #[test]
    fn empty_label_has_no_max_value() {
        let label = parse_image_label(json!({})).unwrap();
        assert_eq!(label.max_label_value(), None);
        assert!(label.property_names().is_empty());
    }
}

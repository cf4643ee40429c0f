use serde::{Deserialize, Serialize};

// https://ngff.openmicroscopy.org/0.4/#omero-md

/// Note that `start` and `end` are optional here, while OME-NGFF lists them as required.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub min: f64,

    pub max: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    // hex RGB without a leading '#'
    pub color: String,

    pub window: Window,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub inverted: Option<bool>,
}

impl Channel {
    pub fn hex_color(&self) -> String {
        format!("#{}", self.color)
    }

    pub fn rgb(&self) -> Option<[u8; 3]> {
        let color = self.color.trim_start_matches('#');
        if color.len() != 6 || !color.is_ascii() {
            return None;
        }
        let component = |i: usize| u8::from_str_radix(&color[i..i + 2], 16).ok();
        Some([component(0)?, component(2)?, component(4)?])
    }
}

#[readonly::make]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RDefs {
    #[serde(rename = "defaultT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_t: Option<u64>,

    #[serde(rename = "defaultZ")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_z: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Display metadata for the channels of an image.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Omero {
    pub channels: Vec<Channel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdefs: Option<RDefs>,

    pub version: String,
}

impl Omero {
    pub fn default_t(&self) -> u64 {
        self.rdefs.as_ref().and_then(|r| r.default_t).unwrap_or(0)
    }

    pub fn default_z(&self) -> u64 {
        self.rdefs.as_ref().and_then(|r| r.default_z).unwrap_or(0)
    }
}

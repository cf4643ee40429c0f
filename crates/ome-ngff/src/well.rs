use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::util::{ensure_non_empty, ensure_unique};

// https://ngff.openmicroscopy.org/0.4/#well-md

#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    // relative to the well group
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquisition: Option<u64>,
}

#[derive(Deserialize)]
pub(crate) struct RawWell {
    pub images: Vec<Image>,

    pub version: Option<String>,
}

/// The `well` attributes of a well group, listing the field-of-view images it holds.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Well {
    pub images: Vec<Image>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl<'de> Deserialize<'de> for Well {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawWell::deserialize(deserializer)?;
        Well::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawWell> for Well {
    type Error = ValidationError;

    fn try_from(raw: RawWell) -> Result<Self, Self::Error> {
        ensure_non_empty("images", &raw.images)?;
        ensure_unique("images", raw.images.iter().map(|i| i.path.as_str()))?;
        Ok(Well {
            images: raw.images,
            version: raw.version,
        })
    }
}

pub fn parse_well(raw: Value) -> Result<Well, ValidationError> {
    let raw: RawWell = serde_json::from_value(raw)?;
    Well::try_from(raw)
}

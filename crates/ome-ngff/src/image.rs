use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::multiscale::{Multiscale, RawMultiscale};
use crate::omero::Omero;
use crate::settings::ValidationSettings;
use crate::util::ensure_non_empty;

#[derive(Deserialize)]
pub(crate) struct RawImage {
    pub multiscales: Vec<RawMultiscale>,

    pub omero: Option<Omero>,
}

/// The attributes of an image group: one or more multiscale pyramids and optional channel
/// display metadata.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Image {
    pub multiscales: Vec<Multiscale>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub omero: Option<Omero>,
}

impl Image {
    pub(crate) fn from_raw(raw: RawImage, settings: &ValidationSettings) -> Result<Self, ValidationError> {
        ensure_non_empty("multiscales", &raw.multiscales)?;
        let multiscales = raw
            .multiscales
            .into_iter()
            .map(|m| Multiscale::from_raw(m, settings))
            .collect::<Result<Vec<Multiscale>, ValidationError>>()?;
        Ok(Image {
            multiscales,
            omero: raw.omero,
        })
    }

    /// The multiscale that pixel lookups are resolved against. Further multiscales are kept but
    /// not related to it.
    pub fn primary_multiscale(&self) -> &Multiscale {
        // non-empty by construction
        &self.multiscales[0]
    }
}

impl<'de> Deserialize<'de> for Image {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawImage::deserialize(deserializer)?;
        Image::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawImage> for Image {
    type Error = ValidationError;

    fn try_from(raw: RawImage) -> Result<Self, Self::Error> {
        Image::from_raw(raw, &ValidationSettings::default())
    }
}

pub fn parse_image(raw: Value) -> Result<Image, ValidationError> {
    parse_image_with(raw, &ValidationSettings::default())
}

pub fn parse_image_with(raw: Value, settings: &ValidationSettings) -> Result<Image, ValidationError> {
    let raw: RawImage = serde_json::from_value(raw)?;
    Image::from_raw(raw, settings)
}

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::image::{Image, RawImage};
use crate::image_label::{ImageLabel, RawImageLabel};
use crate::plate::{Plate, RawPlate};
use crate::settings::ValidationSettings;
use crate::well::{RawWell, Well};

// https://ngff.openmicroscopy.org/0.4/#metadata

/// The NGFF metadata found in the attributes of a single group.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NodeMetadata {
    // "multiscales" and "omero"
    #[serde(flatten)]
    pub image: Option<Image>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,

    // if present, the group is a segmentation of the image found at `source`
    #[serde(rename = "image-label")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_label: Option<ImageLabel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<Plate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub well: Option<Well>,
}

impl NodeMetadata {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.labels.is_none()
            && self.image_label.is_none()
            && self.plate.is_none()
            && self.well.is_none()
    }
}

fn take<T: serde::de::DeserializeOwned>(attributes: &Map<String, Value>, key: &str) -> Result<Option<T>, ValidationError> {
    match attributes.get(key) {
        Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        None => Ok(None),
    }
}

/// Reads every kind of NGFF metadata present in a group's attributes.
/// Keys that are not part of OME-NGFF are ignored. An `omero` block without `multiscales` is
/// ignored as well, since it only describes the channels of an image.
pub fn parse_attributes(
    attributes: &Map<String, Value>,
    settings: &ValidationSettings,
) -> Result<NodeMetadata, ValidationError> {
    let image = match attributes.get("multiscales") {
        Some(multiscales) => {
            let raw = RawImage {
                multiscales: serde_json::from_value(multiscales.clone())?,
                omero: take(attributes, "omero")?,
            };
            Some(Image::from_raw(raw, settings)?)
        }
        None => None,
    };
    let image_label = take::<RawImageLabel>(attributes, "image-label")?
        .map(ImageLabel::try_from)
        .transpose()?;
    let plate = take::<RawPlate>(attributes, "plate")?
        .map(|raw| Plate::from_raw(raw, settings))
        .transpose()?;
    let well = take::<RawWell>(attributes, "well")?
        .map(Well::try_from)
        .transpose()?;

    Ok(NodeMetadata {
        image,
        labels: take(attributes, "labels")?,
        image_label,
        plate,
        well,
    })
}

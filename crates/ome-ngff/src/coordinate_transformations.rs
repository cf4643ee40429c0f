use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{TransformationError, ValidationError};

const MIN_VECTOR_LENGTH: usize = 2;

/// The document form of a transformation, before the payload is checked against the tag.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawCoordinateTransformation {
    #[serde(rename = "type")]
    pub transformation_type: String,

    pub scale: Option<Vec<f64>>,

    pub translation: Option<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum CoordinateTransformation {
    Identity,
    Translation { translation: Vec<f64> },
    Scale { scale: Vec<f64> },
}

impl CoordinateTransformation {
    pub fn type_name(&self) -> &'static str {
        match self {
            CoordinateTransformation::Identity => "identity",
            CoordinateTransformation::Translation { .. } => "translation",
            CoordinateTransformation::Scale { .. } => "scale",
        }
    }

    /// The scale or translation vector, `None` for the identity.
    pub fn vector(&self) -> Option<&[f64]> {
        match self {
            CoordinateTransformation::Identity => None,
            CoordinateTransformation::Translation { translation } => Some(translation),
            CoordinateTransformation::Scale { scale } => Some(scale),
        }
    }

    /// Applies the transformation in place. Dimensions beyond the vector's length are left as is.
    pub fn apply(&self, point: &mut [f64]) {
        match self {
            CoordinateTransformation::Identity => {}
            CoordinateTransformation::Translation { translation } => {
                point.iter_mut().zip(translation).for_each(|(p, t)| *p += t);
            }
            CoordinateTransformation::Scale { scale } => {
                point.iter_mut().zip(scale).for_each(|(p, s)| *p *= s);
            }
        }
    }
}

fn checked_vector(tag: &str, vector: Vec<f64>) -> Result<Vec<f64>, TransformationError> {
    if vector.len() < MIN_VECTOR_LENGTH {
        Err(TransformationError::VectorTooShort {
            tag: tag.to_string(),
            len: vector.len(),
        })
    } else {
        Ok(vector)
    }
}

fn mismatch(tag: &str, field: &str) -> TransformationError {
    TransformationError::FieldMismatch(tag.to_string(), field.to_string())
}

impl TryFrom<RawCoordinateTransformation> for CoordinateTransformation {
    type Error = TransformationError;

    fn try_from(raw: RawCoordinateTransformation) -> Result<Self, Self::Error> {
        let tag = raw.transformation_type.as_str();
        match (tag, raw.scale, raw.translation) {
            ("identity", None, None) => Ok(CoordinateTransformation::Identity),
            ("identity", Some(_), _) => Err(mismatch(tag, "scale")),
            ("identity", None, Some(_)) => Err(mismatch(tag, "translation")),
            ("translation", Some(_), _) => Err(mismatch(tag, "scale")),
            ("translation", None, None) => Err(mismatch(tag, "translation")),
            ("translation", None, Some(translation)) => Ok(CoordinateTransformation::Translation {
                translation: checked_vector(tag, translation)?,
            }),
            ("scale", _, Some(_)) => Err(mismatch(tag, "translation")),
            ("scale", None, None) => Err(mismatch(tag, "scale")),
            ("scale", Some(scale), None) => Ok(CoordinateTransformation::Scale {
                scale: checked_vector(tag, scale)?,
            }),
            _ => Err(TransformationError::UnknownType(tag.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for CoordinateTransformation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawCoordinateTransformation::deserialize(deserializer)?;
        CoordinateTransformation::try_from(raw).map_err(D::Error::custom)
    }
}

pub fn parse_coordinate_transformation(raw: Value) -> Result<CoordinateTransformation, ValidationError> {
    let raw: RawCoordinateTransformation = serde_json::from_value(raw)?;
    Ok(CoordinateTransformation::try_from(raw)?)
}

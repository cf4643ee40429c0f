use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::axis::{Axis, AxisKind};
use crate::coordinate_transformations::{CoordinateTransformation, RawCoordinateTransformation};
use crate::error::{AxisError, DimensionError, StructureError, ValidationError};
use crate::settings::ValidationSettings;
use crate::util::{ensure_non_empty, first_duplicate, warn_unless};

// https://ngff.openmicroscopy.org/0.4/#multiscale-md

const MIN_AXES: usize = 2;
const MAX_AXES: usize = 5;

#[derive(Deserialize)]
pub(crate) struct RawDataset {
    pub path: String,

    #[serde(rename = "coordinateTransformations")]
    pub coordinate_transformations: Vec<RawCoordinateTransformation>,
}

#[derive(Deserialize)]
pub(crate) struct RawMultiscale {
    pub name: Option<String>,

    pub version: Option<String>,

    #[serde(rename = "type")]
    pub downscaling_type: Option<String>,

    pub axes: Vec<Axis>,

    pub datasets: Vec<RawDataset>,

    #[serde(rename = "coordinateTransformations")]
    pub coordinate_transformations: Option<Vec<RawCoordinateTransformation>>,

    pub metadata: Option<Value>,
}

/// One resolution level of a multiscale image.
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dataset {
    pub path: String,

    // the first entry maps raw array indices to the physical space of this level
    #[serde(rename = "coordinateTransformations")]
    pub coordinate_transformations: Vec<CoordinateTransformation>,
}

impl Dataset {
    /// The scale at the head of the transformation chain, if there is one.
    pub fn leading_scale(&self) -> Option<&[f64]> {
        match self.coordinate_transformations.first() {
            Some(CoordinateTransformation::Scale { scale }) => Some(scale),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDataset::deserialize(deserializer)?;
        Dataset::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ValidationError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Ok(Dataset {
            coordinate_transformations: parse_chain("coordinateTransformations", raw.coordinate_transformations, true)?,
            path: raw.path,
        })
    }
}

/// A pyramid of resolution levels sharing one set of axes.
///
/// Construction validates:
///  - axis names are unique
///  - there are 2 to 5 axes
///  - there is at least one dataset, each with at least one transformation
///  - every scale and translation vector has one entry per axis (see
///    [`ValidationSettings::check_transformation_dimensions`])
#[readonly::make]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Multiscale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(rename = "type")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downscaling_type: Option<String>,

    pub axes: Vec<Axis>,

    // ordered by largest (i.e. highest resolution) to smallest.
    pub datasets: Vec<Dataset>,

    // are applied after `coordinate_transformations` in `datasets`
    #[serde(rename = "coordinateTransformations")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_transformations: Option<Vec<CoordinateTransformation>>,

    // fields in metadata depend on `downscaling_type`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl<'de> Deserialize<'de> for Multiscale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawMultiscale::deserialize(deserializer)?;
        Multiscale::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawMultiscale> for Multiscale {
    type Error = ValidationError;

    fn try_from(raw: RawMultiscale) -> Result<Self, Self::Error> {
        Multiscale::from_raw(raw, &ValidationSettings::default())
    }
}

impl Multiscale {
    pub(crate) fn from_raw(raw: RawMultiscale, settings: &ValidationSettings) -> Result<Self, ValidationError> {
        let RawMultiscale {
            name,
            version,
            downscaling_type,
            axes,
            datasets: raw_datasets,
            coordinate_transformations: raw_top_level,
            metadata,
        } = raw;

        if let Some(name) = first_duplicate(axes.iter().map(|a| a.name.as_str())) {
            return Err(AxisError::DuplicateName(name.to_string()).into());
        }
        if axes.len() < MIN_AXES || axes.len() > MAX_AXES {
            return Err(StructureError::LengthOutOfRange {
                list: "axes".to_string(),
                min: MIN_AXES,
                max: MAX_AXES,
                got: axes.len(),
            }
            .into());
        }
        ensure_non_empty("datasets", &raw_datasets)?;

        let mut datasets = Vec::with_capacity(raw_datasets.len());
        for (i, d) in raw_datasets.into_iter().enumerate() {
            datasets.push(Dataset {
                coordinate_transformations: parse_chain(
                    &format!("datasets[{}].coordinateTransformations", i),
                    d.coordinate_transformations,
                    true,
                )?,
                path: d.path,
            });
        }
        let coordinate_transformations = match raw_top_level {
            Some(chain) => Some(parse_chain("coordinateTransformations", chain, false)?),
            None => None,
        };

        if settings.check_transformation_dimensions {
            for (i, d) in datasets.iter().enumerate() {
                check_chain_dimensions(
                    &format!("datasets[{}] (path \"{}\").coordinateTransformations", i, d.path),
                    &d.coordinate_transformations,
                    axes.len(),
                )?;
            }
            if let Some(chain) = &coordinate_transformations {
                check_chain_dimensions("coordinateTransformations", chain, axes.len())?;
            }
        }

        let layout_violation = axes_layout_violation(&axes);
        if settings.enforce_axes_layout {
            if let Some(violation) = layout_violation {
                return Err(AxisError::InvalidLayout(violation).into());
            }
        } else {
            let _ = warn_unless!(
                layout_violation.is_none(),
                "Ignoring axes layout violation: {}",
                layout_violation.as_deref().unwrap_or_default(),
            );
        }
        for a in axes.iter() {
            let _ = warn_unless!(
                a.has_recognized_unit(),
                "Axis \"{}\" has an unrecognized unit: {:?}",
                a.name,
                a.unit,
            );
        }
        for d in datasets.iter() {
            let _ = are_dataset_transformations_conventional(&d.coordinate_transformations);
        }

        Ok(Multiscale {
            name,
            version,
            downscaling_type,
            axes,
            datasets,
            coordinate_transformations,
            metadata,
        })
    }

    pub fn axis_index(&self, name: &str) -> Option<usize> {
        self.axes.iter().position(|a| a.name == name)
    }

    pub fn space_axes(&self) -> Vec<&Axis> {
        self.axes_of_kind(AxisKind::Space).collect()
    }

    pub fn time_axis(&self) -> Option<&Axis> {
        self.axes_of_kind(AxisKind::Time).next()
    }

    pub fn channel_axis(&self) -> Option<&Axis> {
        self.axes_of_kind(AxisKind::Channel).next()
    }

    fn axes_of_kind(&self, kind: AxisKind) -> impl Iterator<Item = &Axis> {
        self.axes.iter().filter(move |a| a.axis_kind() == kind)
    }

    pub fn dataset(&self, level: usize) -> Result<&Dataset, StructureError> {
        self.datasets.get(level).ok_or_else(|| StructureError::IndexOutOfRange {
            list: "datasets".to_string(),
            index: level,
            len: self.datasets.len(),
        })
    }

    /// Maps an array index of the given resolution level to physical coordinates by applying the
    /// level's transformations followed by the multiscale's own transformations.
    pub fn to_physical(&self, level: usize, index: &[f64]) -> Result<Vec<f64>, ValidationError> {
        let dataset = self.dataset(level)?;
        if index.len() != self.axes.len() {
            return Err(DimensionError::VectorLengthMismatch {
                expected: self.axes.len(),
                got: index.len(),
                axis_context: "array index".to_string(),
            }
            .into());
        }
        let mut point = index.to_vec();
        let top_level = self.coordinate_transformations.iter().flatten();
        for t in dataset.coordinate_transformations.iter().chain(top_level) {
            t.apply(&mut point);
        }
        Ok(point)
    }
}

pub fn parse_multiscale(raw: Value) -> Result<Multiscale, ValidationError> {
    parse_multiscale_with(raw, &ValidationSettings::default())
}

pub fn parse_multiscale_with(raw: Value, settings: &ValidationSettings) -> Result<Multiscale, ValidationError> {
    let raw: RawMultiscale = serde_json::from_value(raw)?;
    Multiscale::from_raw(raw, settings)
}

fn parse_chain(
    list: &str,
    raw: Vec<RawCoordinateTransformation>,
    required: bool,
) -> Result<Vec<CoordinateTransformation>, ValidationError> {
    if required {
        ensure_non_empty(list, &raw)?;
    }
    raw.into_iter()
        .map(|t| CoordinateTransformation::try_from(t).map_err(ValidationError::from))
        .collect()
}

fn check_chain_dimensions(
    context: &str,
    chain: &[CoordinateTransformation],
    axes_length: usize,
) -> Result<(), DimensionError> {
    for (j, t) in chain.iter().enumerate() {
        if let Some(vector) = t.vector() {
            if vector.len() != axes_length {
                return Err(DimensionError::VectorLengthMismatch {
                    expected: axes_length,
                    got: vector.len(),
                    axis_context: format!("{}[{}] ({})", context, j, t.type_name()),
                });
            }
        }
    }
    Ok(())
}

/// Returns a description of the first OME-NGFF 0.4 axes rule that is broken:
///  - 2 or 3 axes of type space
///  - at most one axis of type time
///  - at most one axis of type channel or a custom type
///  - time first, followed by channel or custom, followed by space
fn axes_layout_violation(axes: &[Axis]) -> Option<String> {
    let count = |kind: AxisKind| axes.iter().filter(|a| a.axis_kind() == kind).count();
    let space_count = count(AxisKind::Space);
    let time_count = count(AxisKind::Time);
    let channel_count = count(AxisKind::Channel);
    let custom_count = count(AxisKind::Custom);
    if !(space_count == 2 || space_count == 3)
        || time_count > 1
        || channel_count + custom_count > 1
    {
        return Some(format!(
            "expected 2 or 3 space axes, at most one time axis and at most one channel or custom axis, got (space,time,channel,custom): ({},{},{},{})",
            space_count, time_count, channel_count, custom_count,
        ));
    }

    let rank = |kind: AxisKind| match kind {
        AxisKind::Time => 0,
        AxisKind::Channel | AxisKind::Custom => 1,
        AxisKind::Space => 2,
    };
    let ordered = axes
        .windows(2)
        .all(|w| rank(w[0].axis_kind()) <= rank(w[1].axis_kind()));
    if !ordered {
        let names: Vec<&str> = axes.iter().map(|a| a.name.as_str()).collect();
        return Some(format!(
            "axes must be ordered time, channel or custom, space, got {:?}",
            names
        ));
    }
    None
}

/// Logs the transformation chain rules of OME-NGFF 0.4 that a dataset breaks.
fn are_dataset_transformations_conventional(chain: &[CoordinateTransformation]) -> bool {
    let scale_count = chain
        .iter()
        .filter(|t| matches!(t, CoordinateTransformation::Scale { .. }))
        .count();
    let translation_count = chain
        .iter()
        .filter(|t| matches!(t, CoordinateTransformation::Translation { .. }))
        .count();
    let has_one_scale = warn_unless!(
        scale_count == 1,
        "A dataset should contain exactly one scale transformation. Got: {}",
        scale_count
    );
    let has_at_most_one_translation = warn_unless!(
        translation_count <= 1,
        "A dataset may contain at most one translation. Got: {}",
        translation_count
    );
    let starts_with_scale = warn_unless!(
        matches!(chain.first(), Some(CoordinateTransformation::Scale { .. })),
        "If a translation is given it should be listed after the scale."
    );
    has_one_scale && has_at_most_one_translation && starts_with_scale
}

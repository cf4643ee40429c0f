use std::collections::HashMap;

use glam::DVec2;
use ome_ngff::{
    ArithmeticError,
    Axis,
    AxisError,
    CoordinateTransformation,
    Dataset,
    DimensionError,
    Image,
    TransformationError,
    ValidationError,
};
use ome_zarr::ArrayMetadata;
use serde::{Deserialize, Serialize};

/// Physical size of one unit of the scale vectors, keyed by axis name or axis type, e.g.
/// `{"space": 0.25}` or `{"x": 0.25, "y": 0.5}`. Names take precedence over types.
pub type PhysicalResolution = HashMap<String, f64>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelIndex {
    pub x: i64,
    pub y: i64,
}

fn position_of(axes: &[Axis], name: &str) -> Result<usize, AxisError> {
    axes.iter()
        .position(|a| a.name == name)
        .ok_or_else(|| AxisError::MissingRequiredAxis(name.to_string()))
}

fn resolution_of(axis: &Axis, physical_resolution: &PhysicalResolution) -> Result<f64, AxisError> {
    physical_resolution
        .get(&axis.name)
        .or_else(|| axis.kind.as_ref().and_then(|kind| physical_resolution.get(kind)))
        .copied()
        .ok_or_else(|| AxisError::MissingResolution(axis.name.clone()))
}

/// Maps a physical position in the xy plane to the pixel containing it in the given dataset.
///
/// The dataset's first transformation must be a scale. The pixel size along an axis is the
/// axis's physical resolution times its scale entry, and the pixel index is
/// `floor(position / pixel size)`.
pub fn resolve_pixel_index(
    dataset: &Dataset,
    axes: &[Axis],
    physical_resolution: &PhysicalResolution,
    x: f64,
    y: f64,
) -> Result<PixelIndex, ValidationError> {
    let i_x = position_of(axes, "x")?;
    let i_y = position_of(axes, "y")?;

    let scale = match dataset.coordinate_transformations.first() {
        Some(CoordinateTransformation::Scale { scale }) => scale,
        _ => return Err(TransformationError::ExpectedScale.into()),
    };
    let scale_at = |i: usize| {
        scale.get(i).copied().ok_or_else(|| DimensionError::VectorLengthMismatch {
            expected: axes.len(),
            got: scale.len(),
            axis_context: format!("dataset \"{}\" coordinateTransformations[0] (scale)", dataset.path),
        })
    };

    let pixel_size = DVec2::new(
        resolution_of(&axes[i_x], physical_resolution)? * scale_at(i_x)?,
        resolution_of(&axes[i_y], physical_resolution)? * scale_at(i_y)?,
    );
    for (size, axis) in [(pixel_size.x, i_x), (pixel_size.y, i_y)] {
        if size == 0.0 {
            return Err(ArithmeticError::DivisionByZero {
                axis: axes[axis].name.clone(),
            }
            .into());
        }
    }

    // i64::MAX as f64 rounds up to 2^63, which is out of range
    let representable = i64::MIN as f64..i64::MAX as f64;
    let index = (DVec2::new(x, y) / pixel_size).floor();
    for (value, axis) in [(index.x, i_x), (index.y, i_y)] {
        let axis = axes[axis].name.clone();
        if !value.is_finite() {
            return Err(ArithmeticError::NonFinite { axis }.into());
        }
        if !representable.contains(&value) {
            return Err(ArithmeticError::Overflow { axis }.into());
        }
    }
    Ok(PixelIndex {
        x: index.x as i64,
        y: index.y as i64,
    })
}

/// One resolution level of an image together with the context needed to interpret it.
#[derive(Clone, Copy, Debug)]
pub struct ResolutionLevel<'a> {
    pub dataset: &'a Dataset,
    pub axes: &'a [Axis],
    pub array: &'a ArrayMetadata,
}

impl<'a> ResolutionLevel<'a> {
    /// Length of the array along the named axis.
    pub fn axis_size(&self, name: &str) -> Option<u64> {
        let i = self.axes.iter().position(|a| a.name == name)?;
        self.array.shape.get(i).copied()
    }

    /// Number of chunks along the named axis, 0 if there is no such axis.
    pub fn chunk_count(&self, name: &str) -> u64 {
        self.axes
            .iter()
            .position(|a| a.name == name)
            .and_then(|i| self.array.chunk_count(i))
            .unwrap_or(0)
    }

    pub fn pixel_index(&self, physical_resolution: &PhysicalResolution, x: f64, y: f64) -> Result<PixelIndex, ValidationError> {
        resolve_pixel_index(self.dataset, self.axes, physical_resolution, x, y)
    }
}

/// Resolves a pixel index in a resolution level of the image's first multiscale.
pub fn resolve_image_pixel_index(
    image: &Image,
    level: usize,
    physical_resolution: &PhysicalResolution,
    x: f64,
    y: f64,
) -> Result<PixelIndex, ValidationError> {
    let multiscale = image.primary_multiscale();
    let dataset = multiscale.dataset(level)?;
    resolve_pixel_index(dataset, &multiscale.axes, physical_resolution, x, y)
}

use indexmap::IndexMap;
use ome_ngff::{parse_attributes, Image, NodeMetadata, Plate, StructureError, ValidationError, Well};
use ome_zarr::{ArrayMetadata, Child, GroupHandle, HierarchyNode};
use rayon::prelude::*;
use thiserror::Error;

use crate::resolver::{resolve_pixel_index, PhysicalResolution, PixelIndex, ResolutionLevel};
use crate::settings::ReaderSettings;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("invalid metadata at \"{path}\": {source}")]
    Invalid {
        path: String,
        #[source]
        source: ValidationError,
    },

    #[error("\"{path}\" has no \"{key}\" metadata")]
    MissingMetadata { path: String, key: &'static str },

    #[error("\"{0}\" is not a group")]
    NotAGroup(String),

    #[error("\"{0}\" is not an array")]
    NotAnArray(String),

    #[error("array \"{0}\" has no array metadata")]
    MissingArrayMetadata(String),

    #[error("\"{0}\" is not a valid member path")]
    InvalidPath(String),

    #[error(transparent)]
    Structure(#[from] StructureError),
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Applies `f` to every item, on the rayon thread pool if `parallel` is set. Either way the
/// error of the first failing item in `items` order is returned.
fn map_in_order<T, R, F>(items: &[T], parallel: bool, f: F) -> Result<Vec<R>, ReadError>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> Result<R, ReadError> + Sync + Send,
{
    if parallel {
        let results: Vec<Result<R, ReadError>> = items.par_iter().map(f).collect();
        results.into_iter().collect()
    } else {
        items.iter().map(f).collect()
    }
}

fn invalid<E: Into<ValidationError>>(path: &str) -> impl FnOnce(E) -> ReadError + '_ {
    move |e| ReadError::Invalid {
        path: path.to_string(),
        source: e.into(),
    }
}

/// Opens the member at the `/` separated `path` relative to `root`.
pub fn open_path(root: &dyn GroupHandle, path: &str) -> Result<Child, ReadError> {
    let mut segments = path.split('/').filter(|s| !s.is_empty() && *s != ".");
    let first = segments.next().ok_or_else(|| ReadError::InvalidPath(path.to_string()))?;
    let missing = || StructureError::MissingMember(path.to_string());
    let mut current = root.get_child(first).ok_or_else(missing)?;
    for segment in segments {
        current = match current {
            Child::Group(group) => group.get_child(segment).ok_or_else(missing)?,
            Child::Array(_) => return Err(ReadError::NotAGroup(path.to_string())),
        };
    }
    Ok(current)
}

fn open_group(root: &dyn GroupHandle, path: &str) -> Result<Box<dyn GroupHandle>, ReadError> {
    match open_path(root, path)? {
        Child::Group(group) => Ok(group),
        Child::Array(_) => Err(ReadError::NotAGroup(path.to_string())),
    }
}

fn open_array_metadata(root: &dyn GroupHandle, path: &str) -> Result<ArrayMetadata, ReadError> {
    match open_path(root, path)? {
        Child::Array(array) => array
            .metadata()
            .ok_or_else(|| ReadError::MissingArrayMetadata(path.to_string())),
        Child::Group(_) => Err(ReadError::NotAnArray(path.to_string())),
    }
}

/// A validated image and the array metadata of each level of its first multiscale.
#[readonly::make]
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDescription {
    pub image: Image,

    pub labels: Option<Vec<String>>,

    // one entry per dataset of the first multiscale, in the same order
    pub arrays: Vec<ArrayMetadata>,
}

impl ImageDescription {
    pub fn level(&self, level: usize) -> Result<ResolutionLevel<'_>, StructureError> {
        let multiscale = self.image.primary_multiscale();
        Ok(ResolutionLevel {
            dataset: multiscale.dataset(level)?,
            axes: &multiscale.axes,
            array: &self.arrays[level],
        })
    }

    pub fn pixel_index(
        &self,
        level: usize,
        physical_resolution: &PhysicalResolution,
        x: f64,
        y: f64,
    ) -> Result<PixelIndex, ValidationError> {
        let level = self.level(level)?;
        resolve_pixel_index(level.dataset, level.axes, physical_resolution, x, y)
    }
}

fn read_image_at(group: &dyn GroupHandle, path: &str, settings: &ReaderSettings) -> Result<ImageDescription, ReadError> {
    let metadata = parse_attributes(&group.attributes(), &settings.validation).map_err(invalid(path))?;
    let image = metadata.image.ok_or_else(|| ReadError::MissingMetadata {
        path: path.to_string(),
        key: "multiscales",
    })?;
    let arrays = image
        .primary_multiscale()
        .datasets
        .iter()
        .map(|d| open_array_metadata(group, &d.path))
        .collect::<Result<Vec<ArrayMetadata>, ReadError>>()?;
    log::debug!("Read image \"{}\" with {} resolution levels", path, arrays.len());
    Ok(ImageDescription {
        image,
        labels: metadata.labels,
        arrays,
    })
}

/// Reads the image stored in `group`.
pub fn read_image(group: &dyn GroupHandle, settings: &ReaderSettings) -> Result<ImageDescription, ReadError> {
    read_image_at(group, "", settings)
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq)]
pub struct WellDescription {
    pub well: Well,

    // keyed by image path relative to the well
    pub images: IndexMap<String, ImageDescription>,
}

#[readonly::make]
#[derive(Clone, Debug, PartialEq)]
pub struct PlateDescription {
    pub plate: Plate,

    // keyed by well path, in the order of `plate.wells`
    pub wells: IndexMap<String, WellDescription>,
}

impl PlateDescription {
    pub fn image(&self, well: &str, image: &str) -> Option<&ImageDescription> {
        self.wells.get(well)?.images.get(image)
    }
}

fn read_well(plate_group: &dyn GroupHandle, plate: &Plate, path: &str, settings: &ReaderSettings) -> Result<WellDescription, ReadError> {
    let group = open_group(plate_group, path)?;
    let metadata = parse_attributes(&group.attributes(), &settings.validation).map_err(invalid(path))?;
    let well = metadata.well.ok_or_else(|| ReadError::MissingMetadata {
        path: path.to_string(),
        key: "well",
    })?;
    plate.check_well(path, &well).map_err(invalid(path))?;

    let mut images = IndexMap::with_capacity(well.images.len());
    for i in well.images.iter() {
        let image_path = join(path, &i.path);
        let image_group = open_group(group.as_ref(), &i.path)?;
        let image = read_image_at(image_group.as_ref(), &image_path, settings)?;
        images.insert(i.path.clone(), image);
    }
    log::debug!("Read well \"{}\" with {} images", path, images.len());
    Ok(WellDescription { well, images })
}

/// Reads the plate stored in `group`, including every well and every field of view image.
pub fn read_plate(group: &dyn GroupHandle, settings: &ReaderSettings) -> Result<PlateDescription, ReadError> {
    let metadata = parse_attributes(&group.attributes(), &settings.validation).map_err(invalid(""))?;
    let plate = metadata.plate.ok_or_else(|| ReadError::MissingMetadata {
        path: String::new(),
        key: "plate",
    })?;

    let read = |w: &ome_ngff::plate::Well| read_well(group, &plate, &w.path, settings).map(|d| (w.path.clone(), d));
    let wells = map_in_order(&plate.wells, settings.parallel, read)?;
    log::info!(
        "Read plate {:?} with {} wells",
        plate.name.as_deref().unwrap_or_default(),
        wells.len()
    );
    Ok(PlateDescription {
        wells: wells.into_iter().collect(),
        plate,
    })
}

/// Parses the NGFF metadata of every node of an extracted hierarchy.
///
/// Returns the nodes that carry NGFF metadata together with their path, in document order. The
/// first invalid node fails the whole hierarchy.
pub fn validate_hierarchy(root: &HierarchyNode, settings: &ReaderSettings) -> Result<Vec<(String, NodeMetadata)>, ReadError> {
    let mut nodes = Vec::new();
    let mut stack = vec![(String::new(), root)];
    while let Some((path, node)) = stack.pop() {
        if let Some(members) = &node.members {
            stack.extend(members.iter().rev().map(|(name, member)| (join(&path, name), member)));
        }
        nodes.push((path, node));
    }

    let parsed = map_in_order(&nodes, settings.parallel, |(path, node)| {
        parse_attributes(&node.attributes, &settings.validation)
            .map(|metadata| (path.clone(), metadata))
            .map_err(invalid(path))
    })?;
    Ok(parsed.into_iter().filter(|(_, m)| !m.is_empty()).collect())
}

/// Walks `group` and validates every node of the hierarchy.
pub fn read_hierarchy(group: &dyn GroupHandle, settings: &ReaderSettings) -> Result<Vec<(String, NodeMetadata)>, ReadError> {
    let root = ome_zarr::walk(group)?;
    validate_hierarchy(&root, settings)
}

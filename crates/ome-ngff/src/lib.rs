//! OME-NGFF Metadata
//! https://ngff.openmicroscopy.org/0.4/
//!
//! Every model is validated once, when it is deserialized or parsed, and is read-only afterwards.

pub mod axis;
pub mod coordinate_transformations;
pub mod error;
pub mod image;
pub mod image_label;
pub mod metadata;
pub mod multiscale;
pub mod omero;
pub mod plate;
pub mod settings;
pub mod util;
pub mod well;

pub use axis::{Axis, AxisKind, SpaceUnit, TimeUnit};
pub use coordinate_transformations::{parse_coordinate_transformation, CoordinateTransformation};
pub use error::{
    ArithmeticError,
    AxisError,
    DimensionError,
    LayoutError,
    StructureError,
    TransformationError,
    ValidationError,
};
pub use image::{parse_image, parse_image_with, Image};
pub use image_label::{parse_image_label, Color, ImageLabel, Source};
pub use metadata::{parse_attributes, NodeMetadata};
pub use multiscale::{parse_multiscale, parse_multiscale_with, Dataset, Multiscale};
pub use omero::{Channel, Omero, RDefs, Window};
pub use plate::{parse_plate, parse_plate_with, Column, Plate, Row};
pub use settings::ValidationSettings;
pub use well::{parse_well, Well};

//! Reads OME-NGFF images and plates from zarr hierarchies, validates their metadata, and maps
//! physical positions to pixel indices.

pub mod reader;
pub mod resolver;
pub mod settings;

pub use ome_ngff;
pub use ome_zarr;

pub use reader::{
    open_path,
    read_hierarchy,
    read_image,
    read_plate,
    validate_hierarchy,
    ImageDescription,
    PlateDescription,
    ReadError,
    WellDescription,
};
pub use resolver::{
    resolve_image_pixel_index,
    resolve_pixel_index,
    PhysicalResolution,
    PixelIndex,
    ResolutionLevel,
};
pub use settings::ReaderSettings;

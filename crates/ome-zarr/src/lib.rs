//! Zarr v2 hierarchies as consumed by OME-NGFF readers: array metadata, group and array handles,
//! and extraction of the attributes of a whole hierarchy.

pub mod hierarchy;
pub mod memory;
pub mod zarr_v2;

pub use hierarchy::{into_attributes, walk, ArrayHandle, Child, GroupHandle, HierarchyNode};
pub use memory::{MemoryArray, MemoryGroup, MemoryNode};
pub use zarr_v2::ArrayMetadata;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// https://zarr.readthedocs.io/en/stable/spec/v2.html#arrays

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Compressor {
    pub id: String,

    #[serde(flatten)]
    pub meta_data: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// “C” means row-major order, i.e., the last dimension varies fastest.
    #[default]
    C,

    /// “F” means column-major order, i.e., the first dimension varies fastest.
    F,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionSeparator {
    #[default]
    #[serde(rename = ".")]
    Dot,

    #[serde(rename = "/")]
    Slash,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,

    #[serde(flatten)]
    pub meta_data: Map<String, Value>,
}

fn zarr_v2() -> u32 {
    2
}

/// The `.zarray` document of an array.
///
/// Only `shape`, `chunks` and `dtype` are required here. Everything else falls back to the
/// defaults of the storage specification, since arrays are only inspected, never read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayMetadata {
    /// An integer defining the version of the storage specification to which the array store
    /// adheres.
    #[serde(default = "zarr_v2")]
    pub zarr_format: u32,

    /// A list of integers defining the length of each dimension of the array.
    pub shape: Vec<u64>,

    /// A list of integers defining the length of each dimension of a chunk of the array. Note
    /// that all chunks within a Zarr array have the same shape.
    pub chunks: Vec<u64>,

    // string or list, kept as is
    #[serde(rename = "dtype")]
    pub data_type: Value,

    /// The primary compression codec, or null if no compressor is used.
    #[serde(default)]
    pub compressor: Option<Compressor>,

    #[serde(default)]
    pub fill_value: Option<Value>,

    #[serde(default)]
    pub order: Order,

    #[serde(default)]
    pub filters: Option<Vec<Filter>>,

    #[serde(default)]
    pub dimension_separator: DimensionSeparator,
    // Other keys SHOULD NOT be present within the metadata object and SHOULD be ignored by
    // implementations.
}

impl ArrayMetadata {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of chunks along dimension `dimension`, i.e. `ceil(shape / chunks)`.
    /// Returns `None` if the dimension does not exist or has a chunk length of zero.
    pub fn chunk_count(&self, dimension: usize) -> Option<u64> {
        let shape = *self.shape.get(dimension)?;
        let chunks = *self.chunks.get(dimension)?;
        if chunks == 0 {
            None
        } else {
            Some((shape + chunks - 1) / chunks)
        }
    }
}

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AxisError {
    #[error("axis name \"{0}\" is not unique")]
    DuplicateName(String),

    #[error("required axis \"{0}\" is missing")]
    MissingRequiredAxis(String),

    #[error("no physical resolution given for axis \"{0}\"")]
    MissingResolution(String),

    #[error("invalid axes layout: {0}")]
    InvalidLayout(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransformationError {
    #[error("unknown coordinate transformation type \"{0}\", expected one of identity, translation or scale")]
    UnknownType(String),

    #[error("\"{0}\" transformation has an inconsistent \"{1}\" field")]
    FieldMismatch(String, String),

    #[error("\"{tag}\" vector must have at least 2 elements, got {len}")]
    VectorTooShort { tag: String, len: usize },

    #[error("expected the first coordinate transformation to be a scale")]
    ExpectedScale,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DimensionError {
    #[error("{axis_context}: vector length must match the number of axes (expected {expected}, got {got})")]
    VectorLengthMismatch {
        expected: usize,
        got: usize,
        axis_context: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("cycle detected at \"{0}\"")]
    CycleDetected(String),

    #[error("\"{0}\" must contain at least one entry")]
    EmptyRequiredList(String),

    #[error("\"{list}\" contains \"{key}\" more than once")]
    DuplicateEntry { list: String, key: String },

    #[error("length of \"{list}\" must be between {min} and {max}, got {got}")]
    LengthOutOfRange {
        list: String,
        min: usize,
        max: usize,
        got: usize,
    },

    #[error("member \"{0}\" could not be opened")]
    MissingMember(String),

    #[error("index {index} is out of range for \"{list}\" of length {len}")]
    IndexOutOfRange {
        list: String,
        index: usize,
        len: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("pixel size of axis \"{axis}\" is zero")]
    DivisionByZero { axis: String },

    #[error("pixel index of axis \"{axis}\" is not finite")]
    NonFinite { axis: String },

    #[error("pixel index of axis \"{axis}\" does not fit in a 64 bit integer")]
    Overflow { axis: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("\"{list}\" name \"{name}\" must only contain alphanumeric characters")]
    InvalidName { list: String, name: String },

    #[error("well \"{path}\": index {index} is out of range for \"{list}\" of length {len}")]
    WellIndexOutOfRange {
        path: String,
        list: String,
        index: usize,
        len: usize,
    },

    #[error("well path \"{path}\" does not match its row and column, expected \"{expected}\"")]
    WellPathMismatch { path: String, expected: String },

    #[error("well \"{path}\" has an image without an acquisition but the plate has multiple acquisitions")]
    MissingAcquisition { path: String },
}

/// Any error raised while constructing a validated model.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Axis(#[from] AxisError),

    #[error(transparent)]
    Transformation(#[from] TransformationError),

    #[error(transparent)]
    Dimension(#[from] DimensionError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

use thiserror::Error;

/// Reasons the output tensors of an engine cannot be decoded.
///
/// Every variant is terminal for the frame: no detection is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(
        "Unable to find output layers {missing:?}. Did you pass the right engine? \
         The output layer names are: {available:?}"
    )]
    LayerNotFound {
        missing: Vec<&'static str>,
        available: Vec<String>,
    },

    #[error(
        "Layer \"{layer}\" has {actual} dimensions, expected {expected}. \
         Did you pass in the correct model?"
    )]
    RankMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error(
        "The boxes tensor has a box size of {actual}, expected {expected}. \
         Did you pass in the correct model?"
    )]
    BoxSizeMismatch { expected: usize, actual: usize },

    #[error(
        "The classes tensor has {actual} classes, expected {expected}. \
         Check the configured class count!"
    )]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error(
        "The max number of detections in the boxes ({boxes}) and classes ({classes}) \
         tensors don't match! Did you pass in the correct model?"
    )]
    DetectionCountMismatch { boxes: usize, classes: usize },
}

/// Failures while describing an engine output buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("Tensor \"{name}\" has {rank} dimensions, at most {max} are supported")]
    TooManyDimensions {
        name: String,
        rank: usize,
        max: usize,
    },

    #[error("Tensor \"{name}\" needs {required} elements but its buffer holds {actual}")]
    BufferTooSmall {
        name: String,
        required: usize,
        actual: usize,
    },

    #[error("Tensor \"{name}\" dimensions overflow the addressable element count")]
    DimensionOverflow { name: String },

    #[error("Tensor \"{name}\" is not laid out contiguously in row-major order")]
    NonContiguous { name: String },
}

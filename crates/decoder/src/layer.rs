use crate::tensor::{DataType, TensorDescriptor};

/// Class-logit output: `[detections, classes]`, column 0 is background.
pub mod classes {
    use crate::tensor::DataType;

    pub const NAME: &str = "labels";
    pub const TYPE: DataType = DataType::Float;
    pub const NUM_DIMS: usize = 2;

    pub const DETECTIONS: usize = 0;
    pub const CLASSES: usize = 1;

    pub const BACKGROUND: usize = 0;
}

/// Box output: `[detections, 4]` in normalized cxcywh.
pub mod boxes {
    use crate::tensor::DataType;

    pub const NAME: &str = "dets";
    pub const TYPE: DataType = DataType::Float;
    pub const NUM_DIMS: usize = 2;

    pub const DETECTIONS: usize = 0;
    pub const BOXES: usize = 1;

    pub const CX: usize = 0;
    pub const CY: usize = 1;
    pub const W: usize = 2;
    pub const H: usize = 3;
    pub const SIZE: usize = 4;
}

/// First output whose name and element type both match.
pub fn find_layer<'t, 'a>(
    tensors: &'t [TensorDescriptor<'a>],
    name: &str,
    data_type: DataType,
) -> Option<&'t TensorDescriptor<'a>> {
    tensors
        .iter()
        .find(|tensor| tensor.data_type() == data_type && tensor.name() == name)
}

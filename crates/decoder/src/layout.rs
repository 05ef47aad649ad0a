use crate::errors::LayoutError;
use crate::layer::{boxes, classes};
use crate::tensor::{TensorDescriptor, TensorView};

/// Shape-checked views over the box and class outputs.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedLayout<'a> {
    pub boxes: TensorView<'a>,
    pub classes: TensorView<'a>,
    pub num_detections: usize,
    pub num_classes: usize,
}

/// Check that the located outputs agree with each other and with the
/// configured class count.
///
/// `tensors` is the full set of outputs the layers were searched in; it is
/// only used to describe what was available when a layer is missing.
pub fn validate_layout<'a>(
    box_tensor: Option<&TensorDescriptor<'a>>,
    class_tensor: Option<&TensorDescriptor<'a>>,
    num_classes_configured: usize,
    tensors: &[TensorDescriptor<'_>],
) -> Result<ValidatedLayout<'a>, LayoutError> {
    let box_view = box_tensor.and_then(|tensor| tensor.float_view());
    let class_view = class_tensor.and_then(|tensor| tensor.float_view());

    let (Some(box_tensor), Some(box_view), Some(class_tensor), Some(class_view)) =
        (box_tensor, box_view, class_tensor, class_view)
    else {
        let mut missing = Vec::with_capacity(2);
        if box_view.is_none() {
            missing.push(boxes::NAME);
        }
        if class_view.is_none() {
            missing.push(classes::NAME);
        }
        return Err(LayoutError::LayerNotFound {
            missing,
            available: tensors.iter().map(|t| t.name().to_string()).collect(),
        });
    };

    let box_dims = box_tensor.dims();
    let class_dims = class_tensor.dims();

    if box_dims.rank() != boxes::NUM_DIMS {
        return Err(LayoutError::RankMismatch {
            layer: boxes::NAME,
            expected: boxes::NUM_DIMS,
            actual: box_dims.rank(),
        });
    }
    if class_dims.rank() != classes::NUM_DIMS {
        return Err(LayoutError::RankMismatch {
            layer: classes::NAME,
            expected: classes::NUM_DIMS,
            actual: class_dims.rank(),
        });
    }

    // Ranks are checked above, every axis below exists.
    let num_detections_boxes = box_dims.get(boxes::DETECTIONS).unwrap_or(0);
    let num_box_params = box_dims.get(boxes::BOXES).unwrap_or(0);
    let num_detections_classes = class_dims.get(classes::DETECTIONS).unwrap_or(0);
    let num_classes = class_dims.get(classes::CLASSES).unwrap_or(0);

    if num_box_params != boxes::SIZE {
        return Err(LayoutError::BoxSizeMismatch {
            expected: boxes::SIZE,
            actual: num_box_params,
        });
    }

    if num_classes != num_classes_configured {
        return Err(LayoutError::ClassCountMismatch {
            expected: num_classes_configured,
            actual: num_classes,
        });
    }

    if num_detections_boxes != num_detections_classes {
        return Err(LayoutError::DetectionCountMismatch {
            boxes: num_detections_boxes,
            classes: num_detections_classes,
        });
    }

    Ok(ValidatedLayout {
        boxes: box_view,
        classes: class_view,
        num_detections: num_detections_boxes,
        num_classes,
    })
}

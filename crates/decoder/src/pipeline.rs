use serde::{Deserialize, Serialize};

use crate::bbox::{NetworkGeometry, decode_box};
use crate::confidence::evaluate;
use crate::errors::LayoutError;
use crate::layer::{boxes, classes, find_layer};
use crate::layout::validate_layout;
use crate::tensor::TensorDescriptor;
use crate::thresholds::ThresholdTable;

/// Accepted detection in network input pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Decodes RF-DETR style `dets`/`labels` outputs into detections.
///
/// Holds only the threshold table; one instance can serve any number of
/// frames and streams.
#[derive(Debug, Clone)]
pub struct DetectionDecoder {
    thresholds: ThresholdTable,
}

impl DetectionDecoder {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    /// Decode one frame.
    ///
    /// Fails without producing any detection when the outputs do not match
    /// the expected layout. Detections are returned in slot order.
    pub fn decode(
        &self,
        tensors: &[TensorDescriptor<'_>],
        network: NetworkGeometry,
    ) -> Result<Vec<Detection>, LayoutError> {
        decode_frame(tensors, network, self.thresholds.as_slice())
    }
}

/// One-shot form of [`DetectionDecoder::decode`] over a borrowed table.
pub fn decode(
    tensors: &[TensorDescriptor<'_>],
    network: NetworkGeometry,
    thresholds: &ThresholdTable,
) -> Result<Vec<Detection>, LayoutError> {
    decode_frame(tensors, network, thresholds.as_slice())
}

#[tracing::instrument(skip_all, fields(network = ?network, num_tensors = tensors.len()))]
fn decode_frame(
    tensors: &[TensorDescriptor<'_>],
    network: NetworkGeometry,
    thresholds: &[f32],
) -> Result<Vec<Detection>, LayoutError> {
    let box_tensor = find_layer(tensors, boxes::NAME, boxes::TYPE);
    let class_tensor = find_layer(tensors, classes::NAME, classes::TYPE);

    let layout = validate_layout(box_tensor, class_tensor, thresholds.len(), tensors)
        .inspect_err(|e| tracing::error!(error = %e, "Rejected output tensors"))?;

    // At most one detection per slot
    let mut detections = Vec::with_capacity(layout.num_detections);
    let mut exponentials = 0usize;

    for i in 0..layout.num_detections {
        let class_row = layout.classes.row(i, layout.num_classes);

        let evaluation = evaluate(class_row, thresholds);
        exponentials += evaluation.terms;

        let Some(best) = evaluation.score else {
            continue;
        };

        let pixel_box = decode_box(layout.boxes.fixed_row::<{ boxes::SIZE }>(i), network);
        detections.push(Detection {
            class_id: best.class_id as u32,
            confidence: best.confidence,
            left: pixel_box.left,
            top: pixel_box.top,
            width: pixel_box.width,
            height: pixel_box.height,
        });
    }

    tracing::debug!(
        slots = layout.num_detections,
        accepted = detections.len(),
        exponentials,
        "Decoded detections"
    );

    Ok(detections)
}

/// Per-class minimum softmax probability, indexed by class id.
///
/// The table length is the configured class count. The background entry
/// (index 0) is carried for alignment only and never consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    thresholds: Vec<f32>,
}

impl ThresholdTable {
    /// Same threshold for every class.
    pub fn uniform(num_classes: usize, threshold: f32) -> Self {
        Self {
            thresholds: vec![threshold; num_classes],
        }
    }

    pub fn from_vec(thresholds: Vec<f32>) -> Self {
        Self { thresholds }
    }

    /// Override the threshold of a single class. Ids past the table are ignored.
    pub fn with_class_threshold(mut self, class_id: usize, threshold: f32) -> Self {
        if let Some(slot) = self.thresholds.get_mut(class_id) {
            *slot = threshold;
        }
        self
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.thresholds
    }
}

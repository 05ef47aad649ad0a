//! Softmax threshold test for a single detection slot.
//!
//! The softmax probability of the best class `m` is
//! `p = 1 / (1 + Σ_{j≠m} exp(z_j - z_m))`, so `p >= thr` holds exactly when
//! `Σ_{j≠m} exp(z_j - z_m) <= 1/thr - 1`. The sum only grows, which lets the
//! test stop at the first partial sum above that limit without evaluating
//! the remaining exponentials.

use crate::layer::classes::BACKGROUND;

/// Best class of a slot and its softmax probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub class_id: usize,
    pub confidence: f32,
}

/// Neumaier compensated sum in `f64`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Index and value of the largest logit, first occurrence on ties.
#[inline]
fn argmax(logits: &[f32]) -> Option<(usize, f32)> {
    let (&first, rest) = logits.split_first()?;
    let mut best = (0, first);
    for (i, &logit) in rest.iter().enumerate() {
        if logit > best.1 {
            best = (i + 1, logit);
        }
    }
    Some(best)
}

/// Outcome of the test together with the number of exponentials evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Evaluation {
    pub score: Option<ClassScore>,
    pub terms: usize,
}

pub(crate) fn evaluate(logits: &[f32], thresholds: &[f32]) -> Evaluation {
    debug_assert_eq!(logits.len(), thresholds.len());

    let rejected = |terms| Evaluation { score: None, terms };

    let Some((max_idx, max_val)) = argmax(logits) else {
        return rejected(0);
    };

    if max_idx == BACKGROUND {
        return rejected(0);
    }

    let threshold = thresholds.get(max_idx).copied().unwrap_or(1.0);
    // `max` would turn a NaN threshold into EPSILON and accept everything.
    if threshold.is_nan() {
        return rejected(0);
    }
    let thr = f64::from(threshold).max(f64::EPSILON);
    let limit = 1.0 / thr - 1.0;

    let max_val = f64::from(max_val);
    let mut sum_exp_others = CompensatedSum::new();
    let mut terms = 0;

    for (i, &logit) in logits.iter().enumerate() {
        if i == max_idx {
            continue;
        }

        sum_exp_others.add((f64::from(logit) - max_val).exp());
        terms += 1;

        let partial = sum_exp_others.value();
        // NaN never compares greater; reject it here instead of emitting a NaN confidence.
        if partial > limit || partial.is_nan() {
            return rejected(terms);
        }
    }

    let p_max = 1.0 / (1.0 + sum_exp_others.value());

    Evaluation {
        score: Some(ClassScore {
            class_id: max_idx,
            confidence: p_max as f32,
        }),
        terms,
    }
}

/// Best non-background class of `logits` if its softmax probability reaches
/// the threshold configured for that class.
///
/// `thresholds` must be as long as `logits`. Thresholds at or below zero are
/// floored to `f64::EPSILON`; a NaN threshold rejects its class.
#[inline]
pub fn best_class(logits: &[f32], thresholds: &[f32]) -> Option<ClassScore> {
    evaluate(logits, thresholds).score
}

use std::cmp::Ordering;

use super::clip::ClipTensor;
use crate::core::error::DatasetError;

/// A gloss classifier such as I3D: one clip in, one logit per gloss out.
pub trait GlossClassifier: Send + Sync {
    fn num_classes(&self) -> usize;

    fn classify(&self, clip: &ClipTensor) -> Result<Vec<f32>, DatasetError>;
}

/// Indices of the `k` largest logits, best first. Ties keep the lower index
/// first; NaN logits rank last.
pub fn top_k(logits: &[f32], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..logits.len()).collect();
    order.sort_by(|&a, &b| compare_desc(logits[a], logits[b]).then(a.cmp(&b)));
    order.truncate(k);
    order
}

fn compare_desc(a: f32, b: f32) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

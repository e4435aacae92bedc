use ndarray::{Array2, ArrayView2, Axis};

use super::LossFn;
use crate::arch::activations::{log_softmax, softmax};

const EPSILON: f32 = 1e-7;

/// Categorical cross-entropy between one-hot (or probability) targets and predictions.
///
/// With `from_logits` the predictions are raw scores and a softmax is folded into the loss,
/// otherwise they are probabilities and get clipped to `[1e-7, 1 - 1e-7]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoricalCrossEntropy {
    from_logits: bool,
}

impl CategoricalCrossEntropy {
    pub fn new(from_logits: bool) -> Self {
        Self { from_logits }
    }

    pub fn from_logits(&self) -> bool {
        self.from_logits
    }
}

impl Default for CategoricalCrossEntropy {
    fn default() -> Self {
        Self::new(true)
    }
}

impl LossFn for CategoricalCrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let log_p = if self.from_logits {
            log_softmax(y_pred)
        } else {
            y_pred.mapv(|p| p.clamp(EPSILON, 1. - EPSILON).ln())
        };

        let rows = y_pred.nrows().max(1) as f32;
        -(&y * &log_p).sum() / rows
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let rows = y_pred.nrows().max(1) as f32;

        if self.from_logits {
            let mass = y.sum_axis(Axis(1)).insert_axis(Axis(1));
            return (softmax(y_pred) * &mass - &y) / rows;
        }

        let mut d = y.to_owned();
        d.zip_mut_with(&y_pred, |t, &p| {
            let p = p.clamp(EPSILON, 1. - EPSILON);
            *t = -*t / p / rows;
        });
        d
    }
}

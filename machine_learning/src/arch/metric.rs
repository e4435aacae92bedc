use ndarray::{ArrayView1, ArrayView2};

/// A quality measure reported alongside the loss while fitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Categorical accuracy: the row's highest prediction is the row's highest target.
    Accuracy,
}

impl Metric {
    /// The name this metric is recorded under in a `History`.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
        }
    }

    /// Scores every row of the batch and returns the sum of the scores, so that the caller can
    /// average over batches of different sizes.
    pub fn total(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        match self {
            Metric::Accuracy => {
                let hits = y_pred
                    .rows()
                    .into_iter()
                    .zip(y.rows())
                    .filter(|(p, t)| argmax(*p) == argmax(*t))
                    .count();

                hits as f32
            }
        }
    }

    /// Returns the metric averaged over the rows of the batch.
    pub fn compute(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        if y.nrows() == 0 {
            return 0.;
        }

        self.total(y_pred, y) / y.nrows() as f32
    }
}

// Ties resolve to the first maximum.
fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;

    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }

    best
}

use ndarray::{Array2, ArrayView2};

use super::History;
use crate::{Result, arch::Sequential};

/// The public interface every compiled model exposes to its callers.
pub trait Trainer: Send {
    /// Fits the model to the given data.
    ///
    /// # Arguments
    /// * `x` - The features, one sample per row.
    /// * `y` - The targets, one sample per row.
    /// * `epochs` - The amount of passes over the training rows.
    /// * `validation_split` - The fraction of trailing rows held out for validation.
    ///
    /// # Returns
    /// The per-epoch loss and metrics or an error if the data doesn't fit the model.
    fn fit(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        epochs: usize,
        validation_split: f32,
    ) -> Result<History>;

    /// Runs the model in inference mode.
    fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Returns the graph being trained.
    fn graph(&self) -> &Sequential;

    /// Consumes the trainer, keeping only its graph.
    fn into_graph(self: Box<Self>) -> Sequential;
}

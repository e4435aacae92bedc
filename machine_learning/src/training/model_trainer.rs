use std::num::NonZeroUsize;

use log::info;
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{History, Trainer};
use crate::{
    MlErr, Result,
    arch::{Metric, Sequential, loss::LossFn},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: Sequential,
    optimizers: Vec<O>,
    loss_fn: L,
    metrics: Vec<Metric>,

    batch_size: NonZeroUsize,
    shuffle: bool,
    rng: R,
}

impl<O, L, R> ModelTrainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizers` - One optimizer per trainable tensor, see `Sequential::param_sizes`.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `metrics` - The metrics recorded next to the loss.
    /// * `batch_size` - The maximum amount of rows per optimizer step.
    /// * `shuffle` - Whether to shuffle the training rows before every epoch.
    /// * `rng` - A random number generator, used for shuffling and dropout.
    pub fn new(
        model: Sequential,
        optimizers: Vec<O>,
        loss_fn: L,
        metrics: Vec<Metric>,
        batch_size: NonZeroUsize,
        shuffle: bool,
        rng: R,
    ) -> Self {
        Self {
            model,
            optimizers,
            loss_fn,
            metrics,
            batch_size,
            shuffle,
            rng,
        }
    }

    fn check_widths(&self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.model.input_width() {
            return Err(MlErr::SizeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: self.model.input_width(),
            });
        }

        if y.ncols() != self.model.output_width() {
            return Err(MlErr::SizeMismatch {
                what: "target features",
                got: y.ncols(),
                expected: self.model.output_width(),
            });
        }

        Ok(())
    }

    // NOTE: the epoch loss and metrics are running averages over the batches, weighted by the
    // amount of rows in each, so they reflect the parameters as they changed during the epoch.
    fn run_epoch(&mut self, train: &mut Dataset) -> Result<(f32, Vec<f32>)> {
        if self.shuffle {
            train.shuffle(&mut self.rng);
        }

        let mut loss_total = 0.;
        let mut metric_totals = vec![0.; self.metrics.len()];

        for (x, y) in train.batches(self.batch_size) {
            let y_pred = self.model.forward(x, &mut self.rng)?;

            loss_total += self.loss_fn.loss(y_pred.view(), y) * x.nrows() as f32;
            for (total, metric) in metric_totals.iter_mut().zip(&self.metrics) {
                *total += metric.total(y_pred.view(), y);
            }

            let d = self.loss_fn.loss_prime(y_pred.view(), y);
            self.model.backward(d);
            self.model.optimize(&mut self.optimizers)?;
        }

        let rows = train.len() as f32;
        let metric_values = metric_totals.into_iter().map(|t| t / rows).collect();
        Ok((loss_total / rows, metric_values))
    }

    fn evaluate(&self, dataset: &Dataset) -> Result<(f32, Vec<f32>)> {
        let y_pred = self.model.infer(dataset.x())?;
        let loss = self.loss_fn.loss(y_pred.view(), dataset.y());

        let metric_values = self
            .metrics
            .iter()
            .map(|metric| metric.compute(y_pred.view(), dataset.y()))
            .collect();

        Ok((loss, metric_values))
    }
}

impl<O, L, R> Trainer for ModelTrainer<O, L, R>
where
    O: Optimizer + Send,
    L: LossFn + Send,
    R: Rng + Send,
{
    fn fit(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        epochs: usize,
        validation_split: f32,
    ) -> Result<History> {
        self.check_widths(x, y)?;

        let dataset = Dataset::new(x.to_owned(), y.to_owned())?;
        let (mut train, validation) = dataset.split_validation(validation_split)?;
        let mut history = History::new();

        info!(
            "fitting on {} rows, validating on {}",
            train.len(),
            validation.as_ref().map(Dataset::len).unwrap_or_default()
        );

        for epoch in 1..=epochs {
            let (loss, metric_values) = self.run_epoch(&mut train)?;

            if !loss.is_finite() {
                return Err(MlErr::NonFiniteLoss { epoch });
            }

            history.push("loss", loss);
            for (metric, value) in self.metrics.iter().zip(&metric_values) {
                history.push(metric.name(), *value);
            }

            let mut summary = format!("epoch {epoch}/{epochs}: loss={loss:.4}");
            for (metric, value) in self.metrics.iter().zip(&metric_values) {
                summary += &format!(" {}={value:.4}", metric.name());
            }

            if let Some(validation) = &validation {
                let (val_loss, val_metric_values) = self.evaluate(validation)?;

                history.push("val_loss", val_loss);
                summary += &format!(" val_loss={val_loss:.4}");

                for (metric, value) in self.metrics.iter().zip(val_metric_values) {
                    history.push(&format!("val_{}", metric.name()), value);
                    summary += &format!(" val_{}={value:.4}", metric.name());
                }
            }

            info!("{summary}");
        }

        Ok(history)
    }

    fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.model.infer(x)
    }

    fn graph(&self) -> &Sequential {
        &self.model
    }

    fn into_graph(self: Box<Self>) -> Sequential {
        self.model
    }
}

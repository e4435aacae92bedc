use std::num::NonZeroUsize;

use machine_learning::arch::Metric;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizerConfig {
    GradientDescent { lr: f32 },
    GradientDescentWithMomentum { lr: f32, mu: f32 },
    Adam { lr: f32, b1: f32, b2: f32, eps: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossFnConfig {
    Mse,
    CategoricalCrossEntropy { from_logits: bool },
}

/// How a parameter tensor without injected values is initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamGenConfig {
    Zeros,
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    /// Glorot uniform, bounded by `sqrt(6 / (fan_in + fan_out))`.
    XavierUniform,
    LecunUniform,
    Normal { mean: f32, std_dev: f32 },
    /// He normal.
    Kaiming,
}

/// Everything the graph builder needs besides the layers themselves.
///
/// The default matches a plain classifier: stochastic gradient descent with a learning rate of
/// `0.001`, categorical cross-entropy on logits and accuracy as the only metric.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    pub optimizer: OptimizerConfig,
    pub loss_fn: LossFnConfig,
    pub metrics: Vec<Metric>,
    pub kernel_init: ParamGenConfig,
    pub bias_init: ParamGenConfig,
    pub batch_size: NonZeroUsize,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl TrainingConfig {
    pub fn with_optimizer(self, optimizer: OptimizerConfig) -> Self {
        Self { optimizer, ..self }
    }

    pub fn with_loss_fn(self, loss_fn: LossFnConfig) -> Self {
        Self { loss_fn, ..self }
    }

    pub fn with_seed(self, seed: Option<u64>) -> Self {
        Self { seed, ..self }
    }

    pub fn with_batch_size(self, batch_size: NonZeroUsize) -> Self {
        Self { batch_size, ..self }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::GradientDescent { lr: 0.001 },
            loss_fn: LossFnConfig::CategoricalCrossEntropy { from_logits: true },
            metrics: vec![Metric::Accuracy],
            kernel_init: ParamGenConfig::XavierUniform,
            bias_init: ParamGenConfig::Zeros,
            batch_size: NonZeroUsize::new(32).unwrap_or(NonZeroUsize::MIN),
            shuffle: true,
            seed: None,
        }
    }
}

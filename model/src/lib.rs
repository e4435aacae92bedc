//! Dense models kept as immutable layer configurations.
//!
//! A `ModelWrapper` compiles its configurations into a graph of the `machine_learning` engine
//! on demand. Training fits a fresh graph and reads the fitted weights back into new
//! configurations, so every trained model is a new wrapper.

pub mod activation;
pub mod builder;
pub mod config;
pub mod error;
pub mod initializer;
pub mod layer;
pub mod wrapper;

pub use activation::{Activation, ActivationResolver};
pub use builder::ModelGraphBuilder;
pub use config::{LossFnConfig, OptimizerConfig, ParamGenConfig, TrainingConfig};
pub use error::{ModelErr, Result};
pub use initializer::WeightInitializer;
pub use layer::{HiddenLayerConfig, InputLayerConfig, LayerConfig, OutputLayerConfig};
pub use machine_learning::arch::Metric;
pub use wrapper::{ModelWrapper, ModelWrapperBuilder, TrainOptions};

mod hidden;
mod input;
mod output;

use std::sync::Arc;

use machine_learning::{
    Result as MlResult,
    arch::{Sequential, layers::Dense},
};

pub use hidden::HiddenLayerConfig;
pub use input::InputLayerConfig;
pub use output::OutputLayerConfig;

use crate::{activation::Activation, initializer::Initializers};

/// Any of the layer configurations a model is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerConfig {
    Input(InputLayerConfig),
    Hidden(HiddenLayerConfig),
    Output(OutputLayerConfig),
}

impl LayerConfig {
    /// Returns the width of the values this layer outputs.
    pub fn width(&self) -> usize {
        match self {
            LayerConfig::Input(l) => l.input_count(),
            LayerConfig::Hidden(l) => l.neuron_count(),
            LayerConfig::Output(l) => l.output_count(),
        }
    }

    /// Appends this layer's nodes to the graph built so far. An input layer starts a new graph
    /// whatever `previous` is.
    pub fn to_node(
        &self,
        previous: Option<Sequential>,
        initializers: &Initializers,
    ) -> MlResult<Option<Sequential>> {
        match self {
            LayerConfig::Input(l) => l.to_node().map(Some),
            LayerConfig::Hidden(l) => l.to_node(previous, initializers),
            LayerConfig::Output(l) => l.to_node(previous, initializers),
        }
    }
}

impl From<InputLayerConfig> for LayerConfig {
    fn from(value: InputLayerConfig) -> Self {
        Self::Input(value)
    }
}

impl From<HiddenLayerConfig> for LayerConfig {
    fn from(value: HiddenLayerConfig) -> Self {
        Self::Hidden(value)
    }
}

impl From<OutputLayerConfig> for LayerConfig {
    fn from(value: OutputLayerConfig) -> Self {
        Self::Output(value)
    }
}

fn dense_node(
    dim: (usize, usize),
    activation: Activation,
    kernels: Option<&Arc<[f32]>>,
    bias: Option<&Arc<[f32]>>,
    initializers: &Initializers,
) -> MlResult<Dense> {
    let mut kernel_gen = initializers.kernel(kernels, dim)?;
    let mut bias_gen = initializers.bias(bias, dim)?;

    Dense::new(
        dim,
        activation.act_fn(),
        kernel_gen.as_mut(),
        bias_gen.as_mut(),
    )
}

fn kernel_values(dense: &Dense) -> Arc<[f32]> {
    dense.weights().iter().copied().collect()
}

fn bias_values(dense: &Dense) -> Arc<[f32]> {
    dense.biases().iter().copied().collect()
}

use std::sync::Arc;

use machine_learning::{
    Result as MlResult,
    arch::{Sequential, layers::Dense},
};

use super::{bias_values, dense_node, kernel_values};
use crate::{
    ModelErr, Result,
    activation::{Activation, ActivationResolver},
    initializer::Initializers,
};

/// A fully connected hidden layer, optionally followed by dropout.
#[derive(Clone, Debug, PartialEq)]
pub struct HiddenLayerConfig {
    neuron_count: usize,
    activation_name: Option<Arc<str>>,
    dropout_rate: Option<f32>,
    kernels: Option<Arc<[f32]>>,
    bias: Option<Arc<[f32]>>,
}

impl HiddenLayerConfig {
    /// Creates a new `HiddenLayerConfig` with a linear activation, no dropout and engine
    /// initialized weights.
    ///
    /// # Returns
    /// A configuration error if `neuron_count` is zero.
    pub fn new(neuron_count: usize) -> Result<Self> {
        if neuron_count < 1 {
            return Err(ModelErr::configuration(
                "the neuron count of a hidden layer must be at least 1",
            ));
        }

        Ok(Self {
            neuron_count,
            activation_name: None,
            dropout_rate: None,
            kernels: None,
            bias: None,
        })
    }

    pub fn with_activation(self, name: impl Into<Arc<str>>) -> Self {
        Self {
            activation_name: Some(name.into()),
            ..self
        }
    }

    /// Returns a copy followed by a dropout of the given rate.
    ///
    /// # Returns
    /// A configuration error if `rate` is not in `[0, 1)`.
    pub fn with_dropout(self, rate: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&rate) {
            return Err(ModelErr::configuration(format!(
                "the dropout rate must be in [0, 1), got {rate}"
            )));
        }

        Ok(Self {
            dropout_rate: Some(rate),
            ..self
        })
    }

    /// Returns a copy whose weight matrix starts at `kernels`, `previous width * neuron count`
    /// values laid out one input unit after the other.
    pub fn with_kernels(self, kernels: impl Into<Arc<[f32]>>) -> Self {
        Self {
            kernels: Some(kernels.into()),
            ..self
        }
    }

    pub fn with_bias(self, bias: impl Into<Arc<[f32]>>) -> Self {
        Self {
            bias: Some(bias.into()),
            ..self
        }
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    pub fn activation_name(&self) -> Option<&str> {
        self.activation_name.as_deref()
    }

    pub fn dropout_rate(&self) -> Option<f32> {
        self.dropout_rate
    }

    pub fn kernels(&self) -> Option<&[f32]> {
        self.kernels.as_deref()
    }

    pub fn bias(&self) -> Option<&[f32]> {
        self.bias.as_deref()
    }

    /// Returns the activation the name resolves to.
    pub fn activation(&self) -> Activation {
        ActivationResolver::new().hidden(self.activation_name())
    }

    /// Appends a dense node, and a dropout node if requested, to the graph.
    ///
    /// # Arguments
    /// * `previous` - The graph built so far, if any.
    /// * `initializers` - The source of the parameters that were not injected.
    ///
    /// # Returns
    /// `None` when there was no graph to extend, or an error if the injected weights don't fit.
    pub fn to_node(
        &self,
        previous: Option<Sequential>,
        initializers: &Initializers,
    ) -> MlResult<Option<Sequential>> {
        let Some(mut graph) = previous else {
            return Ok(None);
        };

        let dim = (graph.output_width(), self.neuron_count);
        let dense = dense_node(
            dim,
            self.activation(),
            self.kernels.as_ref(),
            self.bias.as_ref(),
            initializers,
        )?;
        graph.push_dense(dense)?;

        if let Some(rate) = self.dropout_rate {
            graph.push_dropout(rate)?;
        }

        Ok(Some(graph))
    }

    /// Rebuilds a configuration from a fitted dense node, keeping the requested activation name
    /// and dropout rate.
    pub(crate) fn from_dense(
        dense: &Dense,
        activation_name: Option<Arc<str>>,
        dropout_rate: Option<f32>,
    ) -> Self {
        Self {
            neuron_count: dense.dim().1,
            activation_name,
            dropout_rate,
            kernels: Some(kernel_values(dense)),
            bias: Some(bias_values(dense)),
        }
    }

    pub(crate) fn activation_name_arc(&self) -> Option<Arc<str>> {
        self.activation_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TrainingConfig, layer::InputLayerConfig};
    use machine_learning::{MlErr, arch::layers::Layer};

    fn initializers() -> Initializers {
        Initializers::new(&TrainingConfig::default().with_seed(Some(1)))
    }

    #[test]
    fn zero_neurons_is_a_configuration_error() {
        assert!(matches!(
            HiddenLayerConfig::new(0),
            Err(ModelErr::Configuration(_))
        ));
    }

    #[test]
    fn dropout_rate_must_be_a_fraction() {
        let config = HiddenLayerConfig::new(2).unwrap();

        assert!(config.clone().with_dropout(1.).is_err());
        assert!(config.clone().with_dropout(-0.2).is_err());
        assert_eq!(config.with_dropout(0.3).unwrap().dropout_rate(), Some(0.3));
    }

    #[test]
    fn absent_previous_builds_nothing() {
        let config = HiddenLayerConfig::new(3).unwrap();
        assert!(config.to_node(None, &initializers()).unwrap().is_none());
    }

    #[test]
    fn appends_dense_then_dropout() {
        let input = InputLayerConfig::new(2).unwrap().to_node().unwrap();
        let config = HiddenLayerConfig::new(3)
            .unwrap()
            .with_activation("ReLU")
            .with_dropout(0.5)
            .unwrap();

        let graph = config.to_node(Some(input), &initializers()).unwrap().unwrap();
        let layers = graph.layers();

        assert_eq!(layers.len(), 3);
        let Layer::Dense(dense) = &layers[1] else {
            panic!("expected a dense node, got {}", layers[1].name());
        };
        assert_eq!(dense.dim(), (2, 3));
        assert_eq!(dense.act_fn().name(), "relu");
        assert!(matches!(&layers[2], Layer::Dropout(d) if d.rate() == 0.5));
    }

    #[test]
    fn injected_weights_are_used() {
        let input = InputLayerConfig::new(2).unwrap().to_node().unwrap();
        let config = HiddenLayerConfig::new(2)
            .unwrap()
            .with_kernels(vec![1f32, 2., 3., 4.])
            .with_bias(vec![0.5f32, -0.5]);

        let graph = config.to_node(Some(input), &initializers()).unwrap().unwrap();
        let dense = graph.dense_layers().next().unwrap();

        assert_eq!(dense.weights().iter().copied().collect::<Vec<_>>(), vec![1., 2., 3., 4.]);
        assert_eq!(dense.biases().to_vec(), vec![0.5, -0.5]);
    }

    #[test]
    fn wrong_kernel_size_is_reported() {
        let input = InputLayerConfig::new(2).unwrap().to_node().unwrap();
        let config = HiddenLayerConfig::new(2).unwrap().with_kernels(vec![1f32, 2., 3.]);

        let err = config.to_node(Some(input), &initializers()).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "kernel",
                got: 3,
                expected: 4
            }
        );
    }
}

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

/// The last, fully connected layer of a model.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputLayerConfig {
    output_count: usize,
    activation_name: Option<Arc<str>>,
    kernels: Option<Arc<[f32]>>,
    bias: Option<Arc<[f32]>>,
}

impl OutputLayerConfig {
    /// Creates a new `OutputLayerConfig` with a softmax activation and engine initialized
    /// weights.
    ///
    /// # Returns
    /// A configuration error if `output_count` is zero.
    pub fn new(output_count: usize) -> Result<Self> {
        if output_count < 1 {
            return Err(ModelErr::configuration(
                "the output count must be at least 1",
            ));
        }

        Ok(Self {
            output_count,
            activation_name: None,
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

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn activation_name(&self) -> Option<&str> {
        self.activation_name.as_deref()
    }

    pub fn kernels(&self) -> Option<&[f32]> {
        self.kernels.as_deref()
    }

    pub fn bias(&self) -> Option<&[f32]> {
        self.bias.as_deref()
    }

    pub fn activation(&self) -> Activation {
        ActivationResolver::new().output(self.activation_name())
    }

    /// Appends the output dense node to the graph.
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

        let dim = (graph.output_width(), self.output_count);
        let dense = dense_node(
            dim,
            self.activation(),
            self.kernels.as_ref(),
            self.bias.as_ref(),
            initializers,
        )?;
        graph.push_dense(dense)?;

        Ok(Some(graph))
    }

    /// Rebuilds a configuration from a fitted dense node. The activation name is not carried
    /// over, so the rebuilt layer resolves to the default activation.
    pub(crate) fn from_dense(dense: &Dense) -> Self {
        Self {
            output_count: dense.dim().1,
            activation_name: None,
            kernels: Some(kernel_values(dense)),
            bias: Some(bias_values(dense)),
        }
    }
}

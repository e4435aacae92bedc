use machine_learning::{Result as MlResult, arch::Sequential};

use crate::{ModelErr, Result};

/// The width of the samples a model is fed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputLayerConfig {
    input_count: usize,
}

impl InputLayerConfig {
    /// Creates a new `InputLayerConfig`.
    ///
    /// # Returns
    /// A configuration error if `input_count` is zero.
    pub fn new(input_count: usize) -> Result<Self> {
        if input_count < 1 {
            return Err(ModelErr::configuration(
                "the input count must be at least 1",
            ));
        }

        Ok(Self { input_count })
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Starts a graph with the input placeholder node.
    pub fn to_node(&self) -> MlResult<Sequential> {
        Sequential::new(self.input_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_inputs_is_a_configuration_error() {
        assert!(matches!(
            InputLayerConfig::new(0),
            Err(ModelErr::Configuration(_))
        ));
    }

    #[test]
    fn node_has_the_input_width() {
        let graph = InputLayerConfig::new(4).unwrap().to_node().unwrap();

        assert_eq!(graph.input_width(), 4);
        assert_eq!(graph.output_width(), 4);
    }
}

use std::iter;

use log::debug;
use machine_learning::{
    arch::{
        Sequential,
        loss::{CategoricalCrossEntropy, LossFn, Mse},
    },
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer},
    training::{ModelTrainer, Trainer},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    ModelErr, Result,
    config::{LossFnConfig, OptimizerConfig, TrainingConfig},
    initializer::Initializers,
    layer::{HiddenLayerConfig, InputLayerConfig, LayerConfig, OutputLayerConfig},
};

/// Builds trainable graphs out of layer configurations.
#[derive(Clone, Debug, Default)]
pub struct ModelGraphBuilder {
    config: TrainingConfig,
}

impl ModelGraphBuilder {
    /// Creates a new `ModelGraphBuilder`.
    ///
    /// # Arguments
    /// * `config` - The optimizer, loss, metrics and initialization of the graphs to build.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Builds the graph `input -> hidden* -> output`.
    ///
    /// # Returns
    /// The graph or a shape mismatch naming the first layer (input being layer 0) whose
    /// injected weights don't fit.
    pub fn build_graph(
        &self,
        input: &InputLayerConfig,
        output: &OutputLayerConfig,
        hidden: &[HiddenLayerConfig],
    ) -> Result<Sequential> {
        let initializers = Initializers::new(&self.config);

        let layers = iter::once(LayerConfig::from(*input))
            .chain(hidden.iter().cloned().map(LayerConfig::from))
            .chain(iter::once(LayerConfig::from(output.clone())));

        let graph = layers
            .enumerate()
            .try_fold(None, |graph, (i, layer)| {
                layer
                    .to_node(graph, &initializers)
                    .map_err(|e| ModelErr::at_layer(i, e))
            })?;

        graph.ok_or_else(|| ModelErr::configuration("the graph has no input node"))
    }

    /// Builds the graph and compiles it with the configured optimizer, loss and metrics.
    pub fn build(
        &self,
        input: &InputLayerConfig,
        output: &OutputLayerConfig,
        hidden: &[HiddenLayerConfig],
    ) -> Result<Box<dyn Trainer>> {
        let graph = self.build_graph(input, output, hidden)?;
        debug!(
            "built a graph of {} nodes and {} parameters",
            graph.layers().len(),
            graph.size()
        );

        Ok(self.resolve_optimizer(graph))
    }

    fn resolve_optimizer(&self, graph: Sequential) -> Box<dyn Trainer> {
        let sizes = graph.param_sizes();

        match self.config.optimizer {
            OptimizerConfig::GradientDescent { lr } => {
                let optimizers = sizes.iter().map(|_| GradientDescent::new(lr)).collect();
                self.resolve_loss(graph, optimizers)
            }
            OptimizerConfig::GradientDescentWithMomentum { lr, mu } => {
                let optimizers = sizes
                    .iter()
                    .map(|&len| GradientDescentWithMomentum::new(len, lr, mu))
                    .collect();
                self.resolve_loss(graph, optimizers)
            }
            OptimizerConfig::Adam { lr, b1, b2, eps } => {
                let optimizers = sizes
                    .iter()
                    .map(|&len| Adam::new(len, lr, b1, b2, eps))
                    .collect();
                self.resolve_loss(graph, optimizers)
            }
        }
    }

    fn resolve_loss<O>(&self, graph: Sequential, optimizers: Vec<O>) -> Box<dyn Trainer>
    where
        O: Optimizer + Send + 'static,
    {
        match self.config.loss_fn {
            LossFnConfig::Mse => self.terminate_build(graph, optimizers, Mse::new()),
            LossFnConfig::CategoricalCrossEntropy { from_logits } => {
                let loss_fn = CategoricalCrossEntropy::new(from_logits);
                self.terminate_build(graph, optimizers, loss_fn)
            }
        }
    }

    fn terminate_build<O, L>(
        &self,
        graph: Sequential,
        optimizers: Vec<O>,
        loss_fn: L,
    ) -> Box<dyn Trainer>
    where
        O: Optimizer + Send + 'static,
        L: LossFn + Send + 'static,
    {
        let trainer = ModelTrainer::new(
            graph,
            optimizers,
            loss_fn,
            self.config.metrics.clone(),
            self.config.batch_size,
            self.config.shuffle,
            self.generate_rng(self.config.seed),
        );

        Box::new(trainer)
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn layers() -> (InputLayerConfig, OutputLayerConfig, Vec<HiddenLayerConfig>) {
        let input = InputLayerConfig::new(2).unwrap();
        let output = OutputLayerConfig::new(3).unwrap();
        let hidden = vec![
            HiddenLayerConfig::new(4).unwrap().with_activation("ReLU"),
            HiddenLayerConfig::new(5)
                .unwrap()
                .with_activation("Tanh")
                .with_dropout(0.1)
                .unwrap(),
        ];

        (input, output, hidden)
    }

    #[test]
    fn nodes_follow_the_configs() {
        let (input, output, hidden) = layers();
        let graph = ModelGraphBuilder::default()
            .build_graph(&input, &output, &hidden)
            .unwrap();

        let names: Vec<_> = graph.layers().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["input", "dense", "dense", "dropout", "dense"]);

        let dims: Vec<_> = graph.dense_layers().map(|d| d.dim()).collect();
        assert_eq!(dims, vec![(2, 4), (4, 5), (5, 3)]);
    }

    #[test]
    fn output_is_fed_by_the_input_without_hidden_layers() {
        let (input, output, _) = layers();
        let graph = ModelGraphBuilder::default()
            .build_graph(&input, &output, &[])
            .unwrap();

        assert_eq!(graph.dense_layers().map(|d| d.dim()).collect::<Vec<_>>(), vec![(2, 3)]);
    }

    #[test]
    fn shape_mismatches_name_the_layer() {
        let (input, output, mut hidden) = layers();
        hidden[1] = hidden[1].clone().with_bias(vec![0f32; 4]);

        let err = ModelGraphBuilder::default()
            .build_graph(&input, &output, &hidden)
            .unwrap_err();

        assert_eq!(
            err,
            ModelErr::ShapeMismatch {
                layer: 2,
                what: "bias",
                got: 4,
                expected: 5
            }
        );
    }

    #[test]
    fn output_mismatches_are_reported_too() {
        let (input, output, hidden) = layers();
        let output = output.with_kernels(vec![0f32; 2]);

        let err = ModelGraphBuilder::default()
            .build_graph(&input, &output, &hidden)
            .unwrap_err();

        assert!(matches!(
            err,
            ModelErr::ShapeMismatch {
                layer: 3,
                what: "kernel",
                ..
            }
        ));
    }

    #[test]
    fn every_optimizer_and_loss_compiles() {
        let (input, output, hidden) = layers();
        let x = array![[0., 1.], [1., 0.], [1., 1.], [0., 0.]];
        let y = array![[1., 0., 0.], [0., 1., 0.], [0., 0., 1.], [1., 0., 0.]];

        let optimizers = [
            OptimizerConfig::GradientDescent { lr: 0.01 },
            OptimizerConfig::GradientDescentWithMomentum { lr: 0.01, mu: 0.9 },
            OptimizerConfig::Adam {
                lr: 0.01,
                b1: 0.9,
                b2: 0.999,
                eps: 1e-7,
            },
        ];
        let losses = [
            LossFnConfig::Mse,
            LossFnConfig::CategoricalCrossEntropy { from_logits: false },
        ];

        for optimizer in optimizers {
            for loss_fn in losses {
                let config = TrainingConfig::default()
                    .with_optimizer(optimizer)
                    .with_loss_fn(loss_fn)
                    .with_seed(Some(0));

                let mut trainer = ModelGraphBuilder::new(config)
                    .build(&input, &output, &hidden)
                    .unwrap();
                let history = trainer.fit(x.view(), y.view(), 2, 0.).unwrap();

                assert_eq!(history.epochs(), 2);
                assert!(history.last("accuracy").is_some());
            }
        }
    }
}

use log::info;
use machine_learning::arch::{Sequential, layers::Layer};
use ndarray::{ArrayView2, Axis, aview1};

use crate::{
    ModelErr, Result,
    builder::ModelGraphBuilder,
    config::TrainingConfig,
    layer::{HiddenLayerConfig, InputLayerConfig, OutputLayerConfig},
};

/// How a `ModelWrapper::train` call fits its fresh graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainOptions {
    /// Passes over the training rows, at least one pass is always made.
    pub epochs: usize,
    /// Fraction of trailing rows held out for validation.
    pub validation_split: f32,
}

impl TrainOptions {
    pub fn new(epochs: usize, validation_split: f32) -> Self {
        Self {
            epochs,
            validation_split,
        }
    }
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self::new(1, 0.25)
    }
}

/// A dense model described only by its layer configurations.
///
/// A wrapper never changes once built: training produces a new wrapper whose configurations
/// carry the fitted weights, and leaves the receiver untouched.
#[derive(Clone, Debug)]
pub struct ModelWrapper {
    input: InputLayerConfig,
    output: OutputLayerConfig,
    hidden: Vec<HiddenLayerConfig>,
    accuracy: Option<f32>,
    config: TrainingConfig,
    graph: Sequential,
}

impl ModelWrapper {
    /// Creates a new `ModelWrapper` compiled with the default `TrainingConfig`.
    ///
    /// # Arguments
    /// * `input` - The input layer.
    /// * `output` - The output layer.
    /// * `hidden` - The hidden layers, in the order the data flows through them.
    /// * `accuracy` - The accuracy the configurations are known to reach, if any.
    ///
    /// # Returns
    /// A new wrapper or a shape mismatch if some injected weights don't fit their layer.
    pub fn new<I>(
        input: InputLayerConfig,
        output: OutputLayerConfig,
        hidden: I,
        accuracy: Option<f32>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = HiddenLayerConfig>,
    {
        Self::compile(
            input,
            output,
            hidden.into_iter().collect(),
            accuracy,
            TrainingConfig::default(),
        )
    }

    /// Creates a new `ModelWrapper` out of plain hyperparameters.
    ///
    /// # Arguments
    /// * `input_count` - The width of every sample.
    /// * `output_count` - The width of every prediction.
    /// * `output_activation` - The name of the output activation, softmax if absent or unknown.
    /// * `hidden` - The hidden layers.
    ///
    /// # Returns
    /// A configuration error if a count is zero.
    pub fn construct<I>(
        input_count: usize,
        output_count: usize,
        output_activation: Option<&str>,
        hidden: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = HiddenLayerConfig>,
    {
        let input = InputLayerConfig::new(input_count)?;
        let mut output = OutputLayerConfig::new(output_count)?;

        if let Some(name) = output_activation {
            output = output.with_activation(name);
        }

        Self::new(input, output, hidden, None)
    }

    pub fn builder() -> ModelWrapperBuilder {
        ModelWrapperBuilder::default()
    }

    /// Returns a copy of this wrapper that builds and trains its graphs with `config`.
    pub fn with_config(&self, config: TrainingConfig) -> Result<Self> {
        Self::compile(
            self.input,
            self.output.clone(),
            self.hidden.clone(),
            self.accuracy,
            config,
        )
    }

    fn compile(
        input: InputLayerConfig,
        output: OutputLayerConfig,
        hidden: Vec<HiddenLayerConfig>,
        accuracy: Option<f32>,
        config: TrainingConfig,
    ) -> Result<Self> {
        let builder = ModelGraphBuilder::new(config.clone());
        let graph = builder.build_graph(&input, &output, &hidden)?;

        Ok(Self {
            input,
            output,
            hidden,
            accuracy,
            config,
            graph,
        })
    }

    pub fn input_config(&self) -> &InputLayerConfig {
        &self.input
    }

    pub fn output_config(&self) -> &OutputLayerConfig {
        &self.output
    }

    pub fn hidden_configs(&self) -> &[HiddenLayerConfig] {
        &self.hidden
    }

    pub fn accuracy(&self) -> Option<f32> {
        self.accuracy
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Trains a fresh graph built from the current configurations.
    ///
    /// # Arguments
    /// * `inputs` - The features, one sample per row.
    /// * `outputs` - The expected outputs, one sample per row.
    /// * `options` - The epochs and validation split of the fit.
    ///
    /// # Returns
    /// A new wrapper holding the fitted weights and the final accuracy, or the error that
    /// stopped the fit.
    pub fn train(
        &self,
        inputs: ArrayView2<f32>,
        outputs: ArrayView2<f32>,
        options: TrainOptions,
    ) -> Result<Self> {
        let epochs = options.epochs.max(1);
        info!(
            "training on {} rows for {epochs} epoch(s), holding out {}",
            inputs.nrows(),
            options.validation_split
        );

        let builder = ModelGraphBuilder::new(self.config.clone());
        let mut trainer = builder.build(&self.input, &self.output, &self.hidden)?;
        let history = trainer.fit(inputs, outputs, epochs, options.validation_split)?;
        let accuracy = history.last("accuracy");

        let graph = trainer.into_graph();
        let (input, output, hidden) = self.extract(&graph)?;
        info!("training finished, accuracy: {accuracy:?}");

        Self::compile(input, output, hidden, accuracy, self.config.clone())
    }

    // Every dense node becomes a hidden layer until there are as many as before, the last one
    // always becomes the output layer.
    fn extract(
        &self,
        graph: &Sequential,
    ) -> Result<(InputLayerConfig, OutputLayerConfig, Vec<HiddenLayerConfig>)> {
        let mut input = None;
        let mut output = None;
        let mut hidden = Vec::with_capacity(self.hidden.len());

        for layer in graph.layers() {
            match layer {
                Layer::Input(node) => input = Some(InputLayerConfig::new(node.width())?),
                Layer::Dense(dense) => {
                    if let Some(original) = self.hidden.get(hidden.len()) {
                        hidden.push(HiddenLayerConfig::from_dense(
                            dense,
                            original.activation_name_arc(),
                            original.dropout_rate(),
                        ));
                    }
                    output = Some(OutputLayerConfig::from_dense(dense));
                }
                Layer::Dropout(_) => {}
            }
        }

        let input =
            input.ok_or_else(|| ModelErr::configuration("the fitted graph has no input"))?;
        let output =
            output.ok_or_else(|| ModelErr::configuration("the fitted graph has no output"))?;

        Ok((input, output, hidden))
    }

    /// Runs a single sample through the current graph.
    ///
    /// # Arguments
    /// * `features` - The sample, as wide as the input layer.
    ///
    /// # Returns
    /// `None` if there are no features, otherwise the raw output of the graph or an error if the
    /// sample has the wrong width.
    pub fn predict(&self, features: Option<&[f32]>) -> Result<Option<Vec<f32>>> {
        let Some(features) = features else {
            return Ok(None);
        };

        let x = aview1(features).insert_axis(Axis(0));
        let y = self.graph.infer(x)?;

        Ok(Some(y.iter().copied().collect()))
    }
}

impl PartialEq for ModelWrapper {
    fn eq(&self, other: &Self) -> bool {
        self.input == other.input
            && self.output == other.output
            && self.hidden == other.hidden
            && self.accuracy == other.accuracy
    }
}

/// Assembles a `ModelWrapper` piece by piece.
#[derive(Clone, Debug, Default)]
pub struct ModelWrapperBuilder {
    input: Option<InputLayerConfig>,
    output: Option<OutputLayerConfig>,
    hidden: Vec<HiddenLayerConfig>,
    accuracy: Option<f32>,
    config: TrainingConfig,
}

impl ModelWrapperBuilder {
    pub fn input(mut self, input: InputLayerConfig) -> Self {
        self.input = Some(input);
        self
    }

    pub fn output(mut self, output: OutputLayerConfig) -> Self {
        self.output = Some(output);
        self
    }

    /// Appends a hidden layer after the ones already added.
    pub fn hidden(mut self, hidden: HiddenLayerConfig) -> Self {
        self.hidden.push(hidden);
        self
    }

    pub fn hidden_layers<I>(mut self, hidden: I) -> Self
    where
        I: IntoIterator<Item = HiddenLayerConfig>,
    {
        self.hidden.extend(hidden);
        self
    }

    pub fn accuracy(mut self, accuracy: f32) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the wrapper.
    ///
    /// # Returns
    /// A configuration error if the input or the output layer is missing, or a shape mismatch if
    /// some injected weights don't fit their layer.
    pub fn build(self) -> Result<ModelWrapper> {
        let input = self
            .input
            .ok_or_else(|| ModelErr::configuration("the input layer is missing"))?;
        let output = self
            .output
            .ok_or_else(|| ModelErr::configuration("the output layer is missing"))?;

        ModelWrapper::compile(input, output, self.hidden, self.accuracy, self.config)
    }
}

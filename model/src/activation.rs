use machine_learning::arch::activations::ActFn;

/// The activations a layer configuration can ask for by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
    Softmax,
}

impl Activation {
    /// Returns the engine activation function.
    pub fn act_fn(&self) -> ActFn {
        match self {
            Activation::Linear => ActFn::Linear,
            Activation::Sigmoid => ActFn::sigmoid(1.),
            Activation::Tanh => ActFn::Tanh,
            Activation::Relu => ActFn::Relu,
            Activation::Softmax => ActFn::Softmax,
        }
    }
}

/// Activation names accepted by hidden layers. `None` asks for no activation at all.
pub const HIDDEN_ACTIVATIONS: &[(&str, Activation)] = &[
    ("None", Activation::Linear),
    ("Sigmoid", Activation::Sigmoid),
    ("Tanh", Activation::Tanh),
    ("ReLU", Activation::Relu),
    ("Softmax", Activation::Softmax),
];

/// Activation names accepted by output layers.
pub const OUTPUT_ACTIVATIONS: &[(&str, Activation)] = &[
    ("Sigmoid", Activation::Sigmoid),
    ("Tanh", Activation::Tanh),
    ("Softmax", Activation::Softmax),
];

/// Maps symbolic activation names to activations.
///
/// Names are matched exactly, so `relu` is not `ReLU`. A name that is absent, empty or not among
/// the allowed ones silently resolves to the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActivationResolver;

impl ActivationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `name` against a table of allowed names.
    ///
    /// # Arguments
    /// * `name` - The requested activation name, if any.
    /// * `allowed` - The accepted names and what they resolve to.
    /// * `default` - The activation used when nothing matches.
    ///
    /// # Returns
    /// The matching activation or `default`.
    pub fn resolve(
        &self,
        name: Option<&str>,
        allowed: &[(&str, Activation)],
        default: Activation,
    ) -> Activation {
        name.and_then(|name| {
            allowed
                .iter()
                .find(|(candidate, _)| *candidate == name)
                .map(|&(_, activation)| activation)
        })
        .unwrap_or(default)
    }

    /// Resolves the activation of a hidden layer, linear by default.
    pub fn hidden(&self, name: Option<&str>) -> Activation {
        self.resolve(name, HIDDEN_ACTIVATIONS, Activation::Linear)
    }

    /// Resolves the activation of an output layer, softmax by default.
    pub fn output(&self, name: Option<&str>) -> Activation {
        self.resolve(name, OUTPUT_ACTIVATIONS, Activation::Softmax)
    }
}

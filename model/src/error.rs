use std::{
    error::Error,
    fmt::{self, Display},
};

use machine_learning::MlErr;

/// The result type of every fallible operation of the model crate.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// All errors that can occur while composing, training or querying a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelErr {
    /// A missing layer configuration or an out of range hyperparameter.
    Configuration(String),
    /// Injected weights don't fit the node they are meant for. Raised when the graph is built.
    ShapeMismatch {
        layer: usize,
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A failure of the numeric engine, left untouched.
    Engine(MlErr),
}

impl ModelErr {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Attributes an engine size mismatch on a parameter tensor to the layer at `layer`.
    pub(crate) fn at_layer(layer: usize, err: MlErr) -> Self {
        match err {
            MlErr::SizeMismatch {
                what: what @ ("kernel" | "bias"),
                got,
                expected,
            } => Self::ShapeMismatch {
                layer,
                what,
                got,
                expected,
            },
            err => Self::Engine(err),
        }
    }
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Self::ShapeMismatch {
                layer,
                what,
                got,
                expected,
            } => write!(
                f,
                "layer {layer}: the {what} has {got} values but the node needs {expected}"
            ),
            Self::Engine(err) => write!(f, "engine error: {err}"),
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MlErr> for ModelErr {
    fn from(value: MlErr) -> Self {
        Self::Engine(value)
    }
}

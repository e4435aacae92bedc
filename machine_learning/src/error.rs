use std::{
    error::Error,
    fmt::{self, Display},
};

use rand_distr::{NormalError, uniform::Error as UniformError};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidWidth {
        what: &'static str,
    },
    InvalidDropoutRate(f32),
    InvalidValidationSplit(f32),
    EmptyDataset,
    EmptyTrainingSplit {
        rows: usize,
        validation_split: f32,
    },
    NonContiguous {
        what: &'static str,
    },
    NonFiniteLoss {
        epoch: usize,
    },
    Distribution(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidWidth { what } => write!(f, "The width of {what} must be at least 1"),
            MlErr::InvalidDropoutRate(rate) => {
                write!(f, "The dropout rate must be in [0, 1), got {rate}")
            }
            MlErr::InvalidValidationSplit(split) => {
                write!(f, "The validation split must be in [0, 1), got {split}")
            }
            MlErr::EmptyDataset => write!(f, "The dataset has no rows"),
            MlErr::EmptyTrainingSplit {
                rows,
                validation_split,
            } => write!(
                f,
                "Holding out {validation_split} of {rows} rows leaves nothing to train on"
            ),
            MlErr::NonContiguous { what } => {
                write!(f, "The {what} buffer is not laid out contiguously")
            }
            MlErr::NonFiniteLoss { epoch } => {
                write!(f, "The loss stopped being finite at epoch {epoch}")
            }
            MlErr::Distribution(msg) => write!(f, "Invalid parameter distribution: {msg}"),
        }
    }
}

impl Error for MlErr {}

impl From<NormalError> for MlErr {
    fn from(value: NormalError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<UniformError> for MlErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

//! A small dense neural network engine on top of `ndarray`.
//!
//! Graphs are `Sequential` stacks of input, dense and dropout nodes. A `ModelTrainer` fits them
//! with one of the `optimization` strategies and reports a `History` of the loss and metrics.

pub mod arch;
pub mod dataset;
pub mod error;
pub mod initialization;
pub mod optimization;
mod test;
pub mod training;

pub use error::{MlErr, Result};

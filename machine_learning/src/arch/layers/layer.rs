use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Dense, Dropout, Input};
use crate::Result;

/// A node of a `Sequential` graph.
#[derive(Clone, Debug)]
pub enum Layer {
    Input(Input),
    Dense(Dense),
    Dropout(Dropout),
}
use Layer::*;

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Input(_) => "input",
            Dense(_) => "dense",
            Dropout(_) => "dropout",
        }
    }

    /// Returns the width of the batches this node outputs.
    pub fn width(&self) -> usize {
        match self {
            Input(l) => l.width(),
            Dense(l) => l.dim().1,
            Dropout(l) => l.width(),
        }
    }

    /// Returns the amount of trainable parameters of this node.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
            Input(_) | Dropout(_) => 0,
        }
    }

    /// Makes a training forward pass, keeping whatever `backward` will need.
    pub fn forward<R: Rng>(&mut self, x: Array2<f32>, rng: &mut R) -> Result<Array2<f32>> {
        match self {
            Input(l) => l.forward(x),
            Dense(l) => l.forward(x.view()),
            Dropout(l) => Ok(l.forward(x.view(), rng)),
        }
    }

    /// Makes an inference forward pass. Dropout nodes let everything through.
    pub fn infer(&self, x: Array2<f32>) -> Result<Array2<f32>> {
        match self {
            Input(l) => l.forward(x),
            Dense(l) => l.infer(x.view()),
            Dropout(_) => Ok(x),
        }
    }

    pub fn backward(&mut self, d: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Input(_) => d.to_owned(),
            Dense(l) => l.backward(d),
            Dropout(l) => l.backward(d),
        }
    }
}

use ndarray::{Array2, ArrayView2, Axis};

use super::{Sigmoid, softmax};

/// An activation function applied to every row of a batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActFn {
    Linear,
    Sigmoid(Sigmoid),
    Tanh,
    Relu,
    Softmax,
}
use ActFn::*;

impl ActFn {
    pub fn sigmoid(amp: f32) -> Self {
        Sigmoid(Sigmoid::new(amp))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Linear => "linear",
            Sigmoid(_) => "sigmoid",
            Tanh => "tanh",
            Relu => "relu",
            Softmax => "softmax",
        }
    }

    /// Computes the activation of the pre-activation batch `z`.
    pub fn apply(&self, z: ArrayView2<f32>) -> Array2<f32> {
        match self {
            Linear => z.to_owned(),
            Sigmoid(s) => z.mapv(|v| s.f(v)),
            Tanh => z.mapv(f32::tanh),
            Relu => z.mapv(|v| v.max(0.)),
            Softmax => softmax(z),
        }
    }

    /// Propagates the delta `d` with respect to the activation back to the pre-activation.
    ///
    /// # Arguments
    /// * `d` - The delta with respect to this activation's output.
    /// * `z` - The pre-activation values of the forward pass.
    /// * `a` - The activation values of the forward pass.
    ///
    /// # Returns
    /// The delta with respect to `z`.
    pub fn backward(
        &self,
        d: ArrayView2<f32>,
        z: ArrayView2<f32>,
        a: ArrayView2<f32>,
    ) -> Array2<f32> {
        let mut dz = d.to_owned();

        match self {
            Linear => {}
            Sigmoid(s) => dz.zip_mut_with(&z, |d, &z| *d *= s.df(z)),
            Tanh => dz.zip_mut_with(&a, |d, &a| *d *= 1. - a * a),
            Relu => dz.zip_mut_with(&z, |d, &z| {
                if z <= 0. {
                    *d = 0.;
                }
            }),
            Softmax => {
                let dot = (&d * &a).sum_axis(Axis(1)).insert_axis(Axis(1));
                let centered = &d - &dot;
                dz = centered * &a;
            }
        }

        dz
    }
}

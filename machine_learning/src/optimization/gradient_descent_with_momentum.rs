use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Gradient descent that keeps a decaying velocity per parameter, smoothing the steps taken
/// along directions where the gradient keeps its sign.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    lr: f32,
    mu: f32,
    velocity: Vec<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum`.
    ///
    /// # Arguments
    /// * `len` - The size of the tensor it optimizes.
    /// * `lr` - The learning rate.
    /// * `mu` - How much of the previous velocity survives each step.
    pub fn new(len: usize, lr: f32, mu: f32) -> Self {
        Self {
            lr,
            mu,
            velocity: vec![0.; len],
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_sizes("momentum step", grad, params)?;
        check_sizes("momentum velocity", &self.velocity, params)?;

        for ((p, g), v) in params.iter_mut().zip(grad).zip(&mut self.velocity) {
            *v = self.mu * *v - self.lr * g;
            *p += *v;
        }

        Ok(())
    }
}

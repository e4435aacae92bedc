use super::{Optimizer, optimizer::check_sizes};
use crate::Result;

/// Adam, with bias corrected estimates of the gradient's first and second moments.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f32,
    b1: f32,
    b2: f32,
    eps: f32,
    steps: i32,
    m: Vec<f32>,
    v: Vec<f32>,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The size of the tensor it optimizes.
    /// * `lr` - The learning rate.
    /// * `b1`, `b2` - The decay rates of the first and second moment estimates.
    /// * `eps` - Keeps the step finite where the second moment vanishes.
    pub fn new(len: usize, lr: f32, b1: f32, b2: f32, eps: f32) -> Self {
        Self {
            lr,
            b1,
            b2,
            eps,
            steps: 0,
            m: vec![0.; len],
            v: vec![0.; len],
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_sizes("adam step", grad, params)?;
        check_sizes("adam moments", &self.m, params)?;

        self.steps = self.steps.saturating_add(1);
        let m_scale = 1. / (1. - self.b1.powi(self.steps));
        let v_scale = 1. / (1. - self.b2.powi(self.steps));

        let moments = self.m.iter_mut().zip(&mut self.v);
        for ((p, &g), (m, v)) in params.iter_mut().zip(grad).zip(moments) {
            *m = self.b1 * *m + (1. - self.b1) * g;
            *v = self.b2 * *v + (1. - self.b2) * g * g;
            *p -= self.lr * (*m * m_scale) / ((*v * v_scale).sqrt() + self.eps);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_has_learning_rate_length() {
        let mut optimizer = Adam::new(2, 0.1, 0.9, 0.999, 1e-8);
        let mut params = [0., 0.];

        optimizer.update_params(&[3., -0.5], &mut params).unwrap();
        assert!((params[0] + 0.1).abs() < 1e-4);
        assert!((params[1] - 0.1).abs() < 1e-4);
    }

    #[test]
    fn steady_gradients_keep_the_step_length() {
        let mut optimizer = Adam::new(1, 0.01, 0.9, 0.999, 1e-8);
        let mut params = [1.];

        for _ in 0..10 {
            optimizer.update_params(&[2.], &mut params).unwrap();
        }

        assert!((params[0] - 0.9).abs() < 1e-4);
    }
}

use std::{cell::RefCell, iter, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{Fan, ParamGen, param_gen::Budget};
use crate::Result;

/// Draws parameters from a distribution, sharing one random number generator with the other
/// generators of the graph so a single seed fixes every tensor.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
    budget: Budget,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen`.
    ///
    /// # Arguments
    /// * `rng` - The shared random number generator.
    /// * `distribution` - Where the values are drawn from.
    /// * `limit` - How many values it draws before running dry.
    pub fn new(rng: Rc<RefCell<R>>, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            budget: Budget::new(limit),
        }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Draws from `[low, high)`.
    ///
    /// # Returns
    /// An error if `low > high`.
    pub fn uniform(rng: Rc<RefCell<R>>, limit: usize, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?, limit))
    }

    /// Glorot uniform: `[-b, b)` with `b = sqrt(6 / (fan_in + fan_out))`.
    pub fn glorot_uniform(rng: Rc<RefCell<R>>, limit: usize, fan: Fan) -> Result<Self> {
        let bound = fan.glorot_bound();
        Self::uniform(rng, limit, -bound, bound)
    }

    /// LeCun uniform: `[-b, b)` with `b = sqrt(3 / fan_in)`.
    pub fn lecun_uniform(rng: Rc<RefCell<R>>, limit: usize, fan: Fan) -> Result<Self> {
        let bound = fan.lecun_bound();
        Self::uniform(rng, limit, -bound, bound)
    }
}

impl<R: Rng> RandParamGen<R, Normal<f32>> {
    /// # Returns
    /// An error if `std_dev` isn't finite.
    pub fn normal(rng: Rc<RefCell<R>>, limit: usize, mean: f32, std_dev: f32) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?, limit))
    }

    /// He normal: centered with a standard deviation of `sqrt(2 / fan_in)`.
    pub fn he_normal(rng: Rc<RefCell<R>>, limit: usize, fan: Fan) -> Result<Self> {
        Self::normal(rng, limit, 0., fan.he_std_dev())
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let n = self.budget.spend(n)?;
        let mut rng = self.rng.borrow_mut();

        let values = iter::repeat_with(|| self.distribution.sample(&mut *rng))
            .take(n)
            .collect();

        Some(values)
    }
}

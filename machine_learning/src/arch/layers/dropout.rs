use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{MlErr, Result};

/// Inverted dropout: while training, every unit is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)`. At inference it is the identity.
#[derive(Clone, Debug)]
pub struct Dropout {
    width: usize,
    rate: f32,

    // Forward metadata
    mask: Array2<f32>,
}

impl Dropout {
    /// Creates a new `Dropout` node.
    ///
    /// # Arguments
    /// * `width` - The width of the batches flowing through this node.
    /// * `rate` - The probability of dropping each unit, in `[0, 1)`.
    ///
    /// # Returns
    /// A new `Dropout` or an error if `rate` is out of range.
    pub fn new(width: usize, rate: f32) -> Result<Self> {
        if !(0.0..1.0).contains(&rate) {
            return Err(MlErr::InvalidDropoutRate(rate));
        }

        Ok(Self {
            width,
            rate,
            mask: Array2::zeros((0, width)),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn forward<R: Rng>(&mut self, x: ArrayView2<f32>, rng: &mut R) -> Array2<f32> {
        let rate = self.rate;
        let keep = 1. - rate;
        let scale = 1. / keep;

        self.mask = Array2::from_shape_fn(x.dim(), |_| {
            if rate == 0. || rng.random::<f32>() < keep {
                scale
            } else {
                0.
            }
        });

        &x * &self.mask
    }

    pub fn backward(&self, d: ArrayView2<f32>) -> Array2<f32> {
        &d * &self.mask
    }
}

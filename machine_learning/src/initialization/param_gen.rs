/// A `ParamGen` generates values for the initial state of a layer's parameters.
pub trait ParamGen {
    /// Should sample `n` parameters.
    ///
    /// Layers treat a sample whose length differs from `n` as a size mismatch, which is how
    /// generators holding fixed values report that they don't fit the requested tensor.
    ///
    /// # Arguments
    /// * `n` - The amount of parameters requested.
    ///
    /// # Returns
    /// The sampled values, or `None` if the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;
}

/// How many values a bounded generator may still hand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Budget(usize);

impl Budget {
    pub(super) fn new(limit: usize) -> Self {
        Self(limit)
    }

    /// Spends up to `n` values, `None` once nothing is left.
    pub(super) fn spend(&mut self, n: usize) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }

        let n = n.min(self.0);
        self.0 -= n;
        Some(n)
    }
}

/// The units feeding into and out of a dense kernel, which scale the variance-preserving
/// initialization schemes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fan {
    pub fan_in: usize,
    pub fan_out: usize,
}

impl Fan {
    /// The fan of a kernel of shape `(inputs, outputs)`.
    pub fn of_dense((fan_in, fan_out): (usize, usize)) -> Self {
        Self { fan_in, fan_out }
    }

    pub(super) fn glorot_bound(self) -> f32 {
        (6. / (self.fan_in + self.fan_out) as f32).sqrt()
    }

    pub(super) fn lecun_bound(self) -> f32 {
        (3. / self.fan_in as f32).sqrt()
    }

    pub(super) fn he_std_dev(self) -> f32 {
        (2. / self.fan_in as f32).sqrt()
    }
}

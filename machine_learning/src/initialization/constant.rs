use super::{ParamGen, param_gen::Budget};

/// Fills a tensor with a single value.
#[derive(Clone, Copy, Debug)]
pub struct ConstParamGen {
    value: f32,
    budget: Budget,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen`.
    ///
    /// # Arguments
    /// * `value` - The value every parameter starts at.
    /// * `limit` - How many parameters it fills before running dry.
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            budget: Budget::new(limit),
        }
    }

    pub fn zeros(limit: usize) -> Self {
        Self::new(0., limit)
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        self.budget.spend(n).map(|n| vec![self.value; n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_a_bias_vector() {
        let mut bias_gen = ConstParamGen::new(0.1, 3);

        assert_eq!(bias_gen.sample(3), Some(vec![0.1; 3]));
        assert_eq!(bias_gen.sample(3), None);
    }

    #[test]
    fn a_short_budget_gives_a_short_sample() {
        let mut kernel_gen = ConstParamGen::zeros(4);

        assert_eq!(kernel_gen.sample(6), Some(vec![0.; 4]));
        assert_eq!(kernel_gen.sample(1), None);
    }

    #[test]
    fn nothing_to_fill() {
        assert_eq!(ConstParamGen::zeros(0).sample(2), None);
    }
}

use std::{cell::RefCell, rc::Rc, sync::Arc};

use machine_learning::{
    Result as MlResult,
    initialization::{ConstParamGen, Fan, ParamGen, RandParamGen},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::config::{ParamGenConfig, TrainingConfig};

/// Forces a parameter tensor to caller supplied values instead of a random initialization.
///
/// The whole buffer is handed over on the first request whatever its length, so a buffer that
/// doesn't fit the tensor is reported by the node as a size mismatch.
#[derive(Clone, Debug)]
pub struct WeightInitializer {
    values: Arc<[f32]>,
    used: bool,
}

impl WeightInitializer {
    pub fn new(values: Arc<[f32]>) -> Self {
        Self {
            values,
            used: false,
        }
    }
}

impl ParamGen for WeightInitializer {
    fn sample(&mut self, _n: usize) -> Option<Vec<f32>> {
        if self.used {
            return None;
        }

        self.used = true;
        Some(self.values.to_vec())
    }
}

/// Hands out the parameter generator of every tensor of a graph being built: the injected
/// values when there are any, the configured initialization otherwise.
pub struct Initializers {
    rng: Rc<RefCell<StdRng>>,
    kernel_init: ParamGenConfig,
    bias_init: ParamGenConfig,
}

impl Initializers {
    /// Creates a new `Initializers` following the initialization and seed of `config`.
    pub fn new(config: &TrainingConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            rng: Rc::new(RefCell::new(rng)),
            kernel_init: config.kernel_init,
            bias_init: config.bias_init,
        }
    }

    /// Returns the generator for the weights of a dense node of dimension `dim`.
    pub fn kernel(
        &self,
        injected: Option<&Arc<[f32]>>,
        dim: (usize, usize),
    ) -> MlResult<Box<dyn ParamGen>> {
        self.resolve(injected, self.kernel_init, dim.0 * dim.1, dim)
    }

    /// Returns the generator for the biases of a dense node of dimension `dim`.
    pub fn bias(
        &self,
        injected: Option<&Arc<[f32]>>,
        dim: (usize, usize),
    ) -> MlResult<Box<dyn ParamGen>> {
        self.resolve(injected, self.bias_init, dim.1, dim)
    }

    fn resolve(
        &self,
        injected: Option<&Arc<[f32]>>,
        config: ParamGenConfig,
        limit: usize,
        dim: (usize, usize),
    ) -> MlResult<Box<dyn ParamGen>> {
        if let Some(values) = injected {
            return Ok(Box::new(WeightInitializer::new(values.clone())));
        }

        let rng = self.rng.clone();
        let fan = Fan::of_dense(dim);

        let param_gen: Box<dyn ParamGen> = match config {
            ParamGenConfig::Zeros => Box::new(ConstParamGen::zeros(limit)),
            ParamGenConfig::Const { value } => Box::new(ConstParamGen::new(value, limit)),
            ParamGenConfig::Uniform { low, high } => {
                Box::new(RandParamGen::uniform(rng, limit, low, high)?)
            }
            ParamGenConfig::XavierUniform => {
                Box::new(RandParamGen::glorot_uniform(rng, limit, fan)?)
            }
            ParamGenConfig::LecunUniform => {
                Box::new(RandParamGen::lecun_uniform(rng, limit, fan)?)
            }
            ParamGenConfig::Normal { mean, std_dev } => {
                Box::new(RandParamGen::normal(rng, limit, mean, std_dev)?)
            }
            ParamGenConfig::Kaiming => Box::new(RandParamGen::he_normal(rng, limit, fan)?),
        };

        Ok(param_gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initializers(seed: u64) -> Initializers {
        Initializers::new(&TrainingConfig::default().with_seed(Some(seed)))
    }

    #[test]
    fn injected_values_win() {
        let values: Arc<[f32]> = Arc::from([0.25, 0.5]);
        let mut param_gen = initializers(1).bias(Some(&values), (3, 2)).unwrap();

        assert_eq!(param_gen.sample(2), Some(vec![0.25, 0.5]));
    }

    #[test]
    fn defaults_are_glorot_kernels_and_zero_biases() {
        let initializers = initializers(1);
        let bound = (6f32 / 7.).sqrt();

        let kernel = initializers.kernel(None, (4, 3)).unwrap().sample(12).unwrap();
        assert_eq!(kernel.len(), 12);
        assert!(kernel.iter().all(|w| w.abs() <= bound));

        let bias = initializers.bias(None, (4, 3)).unwrap().sample(3).unwrap();
        assert_eq!(bias, vec![0.; 3]);
    }

    #[test]
    fn same_seed_same_weights() {
        let a = initializers(9).kernel(None, (5, 5)).unwrap().sample(25);
        let b = initializers(9).kernel(None, (5, 5)).unwrap().sample(25);

        assert_eq!(a, b);
    }

    #[test]
    fn yields_the_values_once() {
        let mut init = WeightInitializer::new(Arc::from([1., 2., 3.]));

        assert_eq!(init.sample(3), Some(vec![1., 2., 3.]));
        assert_eq!(init.sample(3), None);
    }

    #[test]
    fn does_not_pad_or_truncate() {
        let mut init = WeightInitializer::new(Arc::from([1., 2.]));
        assert_eq!(init.sample(4), Some(vec![1., 2.]));

        let mut init = WeightInitializer::new(Arc::from([1., 2.]));
        assert_eq!(init.sample(1), Some(vec![1., 2.]));
    }
}

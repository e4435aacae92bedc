use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::layers::{Dense, Dropout, Input, Layer};
use crate::{MlErr, Result, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The first layer is always an `Input` node, every other layer is fed by the one before it.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential` holding only its input node.
    ///
    /// # Arguments
    /// * `input_width` - The amount of features of every sample.
    ///
    /// # Returns
    /// A new `Sequential` or an error if `input_width` is zero.
    pub fn new(input_width: usize) -> Result<Self> {
        let input = Input::new(input_width)?;

        Ok(Self {
            layers: vec![Layer::Input(input)],
        })
    }

    /// Appends a layer at the end of the graph.
    ///
    /// # Arguments
    /// * `layer` - The layer to append, its input width must match the current output width.
    ///
    /// # Returns
    /// An error if the layer doesn't fit after the current output or if it is another input.
    pub fn push(&mut self, layer: Layer) -> Result<()> {
        let width = self.output_width();

        let got = match &layer {
            Layer::Input(_) => {
                return Err(MlErr::SizeMismatch {
                    what: "input nodes",
                    got: 2,
                    expected: 1,
                });
            }
            Layer::Dense(dense) => dense.dim().0,
            Layer::Dropout(dropout) => dropout.width(),
        };

        if got != width {
            return Err(MlErr::SizeMismatch {
                what: layer.name(),
                got,
                expected: width,
            });
        }

        self.layers.push(layer);
        Ok(())
    }

    pub fn push_dense(&mut self, dense: Dense) -> Result<()> {
        self.push(Layer::Dense(dense))
    }

    /// Appends a dropout node as wide as the current output.
    pub fn push_dropout(&mut self, rate: f32) -> Result<()> {
        let dropout = Dropout::new(self.output_width(), rate)?;
        self.push(Layer::Dropout(dropout))
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map(Layer::width).unwrap_or_default()
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map(Layer::width).unwrap_or_default()
    }

    /// Iterates over the dense nodes in the order they are fed.
    pub fn dense_layers(&self) -> impl Iterator<Item = &Dense> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Dense(dense) => Some(dense),
            _ => None,
        })
    }

    /// Returns the size of every trainable tensor, kernel then bias for each dense node.
    pub fn param_sizes(&self) -> Vec<usize> {
        self.dense_layers()
            .flat_map(|dense| {
                let (n, m) = dense.dim();
                [n * m, m]
            })
            .collect()
    }

    /// Returns the amount of trainable parameters.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Layer::size).sum()
    }

    /// Makes an inference pass through the network without modifying it.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The prediction for the given input or an error if its width is wrong.
    pub fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.layers
            .iter()
            .try_fold(x.to_owned(), |x, layer| layer.infer(x))
    }

    /// Makes a training forward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The input batch, one sample per row.
    /// * `rng` - The random source of the dropout masks.
    ///
    /// # Returns
    /// The prediction for the given input or an error if its width is wrong.
    pub fn forward<R: Rng>(&mut self, x: ArrayView2<f32>, rng: &mut R) -> Result<Array2<f32>> {
        self.layers
            .iter_mut()
            .try_fold(x.to_owned(), |x, layer| layer.forward(x, rng))
    }

    /// Propagates the delta of the loss with respect to the output through every layer,
    /// leaving each dense node's gradient ready for `optimize`.
    pub fn backward(&mut self, d: Array2<f32>) {
        self.layers
            .iter_mut()
            .rev()
            .fold(d, |d, layer| layer.backward(d.view()));
    }

    /// Applies the gradients computed by the last `backward`.
    ///
    /// # Arguments
    /// * `optimizers` - One optimizer per trainable tensor, in `param_sizes` order.
    pub fn optimize<O: Optimizer>(&mut self, optimizers: &mut [O]) -> Result<()> {
        let expected = 2 * self.dense_layers().count();
        if optimizers.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "optimizers",
                got: optimizers.len(),
                expected,
            });
        }

        let dense_layers = self.layers.iter_mut().filter_map(|layer| match layer {
            Layer::Dense(dense) => Some(dense),
            _ => None,
        });

        let mut optimizers = optimizers.iter_mut();

        for dense in dense_layers {
            let (Some(kernel_opt), Some(bias_opt)) = (optimizers.next(), optimizers.next()) else {
                break;
            };
            dense.optimize(kernel_opt, bias_opt)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arch::activations::ActFn, initialization::ConstParamGen};
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    fn dense(dim: (usize, usize), act_fn: ActFn) -> Dense {
        let mut kernel_gen = ConstParamGen::new(0.5, dim.0 * dim.1);
        let mut bias_gen = ConstParamGen::zeros(dim.1);
        Dense::new(dim, act_fn, &mut kernel_gen, &mut bias_gen).unwrap()
    }

    #[test]
    fn widths_follow_the_layers() {
        let mut model = Sequential::new(3).unwrap();
        model.push_dense(dense((3, 4), ActFn::Relu)).unwrap();
        model.push_dropout(0.2).unwrap();
        model.push_dense(dense((4, 2), ActFn::Softmax)).unwrap();

        assert_eq!(model.input_width(), 3);
        assert_eq!(model.output_width(), 2);
        assert_eq!(model.layers().len(), 4);
        assert_eq!(model.param_sizes(), vec![12, 4, 8, 2]);
        assert_eq!(model.size(), 26);
    }

    #[test]
    fn mismatched_dense_is_rejected() {
        let mut model = Sequential::new(3).unwrap();
        let err = model.push_dense(dense((4, 2), ActFn::Linear)).unwrap_err();

        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "dense",
                got: 4,
                expected: 3
            }
        );
    }

    #[test]
    fn inference_ignores_dropout() {
        let mut model = Sequential::new(2).unwrap();
        model.push_dense(dense((2, 2), ActFn::Linear)).unwrap();
        model.push_dropout(0.9).unwrap();

        let y = model.infer(array![[1., 1.]].view()).unwrap();
        assert_eq!(y, array![[1., 1.]]);
    }

    #[test]
    fn optimizers_must_match_the_tensors() {
        use crate::optimization::GradientDescent;

        let mut model = Sequential::new(2).unwrap();
        model.push_dense(dense((2, 2), ActFn::Linear)).unwrap();

        let mut rng = StdRng::seed_from_u64(0);
        let y = model.forward(array![[1., 1.]].view(), &mut rng).unwrap();
        model.backward(y);

        let mut optimizers = vec![GradientDescent::new(0.1)];
        assert!(model.optimize(&mut optimizers).is_err());

        let mut optimizers = vec![GradientDescent::new(0.1), GradientDescent::new(0.1)];
        assert!(model.optimize(&mut optimizers).is_ok());
    }
}

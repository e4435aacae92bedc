use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::{
    MlErr, Result, arch::activations::ActFn, initialization::ParamGen, optimization::Optimizer,
};

/// A fully connected node computing `act_fn(x · W + b)`.
///
/// `W` has shape `(dim.0, dim.1)` and is stored row-major, so its flat form lists the weights
/// of every input unit one after the other.
#[derive(Clone, Debug)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: ActFn,
    weights: Array2<f32>,
    biases: Array1<f32>,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
    a: Array2<f32>,

    // Backward metadata
    dw: Array2<f32>,
    db: Array1<f32>,
}

impl Dense {
    /// Creates a new `Dense` node sampling its parameters from the given generators.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths.
    /// * `act_fn` - The activation applied to the affine transform.
    /// * `kernel_gen` - The generator of the `dim.0 * dim.1` weights.
    /// * `bias_gen` - The generator of the `dim.1` biases.
    ///
    /// # Returns
    /// A new `Dense` or an error if a generator doesn't produce exactly the amount of values the
    /// tensor needs.
    pub fn new(
        dim: (usize, usize),
        act_fn: ActFn,
        kernel_gen: &mut dyn ParamGen,
        bias_gen: &mut dyn ParamGen,
    ) -> Result<Self> {
        check_dim(dim)?;
        let kernel = sample_exact("kernel", kernel_gen, dim.0 * dim.1)?;
        let bias = sample_exact("bias", bias_gen, dim.1)?;
        Self::from_params(dim, act_fn, kernel, bias)
    }

    /// Creates a new `Dense` node from flat parameter buffers.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths.
    /// * `act_fn` - The activation applied to the affine transform.
    /// * `kernel` - The row-major weights.
    /// * `bias` - The biases.
    ///
    /// # Returns
    /// A new `Dense` or an error if the buffers don't match `dim`.
    pub fn from_params(
        dim: (usize, usize),
        act_fn: ActFn,
        kernel: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<Self> {
        check_dim(dim)?;
        check_len("kernel", kernel.len(), dim.0 * dim.1)?;
        check_len("bias", bias.len(), dim.1)?;

        let weights = Array2::from_shape_vec(dim, kernel).map_err(|_| MlErr::SizeMismatch {
            what: "kernel",
            got: 0,
            expected: dim.0 * dim.1,
        })?;

        Ok(Self {
            dim,
            act_fn,
            weights,
            biases: Array1::from_vec(bias),
            x: Array2::zeros((0, dim.0)),
            z: Array2::zeros((0, dim.1)),
            a: Array2::zeros((0, dim.1)),
            dw: Array2::zeros(dim),
            db: Array1::zeros(dim.1),
        })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> ActFn {
        self.act_fn
    }

    pub fn weights(&self) -> ArrayView2<'_, f32> {
        self.weights.view()
    }

    pub fn biases(&self) -> ArrayView1<'_, f32> {
        self.biases.view()
    }

    /// Returns the amount of parameters this node has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    /// Makes a forward pass keeping the metadata needed by `backward`.
    pub fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.z = self.affine(x)?;
        self.a = self.act_fn.apply(self.z.view());
        self.x = x.to_owned();

        Ok(self.a.clone())
    }

    /// Makes a forward pass without touching the node's metadata.
    pub fn infer(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.affine(x)?;
        Ok(self.act_fn.apply(z.view()))
    }

    /// Computes the gradient of the parameters for the delta `d` of this node's output, keeping it
    /// until the next `optimize`.
    ///
    /// # Returns
    /// The delta with respect to this node's input.
    pub fn backward(&mut self, d: ArrayView2<f32>) -> Array2<f32> {
        let dz = self.act_fn.backward(d, self.z.view(), self.a.view());

        // optimizers take the gradients as row-major slices
        self.dw = self.x.t().dot(&dz).as_standard_layout().into_owned();
        self.db = dz.sum_axis(Axis(0)).as_standard_layout().into_owned();

        dz.dot(&self.weights.t())
    }

    /// Applies the last computed gradient to the parameters.
    ///
    /// # Arguments
    /// * `kernel_opt` - The optimizer in charge of the weights.
    /// * `bias_opt` - The optimizer in charge of the biases.
    pub fn optimize<O: Optimizer>(&mut self, kernel_opt: &mut O, bias_opt: &mut O) -> Result<()> {
        let (Some(w), Some(dw)) = (self.weights.as_slice_mut(), self.dw.as_slice()) else {
            return Err(MlErr::NonContiguous { what: "kernel" });
        };
        kernel_opt.update_params(dw, w)?;

        let (Some(b), Some(db)) = (self.biases.as_slice_mut(), self.db.as_slice()) else {
            return Err(MlErr::NonContiguous { what: "bias" });
        };
        bias_opt.update_params(db, b)
    }

    fn affine(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        Ok(x.dot(&self.weights) + &self.biases)
    }
}

fn check_dim((n, m): (usize, usize)) -> Result<()> {
    if n == 0 {
        return Err(MlErr::InvalidWidth { what: "dense input" });
    }

    if m == 0 {
        return Err(MlErr::InvalidWidth {
            what: "dense output",
        });
    }

    Ok(())
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::SizeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}

fn sample_exact(what: &'static str, param_gen: &mut dyn ParamGen, n: usize) -> Result<Vec<f32>> {
    let sample = param_gen.sample(n).unwrap_or_default();
    check_len(what, sample.len(), n)?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{initialization::ConstParamGen, optimization::GradientDescent};
    use ndarray::array;

    fn dense_2x2() -> Dense {
        Dense::from_params((2, 2), ActFn::Linear, vec![1., 2., 3., 4.], vec![0.5, -0.5]).unwrap()
    }

    #[test]
    fn forward_is_affine() {
        let dense = dense_2x2();
        let y = dense.infer(array![[1., 1.]].view()).unwrap();

        assert_eq!(y, array![[4.5, 5.5]]);
    }

    #[test]
    fn generators_must_fill_the_tensors() {
        let mut kernel_gen = ConstParamGen::new(1., 5);
        let mut bias_gen = ConstParamGen::zeros(2);

        let err = Dense::new((2, 3), ActFn::Relu, &mut kernel_gen, &mut bias_gen).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "kernel",
                got: 5,
                expected: 6
            }
        );
    }

    #[test]
    fn wrong_input_width_fails() {
        let dense = dense_2x2();
        assert!(dense.infer(array![[1., 1., 1.]].view()).is_err());
    }

    #[test]
    fn backward_then_optimize_descends() {
        let mut dense = dense_2x2();
        let x = array![[1., 0.]];
        let target = array![[0., 0.]];
        let mut kernel_opt = GradientDescent::new(0.1);
        let mut bias_opt = GradientDescent::new(0.1);

        let before = (dense.infer(x.view()).unwrap() - &target).mapv(|v| v * v).sum();

        let y = dense.forward(x.view()).unwrap();
        let d = (&y - &target) * 2.;
        let dx = dense.backward(d.view());
        dense.optimize(&mut kernel_opt, &mut bias_opt).unwrap();

        let after = (dense.infer(x.view()).unwrap() - &target).mapv(|v| v * v).sum();

        assert_eq!(dx.dim(), (1, 2));
        assert!(after < before);
    }

    #[test]
    fn column_major_deltas_still_optimize() {
        let mut kernel_gen = ConstParamGen::new(0.5, 6);
        let mut bias_gen = ConstParamGen::zeros(3);
        let mut dense = Dense::new((2, 3), ActFn::Linear, &mut kernel_gen, &mut bias_gen).unwrap();
        let x = Array2::from_shape_fn((4, 2), |(i, j)| (i + j) as f32);

        // what a width 1 node downstream hands back
        let d = Array2::from_shape_fn((3, 4), |(i, j)| (i * 4 + j) as f32 * 0.1).reversed_axes();
        assert!(!d.is_standard_layout());

        dense.forward(x.view()).unwrap();
        dense.backward(d.view());

        let mut kernel_opt = GradientDescent::new(0.1);
        let mut bias_opt = GradientDescent::new(0.1);
        dense.optimize(&mut kernel_opt, &mut bias_opt).unwrap();

        assert!(dense.weights().iter().any(|&w| w != 0.5));
    }
}

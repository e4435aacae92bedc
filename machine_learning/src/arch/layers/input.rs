use ndarray::Array2;

use crate::{MlErr, Result};

/// The placeholder node every graph starts with. It only checks the width of the batches it is
/// fed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input {
    width: usize,
}

impl Input {
    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(MlErr::InvalidWidth { what: "input" });
        }

        Ok(Self { width })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn forward(&self, x: Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.width {
            return Err(MlErr::SizeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: self.width,
            });
        }

        Ok(x)
    }
}

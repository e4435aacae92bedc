use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis, s};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// An in-memory supervised dataset, one sample per row of `x` and `y`.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The features.
    /// * `y` - The targets.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the row counts differ or there are no rows.
    pub fn new(x: Array2<f32>, y: Array2<f32>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "target rows",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        if x.nrows() == 0 {
            return Err(MlErr::EmptyDataset);
        }

        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<'_, f32> {
        self.y.view()
    }

    /// Holds out the trailing rows for validation.
    ///
    /// # Arguments
    /// * `validation_split` - The fraction of rows to hold out, in `[0, 1)`.
    ///
    /// # Returns
    /// The training part and, unless nothing was held out, the validation part.
    pub fn split_validation(self, validation_split: f32) -> Result<(Self, Option<Self>)> {
        if !(0.0..1.0).contains(&validation_split) {
            return Err(MlErr::InvalidValidationSplit(validation_split));
        }

        let rows = self.len();
        let train_rows = (rows as f64 * (1. - validation_split as f64)).floor() as usize;

        if train_rows == 0 {
            return Err(MlErr::EmptyTrainingSplit {
                rows,
                validation_split,
            });
        }

        if train_rows == rows {
            return Ok((self, None));
        }

        let train = Self {
            x: self.x.slice(s![..train_rows, ..]).to_owned(),
            y: self.y.slice(s![..train_rows, ..]).to_owned(),
        };
        let validation = Self {
            x: self.x.slice(s![train_rows.., ..]).to_owned(),
            y: self.y.slice(s![train_rows.., ..]).to_owned(),
        };

        Ok((train, Some(validation)))
    }

    /// Shuffles the rows, keeping every sample's features next to its targets.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        self.x = self.x.select(Axis(0), &order);
        self.y = self.y.select(Axis(0), &order);
    }

    /// Iterates over consecutive batches of at most `batch_size` rows.
    pub fn batches(
        &self,
        batch_size: NonZeroUsize,
    ) -> impl Iterator<Item = (ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let size = batch_size.get();

        self.x
            .axis_chunks_iter(Axis(0), size)
            .zip(self.y.axis_chunks_iter(Axis(0), size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn dataset(rows: usize) -> Dataset {
        let x = Array2::from_shape_fn((rows, 2), |(i, j)| (i * 2 + j) as f32);
        let y = Array2::from_shape_fn((rows, 1), |(i, _)| i as f32);
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn mismatched_rows_fail() {
        let err = Dataset::new(Array2::zeros((3, 2)), Array2::zeros((2, 1))).unwrap_err();
        assert_eq!(
            err,
            MlErr::SizeMismatch {
                what: "target rows",
                got: 2,
                expected: 3
            }
        );
    }

    #[test]
    fn empty_dataset_fails() {
        let err = Dataset::new(Array2::zeros((0, 2)), Array2::zeros((0, 1))).unwrap_err();
        assert_eq!(err, MlErr::EmptyDataset);
    }

    #[test]
    fn validation_takes_the_last_rows() {
        let (train, validation) = dataset(10).split_validation(0.25).unwrap();
        let validation = validation.unwrap();

        assert_eq!(train.len(), 7);
        assert_eq!(validation.len(), 3);
        assert_eq!(validation.y()[[0, 0]], 7.);
    }

    #[test]
    fn zero_split_holds_nothing_out() {
        let (train, validation) = dataset(4).split_validation(0.).unwrap();

        assert_eq!(train.len(), 4);
        assert!(validation.is_none());
    }

    #[test]
    fn invalid_splits_fail() {
        assert!(dataset(4).split_validation(1.).is_err());
        assert!(dataset(4).split_validation(-0.5).is_err());
        assert_eq!(
            dataset(1).split_validation(0.5).unwrap_err(),
            MlErr::EmptyTrainingSplit {
                rows: 1,
                validation_split: 0.5
            }
        );
    }

    #[test]
    fn shuffle_keeps_rows_together() {
        let mut ds = dataset(20);
        ds.shuffle(&mut StdRng::seed_from_u64(3));

        for (x, y) in ds.x().rows().into_iter().zip(ds.y().rows()) {
            assert_eq!(x[0], y[0] * 2.);
            assert_eq!(x[1], y[0] * 2. + 1.);
        }
    }

    #[test]
    fn batches_cover_every_row() {
        let ds = dataset(5);
        let sizes: Vec<_> = ds
            .batches(NonZeroUsize::new(2).unwrap())
            .map(|(x, y)| (x.nrows(), y.nrows()))
            .collect();

        assert_eq!(sizes, vec![(2, 2), (2, 2), (1, 1)]);
    }
}

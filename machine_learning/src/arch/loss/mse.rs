use ndarray::{Array2, ArrayView2, Zip};

use super::LossFn;

/// Mean squared error, averaged over every output of every sample.
#[derive(Default, Clone, Copy, Debug)]
pub struct Mse;

impl Mse {
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = y_pred.len().max(1) as f32;

        Zip::from(&y_pred)
            .and(&y)
            .fold(0., |acc, p, t| acc + (p - t) * (p - t))
            / n
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let n = y_pred.len().max(1) as f32;

        Zip::from(&y_pred)
            .and(&y)
            .map_collect(|p, t| 2. * (p - t) / n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn perfect_prediction_has_no_loss() {
        let y = array![[1., 0.], [0., 1.]];
        assert_eq!(Mse.loss(y.view(), y.view()), 0.);
        assert!(Mse.loss_prime(y.view(), y.view()).iter().all(|&d| d == 0.));
    }

    #[test]
    fn loss_is_the_mean_of_squares() {
        let y_pred = array![[1., 3.]];
        let y = array![[0., 0.]];

        assert_eq!(Mse.loss(y_pred.view(), y.view()), 5.);
        assert_eq!(Mse.loss_prime(y_pred.view(), y.view()), array![[1., 3.]]);
    }
}

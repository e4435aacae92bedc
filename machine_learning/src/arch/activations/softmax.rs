use ndarray::{Array2, ArrayView2};

/// Row-wise softmax. Each row's maximum is subtracted before exponentiating.
pub fn softmax(z: ArrayView2<f32>) -> Array2<f32> {
    let mut a = z.to_owned();

    for mut row in a.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }

    a
}

/// Row-wise natural logarithm of the softmax, computed without forming the softmax itself.
pub fn log_softmax(z: ArrayView2<f32>) -> Array2<f32> {
    let mut out = z.to_owned();

    for mut row in out.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum = row.fold(0., |acc, &v| acc + (v - max).exp()).ln();
        row.mapv_inplace(|v| v - max - log_sum);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rows_sum_to_one() {
        let z = array![[1., 2., 3.], [-5., 0., 5.], [1000., 1000., 1000.]];
        let a = softmax(z.view());

        for row in a.rows() {
            assert!((row.sum() - 1.).abs() < 1e-6);
            assert!(row.iter().all(|&p| p >= 0.));
        }

        assert!((a[[2, 0]] - 1. / 3.).abs() < 1e-6);
    }

    #[test]
    fn log_softmax_matches_softmax() {
        let z = array![[0.5, -1.5, 2.0]];
        let a = softmax(z.view());
        let log_a = log_softmax(z.view());

        for (p, lp) in a.iter().zip(log_a.iter()) {
            assert!((p.ln() - lp).abs() < 1e-5);
        }
    }
}

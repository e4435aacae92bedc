#![cfg(test)]

use std::{cell::RefCell, num::NonZeroUsize, rc::Rc};

use ndarray::{Array2, array};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    arch::{
        Metric, Sequential,
        activations::ActFn,
        layers::Dense,
        loss::{CategoricalCrossEntropy, LossFn, Mse},
    },
    initialization::{ConstParamGen, Fan, RandParamGen},
    optimization::{Adam, GradientDescent, Optimizer},
    training::{ModelTrainer, Trainer},
};

fn build_model(widths: &[usize], act_fns: &[ActFn], seed: u64) -> Sequential {
    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));
    let mut model = Sequential::new(widths[0]).unwrap();

    for (dim, &act_fn) in widths.windows(2).map(|w| (w[0], w[1])).zip(act_fns) {
        let mut kernel_gen =
            RandParamGen::glorot_uniform(rng.clone(), dim.0 * dim.1, Fan::of_dense(dim)).unwrap();
        let mut bias_gen = ConstParamGen::zeros(dim.1);
        let dense = Dense::new(dim, act_fn, &mut kernel_gen, &mut bias_gen).unwrap();
        model.push_dense(dense).unwrap();
    }

    model
}

fn trainer<O, L>(
    model: Sequential,
    optimizer: impl Fn(usize) -> O,
    loss_fn: L,
    batch_size: usize,
) -> ModelTrainer<O, L, StdRng>
where
    O: Optimizer,
    L: LossFn,
{
    let optimizers = model.param_sizes().into_iter().map(optimizer).collect();
    let batch_size = NonZeroUsize::new(batch_size).unwrap();

    ModelTrainer::new(
        model,
        optimizers,
        loss_fn,
        vec![Metric::Accuracy],
        batch_size,
        true,
        StdRng::seed_from_u64(7),
    )
}

#[test]
fn test_ml_and2_gate_convergence() {
    let x = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
    let y = array![[0.], [0.], [0.], [1.]];

    let model = build_model(&[2, 3, 1], &[ActFn::sigmoid(1.), ActFn::sigmoid(1.)], 1);
    let mut trainer = trainer(model, |_| GradientDescent::new(2.), Mse, 4);
    trainer.fit(x.view(), y.view(), 5000, 0.).unwrap();

    let y_pred = trainer.infer(x.view()).unwrap();
    let err = Mse.loss(y_pred.view(), y.view());
    assert!(err < 0.05, "err: {err}");
}

#[test]
fn test_ml_xor2_gate_convergence() {
    let x = array![[0., 0.], [0., 1.], [1., 0.], [1., 1.]];
    let y = array![[1., 0.], [0., 1.], [0., 1.], [1., 0.]];

    let model = build_model(&[2, 8, 2], &[ActFn::Tanh, ActFn::Linear], 3);
    let mut trainer = trainer(
        model,
        |len| Adam::new(len, 0.05, 0.9, 0.999, 1e-7),
        CategoricalCrossEntropy::new(true),
        4,
    );
    let history = trainer.fit(x.view(), y.view(), 1000, 0.).unwrap();

    assert_eq!(history.last("accuracy"), Some(1.));
}

#[test]
fn test_ml_softmax_classifier_separates_clusters() {
    // three clusters around (3, 0), (0, 3) and (-3, -3), each a small ring of radius 0.3
    let centers = [(3., 0.), (0., 3.), (-3., -3.)];
    let x = Array2::from_shape_fn((30, 2), |(i, j)| {
        let (cx, cy) = centers[i % 3];
        let angle = (i / 3) as f32 * 0.6;
        if j == 0 {
            cx + 0.3 * angle.cos()
        } else {
            cy + 0.3 * angle.sin()
        }
    });
    let y = Array2::from_shape_fn((30, 3), |(i, j)| if i % 3 == j { 1. } else { 0. });

    let model = build_model(&[2, 6, 3], &[ActFn::Tanh, ActFn::Softmax], 5);
    let mut trainer = trainer(
        model,
        |len| Adam::new(len, 0.05, 0.9, 0.999, 1e-7),
        CategoricalCrossEntropy::new(false),
        8,
    );
    let history = trainer.fit(x.view(), y.view(), 300, 0.2).unwrap();

    assert!(history.last("accuracy").unwrap() > 0.9);
    assert_eq!(history.last("val_accuracy"), Some(1.));

    let probs = trainer.infer(x.view()).unwrap();
    for row in probs.rows() {
        assert!((row.sum() - 1.).abs() < 1e-4);
    }
}

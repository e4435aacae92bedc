use crate::Result;

/// Defines the strategy for updating a parameter tensor based on its calculated gradient.
///
/// Stateful optimizers keep one entry of state per parameter, so a model holds one instance
/// per trainable tensor.
pub trait Optimizer {
    /// Updates the provided slice of parameters using the gradient.
    ///
    /// # Arguments
    /// * `grad` - The gradient of the loss with respect to `params`.
    /// * `params` - The parameters to update.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}

pub(super) fn check_sizes(what: &'static str, grad: &[f32], params: &[f32]) -> Result<()> {
    if grad.len() != params.len() {
        return Err(crate::MlErr::SizeMismatch {
            what,
            got: grad.len(),
            expected: params.len(),
        });
    }

    Ok(())
}

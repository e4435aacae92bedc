mod dense;
mod dropout;
mod input;
mod layer;

pub use dense::Dense;
pub use dropout::Dropout;
pub use input::Input;
pub use layer::Layer;

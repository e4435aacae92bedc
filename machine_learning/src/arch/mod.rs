pub mod activations;
pub mod layers;
pub mod loss;
mod metric;
mod sequential;

pub use metric::Metric;
pub use sequential::Sequential;

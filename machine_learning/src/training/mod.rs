mod history;
mod model_trainer;
mod trainer;

pub use history::History;
pub use model_trainer::ModelTrainer;
pub use trainer::Trainer;

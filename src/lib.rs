//! Temperature record analysis: stores daily temperature records, turns each record and its
//! predecessors into a training row and fits a dense classifier on whether the temperature
//! rises, falls or stays flat.

pub mod config;
pub mod error;
pub mod lookback;
pub mod record;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppErr, Result};
pub use lookback::{TempRecordLookback, build_lookbacks, to_training_arrays};
pub use record::{TempChange, TempRecord};
pub use storage::RecordStorage;

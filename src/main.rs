use anyhow::{Context, Result};
use log::{info, warn};
use model::{HiddenLayerConfig, ModelWrapper, TrainOptions, TrainingConfig};

use temp_records_analysis::{AppConfig, RecordStorage, build_lookbacks, to_training_arrays};

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env()?;
    let storage = RecordStorage::new(&config.records_path);

    let mut records = storage
        .load_records(None, None)
        .with_context(|| format!("loading records from {}", config.records_path.display()))?;
    records.sort_by(|a, b| b.rec_time.cmp(&a.rec_time));
    info!(
        "loaded {} records from {}",
        records.len(),
        config.records_path.display()
    );

    let lookbacks = build_lookbacks(&records, config.lookback);
    let Some((x, y)) = to_training_arrays(&lookbacks) else {
        warn!("not enough records to build a single training row, nothing to do");
        return Ok(());
    };
    info!("training on {} rows of {} features", x.nrows(), x.ncols());

    let hidden = HiddenLayerConfig::new(config.hidden_neurons)?
        .with_activation(config.hidden_activation.as_str());

    let wrapper = ModelWrapper::construct(
        x.ncols(),
        y.ncols(),
        Some(config.output_activation.as_str()),
        [hidden],
    )?
    .with_config(TrainingConfig::default().with_seed(config.seed))?;

    let options = TrainOptions::new(config.epochs, config.validation_split);
    let trained = wrapper
        .train(x.view(), y.view(), options)
        .context("training the model")?;

    match trained.accuracy() {
        Some(accuracy) => info!("trained, accuracy={accuracy:.4}"),
        None => warn!("trained, but no accuracy was recorded"),
    }

    Ok(())
}

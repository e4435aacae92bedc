use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use crate::error::{AppErr, Result};

/// The settings of a training run, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `RECORDS_PATH`, the base directory of the record storage.
    pub records_path: PathBuf,
    /// `LOOKBACK`, how many previous records describe each target.
    pub lookback: usize,
    /// `HIDDEN_NEURONS`, the width of the hidden layer.
    pub hidden_neurons: usize,
    /// `HIDDEN_ACTIVATION`
    pub hidden_activation: String,
    /// `OUTPUT_ACTIVATION`
    pub output_activation: String,
    /// `EPOCHS`
    pub epochs: usize,
    /// `VALIDATION_SPLIT`, the fraction of rows held out, in `[0, 1)`.
    pub validation_split: f32,
    /// `SEED`, unset for a non reproducible run.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("records"),
            lookback: 10,
            hidden_neurons: 60,
            hidden_activation: "ReLU".to_string(),
            output_activation: "Softmax".to_string(),
            epochs: 1,
            validation_split: 0.25,
            seed: None,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Reads the configuration through `var`, falling back to the defaults for unset keys.
    ///
    /// # Returns
    /// The configuration or an error naming the first unusable value.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            records_path: var("RECORDS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.records_path),
            lookback: parse(&var, "LOOKBACK", defaults.lookback)?,
            hidden_neurons: parse(&var, "HIDDEN_NEURONS", defaults.hidden_neurons)?,
            hidden_activation: var("HIDDEN_ACTIVATION").unwrap_or(defaults.hidden_activation),
            output_activation: var("OUTPUT_ACTIVATION").unwrap_or(defaults.output_activation),
            epochs: parse(&var, "EPOCHS", defaults.epochs)?,
            validation_split: parse(&var, "VALIDATION_SPLIT", defaults.validation_split)?,
            seed: var("SEED").map(|v| parse_value("SEED", &v)).transpose()?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.lookback == 0 {
            return Err(AppErr::Config("LOOKBACK must be at least 1".to_string()));
        }

        if self.hidden_neurons == 0 {
            return Err(AppErr::Config("HIDDEN_NEURONS must be at least 1".to_string()));
        }

        if self.epochs == 0 {
            return Err(AppErr::Config("EPOCHS must be at least 1".to_string()));
        }

        if !(0.0..1.0).contains(&self.validation_split) {
            return Err(AppErr::Config(format!(
                "VALIDATION_SPLIT must be in [0, 1), got {}",
                self.validation_split
            )));
        }

        Ok(())
    }
}

fn parse<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppErr::Config(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        AppConfig::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn unset_keys_take_the_defaults() {
        assert_eq!(config(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn every_key_is_read() {
        let config = config(&[
            ("RECORDS_PATH", "/data/records"),
            ("LOOKBACK", "5"),
            ("HIDDEN_NEURONS", " 16 "),
            ("HIDDEN_ACTIVATION", "Tanh"),
            ("OUTPUT_ACTIVATION", "Sigmoid"),
            ("EPOCHS", "20"),
            ("VALIDATION_SPLIT", "0.1"),
            ("SEED", "7"),
        ])
        .unwrap();

        assert_eq!(
            config,
            AppConfig {
                records_path: PathBuf::from("/data/records"),
                lookback: 5,
                hidden_neurons: 16,
                hidden_activation: "Tanh".to_string(),
                output_activation: "Sigmoid".to_string(),
                epochs: 20,
                validation_split: 0.1,
                seed: Some(7),
            }
        );
    }

    #[test]
    fn unparsable_values_are_config_errors() {
        for pair in [
            ("LOOKBACK", "ten"),
            ("EPOCHS", "-1"),
            ("VALIDATION_SPLIT", "half"),
            ("SEED", "0x10"),
        ] {
            assert!(matches!(config(&[pair]), Err(AppErr::Config(_))), "{pair:?}");
        }
    }

    #[test]
    fn out_of_range_values_are_config_errors() {
        for pair in [
            ("LOOKBACK", "0"),
            ("HIDDEN_NEURONS", "0"),
            ("EPOCHS", "0"),
            ("VALIDATION_SPLIT", "1"),
            ("VALIDATION_SPLIT", "-0.2"),
        ] {
            assert!(matches!(config(&[pair]), Err(AppErr::Config(_))), "{pair:?}");
        }
    }
}

use std::{env, path::PathBuf, str::FromStr};

use crate::{error::StartupErr, trainer::TrainerConfig};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATASET_PATH: &str = "blood-glucose-results.csv";
pub const DEFAULT_MODEL_DIR: &str = "model";

/// Everything the server reads from its environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dataset_path: PathBuf,
    pub model_dir: PathBuf,
    pub trainer: TrainerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            trainer: TrainerConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Recognized variables are `HOST`, `PORT`, `DATASET_PATH`, `MODEL_DIR`,
    /// `SPLIT_SEED` and `COMPARE_ON_TRAIN`. Unset variables take their default.
    ///
    /// # Errors
    /// Returns `StartupErr::Config` if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, StartupErr> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration out of an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StartupErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT", defaults.port)?;
        let dataset_path = lookup("DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.dataset_path);
        let model_dir = lookup("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let trainer = TrainerConfig {
            seed: parse_var(&lookup, "SPLIT_SEED", defaults.trainer.seed)?,
            compare_on_train: match lookup("COMPARE_ON_TRAIN") {
                Some(value) => parse_flag("COMPARE_ON_TRAIN", &value)?,
                None => defaults.trainer.compare_on_train,
            },
            ..defaults.trainer
        };

        Ok(Self {
            host,
            port,
            dataset_path,
            model_dir,
            trainer,
        })
    }

    /// Returns the `host:port` address to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, StartupErr>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| StartupErr::Config {
            var: name,
            value,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, StartupErr> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(StartupErr::Config {
            var: name,
            value: value.to_string(),
            reason: "expected a boolean such as `true` or `false`".to_string(),
        }),
    }
}

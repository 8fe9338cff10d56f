pub mod config;
pub mod diagnostics;
pub mod error;
pub mod http;
pub mod model;
pub mod predictor;
pub mod request;
pub mod trainer;

#[cfg(test)]
pub(crate) mod testing;

use std::{io::Write, str::FromStr, sync::Arc};

use log::{info, warn};
use machine_learning::Dataset;
use model_store::{BlobStore, FsBlobStore};
use tokio::{net::TcpListener, signal};

pub use config::ServerConfig;
pub use error::{ServiceErr, StartupErr};
pub use http::{AppState, router};
pub use predictor::Predictor;
pub use trainer::{TrainReport, Trainer, TrainerConfig};

/// Loads the dataset a server is going to train on.
///
/// # Errors
/// Returns `StartupErr::Dataset` if the file can't be read or is malformed.
pub fn load_dataset(config: &ServerConfig) -> Result<Dataset, StartupErr> {
    let dataset = Dataset::from_path(&config.dataset_path).map_err(|source| StartupErr::Dataset {
        path: config.dataset_path.clone(),
        source,
    })?;

    info!(
        "loaded {} observations from {}",
        dataset.len(),
        config.dataset_path.display()
    );

    if !dataset.is_partitioned() {
        warn!(
            "the dataset has no `userid` column, every user's model is trained on the same observations"
        );
    }

    Ok(dataset)
}

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Serve the HTTP API.
    #[default]
    Serve,
    /// Print the dataset diagnostics.
    Describe,
    /// Print the cross validated comparison of the candidate algorithms.
    Compare,
}

impl FromStr for Mode {
    type Err = StartupErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serve" => Ok(Mode::Serve),
            "describe" => Ok(Mode::Describe),
            "compare" => Ok(Mode::Compare),
            other => Err(StartupErr::UnknownMode(other.to_string())),
        }
    }
}

/// Runs `mode`, writing the reports of the diagnostic modes to `out`.
///
/// # Errors
/// Returns a `StartupErr` if the dataset can't be loaded, the comparison fails or,
/// when serving, the address can't be bound.
pub async fn run<W: Write>(
    mode: Mode,
    config: ServerConfig,
    out: &mut W,
) -> Result<(), StartupErr> {
    match mode {
        Mode::Serve => serve(config).await,
        Mode::Describe => {
            let dataset = load_dataset(&config)?;
            write!(out, "{}", diagnostics::describe(&dataset))?;
            Ok(())
        }
        Mode::Compare => {
            let dataset = load_dataset(&config)?;
            let report =
                diagnostics::compare(&dataset, &config.trainer).map_err(StartupErr::Comparison)?;
            write!(out, "{report}")?;
            Ok(())
        }
    }
}

/// Runs the HTTP service until ctrl-c is received.
///
/// The dataset is loaded before binding, so a broken dataset keeps the server from
/// ever accepting connections.
///
/// # Errors
/// Returns a `StartupErr` if the dataset can't be loaded or the address can't be bound.
pub async fn serve(config: ServerConfig) -> Result<(), StartupErr> {
    let dataset = load_dataset(&config)?;

    let backend: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(&config.model_dir));
    let state = AppState::new(dataset, backend, config.trainer);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupErr::Bind {
            addr: addr.clone(),
            source,
        })?;

    info!(
        "listening at {addr}, models are stored in {}",
        config.model_dir.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("wrapping up, bye");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c, shutting down"),
        Err(e) => {
            warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    }
}

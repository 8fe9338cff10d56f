use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use machine_learning::Dataset;
use model_store::{BlobStore, ModelStore};
use serde_json::{Value, json};
use tokio::task;

use crate::{
    error::ServiceErr,
    predictor::Predictor,
    request::{PredictRequest, TrainRequest},
    trainer::{TrainReport, Trainer, TrainerConfig},
};

/// What every handler gets to work with.
#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    trainer: Arc<Trainer>,
    predictor: Arc<Predictor>,
}

impl AppState {
    /// Creates a new `AppState` whose trainer and predictor share a model store over
    /// `backend`.
    pub fn new(dataset: Dataset, backend: Arc<dyn BlobStore>, config: TrainerConfig) -> Self {
        let dataset = Arc::new(dataset);
        let store = Arc::new(ModelStore::new(backend));

        Self {
            trainer: Arc::new(Trainer::new(Arc::clone(&dataset), Arc::clone(&store), config)),
            predictor: Arc::new(Predictor::new(store)),
            dataset,
        }
    }
}

/// Builds the service's routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/train", post(train))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .with_state(state)
}

async fn train(
    State(state): State<AppState>,
    body: Result<Json<TrainRequest>, JsonRejection>,
) -> Result<Json<TrainReport>, ServiceErr> {
    let request = json_body(body)?;

    let trainer = Arc::clone(&state.trainer);
    let report = blocking(move || trainer.train(&request.user)).await?;
    Ok(Json(report))
}

async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<f64>, ServiceErr> {
    let request = json_body(body)?;

    let predictor = Arc::clone(&state.predictor);
    let prediction =
        blocking(move || predictor.predict(&request.user, &request.observation)).await?;
    Ok(Json(prediction))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "samples": state.dataset.len() }))
}

/// Reports any rejected body, malformed or missing a field, as a client error.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceErr> {
    body.map(|Json(request)| request)
        .map_err(|e| ServiceErr::ClientInput(e.body_text()))
}

/// Runs `f` on the blocking pool.
async fn blocking<F, T>(f: F) -> Result<T, ServiceErr>
where
    F: FnOnce() -> Result<T, ServiceErr> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceErr::Internal(format!("worker task failed: {e}")))?
}

use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, mpsc},
};

use glucose_server::{AppState, ServerConfig, StartupErr, TrainerConfig, load_dataset, router};
use machine_learning::Dataset;
use model_store::{BlobStore, FsBlobStore, Key};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[allow(dead_code)]
#[path = "../src/testing/sample.rs"]
mod sample;

use sample::sample_csv;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("glucose_server_{name}_{:016x}", rand::random::<u64>()))
}

struct TestServer {
    addr: SocketAddr,
    model_dir: PathBuf,
    client: Client,
}

impl TestServer {
    async fn start(name: &str) -> Self {
        let model_dir = temp_dir(name);
        let backend = Arc::new(FsBlobStore::new(&model_dir));
        Self::start_with(model_dir, backend, TrainerConfig::default()).await
    }

    async fn start_with(
        model_dir: PathBuf,
        backend: Arc<dyn BlobStore>,
        config: TrainerConfig,
    ) -> Self {
        let dataset = Dataset::from_reader(sample_csv(60).as_bytes()).unwrap();
        let state = AppState::new(dataset, backend, config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await });

        Self {
            addr,
            model_dir,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let resp = self.client.post(self.url(path)).json(body).send().await.unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn train(&self, user: &str) -> (StatusCode, Value) {
        self.post("/train", &json!({ "userid": user })).await
    }

    async fn predict(&self, user: &str) -> (StatusCode, Value) {
        self.post(
            "/predict",
            &json!({
                "userid": user,
                "pf_time_of_day": 1,
                "bg_value": 120,
                "food_value": 2,
                "exercise_value": 0,
                "ins_value": 4
            }),
        )
        .await
    }

    fn model_path(&self, user: &str) -> PathBuf {
        self.model_dir.join(format!("model_user_{user}.pkl"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.model_dir);
    }
}

#[tokio::test]
async fn health_reports_dataset_size() {
    let server = TestServer::start("health").await;
    let resp = server.client.get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "samples": 60 }));
}

#[tokio::test]
async fn train_then_predict() {
    let server = TestServer::start("train_predict").await;

    let (status, body) = server.train("42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "Success",
            "userid": "42",
            "train_samples": 48,
            "validation_samples": 12
        })
    );
    assert!(server.model_path("42").is_file());

    let (status, body) = server.predict("42").await;
    assert_eq!(status, StatusCode::OK);
    let prediction = body.as_f64().unwrap();
    assert!((prediction - 4.0).abs() < 0.2, "predicted {prediction}");
}

#[tokio::test]
async fn integer_userid_shares_the_string_model() {
    let server = TestServer::start("integer_id").await;

    let (status, _) = server.post("/train", &json!({ "userid": 7 })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(server.model_path("7").is_file());

    let (status, _) = server.predict("7").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn predict_before_train_is_not_found() {
    let server = TestServer::start("not_found").await;

    let (status, body) = server.predict("ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn missing_userid_is_a_bad_request() {
    let server = TestServer::start("missing_id").await;

    let (status, body) = server.post("/train", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("userid"));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let server = TestServer::start("malformed").await;

    let resp = server
        .client
        .post(server.url("/train"))
        .header("content-type", "application/json")
        .body("{\"userid\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .post(server.url("/train"))
        .body("userid=1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_prediction_field_is_a_bad_request() {
    let server = TestServer::start("missing_field").await;
    server.train("1").await;

    let (status, body) = server
        .post(
            "/predict",
            &json!({
                "userid": "1",
                "pf_time_of_day": 1,
                "bg_value": 120,
                "food_value": 2,
                "exercise_value": 0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("ins_value"));
}

#[tokio::test]
async fn path_traversal_is_rejected() {
    let server = TestServer::start("traversal").await;

    for user in ["../escape", "a/b", "..", ""] {
        let (status, _) = server.train(user).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{user:?} should be rejected");
    }

    let parent = server.model_dir.parent().unwrap();
    assert!(!parent.join("model_user_escape.pkl").exists());
}

#[tokio::test]
async fn corrupt_model_is_a_server_error() {
    let server = TestServer::start("corrupt").await;

    fs::create_dir_all(&server.model_dir).unwrap();
    fs::write(server.model_path("broken"), b"\x80\x04\x95 not json").unwrap();

    let (status, body) = server.predict("broken").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_trains_and_predicts() {
    let server = Arc::new(TestServer::start("concurrent").await);
    let (status, _) = server.train("busy").await;
    assert_eq!(status, StatusCode::OK);

    let mut handles = Vec::new();
    for i in 0..16 {
        let server = Arc::clone(&server);
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                server.train("busy").await.0
            } else {
                server.predict("busy").await.0
            }
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
}

/// Holds every write between its temporary file and the rename until released.
struct HeldWrites {
    inner: FsBlobStore,
    staged: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl BlobStore for HeldWrites {
    fn put(&self, key: &Key, blob: &[u8]) -> model_store::Result<()> {
        let staged = self.inner.stage(key, blob)?;
        let _ = self.staged.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv();
        staged.commit()
    }

    fn get(&self, key: &Key) -> model_store::Result<Vec<u8>> {
        self.inner.get(key)
    }
}

fn temporary_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter(|entry| {
            let name = entry.as_ref().unwrap().file_name();
            name.to_string_lossy().ends_with(".tmp")
        })
        .count()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn predict_during_a_held_train_serves_the_previous_model() {
    let model_dir = temp_dir("held");

    // Seeds 7 and 8 split the rows differently, so the two servers fit different
    // models for the same user.
    let first = TestServer::start_with(
        model_dir.clone(),
        Arc::new(FsBlobStore::new(&model_dir)),
        TrainerConfig::default(),
    )
    .await;
    let (status, _) = first.train("slow").await;
    assert_eq!(status, StatusCode::OK);
    let (_, before) = first.predict("slow").await;
    let stored = fs::read(first.model_path("slow")).unwrap();

    let (staged_tx, staged_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let backend = Arc::new(HeldWrites {
        inner: FsBlobStore::new(&model_dir),
        staged: Mutex::new(staged_tx),
        release: Mutex::new(release_rx),
    });
    let second = Arc::new(
        TestServer::start_with(
            model_dir.clone(),
            backend,
            TrainerConfig {
                seed: 8,
                ..TrainerConfig::default()
            },
        )
        .await,
    );

    let training = {
        let second = Arc::clone(&second);
        tokio::spawn(async move { second.train("slow").await.0 })
    };
    tokio::task::spawn_blocking(move || staged_rx.recv())
        .await
        .unwrap()
        .unwrap();

    // The new model sits in a temporary file, the entry still holds the old one.
    assert_eq!(temporary_files(&model_dir), 1);
    assert_eq!(fs::read(second.model_path("slow")).unwrap(), stored);
    for _ in 0..5 {
        let (status, during) = second.predict("slow").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(during, before);
    }

    release_tx.send(()).unwrap();
    assert_eq!(training.await.unwrap(), StatusCode::OK);

    assert_eq!(temporary_files(&model_dir), 0);
    let (status, after) = second.predict("slow").await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(after, before);
}

#[test]
fn unreadable_dataset_is_a_startup_error() {
    let dir = temp_dir("startup");
    let config = ServerConfig::from_lookup(|name| match name {
        "DATASET_PATH" => Some(dir.join("missing.csv").display().to_string()),
        _ => None,
    })
    .unwrap();

    assert!(matches!(load_dataset(&config), Err(StartupErr::Dataset { .. })));
}

#[test]
fn dataset_is_loaded_from_the_configured_path() {
    let dir = temp_dir("dataset");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bg.csv");
    fs::write(&path, sample_csv(10)).unwrap();

    let config = ServerConfig::from_lookup(|name| match name {
        "DATASET_PATH" => Some(path.display().to_string()),
        _ => None,
    })
    .unwrap();
    let dataset = load_dataset(&config).unwrap();
    assert_eq!(dataset.len(), 10);

    fs::remove_dir_all(dir).unwrap();
}

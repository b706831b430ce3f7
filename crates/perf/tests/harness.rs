//! End-to-end harness tests against in-process stub servers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use taskcheck_perf::{
    ExperimentRunner, PerfConfig, PerfError, PerformanceTester, ProfileKind, TodoProfile,
};

#[derive(Clone, Default)]
struct Counters {
    posts: Arc<AtomicUsize>,
    puts: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
}

/// Serve a stub collection on an ephemeral port and return its base URL
/// plus the request counters.
async fn serve_stub() -> (String, Counters) {
    let counters = Counters::default();

    let app = Router::new()
        .route(
            "/todos",
            get(|State(c): State<Counters>| async move {
                c.gets.fetch_add(1, Ordering::SeqCst);
                Json(json!({"todos": []}))
            })
            .post(|State(c): State<Counters>| async move {
                let n = c.posts.fetch_add(1, Ordering::SeqCst) + 1;
                Json(json!({"id": n.to_string()}))
            }),
        )
        .route(
            "/todos/:id",
            get(|| async { Json(json!({})) })
                .put(|State(c): State<Counters>| async move {
                    c.puts.fetch_add(1, Ordering::SeqCst);
                    Json(json!({}))
                })
                .delete(|State(c): State<Counters>| async move {
                    c.deletes.fetch_add(1, Ordering::SeqCst);
                    Json(json!({}))
                }),
        )
        .with_state(counters.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });

    (format!("http://{addr}"), counters)
}

fn fast_config(base_url: &str) -> PerfConfig {
    PerfConfig {
        sample_interval: Duration::from_millis(10),
        cooldown: Duration::from_millis(10),
        load_levels: vec![3],
        ..PerfConfig::with_base_url(base_url)
    }
}

#[tokio::test]
async fn experiment_drives_every_phase_once_per_object() {
    let (base_url, counters) = serve_stub().await;
    let config = fast_config(&base_url);

    let mut tester = PerformanceTester::new(&config, TodoProfile).expect("build tester");
    let result = tester.run_experiment(3).await;

    assert_eq!(counters.posts.load(Ordering::SeqCst), 3);
    assert_eq!(counters.puts.load(Ordering::SeqCst), 3);
    assert_eq!(counters.deletes.load(Ordering::SeqCst), 3);
    assert_eq!(counters.gets.load(Ordering::SeqCst), 1);

    assert_eq!(result.endpoint, "todos");
    assert_eq!(result.load, 3);
    assert!(result.create.seconds >= 0.0);
    assert!(result.get.seconds >= 0.0);
}

#[tokio::test]
async fn zero_objects_is_a_valid_experiment() {
    let (base_url, counters) = serve_stub().await;
    let config = fast_config(&base_url);

    let mut tester = PerformanceTester::new(&config, TodoProfile).expect("build tester");
    let result = tester.run_experiment(0).await;

    // No per-object traffic; the GET phase still reads the collection
    assert_eq!(counters.posts.load(Ordering::SeqCst), 0);
    assert_eq!(counters.puts.load(Ordering::SeqCst), 0);
    assert_eq!(counters.deletes.load(Ordering::SeqCst), 0);
    assert_eq!(counters.gets.load(Ordering::SeqCst), 1);
    assert_eq!(result.load, 0);
}

#[tokio::test]
async fn runner_covers_every_requested_kind_and_load() {
    let (base_url, counters) = serve_stub().await;
    let config = PerfConfig {
        load_levels: vec![1, 2],
        ..fast_config(&base_url)
    };

    let runner = ExperimentRunner::new(config);
    let results = runner.run(&[ProfileKind::Todos]).await.expect("run");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].load, 1);
    assert_eq!(results[1].load, 2);
    assert_eq!(counters.posts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn runner_refuses_an_unreachable_target() {
    let config = fast_config("http://127.0.0.1:1");
    let runner = ExperimentRunner::new(config);

    let err = runner.run(&[ProfileKind::Todos]).await.unwrap_err();
    assert!(matches!(err, PerfError::Unreachable { .. }));
}

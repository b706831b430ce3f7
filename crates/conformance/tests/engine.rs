//! Engine tests against in-process stub servers
//!
//! Each test spins up an axum router on an ephemeral port and drives the
//! spec runner against it, so engine behavior is verified without the
//! real server jar.

use axum::extract::Path;
use axum::http::header::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use taskcheck_conformance::{
    CheckError, HarnessConfig, IdSource, Method, ResourceKind, RunnerConfig, SpecRunner,
    SuiteRunner, TestSpec,
};

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn runner(base_url: &str) -> SpecRunner {
    SpecRunner::new(&HarnessConfig::with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn subset_template_is_located_through_the_wrapper() {
    let router = Router::new().route(
        "/todos/1",
        get(|| async {
            Json(json!({
                "todos": [{"id": "1", "title": "scan paperwork", "description": ""}]
            }))
        }),
    );
    let base = serve(router).await;

    let spec = TestSpec::new("get_todo_1", Method::Get, "/todos/1")
        .expect_body(json!({"id": "1", "title": "scan paperwork"}));

    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn status_mismatch_names_both_codes() {
    let router = Router::new();
    let base = serve(router).await;

    let spec = TestSpec::new("get_missing", Method::Get, "/nothing-here");
    let err = runner(&base).run(&spec).await.unwrap_err();

    match err {
        CheckError::StatusMismatch { expected, actual, .. } => {
            assert_eq!(expected, vec![200]);
            assert_eq!(actual, 404);
        }
        other => panic!("expected StatusMismatch, got {other}"),
    }
}

#[tokio::test]
async fn setup_objects_feed_id_replacements() {
    let router = Router::new()
        .route("/projects", post(|| async { Json(json!({"id": "7"})) }))
        .route(
            "/projects/:id",
            get(|Path(id): Path<String>| async move { Json(json!({"id": id})) }),
        );
    let base = serve(router).await;

    let spec = TestSpec::new("get_setup_project", Method::Get, "/projects/{id}")
        .setup(ResourceKind::Project, json!({"title": "Test Project"}))
        .replace("{id}", IdSource::Setup(ResourceKind::Project))
        .expect_body(json!({"id": "7"}));

    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn unresolved_placeholders_stay_verbatim_in_the_url() {
    // The documented-bug fixtures rely on the literal {id} reaching the server
    let router = Router::new().route(
        "/todos/:id/tasksof",
        get(|Path(id): Path<String>| async move { Json(json!({"seen": id})) }),
    );
    let base = serve(router).await;

    let spec = TestSpec::new("bug_literal_id", Method::Get, "/todos/{id}/tasksof")
        .expect_body(json!({"seen": "{id}"}));

    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn fallback_and_literal_sources_substitute() {
    let router = Router::new().route(
        "/todos/:id/categories/:id2",
        get(|Path((id, id2)): Path<(String, String)>| async move {
            Json(json!({"id": id, "id2": id2}))
        }),
    );
    let base = serve(router).await;

    let spec = TestSpec::new("both_sources", Method::Get, "/todos/{id}/categories/{id2}")
        .replace("{id}", IdSource::Fallback)
        .replace("{id2}", IdSource::Literal("9".to_string()))
        .expect_body(json!({"id": "1", "id2": "9"}));

    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn head_requests_must_not_carry_a_body() {
    // axum answers HEAD for GET routes with the body stripped
    let router = Router::new().route("/todos", get(|| async { Json(json!({"todos": []})) }));
    let base = serve(router).await;

    let spec = TestSpec::new("head_todos", Method::Head, "/todos").check_headers();
    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn expected_headers_check_presence_and_value() {
    let router = Router::new().route(
        "/todos",
        get(|| async {
            let mut headers = HeaderMap::new();
            headers.insert("x-custom", "yes".parse().unwrap());
            (headers, Json(json!({"todos": []})))
        }),
    );
    let base = serve(router).await;

    let spec = TestSpec::new("headers_ok", Method::Get, "/todos")
        .expect_header("x-custom", "yes")
        .expect_header("content-type", "*");
    runner(&base).run(&spec).await.unwrap();

    let spec = TestSpec::new("header_wrong_value", Method::Get, "/todos")
        .expect_header("x-custom", "no");
    let err = runner(&base).run(&spec).await.unwrap_err();
    assert!(matches!(err, CheckError::HeaderMismatch { .. }));

    let spec = TestSpec::new("header_missing", Method::Get, "/todos")
        .expect_header("x-absent", "*");
    let err = runner(&base).run(&spec).await.unwrap_err();
    assert!(matches!(err, CheckError::HeaderMissing(_)));
}

#[tokio::test]
async fn xml_responses_convert_and_match() {
    let router = Router::new().route(
        "/projects",
        get(|| async {
            (
                [("content-type", "application/xml")],
                "<projects><project><id>1</id><title>Office Work</title></project></projects>",
            )
        }),
    );
    let base = serve(router).await;

    let spec = TestSpec::new("get_projects_xml", Method::Get, "/projects")
        .xml()
        .expect_body(json!({"title": "Office Work"}));
    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn unparseable_body_fails_unless_tolerated() {
    let router = Router::new().route("/todos", get(|| async { "this is not json" }));
    let base = serve(router).await;

    let spec = TestSpec::new("wants_json", Method::Get, "/todos")
        .expect_body(json!({"todos": []}));
    let err = runner(&base).run(&spec).await.unwrap_err();
    assert!(matches!(err, CheckError::BodyParse(_)));

    let spec = TestSpec::new("tolerates_text", Method::Get, "/todos")
        .expect_body(json!({"todos": []}))
        .tolerate_non_json();
    runner(&base).run(&spec).await.unwrap();
}

#[tokio::test]
async fn connection_refused_is_a_hard_failure_not_a_panic() {
    // Bind and immediately drop a listener so the port is closed
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let spec = TestSpec::new("unreachable", Method::Get, "/todos");
    let err = runner(&format!("http://{addr}")).run(&spec).await.unwrap_err();

    match err {
        CheckError::Connection { method, url, .. } => {
            assert_eq!(method, "GET");
            assert!(url.ends_with("/todos"));
        }
        other => panic!("expected Connection, got {other}"),
    }
}

#[tokio::test]
async fn suite_runner_accumulates_failures_without_aborting() {
    let router = Router::new().route("/todos", get(|| async { Json(json!({"todos": []})) }));
    let base = serve(router).await;

    let specs = vec![
        TestSpec::new("passes", Method::Get, "/todos"),
        TestSpec::new("fails_on_status", Method::Get, "/absent").expect_status(&[200]),
        TestSpec::new("also_passes", Method::Get, "/todos"),
    ];
    let config = RunnerConfig {
        harness: HarnessConfig::with_base_url(&base),
        shuffle_seed: None,
        server: None,
    };

    let report = SuiteRunner::new(config, specs).run().await.unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 2);
    assert_eq!(report.failed, 1);
    let failed = report.results.iter().find(|r| !r.passed).unwrap();
    assert_eq!(failed.name, "fails_on_status");
    assert!(failed.error.as_deref().unwrap().contains("404"));
}

#[tokio::test]
async fn shuffled_runs_cover_every_case() {
    let router = Router::new().route("/todos", get(|| async { Json(json!({"todos": []})) }));
    let base = serve(router).await;

    let specs: Vec<TestSpec> = (0..5)
        .map(|i| TestSpec::new(format!("case_{i}"), Method::Get, "/todos"))
        .collect();
    let config = RunnerConfig {
        harness: HarnessConfig::with_base_url(&base),
        shuffle_seed: Some(1234),
        server: None,
    };

    let report = SuiteRunner::new(config, specs).run().await.unwrap();
    assert_eq!(report.total, 5);
    assert_eq!(report.passed, 5);
}

//! Timed create/update/delete/get batches with per-phase resource windows

use std::time::Instant;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::PerfConfig;
use crate::error::PerfResult;
use crate::monitor::{ResourceMonitor, ResourceStats};

/// A resource kind the harness can exercise: which collection to hit and
/// what a plausible payload for it looks like.
pub trait ResourceProfile {
    /// Collection name, e.g. `todos`
    fn endpoint(&self) -> &'static str;

    fn generate_payload(&self) -> Value;
}

pub struct TodoProfile;

impl ResourceProfile for TodoProfile {
    fn endpoint(&self) -> &'static str {
        "todos"
    }

    fn generate_payload(&self) -> Value {
        let mut rng = rand::thread_rng();
        json!({
            "title": random_letters(10),
            "description": random_lowercase(20),
            "doneStatus": rng.gen_bool(0.5),
        })
    }
}

pub struct ProjectProfile;

impl ResourceProfile for ProjectProfile {
    fn endpoint(&self) -> &'static str {
        "projects"
    }

    fn generate_payload(&self) -> Value {
        let mut rng = rand::thread_rng();
        json!({
            "title": format!("Proj-{}", random_letters(8)),
            "completed": rng.gen_bool(0.5),
            "active": true,
            "description": "Project test description",
        })
    }
}

pub struct CategoryProfile;

impl ResourceProfile for CategoryProfile {
    fn endpoint(&self) -> &'static str {
        "categories"
    }

    fn generate_payload(&self) -> Value {
        json!({
            "title": random_letters(10),
            "description": random_lowercase(20),
        })
    }
}

fn random_letters(len: usize) -> String {
    const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

fn random_lowercase(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect()
}

/// Timing and resource statistics for one phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStats {
    pub seconds: f64,
    pub resources: ResourceStats,
}

/// One row per (resource kind, load level)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub endpoint: String,
    pub load: usize,
    pub create: PhaseStats,
    pub update: PhaseStats,
    pub delete: PhaseStats,
    pub get: PhaseStats,
}

/// Drives timed batches against one collection.
///
/// Per-object network errors are logged and swallowed so one flaky call
/// cannot void a whole experiment; later phases simply see fewer tracked
/// ids. Phases run strictly in order, each inside its own monitor window.
pub struct PerformanceTester<P: ResourceProfile> {
    client: reqwest::Client,
    base_url: String,
    profile: P,
    monitor: ResourceMonitor,
}

impl<P: ResourceProfile> PerformanceTester<P> {
    pub fn new(config: &PerfConfig, profile: P) -> PerfResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile,
            monitor: ResourceMonitor::new(config.sample_interval),
        })
    }

    pub async fn run_experiment(&mut self, num_objects: usize) -> ExperimentResult {
        let target = format!("{}/{}", self.base_url, self.profile.endpoint());
        info!(
            "experiment ({}): load = {} object(s)",
            self.profile.endpoint(),
            num_objects
        );

        self.monitor.start().await;
        let start = Instant::now();
        let ids = self.create_all(&target, num_objects).await;
        let create = PhaseStats {
            seconds: round4(start.elapsed().as_secs_f64()),
            resources: self.monitor.stop().await,
        };
        debug!("create phase tracked {} id(s)", ids.len());

        self.monitor.start().await;
        let start = Instant::now();
        self.update_all(&target, &ids).await;
        let update = PhaseStats {
            seconds: round4(start.elapsed().as_secs_f64()),
            resources: self.monitor.stop().await,
        };

        self.monitor.start().await;
        let start = Instant::now();
        self.delete_all(&target, &ids).await;
        let delete = PhaseStats {
            seconds: round4(start.elapsed().as_secs_f64()),
            resources: self.monitor.stop().await,
        };

        self.monitor.start().await;
        let start = Instant::now();
        self.get_collection(&target).await;
        let get = PhaseStats {
            seconds: round4(start.elapsed().as_secs_f64()),
            resources: self.monitor.stop().await,
        };

        ExperimentResult {
            endpoint: self.profile.endpoint().to_string(),
            load: num_objects,
            create,
            update,
            delete,
            get,
        }
    }

    async fn create_all(&self, target: &str, num_objects: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(num_objects);
        for _ in 0..num_objects {
            let payload = self.profile.generate_payload();
            match self.client.post(target).json(&payload).send().await {
                Ok(resp) if [200, 201].contains(&resp.status().as_u16()) => {
                    if let Ok(body) = resp.json::<Value>().await {
                        if let Some(id) = body.get("id").and_then(Value::as_str) {
                            ids.push(id.to_string());
                        }
                    }
                }
                Ok(resp) => debug!("create returned {}", resp.status()),
                Err(e) => warn!("create request failed: {e}"),
            }
        }
        ids
    }

    async fn update_all(&self, target: &str, ids: &[String]) {
        for id in ids {
            let payload = self.profile.generate_payload();
            if let Err(e) = self
                .client
                .put(format!("{target}/{id}"))
                .json(&payload)
                .send()
                .await
            {
                warn!("update request failed for id {id}: {e}");
            }
        }
    }

    async fn delete_all(&self, target: &str, ids: &[String]) {
        for id in ids {
            if let Err(e) = self.client.delete(format!("{target}/{id}")).send().await {
                warn!("delete request failed for id {id}: {e}");
            }
        }
    }

    async fn get_collection(&self, target: &str) {
        if let Err(e) = self.client.get(target).send().await {
            warn!("get request failed: {e}");
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_payload_has_the_expected_shape() {
        let payload = TodoProfile.generate_payload();
        assert_eq!(payload["title"].as_str().unwrap().len(), 10);
        assert_eq!(payload["description"].as_str().unwrap().len(), 20);
        assert!(payload["doneStatus"].is_boolean());
    }

    #[test]
    fn project_payload_has_the_expected_shape() {
        let payload = ProjectProfile.generate_payload();
        assert!(payload["title"].as_str().unwrap().starts_with("Proj-"));
        assert_eq!(payload["active"], Value::Bool(true));
        assert!(payload["completed"].is_boolean());
    }

    #[test]
    fn category_payload_has_the_expected_shape() {
        let payload = CategoryProfile.generate_payload();
        assert_eq!(payload["title"].as_str().unwrap().len(), 10);
        assert_eq!(payload["description"].as_str().unwrap().len(), 20);
    }

    #[test]
    fn random_strings_use_their_alphabets() {
        assert!(random_lowercase(50).chars().all(|c| c.is_ascii_lowercase()));
        assert!(random_letters(50).chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn timings_round_to_four_decimals() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(2.0), 2.0);
    }
}

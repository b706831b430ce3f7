//! Server process management for restart-per-case isolation

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{CheckError, CheckResult};

/// Configuration for spawning the target server jar
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the Todo Manager jar
    pub jar_path: PathBuf,

    /// Base URL the spawned server listens on
    pub base_url: String,

    /// How long to wait for the server to reach a clean state
    pub startup_timeout: Duration,

    /// Delay between readiness polls
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            jar_path: PathBuf::from("runTodoManagerRestAPI-1.5.5.jar"),
            base_url: "http://localhost:4567".to_string(),
            startup_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
        }
    }
}

/// Handle to a running server process.
///
/// Readiness means more than a 200: the default state (todos "1" and "2",
/// nothing else) must be verified, because a dirty database invalidates
/// every fixture that relies on predictable ids.
pub struct ServerHandle {
    child: Child,
}

impl ServerHandle {
    pub async fn spawn(config: ServerConfig) -> CheckResult<Self> {
        debug!("spawning java -jar {}", config.jar_path.display());

        let child = Command::new("java")
            .arg("-jar")
            .arg(&config.jar_path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                CheckError::ServerStartup(format!(
                    "failed to spawn java -jar {}: {e}",
                    config.jar_path.display()
                ))
            })?;

        let handle = ServerHandle { child };
        handle.wait_for_clean_state(&config).await?;
        Ok(handle)
    }

    async fn wait_for_clean_state(&self, config: &ServerConfig) -> CheckResult<()> {
        let url = format!("{}/todos", config.base_url.trim_end_matches('/'));
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < config.startup_timeout {
            attempts += 1;
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: Value = resp.json().await.unwrap_or(Value::Null);
                    if is_clean_state(&body) {
                        info!(
                            "server ready with clean state after {:.1}s",
                            start.elapsed().as_secs_f64()
                        );
                        return Ok(());
                    }
                    warn!("server responding but state is dirty, still waiting");
                }
                Ok(resp) => warn!("readiness poll returned {}", resp.status()),
                Err(e) => {
                    // Connection refused is expected while the jar boots
                    if !e.is_connect() {
                        warn!("readiness poll error: {e}");
                    }
                }
            }
            sleep(config.poll_interval).await;
        }

        Err(CheckError::ServerNotReady(attempts))
    }

    pub async fn stop(&mut self) -> CheckResult<()> {
        debug!("stopping server (pid: {})", self.child.id());
        if self.terminate() {
            sleep(SHUTDOWN_GRACE).await;
        }
        self.reap();
        Ok(())
    }

    /// Send SIGTERM; false when the signal could not be delivered
    /// (the process is already gone, or a non-unix platform)
    fn terminate(&mut self) -> bool {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            return kill(pid, Signal::SIGTERM).is_ok();
        }
        #[cfg(not(unix))]
        false
    }

    fn reap(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

impl Drop for ServerHandle {
    fn drop(&mut self) {
        // No runtime available here, so the grace period blocks; the
        // runner path goes through the async `stop`
        if self.terminate() {
            std::thread::sleep(SHUTDOWN_GRACE);
        }
        self.reap();
    }
}

/// The default state has exactly the two seed todos with ids "1" and "2"
fn is_clean_state(body: &Value) -> bool {
    let Some(todos) = body.get("todos").and_then(Value::as_array) else {
        return false;
    };
    if todos.len() != 2 {
        return false;
    }
    let ids: Vec<&str> = todos
        .iter()
        .filter_map(|t| t.get("id").and_then(Value::as_str))
        .collect();
    ids.contains(&"1") && ids.contains(&"2")
}

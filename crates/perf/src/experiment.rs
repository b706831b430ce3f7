//! Experiment orchestration: resource kinds, load levels, cooldowns

use tracing::{debug, info};

use crate::config::PerfConfig;
use crate::error::{PerfError, PerfResult};
use crate::tester::{
    CategoryProfile, ExperimentResult, PerformanceTester, ProjectProfile, TodoProfile,
};

/// Resource kind to exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Todos,
    Projects,
    Categories,
}

impl ProfileKind {
    pub const ALL: [ProfileKind; 3] = [
        ProfileKind::Todos,
        ProfileKind::Projects,
        ProfileKind::Categories,
    ];
}

/// Runs every (kind, load level) combination sequentially.
///
/// Experiments share the machine, so they never overlap and each is
/// followed by a cooldown pause to let the previous one's load drain
/// before the next baseline is captured.
pub struct ExperimentRunner {
    config: PerfConfig,
}

impl ExperimentRunner {
    pub fn new(config: PerfConfig) -> Self {
        Self { config }
    }

    /// Check the target answers at all before investing in experiments.
    pub async fn preflight(&self) -> PerfResult<()> {
        let url = format!(
            "{}/todos",
            self.config.base_url.trim_end_matches('/')
        );
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()?;
        client
            .get(&url)
            .send()
            .await
            .map_err(|source| PerfError::Unreachable {
                url: url.clone(),
                source,
            })?;
        debug!("preflight OK against {url}");
        Ok(())
    }

    pub async fn run(&self, kinds: &[ProfileKind]) -> PerfResult<Vec<ExperimentResult>> {
        self.preflight().await?;

        let mut results = Vec::new();
        for &kind in kinds {
            for &load in &self.config.load_levels {
                let result = self.run_one(kind, load).await?;
                results.push(result);
                info!("cooling down for {:?}", self.config.cooldown);
                tokio::time::sleep(self.config.cooldown).await;
            }
        }
        Ok(results)
    }

    async fn run_one(&self, kind: ProfileKind, load: usize) -> PerfResult<ExperimentResult> {
        match kind {
            ProfileKind::Todos => {
                let mut tester = PerformanceTester::new(&self.config, TodoProfile)?;
                Ok(tester.run_experiment(load).await)
            }
            ProfileKind::Projects => {
                let mut tester = PerformanceTester::new(&self.config, ProjectProfile)?;
                Ok(tester.run_experiment(load).await)
            }
            ProfileKind::Categories => {
                let mut tester = PerformanceTester::new(&self.config, CategoryProfile)?;
                Ok(tester.run_experiment(load).await)
            }
        }
    }
}

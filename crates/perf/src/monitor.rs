//! Baseline-relative CPU and memory sampling
//!
//! A monitor owns at most one active sample window: `start()` captures an
//! idle baseline and spawns a background task that pushes periodic samples
//! into a bounded channel; `stop()` drains the channel and reduces the
//! samples to averages and baseline deltas.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::System;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Statistics from one sample window.
///
/// `cpu_increase` is floored at zero (negative drift is noise, not a
/// release of load); `mem_consumed_mb` is not floored, a negative value
/// means memory pressure relaxed below the baseline and is valid data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceStats {
    pub avg_cpu_percent: f64,
    pub avg_mem_free_mb: f64,
    pub cpu_increase: f64,
    pub mem_consumed_mb: f64,
}

impl ResourceStats {
    pub fn zeroed() -> Self {
        Self {
            avg_cpu_percent: 0.0,
            avg_mem_free_mb: 0.0,
            cpu_increase: 0.0,
            mem_consumed_mb: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    cpu_percent: f64,
    mem_free_mb: f64,
}

struct SampleWindow {
    task: JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
    samples_rx: mpsc::Receiver<Sample>,
    baseline_cpu: f64,
    baseline_mem_free: f64,
}

/// System-wide resource monitor with a start/stop lifecycle.
pub struct ResourceMonitor {
    interval: Duration,
    window: Option<SampleWindow>,
}

/// Settle delay before the baseline reading; the first reading of an
/// interval-based CPU meter is a known zero artifact.
const BASELINE_SETTLE: Duration = Duration::from_millis(500);

const SAMPLE_CHANNEL_CAPACITY: usize = 4096;

impl ResourceMonitor {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window: None,
        }
    }

    /// Capture the baseline and launch the background sampler.
    /// A no-op when a window is already active.
    pub async fn start(&mut self) {
        if self.window.is_some() {
            debug!("monitor already sampling, ignoring start");
            return;
        }

        let mut sys = System::new();
        sys.refresh_cpu_usage(); // prime the CPU counter
        tokio::time::sleep(BASELINE_SETTLE).await;
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        let baseline_cpu = sys.global_cpu_usage() as f64;
        let baseline_mem_free = mem_free_mb(&sys);
        debug!(
            "baseline captured: cpu {:.2}%, free memory {:.2} MB",
            baseline_cpu, baseline_mem_free
        );

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (samples_tx, samples_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sys.refresh_cpu_usage();
                        sys.refresh_memory();
                        let sample = Sample {
                            cpu_percent: sys.global_cpu_usage() as f64,
                            mem_free_mb: mem_free_mb(&sys),
                        };
                        // A full channel drops the sample instead of
                        // blocking; the tick loop must stay responsive to
                        // the stop signal no matter how long a window runs
                        match samples_tx.try_send(sample) {
                            Err(mpsc::error::TrySendError::Closed(_)) => break,
                            _ => {}
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }
        });

        self.window = Some(SampleWindow {
            task,
            stop_tx,
            samples_rx,
            baseline_cpu,
            baseline_mem_free,
        });
    }

    /// Signal the sampler, wait for it to finish, and reduce the window.
    /// Without a prior `start()` this returns zero-filled statistics.
    pub async fn stop(&mut self) -> ResourceStats {
        let Some(mut window) = self.window.take() else {
            return ResourceStats::zeroed();
        };

        let _ = window.stop_tx.send(true);
        let _ = window.task.await;

        let mut cpu_log = Vec::new();
        let mut mem_log = Vec::new();
        while let Ok(sample) = window.samples_rx.try_recv() {
            cpu_log.push(sample.cpu_percent);
            mem_log.push(sample.mem_free_mb);
        }
        debug!("window closed with {} sample(s)", cpu_log.len());

        summarize(&cpu_log, &mem_log, window.baseline_cpu, window.baseline_mem_free)
    }

    pub fn is_sampling(&self) -> bool {
        self.window.is_some()
    }
}

fn mem_free_mb(sys: &System) -> f64 {
    sys.available_memory() as f64 / (1024.0 * 1024.0)
}

fn summarize(
    cpu_log: &[f64],
    mem_log: &[f64],
    baseline_cpu: f64,
    baseline_mem_free: f64,
) -> ResourceStats {
    let avg_cpu = mean(cpu_log);
    let avg_mem_free = mean(mem_log);
    ResourceStats {
        avg_cpu_percent: round2(avg_cpu),
        avg_mem_free_mb: round2(avg_mem_free),
        cpu_increase: round2((avg_cpu - baseline_cpu).max(0.0)),
        mem_consumed_mb: round2(baseline_mem_free - avg_mem_free),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_increase_is_floored_at_zero() {
        // System got quieter during the window
        let stats = summarize(&[10.0, 12.0], &[1000.0, 1000.0], 20.0, 1000.0);
        assert_eq!(stats.cpu_increase, 0.0);
        assert_eq!(stats.avg_cpu_percent, 11.0);
    }

    #[test]
    fn memory_delta_is_not_floored() {
        // More memory free during the window than at baseline
        let stats = summarize(&[5.0], &[2048.0], 5.0, 2000.0);
        assert_eq!(stats.mem_consumed_mb, -48.0);
    }

    #[test]
    fn positive_deltas_survive() {
        let stats = summarize(&[35.5, 44.5], &[900.0, 700.0], 10.0, 1000.0);
        assert_eq!(stats.avg_cpu_percent, 40.0);
        assert_eq!(stats.cpu_increase, 30.0);
        assert_eq!(stats.avg_mem_free_mb, 800.0);
        assert_eq!(stats.mem_consumed_mb, 200.0);
    }

    #[test]
    fn statistics_round_to_two_decimals() {
        let stats = summarize(&[1.0, 2.0, 2.0], &[3.333], 0.0, 3.333);
        assert_eq!(stats.avg_cpu_percent, 1.67);
        assert_eq!(stats.avg_mem_free_mb, 3.33);
    }

    #[tokio::test]
    async fn stop_without_start_returns_zeroed_stats() {
        let mut monitor = ResourceMonitor::new(Duration::from_millis(10));
        let stats = monitor.stop().await;
        assert_eq!(stats, ResourceStats::zeroed());
    }

    #[tokio::test]
    async fn double_start_keeps_the_first_window() {
        let mut monitor = ResourceMonitor::new(Duration::from_millis(10));
        monitor.start().await;
        assert!(monitor.is_sampling());
        monitor.start().await; // no second sampler task
        assert!(monitor.is_sampling());

        let _ = monitor.stop().await;
        assert!(!monitor.is_sampling());

        // The window is consumed, a second stop sees no session
        let stats = monitor.stop().await;
        assert_eq!(stats, ResourceStats::zeroed());
    }

    #[tokio::test]
    async fn stop_returns_after_the_sample_channel_fills() {
        // A 1 ms tick overruns the channel capacity well within the sleep;
        // overflow samples are dropped so the stop signal still gets through
        let mut monitor = ResourceMonitor::new(Duration::from_millis(1));
        monitor.start().await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        let stats = tokio::time::timeout(Duration::from_secs(5), monitor.stop())
            .await
            .expect("stop() must return once the sample channel is full");
        assert!(stats.avg_mem_free_mb > 0.0);
    }

    #[tokio::test]
    async fn window_collects_samples_while_active() {
        let mut monitor = ResourceMonitor::new(Duration::from_millis(10));
        monitor.start().await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        let stats = monitor.stop().await;
        assert!(stats.avg_mem_free_mb > 0.0);
        assert!(stats.cpu_increase >= 0.0);
    }
}

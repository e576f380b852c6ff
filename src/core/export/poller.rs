//! Export job polling
//!
//! Observes a job until it reaches a terminal state, sleeping on an
//! interval that grows after every non-terminal observation.

use crate::adapters::catalog::{CatalogClient, ExportJob};
use crate::config::PollConfig;
use crate::domain::{BackupError, CatalogError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Non-decreasing sequence of poll intervals
///
/// Starts at `initial` and multiplies by `multiplier` after each step,
/// capped at `max`.
#[derive(Debug, Clone)]
pub struct PollSchedule {
    next: Duration,
    multiplier: f64,
    max: Duration,
}

impl PollSchedule {
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            multiplier: multiplier.max(1.0),
            max,
        }
    }

    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(
            Duration::from_secs(config.initial_interval_secs),
            config.backoff_multiplier,
            Duration::from_secs(config.max_wait_secs),
        )
    }
}

impl Iterator for PollSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        let grown = Duration::from_secs_f64(current.as_secs_f64() * self.multiplier);
        self.next = grown.min(self.max);
        Some(current)
    }
}

/// Time budget shared by every observation of one job
///
/// Holds a single deadline and a single interval schedule, so callers that
/// re-enter polling after a transient error continue where they left off.
#[derive(Debug)]
pub struct PollWindow {
    started: Instant,
    deadline: Instant,
    schedule: Mutex<PollSchedule>,
}

impl PollWindow {
    pub fn new(config: &PollConfig) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: started + Duration::from_secs(config.max_wait_secs),
            schedule: Mutex::new(PollSchedule::from_config(config)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Next sleep, capped at the remaining budget
    fn next_interval(&self) -> Duration {
        let interval = match self.schedule.lock() {
            Ok(mut schedule) => schedule.next(),
            Err(poisoned) => poisoned.into_inner().next(),
        };
        interval.unwrap_or_default().min(self.remaining())
    }

    fn timeout(&self, job_id: &str) -> BackupError {
        let elapsed = self.elapsed();
        tracing::error!(job_id, elapsed_secs = elapsed.as_secs(), "Export job timed out");
        BackupError::JobTimeout {
            job_id: job_id.to_string(),
            elapsed_secs: elapsed.as_secs(),
        }
    }
}

/// Polls export jobs until they finish
pub struct JobPoller {
    catalog: Arc<dyn CatalogClient>,
    config: PollConfig,
}

impl JobPoller {
    pub fn new(catalog: Arc<dyn CatalogClient>, config: PollConfig) -> Self {
        Self { catalog, config }
    }

    /// Open a window starting now
    pub fn window(&self) -> PollWindow {
        PollWindow::new(&self.config)
    }

    /// Wait until the job reaches `SUCCESSFUL` or `FAILED`
    ///
    /// Opens a fresh window; see [`JobPoller::wait_within`].
    pub async fn wait_for_completion(&self, job_id: &str) -> Result<ExportJob> {
        self.wait_within(job_id, &self.window()).await
    }

    /// Wait for a terminal state inside an existing window
    ///
    /// Returns on the first terminal observation. No observation is made once
    /// the window's deadline has passed. Throttling, access denied and invalid
    /// parameter errors propagate to the caller. Other transient observation
    /// errors are logged and polling continues.
    ///
    /// # Errors
    ///
    /// - [`BackupError::JobNotFound`] if the job does not exist
    /// - [`BackupError::JobTimeout`] if no terminal state is observed before
    ///   the deadline
    pub async fn wait_within(&self, job_id: &str, window: &PollWindow) -> Result<ExportJob> {
        let mut observations: u32 = 0;

        loop {
            if window.remaining().is_zero() {
                return Err(window.timeout(job_id));
            }
            observations += 1;

            match self.catalog.describe_export_job(job_id).await {
                Ok(job) if job.status.is_terminal() => {
                    tracing::info!(
                        job_id,
                        status = %job.status,
                        observations,
                        elapsed_secs = window.elapsed().as_secs(),
                        "Export job finished"
                    );
                    return Ok(job);
                }
                Ok(job) => {
                    tracing::debug!(job_id, status = %job.status, "Export job still running");
                }
                Err(CatalogError::NotFound(_)) => {
                    return Err(BackupError::JobNotFound(job_id.to_string()));
                }
                Err(
                    e @ (CatalogError::Throttling(_)
                    | CatalogError::AccessDenied(_)
                    | CatalogError::InvalidParameter(_)),
                ) => {
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!(job_id, error = %e, "Failed to observe export job, will retry");
                }
            }

            tokio::time::sleep(window.next_interval()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_grows_by_multiplier() {
        let schedule = PollSchedule::new(Duration::from_secs(30), 1.2, Duration::from_secs(1200));
        let intervals: Vec<f64> = schedule.take(4).map(|d| d.as_secs_f64()).collect();
        let expected = [30.0, 36.0, 43.2, 51.84];

        for (actual, expected) in intervals.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
        }
    }

    #[test]
    fn test_schedule_is_non_decreasing_and_capped() {
        let schedule = PollSchedule::new(Duration::from_secs(30), 1.2, Duration::from_secs(120));
        let intervals: Vec<Duration> = schedule.take(20).collect();

        assert!(intervals.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*intervals.last().unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_schedule_multiplier_floor() {
        let mut schedule = PollSchedule::new(Duration::from_secs(10), 0.5, Duration::from_secs(60));
        assert_eq!(schedule.next(), Some(Duration::from_secs(10)));
        assert_eq!(schedule.next(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_schedule_from_default_config() {
        let mut schedule = PollSchedule::from_config(&PollConfig::default());
        assert_eq!(schedule.next(), Some(Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_caps_interval_at_remaining_budget() {
        let window = PollWindow::new(&PollConfig {
            initial_interval_secs: 30,
            backoff_multiplier: 1.0,
            max_wait_secs: 40,
        });

        assert_eq!(window.next_interval(), Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(window.next_interval(), Duration::from_secs(10));
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(window.remaining().is_zero());
        assert_eq!(window.next_interval(), Duration::ZERO);
    }
}

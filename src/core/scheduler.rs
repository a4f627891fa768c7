use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::Instrument;

use crate::config::schedule::DailyAt;
use crate::error::Result;
use crate::observability::metrics::{REFRESH_DURATION, REFRESH_FAILURE, REFRESH_SUCCESS};
use crate::observability::tracing::trace_refresh;
use crate::utils::task_supervisor::TaskSupervisor;

pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// When a refresh job fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    Every(Duration),
    DailyAt(DailyAt),
}

impl Cadence {
    /// Time to wait from `now` until the next firing.
    pub fn delay_from(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Cadence::Every(period) => *period,
            Cadence::DailyAt(at) => {
                let Some(today) = now.date_naive().and_hms_opt(at.hour, at.minute, 0) else {
                    return Duration::from_secs(24 * 60 * 60);
                };
                let mut next = today.and_utc();
                if next <= now {
                    next += ChronoDuration::days(1);
                }
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

struct RefreshJob {
    name: String,
    cadence: Cadence,
    run_at_start: bool,
    refresh: RefreshFn,
}

/// Drives independent refresh jobs, each on its own loop.
///
/// A job's cycles run one after another, so a job never overlaps itself.
/// Jobs are not coordinated with each other.
#[derive(Default)]
pub struct RefreshScheduler {
    jobs: Vec<RefreshJob>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F, Fut>(
        &mut self,
        name: impl Into<String>,
        cadence: Cadence,
        run_at_start: bool,
        refresh: F,
    ) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.jobs.push(RefreshJob {
            name: name.into(),
            cadence,
            run_at_start,
            refresh: Arc::new(move || refresh().boxed()),
        });
        self
    }

    pub fn jobs(&self) -> Vec<(String, Cadence)> {
        self.jobs.iter().map(|j| (j.name.clone(), j.cadence)).collect()
    }

    pub fn start(self) -> TaskSupervisor {
        let mut supervisor = TaskSupervisor::new();
        for job in self.jobs {
            let name = job.name.clone();
            supervisor.spawn(name, run_job(job));
        }
        supervisor
    }
}

async fn run_job(job: RefreshJob) {
    match job.cadence {
        Cadence::Every(period) => {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            if !job.run_at_start {
                // The first tick completes immediately
                ticker.tick().await;
            }
            loop {
                ticker.tick().await;
                run_cycle(&job.name, &job.refresh).await;
            }
        }
        Cadence::DailyAt(_) => {
            if job.run_at_start {
                run_cycle(&job.name, &job.refresh).await;
            }
            loop {
                sleep(job.cadence.delay_from(Utc::now())).await;
                run_cycle(&job.name, &job.refresh).await;
            }
        }
    }
}

/// Runs one cycle, logging and counting its outcome. Returns whether it succeeded.
pub async fn run_cycle(name: &str, refresh: &RefreshFn) -> bool {
    let started = Instant::now();
    let result = refresh().instrument(trace_refresh(name)).await;
    REFRESH_DURATION
        .with_label_values(&[name])
        .observe(started.elapsed().as_secs_f64());

    match result {
        Ok(()) => {
            REFRESH_SUCCESS.with_label_values(&[name]).inc();
            true
        }
        Err(e) => {
            REFRESH_FAILURE.with_label_values(&[name]).inc();
            tracing::error!(job = %name, "Refresh failed, keeping previous data: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(hour: u32, minute: u32) -> Cadence {
        Cadence::DailyAt(DailyAt { hour, minute })
    }

    #[test]
    fn daily_cadence_waits_until_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap();
        assert_eq!(at(8, 0).delay_from(now), Duration::from_secs(90 * 60));
    }

    #[test]
    fn daily_cadence_rolls_over_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(at(8, 0).delay_from(now), Duration::from_secs(24 * 60 * 60));

        let later = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        assert_eq!(at(0, 1).delay_from(later), Duration::from_secs(2 * 60));
    }

    #[test]
    fn interval_cadence_is_constant() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(
            Cadence::Every(Duration::from_secs(30)).delay_from(now),
            Duration::from_secs(30)
        );
    }

    #[tokio::test]
    async fn run_cycle_reports_outcome() {
        let ok: RefreshFn = Arc::new(|| async { Ok::<(), Error>(()) }.boxed());
        let failing: RefreshFn = Arc::new(|| {
            async { Err::<(), Error>(Error::GraphQlError("boom".to_string())) }.boxed()
        });

        assert!(run_cycle("test_ok", &ok).await);
        assert!(!run_cycle("test_failing", &failing).await);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_job_runs_at_start_and_keeps_going_after_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        {
            let calls = Arc::clone(&calls);
            scheduler.add("flaky", Cadence::Every(Duration::from_secs(30)), true, move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(Error::GraphQlError("upstream down".to_string()))
                }
            });
        }
        let mut supervisor = scheduler.start();

        sleep(Duration::from_secs(65)).await;

        // t = 0, 30, 60
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(supervisor.check_health().is_ok());
        supervisor.shutdown_all().await;
    }

    #[tokio::test(start_paused = true)]
    async fn interval_job_can_skip_the_initial_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut scheduler = RefreshScheduler::new();
        {
            let calls = Arc::clone(&calls);
            scheduler.add("late", Cadence::Every(Duration::from_secs(30)), false, move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            });
        }
        let mut supervisor = scheduler.start();

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        supervisor.shutdown_all().await;
    }
}

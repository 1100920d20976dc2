use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use derive_more::Display;
use strum::IntoEnumIterator;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::config::AppConfig;
use crate::domain::{decay, Clock, Dimension, Intervals};
use crate::metrics;
use crate::notifier::{self, Notification, Notifier};
use crate::repo::Storage;

/// Score reported for an aquarium whose timestamp is missing.
const MISSING_TIMESTAMP_SCORE: i8 = -1;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display)]
#[display("notified={notified}, skipped={skipped}, failed={failed}")]
pub struct SweepReport {
    pub notified: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Periodic reminder about one maintenance dimension of every aquarium.
#[derive(Clone)]
pub struct SweepTask {
    dimension: Dimension,
    period: Duration,
    intervals: Intervals,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl SweepTask {
    pub fn new(dimension: Dimension, period: Duration, intervals: Intervals,
               storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self { dimension, period, intervals, storage, notifier, clock }
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Notifies the owner of every aquarium whose score is below the healthy tiers.
    /// A single aquarium never stops the sweep.
    pub async fn run_once(&self, now: DateTime<Utc>) -> anyhow::Result<SweepReport> {
        let mut tx = self.storage.begin().await?;
        let aquariums = tx.all_aquariums().await?;
        drop(tx);

        let dimension = self.dimension;
        let mut report = SweepReport::default();
        for aquarium in aquariums {
            let score = match aquarium.score(dimension, &self.intervals, now) {
                Some(score) => score,
                None => {
                    log::error!("{dimension} sweep: the aquarium {} has no timestamp, score {MISSING_TIMESTAMP_SCORE}", aquarium.id);
                    metrics::SWEEP_FAILURES_COUNTER.get(dimension).inc();
                    report.failed += 1;
                    continue
                }
            };
            if decay::is_healthy(score) {
                report.skipped += 1;
                continue
            }

            let notification = Notification::new(&aquarium.name, aquarium.owner.clone(), dimension.notification_kind(), score);
            if notifier::deliver(self.notifier.as_ref(), notification).await {
                metrics::SWEEP_NOTIFICATIONS_COUNTER.get(dimension).inc();
                report.notified += 1;
            } else {
                metrics::SWEEP_FAILURES_COUNTER.get(dimension).inc();
                report.failed += 1;
            }
        }
        Ok(report)
    }

    /// Sweeps once per period, starting immediately, until `shutdown` turns true or its sender is gone.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("{} sweep started with the period of {:?}", self.dimension, self.period);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.run_once(self.clock.now()).await {
                        Ok(report) => log::info!("{} sweep: {report}", self.dimension),
                        Err(e) => log::error!("{} sweep failed: {e}", self.dimension),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break
                    }
                }
            }
        }
        log::info!("{} sweep stopped", self.dimension);
    }
}

/// One task per maintenance dimension.
pub fn tasks(config: &AppConfig, storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Vec<SweepTask> {
    Dimension::iter()
        .map(|dimension| SweepTask::new(dimension, config.sweep_periods.of(dimension), config.intervals,
                                        storage.clone(), notifier.clone(), clock.clone()))
        .collect()
}

pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
    shutdown: watch::Sender<bool>,
}

impl Scheduler {
    pub fn spawn(tasks: Vec<SweepTask>) -> Self {
        let (shutdown, receiver) = watch::channel(false);
        let handles = tasks.into_iter()
            .map(|task| tokio::spawn(task.run(receiver.clone())))
            .collect();
        Self { handles, shutdown }
    }

    /// Signals every task and waits for them to stop.
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            log::warn!("every sweep task had already stopped");
        }
        for result in futures::future::join_all(self.handles).await {
            if let Err(e) = result {
                log::error!("a sweep task failed: {e}");
            }
        }
    }
}

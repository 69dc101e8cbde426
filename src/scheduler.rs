//! Reminder scheduler loop.
//!
//! A single process-wide background task evaluates every enabled reminder
//! configuration against the current UTC minute and emits a
//! [`ReminderEvent`] for each channel that is due **and** has pending
//! tasks. Events are delivered via a `tokio::sync::mpsc` channel so the
//! transport layer can render and send them without the loop ever waiting
//! on Slack.
//!
//! Ticks are strictly sequential: an overdue tick is skipped, never run
//! concurrently with a previous one. Channels that were due while the
//! process was down are not back-fired; the last-fired guard lives only in
//! memory and rebuilds empty on restart.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cron::Schedule;
use crate::models::task::QueuedTask;
use crate::queue::QueueStore;
use crate::reminders::ReminderRegistry;

/// A reminder due for delivery: the channel and its queue snapshot.
#[derive(Debug, Clone)]
pub struct ReminderEvent {
    /// Channel whose schedule matched with pending tasks present.
    pub channel_id: String,
    /// The pending tasks at evaluation time, in queue order.
    pub tasks: Vec<QueuedTask>,
}

/// Periodic evaluator over the reminder registry and queue store.
pub struct Scheduler {
    registry: ReminderRegistry,
    queue: QueueStore,
    event_tx: mpsc::Sender<ReminderEvent>,
    /// Last minute each channel fired, to suppress double-firing when the
    /// tick granularity is finer than one minute.
    last_fired: HashMap<String, DateTime<Utc>>,
}

impl Scheduler {
    /// Create a scheduler that emits due reminders on `event_tx`.
    #[must_use]
    pub fn new(
        registry: ReminderRegistry,
        queue: QueueStore,
        event_tx: mpsc::Sender<ReminderEvent>,
    ) -> Self {
        Self {
            registry,
            queue,
            event_tx,
            last_fired: HashMap::new(),
        }
    }

    /// Evaluate all enabled configurations at `now`.
    ///
    /// Failures are per-channel: a bad stored schedule or a store error on
    /// one channel is logged and never blocks the others.
    pub async fn run_tick(&mut self, now: DateTime<Utc>) {
        let minute = truncate_to_minute(now);

        let configs = match self.registry.list_enabled().await {
            Ok(configs) => configs,
            Err(err) => {
                error!(%err, "failed to load reminder configurations");
                return;
            }
        };

        for config in configs {
            let schedule = match Schedule::parse(&config.schedule) {
                Ok(schedule) => schedule,
                Err(err) => {
                    warn!(
                        channel_id = %config.channel_id,
                        schedule = %config.schedule,
                        %err,
                        "stored schedule no longer parses; skipping channel"
                    );
                    continue;
                }
            };

            if !schedule.matches(minute) {
                continue;
            }
            if self.last_fired.get(&config.channel_id) == Some(&minute) {
                continue;
            }

            match self.evaluate_channel(&config.channel_id).await {
                Ok(true) => {
                    self.last_fired.insert(config.channel_id, minute);
                }
                Ok(false) => {}
                Err(err) => {
                    error!(channel_id = %config.channel_id, %err, "reminder evaluation failed");
                }
            }
        }
    }

    /// Check pendingness and emit one event. Returns whether it fired.
    async fn evaluate_channel(&self, channel_id: &str) -> crate::Result<bool> {
        if !self.queue.has_pending(channel_id).await? {
            debug!(channel_id, "schedule matched but queue is empty; skipping");
            return Ok(false);
        }

        let tasks = self.queue.list(channel_id).await?;
        if tasks.is_empty() {
            // Queue drained between the pending check and the snapshot.
            return Ok(false);
        }

        let count = tasks.len();
        let event = ReminderEvent {
            channel_id: channel_id.to_owned(),
            tasks,
        };
        if self.event_tx.send(event).await.is_err() {
            error!(channel_id, "reminder consumer is gone; event dropped");
            return Ok(false);
        }

        info!(channel_id, tasks = count, "reminder fired");
        Ok(true)
    }
}

/// Spawn the scheduler loop as a background task.
///
/// `tick` must be no coarser than one minute so no cron minute is skipped
/// between evaluations. Overdue ticks are skipped rather than overlapped.
#[must_use]
pub fn spawn_scheduler_task(
    mut scheduler: Scheduler,
    tick: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("scheduler task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    scheduler.run_tick(Utc::now()).await;
                }
            }
        }
    })
}

fn truncate_to_minute(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

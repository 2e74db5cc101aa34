//! The chart side of the tracker: a mirror of the collection feeding an
//! animated pie chart.

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::chart::{Frame, PieChart, RedrawSummary};
use crate::config::Config;
use crate::error::StoreError;
use crate::expense::{Change, ExpenseId};
use crate::mirror::{Applied, ExpenseMirror};
use crate::store::{ExpenseStore, Subscription};

/// Monotonic time source for animations
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Default for Clock {
    fn default() -> Self {
        Clock {
            origin: Instant::now(),
        }
    }
}

impl Clock {
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Mirror and chart kept in step, one redraw per batch
#[derive(Clone, Debug)]
pub struct Visualization {
    mirror: ExpenseMirror,
    chart: PieChart,
}

impl Visualization {
    pub fn new(config: &Config) -> Self {
        Visualization {
            mirror: ExpenseMirror::new(),
            chart: PieChart::new(config),
        }
    }

    /// Applies a batch to the mirror, then redraws the chart once
    pub fn handle_batch(&mut self, batch: &[Change], now: Duration) -> (Applied, RedrawSummary) {
        let applied = self.mirror.apply_batch(batch);
        let summary = self.chart.redraw(&applied.snapshot, now);
        (applied, summary)
    }

    pub fn mirror(&self) -> &ExpenseMirror {
        &self.mirror
    }

    pub fn chart(&self) -> &PieChart {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut PieChart {
        &mut self.chart
    }

    pub fn frame(&self, now: Duration) -> Frame {
        self.chart.frame(now)
    }

    /// Forgets the mirrored records before a fresh subscription replays them
    ///
    /// The chart keeps its slices so the next redraw animates from them.
    pub fn reset_mirror(&mut self) {
        self.mirror = ExpenseMirror::new();
    }
}

/// Visualization shared between the subscription task and request handlers
pub type SharedVisualization = Arc<Mutex<Visualization>>;

pub fn lock(shared: &SharedVisualization) -> MutexGuard<'_, Visualization> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Feeds every subscription batch into the visualization, in delivery order
///
/// Returns when the store closes the subscription.
pub async fn run_subscription(
    mut subscription: Subscription,
    shared: SharedVisualization,
    clock: Clock,
) {
    while let Some(batch) = subscription.next().await {
        let (applied, summary) = lock(&shared).handle_batch(&batch, clock.now());
        debug!(
            "Batch of {} change(s): {} record(s), {:?}",
            batch.len(),
            applied.snapshot.len(),
            summary
        );
    }
    info!("Subscription closed");
}

/// Deletes the record under a click, if any
///
/// Nothing changes on screen until the store reports the removal.
pub async fn delete_at<S: ExpenseStore>(
    store: &S,
    shared: &SharedVisualization,
    clock: &Clock,
    x: f64,
    y: f64,
) -> Result<Option<ExpenseId>, StoreError> {
    let target = lock(shared).chart().click(x, y, clock.now());
    let Some(id) = target else {
        return Ok(None);
    };
    if let Err(e) = store.delete(&id).await {
        warn!("Failed to delete {}: {}", id, e);
        return Err(e);
    }
    Ok(Some(id))
}

/// Subscribes to the store and spawns the task keeping `shared` up to date
pub fn spawn_subscription<S: ExpenseStore>(
    store: &S,
    shared: SharedVisualization,
    clock: Clock,
) -> tokio::task::JoinHandle<()> {
    let subscription = store.subscribe();
    tokio::spawn(run_subscription(subscription, shared, clock))
}

/// Pause before subscribing again after the subscription task ends
pub const RESUBSCRIBE_DELAY: Duration = Duration::from_millis(250);

/// Keeps a subscription task running for as long as the returned task lives
///
/// When the task panics or its subscription closes, the failure is logged,
/// the mirror is cleared and a new subscription replays the collection.
/// Aborting the returned handle does not stop the current subscription task.
pub fn supervise_subscription<S: ExpenseStore>(
    store: S,
    shared: SharedVisualization,
    clock: Clock,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match spawn_subscription(&store, shared.clone(), clock).await {
                Ok(()) => warn!("Subscription ended, subscribing again"),
                Err(e) if e.is_panic() => {
                    error!("Subscription task panicked, subscribing again: {}", e)
                }
                Err(e) => {
                    warn!("Subscription task cancelled: {}", e);
                    return;
                }
            }
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
            lock(&shared).reset_mirror();
        }
    })
}

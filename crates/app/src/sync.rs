//! Remote state synchronizer — keeps the view model in step with the hub.
//!
//! Two transports feed the same [`StateSink`]: interval polling of the full
//! state list and a push subscription. Push is preferred; polling runs until
//! push has delivered its first message and resumes whenever push drops.
//! After a push failure the subscription is retried once the reconnect
//! back-off has elapsed.

use std::sync::Arc;
use std::time::Duration;

use ipadha_domain::entity::Entity;
use ipadha_domain::error::IpadhaError;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use crate::ports::{HubClient, PushTransport, StateSink};

/// Capacity of the push → synchronizer channel.
const PUSH_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub refresh_interval: Duration,
    pub reconnect_interval: Duration,
    pub use_push: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(5000),
            reconnect_interval: Duration::from_millis(10_000),
            use_push: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushState {
    Disabled,
    /// Subscribed, no message received yet.
    Connecting,
    /// At least one message received on the current connection.
    Live,
    /// Lost; reconnect at the given instant.
    Backoff { until: Instant },
}

/// Which transport is authoritative right now.
#[derive(Debug, Clone, Copy)]
pub struct TransportPolicy {
    push: PushState,
    reconnect_interval: Duration,
}

impl TransportPolicy {
    #[must_use]
    pub fn new(use_push: bool, reconnect_interval: Duration) -> Self {
        Self {
            push: if use_push {
                PushState::Connecting
            } else {
                PushState::Disabled
            },
            reconnect_interval,
        }
    }

    #[must_use]
    pub fn state(&self) -> PushState {
        self.push
    }

    #[must_use]
    pub fn polling_active(&self) -> bool {
        self.push != PushState::Live
    }

    /// Record a pushed message. Returns `true` when push just became live.
    pub fn on_push_message(&mut self) -> bool {
        let became_live = self.push == PushState::Connecting;
        if became_live {
            self.push = PushState::Live;
        }
        became_live
    }

    /// Record the loss of the push connection; returns the reconnect instant.
    pub fn on_push_lost(&mut self, now: Instant) -> Instant {
        let until = now + self.reconnect_interval;
        self.push = PushState::Backoff { until };
        until
    }

    #[must_use]
    pub fn reconnect_at(&self) -> Option<Instant> {
        match self.push {
            PushState::Backoff { until } => Some(until),
            _ => None,
        }
    }

    pub fn on_reconnect(&mut self) {
        self.push = PushState::Connecting;
    }
}

/// Aborts the push task when the synchronizer goes away.
struct PushTask(JoinHandle<Result<(), IpadhaError>>);

impl Drop for PushTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct Synchronizer<H, P, S> {
    hub: H,
    push: Arc<P>,
    sink: S,
    config: SyncConfig,
}

impl<H, P, S> Synchronizer<H, P, S>
where
    H: HubClient,
    P: PushTransport,
    S: StateSink,
{
    #[must_use]
    pub fn new(hub: H, push: Arc<P>, sink: S, config: SyncConfig) -> Self {
        Self {
            hub,
            push,
            sink,
            config,
        }
    }

    /// Spawn the synchronizer loop. Aborting the handle stops both transports.
    #[must_use]
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until the task is dropped.
    pub async fn run(self) {
        let (tx, mut rx) = mpsc::channel::<Entity>(PUSH_BUFFER);
        let mut policy = TransportPolicy::new(self.config.use_push, self.config.reconnect_interval);
        let mut push_task = self.config.use_push.then(|| self.spawn_push(tx.clone()));

        let mut ticker = tokio::time::interval(self.config.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            refresh_ms = self.config.refresh_interval.as_millis(),
            use_push = self.config.use_push,
            "state synchronizer started"
        );

        loop {
            let reconnect_at = policy.reconnect_at();
            tokio::select! {
                _ = ticker.tick() => {
                    if policy.polling_active() {
                        self.poll().await;
                    }
                }
                Some(entity) = rx.recv() => {
                    if policy.on_push_message() {
                        tracing::info!("push subscription live, polling paused");
                    }
                    self.sink.apply_states(vec![entity]);
                }
                joined = join_push(&mut push_task), if push_task.is_some() => {
                    push_task = None;
                    log_push_end(joined);
                    policy.on_push_lost(Instant::now());
                    tracing::info!(
                        retry_in_ms = self.config.reconnect_interval.as_millis(),
                        "push lost, polling resumed"
                    );
                    ticker.reset_immediately();
                }
                () = sleep_until_opt(reconnect_at), if reconnect_at.is_some() => {
                    tracing::debug!("reconnecting push subscription");
                    policy.on_reconnect();
                    push_task = Some(self.spawn_push(tx.clone()));
                }
            }
        }
    }

    fn spawn_push(&self, sink: mpsc::Sender<Entity>) -> PushTask {
        let push = Arc::clone(&self.push);
        PushTask(tokio::spawn(async move { push.stream_states(sink).await }))
    }

    async fn poll(&self) {
        match self.hub.fetch_states().await {
            Ok(entities) => {
                tracing::trace!(count = entities.len(), "polled hub states");
                self.sink.apply_states(entities);
            }
            Err(err) => {
                tracing::warn!(%err, "failed to poll hub states, retrying next interval");
            }
        }
    }
}

async fn join_push(
    task: &mut Option<PushTask>,
) -> Result<Result<(), IpadhaError>, JoinError> {
    match task {
        Some(task) => (&mut task.0).await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn log_push_end(joined: Result<Result<(), IpadhaError>, JoinError>) {
    match joined {
        Ok(Ok(())) => tracing::info!("push subscription closed by the hub"),
        Ok(Err(IpadhaError::Unauthorized)) => {
            tracing::warn!("hub rejected the access token for push, falling back to polling");
        }
        Ok(Err(err)) => tracing::warn!(%err, "push subscription failed"),
        Err(err) => tracing::warn!(%err, "push task ended unexpectedly"),
    }
}

//! Startup sequencing and the named periodic tasks driving the bot.

use std::{future::Future, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval, sleep},
};
use tracing::{debug, info, warn};

use crate::{
    notify::{ChannelInfo, NotifySendError},
    services::{progress_service, walk_service},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(30);
const SEED_ATTEMPTS: u32 = 3;

/// Result of one periodic tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome<S> {
    /// The tick ran to completion.
    Completed(S),
    /// The previous tick still held the gate, or the activity is disabled.
    Skipped,
    /// The upstream fetch failed; nothing was mutated.
    Failed,
}

/// Owns the periodic tasks and stops them on shutdown.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Scheduler {
    /// Wait for the chat channel, seed the tracker, then spawn the periodic tasks.
    ///
    /// Fails only when the chat platform rejects the token or channel.
    pub async fn start(state: SharedState) -> Result<Self, NotifySendError> {
        let channel = wait_for_sink(&state).await?;
        info!(
            channel_id = %state.alert_channel(),
            channel_name = channel.name.as_deref().unwrap_or("unknown"),
            guild_id = channel.guild_id.as_deref().unwrap_or("none"),
            filter = %state.config().filter,
            "chat channel ready"
        );

        seed_with_retry(&state).await;
        Ok(Self::spawn(state))
    }

    /// Spawn the periodic tasks without the startup sequence.
    pub fn spawn(state: SharedState) -> Self {
        let (shutdown, _rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let progress_state = state.clone();
        tasks.push((
            "progress",
            spawn_periodic(
                "progress",
                state.config().poll_interval(),
                shutdown.subscribe(),
                move || {
                    let state = progress_state.clone();
                    async move {
                        match progress_service::poll_once(&state).await {
                            TickOutcome::Completed(summary) => {
                                debug!(?summary, "progress tick completed")
                            }
                            TickOutcome::Skipped => debug!("progress tick skipped"),
                            TickOutcome::Failed => {}
                        }
                    }
                },
            ),
        ));

        if state.walk_source().is_some() {
            let walk_state = state.clone();
            tasks.push((
                "walks",
                spawn_periodic(
                    "walks",
                    state.config().walk_poll_interval(),
                    shutdown.subscribe(),
                    move || {
                        let state = walk_state.clone();
                        async move {
                            if let TickOutcome::Completed(summary) =
                                walk_service::poll_once(&state).await
                            {
                                debug!(?summary, "walk tick completed");
                            }
                        }
                    },
                ),
            ));
        } else {
            warn!("planned walk API credentials not set; walk alerts disabled");
        }

        Self { shutdown, tasks }
    }

    /// Names of the running tasks, in spawn order.
    pub fn task_names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(name, _)| *name).collect()
    }

    /// Signal every task and wait for each to finish its current tick.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for (name, handle) in self.tasks {
            match handle.await {
                Ok(()) => info!(task = name, "task stopped"),
                Err(err) => warn!(task = name, error = %err, "task ended abnormally"),
            }
        }
    }
}

/// Run `tick` every `period` until shutdown. Missed ticks are skipped, never queued.
fn spawn_periodic<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(task = name, period_secs = period.as_secs(), "periodic task started");

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => tick().await,
            }
        }
    })
}

/// Probe the chat channel until it answers, backing off on transient failures.
async fn wait_for_sink(state: &SharedState) -> Result<ChannelInfo, NotifySendError> {
    let channel = state.alert_channel();
    let mut delay = INITIAL_DELAY;

    loop {
        match state.sink().ready(channel).await {
            Ok(info) => return Ok(info),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(
                    %channel,
                    error = &err as &(dyn std::error::Error + 'static),
                    retry_in_ms = delay.as_millis() as u64,
                    "chat channel not ready"
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Seed from a live snapshot. Falls back to baseline when every attempt fails.
async fn seed_with_retry(state: &SharedState) {
    let mut delay = INITIAL_DELAY;

    for attempt in 1..=SEED_ATTEMPTS {
        match progress_service::seed(state).await {
            Ok(count) => {
                info!(partitions = count, "seeded tracker from status snapshot");
                return;
            }
            Err(err) => {
                warn!(
                    attempt,
                    error = &err as &(dyn std::error::Error + 'static),
                    "failed to fetch seed snapshot"
                );
                if attempt < SEED_ATTEMPTS {
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_DELAY);
                }
            }
        }
    }

    warn!("starting without seed snapshot; every partition stays at baseline");
}

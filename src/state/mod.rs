//! Shared application state and the domain core.

pub mod partition;
pub mod policy;
pub mod report;
mod sse;
pub mod tracker;
pub mod walks;

use std::sync::Arc;

use tokio::sync::{Mutex, watch};

use crate::{
    config::AppConfig,
    notify::{ChannelId, NotificationSink},
    upstream::{StatusSource, WalkSource},
};

pub use self::sse::SseHub;
use self::{policy::AlertPolicy, tracker::DebounceTracker, walks::AlertedWalkSet};

/// Shared handle passed to routes, services and tasks.
pub type SharedState = Arc<AppState>;

const ALERT_STREAM_CAPACITY: usize = 32;

/// External collaborators the state drives: the two upstream APIs and the chat sink.
pub struct Collaborators {
    /// Progress snapshot source.
    pub status: Arc<dyn StatusSource>,
    /// `None` when planned-walk alerts are not configured.
    pub walks: Option<Arc<dyn WalkSource>>,
    /// Chat sink alerts and replies go to.
    pub sink: Arc<dyn NotificationSink>,
}

/// Central application state: the debounce table, the walk dedup set and the I/O handles.
pub struct AppState {
    config: AppConfig,
    status: Arc<dyn StatusSource>,
    walks: Option<Arc<dyn WalkSource>>,
    sink: Arc<dyn NotificationSink>,
    tracker: Mutex<DebounceTracker>,
    policy: AlertPolicy,
    alerted_walks: AlertedWalkSet,
    alerts: SseHub,
    degraded: watch::Sender<bool>,
    poll_gate: Mutex<()>,
    walk_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts degraded until a status snapshot has been fetched.
    pub fn new(config: AppConfig, collaborators: Collaborators) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let tracker = DebounceTracker::new(config.stabilization_count());
        let policy = AlertPolicy::new(config.threshold_level());
        Arc::new(Self {
            config,
            status: collaborators.status,
            walks: collaborators.walks,
            sink: collaborators.sink,
            tracker: Mutex::new(tracker),
            policy,
            alerted_walks: AlertedWalkSet::new(),
            alerts: SseHub::new(ALERT_STREAM_CAPACITY),
            degraded: degraded_tx,
            poll_gate: Mutex::new(()),
            walk_gate: Mutex::new(()),
        })
    }

    /// Validated runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Channel every alert is posted to.
    pub fn alert_channel(&self) -> ChannelId {
        self.config.discord.channel_id
    }

    /// Progress snapshot source.
    pub fn status_source(&self) -> &Arc<dyn StatusSource> {
        &self.status
    }

    /// Planned-walk source, when configured.
    pub fn walk_source(&self) -> Option<&Arc<dyn WalkSource>> {
        self.walks.as_ref()
    }

    /// Chat sink.
    pub fn sink(&self) -> &Arc<dyn NotificationSink> {
        &self.sink
    }

    /// Single lock serializing every mutation of the partition table.
    pub fn tracker(&self) -> &Mutex<DebounceTracker> {
        &self.tracker
    }

    /// Alerting rules derived from the threshold.
    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Walks already announced by this process.
    pub fn alerted_walks(&self) -> &AlertedWalkSet {
        &self.alerted_walks
    }

    /// Broadcast hub mirroring every chat alert.
    pub fn alerts(&self) -> &SseHub {
        &self.alerts
    }

    /// Held for the duration of a progress tick so ticks never overlap.
    pub fn poll_gate(&self) -> &Mutex<()> {
        &self.poll_gate
    }

    /// Held for the duration of a walk tick so ticks never overlap.
    pub fn walk_gate(&self) -> &Mutex<()> {
        &self.walk_gate
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag, returning whether it changed.
    pub fn update_degraded(&self, value: bool) -> bool {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }
}

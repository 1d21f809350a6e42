//! In-memory collaborators for service tests.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;
use reqwest::StatusCode;
use time::OffsetDateTime;

use crate::{
    config::AppConfig,
    notify::{ChannelId, ChannelInfo, NotificationSink, NotifyResult, NotifySendError},
    state::{
        AppState, Collaborators, SharedState,
        partition::{Core, Ladder, Partition, ProgressLevel, Region},
        report::Report,
        walks::WalkEvent,
    },
    upstream::{FetchError, FetchResult, StatusSource, WalkSource},
};

pub const ALERT_CHANNEL: ChannelId = ChannelId(42);

pub fn level(value: u8) -> ProgressLevel {
    ProgressLevel::new(value).unwrap()
}

pub fn softcore_europe_ladder() -> Partition {
    Partition::new(Region::Europe, Ladder::Ladder, Core::Softcore)
}

pub fn report_at(partition: Partition, value: u8) -> Report {
    Report::new(
        partition,
        level(value),
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
    )
    .with_reporter("reporter-1")
}

pub fn test_config(walks: bool) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DCLONE_DISCORD_TOKEN" => Some("token".into()),
        "DCLONE_DISCORD_CHANNEL_ID" => Some(ALERT_CHANNEL.to_string()),
        "DCLONE_D2RW_TOKEN" if walks => Some("walk-token".into()),
        "DCLONE_D2RW_CONTACT" if walks => Some("ops@example.com".into()),
        _ => None,
    })
    .unwrap()
}

/// Status source replaying a fixed script, then returning empty snapshots.
pub struct ScriptedStatus {
    script: Mutex<VecDeque<FetchResult<Vec<Report>>>>,
    calls: AtomicUsize,
}

impl ScriptedStatus {
    pub fn new(script: impl IntoIterator<Item = FetchResult<Vec<Report>>>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::<FetchResult<Vec<Report>>>::new())
    }

    pub fn failure() -> FetchError {
        FetchError::Status {
            endpoint: "scripted",
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StatusSource for ScriptedStatus {
    fn fetch(
        &self,
        _filter: crate::state::partition::PartitionFilter,
    ) -> BoxFuture<'static, FetchResult<Vec<Report>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { next })
    }
}

/// Walk source returning the same listing on every call until changed.
#[derive(Default)]
pub struct FixedWalks {
    walks: Mutex<Option<Vec<WalkEvent>>>,
}

impl FixedWalks {
    pub fn new(walks: Vec<WalkEvent>) -> Self {
        Self {
            walks: Mutex::new(Some(walks)),
        }
    }

    /// Make every following fetch fail.
    pub fn fail(&self) {
        self.walks.lock().unwrap().take();
    }
}

impl WalkSource for FixedWalks {
    fn fetch(&self) -> BoxFuture<'static, FetchResult<Vec<WalkEvent>>> {
        let result = self
            .walks
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(ScriptedStatus::failure);
        Box::pin(async move { result })
    }
}

/// Sink recording every delivered message.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(ChannelId, String)>>,
    failing: AtomicBool,
    reject_ready: AtomicBool,
    ready_failures: AtomicUsize,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail_sends(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Answer readiness checks with a fatal rejection.
    pub fn reject_ready(&self) {
        self.reject_ready.store(true, Ordering::SeqCst);
    }

    /// Fail the next `count` readiness checks with a transient error.
    pub fn fail_ready(&self, count: usize) {
        self.ready_failures.store(count, Ordering::SeqCst);
    }
}

impl NotificationSink for RecordingSink {
    fn ready(&self, channel: ChannelId) -> BoxFuture<'static, NotifyResult<ChannelInfo>> {
        let result = if self.reject_ready.load(Ordering::SeqCst) {
            Err(NotifySendError::Rejected {
                channel,
                status: StatusCode::FORBIDDEN,
            })
        } else if self
            .ready_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            Err(NotifySendError::Status {
                channel,
                status: StatusCode::BAD_GATEWAY,
            })
        } else {
            Ok(ChannelInfo {
                name: Some("dclone".into()),
                guild_id: None,
            })
        };
        Box::pin(async move { result })
    }

    fn send(&self, channel: ChannelId, text: String) -> BoxFuture<'static, NotifyResult<()>> {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(NotifySendError::Status {
                channel,
                status: StatusCode::INTERNAL_SERVER_ERROR,
            })
        } else {
            self.messages.lock().unwrap().push((channel, text));
            Ok(())
        };
        Box::pin(async move { result })
    }
}

/// Application state wired to in-memory collaborators.
pub struct TestHarness {
    pub state: SharedState,
    pub status: Arc<ScriptedStatus>,
    pub walks: Option<Arc<FixedWalks>>,
    pub sink: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn new(status: ScriptedStatus) -> Self {
        Self::build(status, None)
    }

    pub fn with_walks(status: ScriptedStatus, walks: FixedWalks) -> Self {
        Self::build(status, Some(Arc::new(walks)))
    }

    fn build(status: ScriptedStatus, walks: Option<Arc<FixedWalks>>) -> Self {
        let status = Arc::new(status);
        let sink = Arc::new(RecordingSink::default());
        let state = AppState::new(
            test_config(walks.is_some()),
            Collaborators {
                status: status.clone(),
                walks: walks.clone().map(|walks| walks as Arc<dyn WalkSource>),
                sink: sink.clone(),
            },
        );
        Self {
            state,
            status,
            walks,
            sink,
        }
    }
}

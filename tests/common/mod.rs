//! Shared fakes for HTTP-level tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use dclone_bot::{
    config::AppConfig,
    notify::{ChannelId, ChannelInfo, NotificationSink, NotifyResult},
    routes,
    state::{
        AppState, Collaborators, SharedState,
        partition::{Core, Ladder, Partition, PartitionFilter, ProgressLevel, Region},
        report::Report,
    },
    upstream::{FetchResult, StatusSource},
};
use futures::future::BoxFuture;
use time::OffsetDateTime;

/// Status source answering every fetch with the same snapshot.
pub struct StaticStatus(pub Vec<Report>);

impl StatusSource for StaticStatus {
    fn fetch(&self, _filter: PartitionFilter) -> BoxFuture<'static, FetchResult<Vec<Report>>> {
        let reports = self.0.clone();
        Box::pin(async move { Ok(reports) })
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(ChannelId, String)>>,
}

impl NotificationSink for RecordingSink {
    fn ready(&self, _channel: ChannelId) -> BoxFuture<'static, NotifyResult<ChannelInfo>> {
        Box::pin(async { Ok(ChannelInfo::default()) })
    }

    fn send(&self, channel: ChannelId, text: String) -> BoxFuture<'static, NotifyResult<()>> {
        self.sent.lock().unwrap().push((channel, text));
        Box::pin(async { Ok(()) })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: SharedState,
    pub sink: Arc<RecordingSink>,
}

pub fn europe_ladder_softcore(level: u8) -> Report {
    Report::new(
        Partition::new(Region::Europe, Ladder::Ladder, Core::Softcore),
        ProgressLevel::new(level).unwrap(),
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
    )
}

pub fn test_app(reports: Vec<Report>) -> TestApp {
    let config = AppConfig::from_lookup(|key| match key {
        "DCLONE_DISCORD_TOKEN" => Some("token".into()),
        "DCLONE_DISCORD_CHANNEL_ID" => Some("42".into()),
        _ => None,
    })
    .unwrap();

    let sink = Arc::new(RecordingSink::default());
    let state = AppState::new(
        config,
        Collaborators {
            status: Arc::new(StaticStatus(reports)),
            walks: None,
            sink: sink.clone(),
        },
    );

    TestApp {
        router: routes::router(state.clone()),
        state,
        sink,
    }
}

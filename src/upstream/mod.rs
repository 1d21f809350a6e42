//! Stateless clients for the two upstream APIs.

pub mod error;
pub mod models;
pub mod status;
pub mod walks;

use futures::future::BoxFuture;

use crate::state::{partition::PartitionFilter, report::Report, walks::WalkEvent};

pub use self::error::{FetchError, FetchResult};
pub use self::status::StatusClient;
pub use self::walks::WalkClient;

/// `User-Agent` sent to every upstream.
pub const USER_AGENT: &str = concat!("dclone-bot/", env!("CARGO_PKG_VERSION"));

/// Source of per-partition progress snapshots.
pub trait StatusSource: Send + Sync {
    /// Fetch the current snapshot for the partitions matching `filter`.
    fn fetch(&self, filter: PartitionFilter) -> BoxFuture<'static, FetchResult<Vec<Report>>>;
}

/// Source of community-planned walks.
pub trait WalkSource: Send + Sync {
    /// Fetch every listed planned walk.
    fn fetch(&self) -> BoxFuture<'static, FetchResult<Vec<WalkEvent>>>;
}

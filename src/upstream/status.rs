//! Client for the progress status API.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, header};

use crate::state::{partition::PartitionFilter, report::Report};

use super::{
    StatusSource, USER_AGENT,
    error::{FetchError, FetchResult},
    models::RawStatusEntry,
};

const ENDPOINT: &str = "diablo2.io";

/// Client for the public progress status API.
#[derive(Clone)]
pub struct StatusClient {
    client: Client,
    url: Arc<str>,
}

impl StatusClient {
    /// Build a client for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::ClientBuilder {
                endpoint: ENDPOINT,
                source,
            })?;

        Ok(Self {
            client,
            url: Arc::from(url.into()),
        })
    }

    /// Fetch the current report of every partition matching `filter`.
    pub async fn status(&self, filter: PartitionFilter) -> FetchResult<Vec<Report>> {
        let response = self
            .client
            .get(self.url.as_ref())
            .query(&filter.query()[..])
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                endpoint: ENDPOINT,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: ENDPOINT,
                status,
            });
        }

        let entries = response
            .json::<Vec<RawStatusEntry>>()
            .await
            .map_err(|source| FetchError::Decode {
                endpoint: ENDPOINT,
                source,
            })?;

        entries
            .into_iter()
            .map(|entry| {
                Report::try_from(entry).map_err(|reason| FetchError::Malformed {
                    endpoint: ENDPOINT,
                    reason,
                })
            })
            .collect()
    }
}

impl StatusSource for StatusClient {
    fn fetch(&self, filter: PartitionFilter) -> BoxFuture<'static, FetchResult<Vec<Report>>> {
        let client = self.clone();
        Box::pin(async move { client.status(filter).await })
    }
}

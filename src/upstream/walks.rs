//! Client for the planned-walk API.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, header};
use serde_json::Value;
use tracing::warn;

use crate::state::walks::WalkEvent;

use super::{
    USER_AGENT, WalkSource,
    error::{FetchError, FetchResult},
    models::{RawWalkResponse, parse_walk},
};

const ENDPOINT: &str = "d2runewizard.com";
const PLATFORM: &str = "Discord";
const REPO: &str = "https://github.com/Synse/dclone-discord";

/// Client for the community planned-walk API.
#[derive(Clone)]
pub struct WalkClient {
    client: Client,
    url: Arc<str>,
    token: Arc<str>,
    contact: Arc<str>,
}

impl WalkClient {
    /// Build a client authenticated with `token`, identifying the operator by `contact`.
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        contact: impl Into<String>,
        timeout: Duration,
    ) -> FetchResult<Self> {
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
            token: Arc::from(token.into()),
            contact: Arc::from(contact.into()),
        })
    }

    /// Fetch every planned walk currently listed.
    pub async fn planned_walks(&self) -> FetchResult<Vec<WalkEvent>> {
        let response = self
            .client
            .get(self.url.as_ref())
            .query(&[("token", self.token.as_ref())])
            .header(header::USER_AGENT, USER_AGENT)
            .header("D2R-Contact", self.contact.as_ref())
            .header("D2R-Platform", PLATFORM)
            .header("D2R-Repo", REPO)
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

        let payload = response
            .json::<RawWalkResponse>()
            .await
            .map_err(|source| FetchError::Decode {
                endpoint: ENDPOINT,
                source,
            })?;

        let walks = payload
            .walks
            .into_iter()
            .filter_map(|value| {
                let walk_id = value
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown")
                    .to_string();
                parse_walk(value)
                    .inspect_err(|reason| {
                        warn!(%walk_id, %reason, endpoint = ENDPOINT, "skipping unreadable planned walk")
                    })
                    .ok()
            })
            .collect();
        Ok(walks)
    }
}

impl WalkSource for WalkClient {
    fn fetch(&self) -> BoxFuture<'static, FetchResult<Vec<WalkEvent>>> {
        let client = self.clone();
        Box::pin(async move { client.planned_walks().await })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, query_param},
    };

    use super::*;
    use crate::state::partition::Region;

    #[tokio::test]
    async fn sends_credentials_and_decodes_walks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("token", "secret"))
            .and(header("D2R-Contact", "ops@example.com"))
            .and(header("D2R-Platform", "Discord"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "walks": [{
                    "id": "abc",
                    "region": "Europe",
                    "ladder": true,
                    "hardcore": false,
                    "timestamp": 1650003600000i64,
                    "displayName": "walker",
                    "confirmed": true
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            WalkClient::new(server.uri(), "secret", "ops@example.com", Duration::from_secs(2))
                .unwrap();
        let walks = client.planned_walks().await.unwrap();

        assert_eq!(walks.len(), 1);
        assert_eq!(walks[0].id, "abc");
        assert_eq!(walks[0].region, Some(Region::Europe));
        assert!(walks[0].confirmed);
    }

    #[tokio::test]
    async fn rejected_token_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client =
            WalkClient::new(server.uri(), "bad", "ops@example.com", Duration::from_secs(2))
                .unwrap();
        assert!(matches!(
            client.planned_walks().await,
            Err(FetchError::Status { .. })
        ));
    }

    #[tokio::test]
    async fn missing_walks_field_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client =
            WalkClient::new(server.uri(), "t", "c", Duration::from_secs(2)).unwrap();
        assert!(client.planned_walks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreadable_walk_is_skipped_and_others_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "walks": [
                    {
                        "id": "good",
                        "region": "Europe",
                        "ladder": false,
                        "hardcore": false,
                        "timestamp": 1650003600000i64,
                        "displayName": "walker",
                        "confirmed": true
                    },
                    {
                        "id": "late",
                        "region": "Asia",
                        "ladder": true,
                        "hardcore": false,
                        "timestamp": "tonight",
                        "displayName": "walker"
                    },
                    {
                        "id": "bad",
                        "region": "Oceania",
                        "ladder": false,
                        "hardcore": false,
                        "timestamp": 1650003600000i64,
                        "displayName": "walker",
                        "confirmed": false
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client =
            WalkClient::new(server.uri(), "t", "c", Duration::from_secs(2)).unwrap();
        let walks = client.planned_walks().await.unwrap();

        assert_eq!(walks.len(), 1);
        assert_eq!(walks[0].id, "good");
        assert_eq!(walks[0].region, Some(Region::Europe));
    }
}

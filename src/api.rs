//! Client for the dashboard backend that owns floors, machines and plan
//! images.
//!
//! The viewport engine never talks to the network itself; the application
//! drives these calls and feeds the results into its view controllers.

use crate::error::ApiError;
use crate::{Floor, Machine, PingSchedule, Placement};
use reqwest::{Response, Url};
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

const USER_AGENT: &str = "floor-map";

/// Source of plan image bytes for a floor.
pub trait ImageProvider {
    fn fetch_map_image(&self, floor_id: &str)
    -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

/// Source of the machines shown as markers on a floor.
pub trait EntityProvider {
    fn fetch_machines(&self, floor_id: &str)
    -> impl Future<Output = Result<Vec<Machine>, ApiError>> + Send;

    /// Machines on every floor, including ones not placed yet.
    fn fetch_all_machines(&self) -> impl Future<Output = Result<Vec<Machine>, ApiError>> + Send;
}

/// Receiver of positions chosen in the placement view.
pub trait PlacementSink {
    fn save_placement(&self, placement: &Placement)
    -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// HTTP client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // Without a trailing slash `Url::join` would replace the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|err| ApiError::InvalidUrl {
            url: base_url.to_owned(),
            reason: err.to_string(),
        })?;
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url.join(path).map_err(|err| ApiError::InvalidUrl {
            url: format!("{}{path}", self.base_url),
            reason: err.to_string(),
        })
    }

    /// URL of one machine, with the id percent-encoded as a single path segment.
    fn machine_url(&self, machine_id: &str) -> Result<Url, ApiError> {
        let invalid = |reason: &str| ApiError::InvalidUrl {
            url: format!("{}api/machines/{machine_id}", self.base_url),
            reason: reason.to_owned(),
        };
        if matches!(machine_id, "" | "." | "..") {
            return Err(invalid("machine id is not a valid path segment"));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| invalid("server URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "machines", machine_id]);
        Ok(url)
    }

    pub async fn floors(&self) -> Result<Vec<Floor>, ApiError> {
        let url = self.endpoint("api/public/floors")?;
        let response = self.client.get(url).send().await?;
        Ok(check(response, "floors").await?.json().await?)
    }

    pub async fn machines(&self, floor_id: &str) -> Result<Vec<Machine>, ApiError> {
        let url = self.endpoint("api/public/machines")?;
        let response = self
            .client
            .get(url)
            .query(&[("floor_id", floor_id)])
            .send()
            .await?;
        Ok(check(response, "machines").await?.json().await?)
    }

    /// Every operational machine, placed or not.
    pub async fn all_machines(&self) -> Result<Vec<Machine>, ApiError> {
        let url = self.endpoint("api/public/machines")?;
        let response = self.client.get(url).send().await?;
        Ok(check(response, "machines").await?.json().await?)
    }

    pub async fn ping_schedule(&self) -> Result<PingSchedule, ApiError> {
        let url = self.endpoint("api/public/status")?;
        let response = self.client.get(url).send().await?;
        Ok(check(response, "status").await?.json().await?)
    }

    pub async fn map_image(&self, floor_id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint("map-image")?;
        let ts = cache_buster();
        let response = self
            .client
            .get(url)
            .query(&[("floor_id", floor_id), ("ts", ts.as_str())])
            .send()
            .await?;
        Ok(check(response, "map-image").await?.bytes().await?.to_vec())
    }

    pub async fn put_placement(&self, placement: &Placement) -> Result<(), ApiError> {
        let url = self.machine_url(&placement.machine_id)?;
        let response = self.client.put(url).json(placement).send().await?;
        check(response, "machines").await?;
        Ok(())
    }
}

impl ImageProvider for ApiClient {
    fn fetch_map_image(
        &self,
        floor_id: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send {
        let client = self.clone();
        let floor_id = floor_id.to_owned();
        async move { client.map_image(&floor_id).await }
    }
}

impl EntityProvider for ApiClient {
    fn fetch_machines(
        &self,
        floor_id: &str,
    ) -> impl Future<Output = Result<Vec<Machine>, ApiError>> + Send {
        let client = self.clone();
        let floor_id = floor_id.to_owned();
        async move { client.machines(&floor_id).await }
    }

    fn fetch_all_machines(&self) -> impl Future<Output = Result<Vec<Machine>, ApiError>> + Send {
        let client = self.clone();
        async move { client.all_machines().await }
    }
}

impl PlacementSink for ApiClient {
    fn save_placement(
        &self,
        placement: &Placement,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        let client = self.clone();
        let placement = placement.clone();
        async move { client.put_placement(&placement).await }
    }
}

async fn check(response: Response, endpoint: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        endpoint: endpoint.to_owned(),
        status,
        body,
    })
}

/// Millisecond timestamp that keeps caches from serving an outdated plan.
fn cache_buster() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_onto_base_path() {
        let api = ApiClient::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(
            api.endpoint("api/public/floors").unwrap().as_str(),
            "http://127.0.0.1:5000/api/public/floors"
        );

        let api = ApiClient::new("https://example.org/dashboard").unwrap();
        assert_eq!(
            api.endpoint("map-image").unwrap().as_str(),
            "https://example.org/dashboard/map-image"
        );
    }

    #[test]
    fn machine_ids_stay_inside_their_path_segment() {
        let api = ApiClient::new("http://127.0.0.1:5000/dash").unwrap();

        let url = api.machine_url("pc-7").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/dash/api/machines/pc-7");

        let url = api.machine_url("pc?x=1").unwrap();
        assert_eq!(url.path(), "/dash/api/machines/pc%3Fx=1");
        assert_eq!(url.query(), None);

        let url = api.machine_url("pc#frag").unwrap();
        assert_eq!(url.path(), "/dash/api/machines/pc%23frag");
        assert_eq!(url.fragment(), None);

        let url = api.machine_url("a/../../floors/main").unwrap();
        assert_eq!(url.path(), "/dash/api/machines/a%2F..%2F..%2Ffloors%2Fmain");
    }

    #[test]
    fn dot_segment_machine_ids_are_rejected() {
        let api = ApiClient::new("http://127.0.0.1:5000").unwrap();
        for id in ["", ".", ".."] {
            assert!(matches!(
                api.machine_url(id),
                Err(ApiError::InvalidUrl { .. })
            ));
        }
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn cache_buster_is_numeric() {
        assert!(cache_buster().parse::<u128>().is_ok());
    }
}

//! HTTP implementation of the provider gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    InstanceRecord, ProviderError, ProviderGateway, ReservationRecord, TargetConfiguration,
};

/// Static API credentials for the provider endpoint.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Gateway talking JSON over HTTP to a provider regional endpoint.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    region: String,
}

impl HttpGateway {
    /// Create a gateway for one region.
    ///
    /// Credentials are optional; without them the request relies on whatever
    /// ambient auth the endpoint accepts (e.g. instance-role proxies).
    pub fn new(
        base_url: &str,
        region: &str,
        credentials: Option<&ProviderCredentials>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(creds) = credentials {
            let value = format!("Credential={}:{}", creds.access_key_id, creds.secret_access_key);
            let mut value = HeaderValue::from_str(&value)
                .map_err(|e| ProviderError::Credentials(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            region: region.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status().as_u16();
        let body: ApiErrorBody = response.json().await.unwrap_or_else(|_| ApiErrorBody {
            message: "unknown error".to_string(),
        });

        Err(ProviderError::Api {
            status,
            message: body.message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ProviderError> {
        let url = self.url(path);
        debug!(url = %url, region = %self.region, "Provider GET");

        let response = self
            .client
            .get(&url)
            .query(&[("region", self.region.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return self.handle_error(response).await;
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ProviderGateway for HttpGateway {
    async fn list_active_reservations(&self) -> Result<Vec<ReservationRecord>, ProviderError> {
        let body: ReservationListResponse =
            self.get_json("/v1/reservations?state=active").await?;
        debug!(count = body.reservations.len(), "Listed active reservations");
        Ok(body.reservations)
    }

    async fn list_running_instances(&self) -> Result<Vec<InstanceRecord>, ProviderError> {
        let body: InstanceListResponse = self.get_json("/v1/instances?state=running").await?;
        debug!(count = body.instances.len(), "Listed running instances");
        Ok(body.instances)
    }

    async fn modify_reservations(
        &self,
        client_token: &str,
        reservation_ids: &[String],
        targets: &[TargetConfiguration],
    ) -> Result<(), ProviderError> {
        let url = self.url("/v1/reservations/modify");
        let request = ModifyRequest {
            client_token,
            region: &self.region,
            reservation_ids,
            target_configurations: targets,
        };
        debug!(
            url = %url,
            client_token = %client_token,
            reservation_count = reservation_ids.len(),
            target_count = targets.len(),
            "Provider modify"
        );

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return self.handle_error(response).await;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ReservationListResponse {
    reservations: Vec<ReservationRecord>,
}

#[derive(Debug, Deserialize)]
struct InstanceListResponse {
    instances: Vec<InstanceRecord>,
}

#[derive(Debug, Serialize)]
struct ModifyRequest<'a> {
    client_token: &'a str,
    region: &'a str,
    reservation_ids: &'a [String],
    target_configurations: &'a [TargetConfiguration],
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default = "unknown_message")]
    message: String,
}

fn unknown_message() -> String {
    "unknown error".to_string()
}

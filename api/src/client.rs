use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use shared::types::{
    Campaign, CampaignId, CampaignStatus, CreatedCampaign, Credentials, NewCampaign,
    Registration, StatusPayload,
};
use tracing::{debug, error};

use crate::{
    AuthApi, CampaignApi, LoginResponse, TokenSource,
    envelope::decode_response,
    error::{ApiError, ApiResult},
};

/// HTTP binding of the campaign service.
///
/// Campaign endpoints carry `Authorization: Bearer <token>`; the token is asked
/// from the [`TokenSource`] on every request so a login or logout elsewhere is
/// picked up without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    api_host: Url,
    timeout: Duration,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(api_host: &str, timeout: Duration, tokens: Arc<dyn TokenSource>) -> ApiResult<Self> {
        let invalid = |detail: String| ApiError::InvalidApiHost { host: api_host.to_owned(), detail };
        let base = Url::parse(api_host.trim().trim_end_matches('/')).map_err(|err| invalid(err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".to_owned()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("campaigns/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport { context: "Building HTTP client failed", source })?;
        Ok(Self {
            http,
            api_host: base,
            timeout,
            tokens,
        })
    }

    pub fn api_host(&self) -> &str {
        self.api_host.as_str()
    }

    /// Appends `segments` to the API host, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_host.clone();
        // `new` only accepts hosts that can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.access_token() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str], context: &'static str) -> ApiResult<T> {
        let request = self.authorized(self.http.get(self.url(path)));
        self.send(request, context).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &(impl Serialize + Sync),
        authorized: bool,
        context: &'static str,
    ) -> ApiResult<T> {
        let mut request = self.http.post(self.url(path)).json(body);
        if authorized {
            request = self.authorized(request);
        }
        self.send(request, context).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, context: &'static str) -> ApiResult<T> {
        let response = request.send().await.map_err(|err| self.transport_error(err, context))?;
        let status = response.status();
        debug!("{} {}", status, response.url().path());
        let body = response.text().await.map_err(|err| self.transport_error(err, context))?;
        decode_response(status, &body, context)
    }

    fn transport_error(&self, err: reqwest::Error, context: &'static str) -> ApiError {
        if err.is_timeout() {
            error!("{context}: timed out after {:?}", self.timeout);
            ApiError::Timeout { context, timeout: self.timeout }
        } else {
            error!("{context}: {err}");
            ApiError::Transport { context, source: err }
        }
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.post(&["user", "login"], credentials, false, "Login failed").await
    }

    async fn signup(&self, registration: &Registration) -> ApiResult<Value> {
        self.post(&["user", "signup"], registration, false, "Registration failed").await
    }
}

#[async_trait]
impl CampaignApi for ApiClient {
    async fn create_campaign(&self, campaign: &NewCampaign) -> ApiResult<CreatedCampaign> {
        self.post(&["campaign", "create"], campaign, true, "Campaign creation failed").await
    }

    async fn list_campaigns(&self) -> ApiResult<Vec<Campaign>> {
        self.get(&["campaign", "list"], "Fetching campaign list failed").await
    }

    async fn campaign_details(&self, id: &CampaignId) -> ApiResult<Campaign> {
        self.get(&["campaign", "details", id.as_str()], "Fetching campaign details failed").await
    }

    async fn campaign_status(&self, id: &CampaignId) -> ApiResult<CampaignStatus> {
        let payload: StatusPayload = self
            .get(&["campaign", id.as_str(), "status"], "Fetching campaign status failed")
            .await?;
        Ok(payload.status())
    }

    async fn publish_campaign(&self, id: &CampaignId) -> ApiResult<Value> {
        self.get(&["campaign", "publish", id.as_str()], "Publishing campaign failed").await
    }
}

//! Binding of the remote campaign service.
//!
//! Every call returns [`ApiResult`]; callers branch on [`ApiError`] variants
//! instead of probing response bodies for optional fields.

mod client;
pub mod envelope;
pub mod error;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shared::types::{
    AccessToken, Campaign, CampaignId, CampaignStatus, CreatedCampaign, Credentials, NewCampaign,
    Registration,
};

pub use client::ApiClient;
pub use error::{ApiError, ApiResult, ErrorKind, ResponseCode};

/// Where the client gets the bearer token from, read fresh per request.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<AccessToken>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: AccessToken,
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    async fn signup(&self, registration: &Registration) -> ApiResult<Value>;
}

#[async_trait]
pub trait CampaignApi: Send + Sync {
    async fn create_campaign(&self, campaign: &NewCampaign) -> ApiResult<CreatedCampaign>;

    async fn list_campaigns(&self) -> ApiResult<Vec<Campaign>>;

    async fn campaign_details(&self, id: &CampaignId) -> ApiResult<Campaign>;

    async fn campaign_status(&self, id: &CampaignId) -> ApiResult<CampaignStatus>;

    async fn publish_campaign(&self, id: &CampaignId) -> ApiResult<Value>;
}

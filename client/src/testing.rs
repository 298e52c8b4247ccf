//! Scripted in-memory stand-in for the remote service.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use api::{ApiError, ApiResult, AuthApi, CampaignApi, LoginResponse};
use async_trait::async_trait;
use serde_json::{Value, json};
use shared::types::{
    AccessToken, Campaign, CampaignId, CampaignStatus, CreatedCampaign, Credentials, NewCampaign,
    Registration,
};

#[derive(Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub signup: AtomicUsize,
    pub create: AtomicUsize,
    pub list: AtomicUsize,
    pub details: AtomicUsize,
    pub status: AtomicUsize,
    pub publish: AtomicUsize,
}

pub struct FakeApi {
    pub calls: Calls,
    campaign: Mutex<Campaign>,
    server_status: Mutex<CampaignStatus>,
    statuses: Mutex<VecDeque<ApiResult<CampaignStatus>>>,
    details_error: Mutex<Option<String>>,
    publish_error: Mutex<Option<String>>,
    login_token: Mutex<Option<String>>,
    created: Mutex<Value>,
}

pub fn campaign(status: CampaignStatus) -> Campaign {
    Campaign {
        id: CampaignId::from("c1"),
        name: "Spring launch".to_owned(),
        subject: "Something new".to_owned(),
        body: "Hello,\nwe have news.".to_owned(),
        scheduled_time: Some("2025-03-01T09:30:00.000Z".to_owned()),
        status,
    }
}

impl FakeApi {
    pub fn new(campaign: Campaign) -> Self {
        Self {
            calls: Calls::default(),
            server_status: Mutex::new(campaign.status),
            campaign: Mutex::new(campaign),
            statuses: Mutex::new(VecDeque::new()),
            details_error: Mutex::new(None),
            publish_error: Mutex::new(None),
            login_token: Mutex::new(Some("abc".to_owned())),
            created: Mutex::new(json!({ "_id": "new-1" })),
        }
    }

    pub fn sending() -> Self {
        Self::new(campaign(CampaignStatus::Sending))
    }

    pub fn rejected(message: &str) -> ApiError {
        ApiError::Rejected { code: None, message: message.to_owned() }
    }

    /// Answers for the next status calls; afterwards the server status is returned.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = ApiResult<CampaignStatus>>) {
        self.statuses.lock().unwrap().extend(statuses);
    }

    pub fn set_server_status(&self, status: CampaignStatus) {
        *self.server_status.lock().unwrap() = status;
    }

    pub fn fail_details(&self, message: &str) {
        *self.details_error.lock().unwrap() = Some(message.to_owned());
    }

    pub fn fail_publish(&self, message: &str) {
        *self.publish_error.lock().unwrap() = Some(message.to_owned());
    }

    pub fn refuse_login(&self) {
        *self.login_token.lock().unwrap() = None;
    }

    pub fn create_responds(&self, response: Value) {
        *self.created.lock().unwrap() = response;
    }

    pub fn status_calls(&self) -> usize {
        self.calls.status.load(Ordering::SeqCst)
    }

    pub fn details_calls(&self) -> usize {
        self.calls.details.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, _credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        match self.login_token.lock().unwrap().clone() {
            Some(token) => Ok(LoginResponse { access_token: AccessToken::new(token) }),
            None => Err(Self::rejected("Invalid email or password")),
        }
    }

    async fn signup(&self, registration: &Registration) -> ApiResult<Value> {
        self.calls.signup.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "email": registration.email }))
    }
}

#[async_trait]
impl CampaignApi for FakeApi {
    async fn create_campaign(&self, _campaign: &NewCampaign) -> ApiResult<CreatedCampaign> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        let created = self.created.lock().unwrap().clone();
        Ok(serde_json::from_value(created).unwrap_or_default())
    }

    async fn list_campaigns(&self) -> ApiResult<Vec<Campaign>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        Ok(vec![self.campaign.lock().unwrap().clone()])
    }

    async fn campaign_details(&self, _id: &CampaignId) -> ApiResult<Campaign> {
        self.calls.details.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.details_error.lock().unwrap().clone() {
            return Err(Self::rejected(&message));
        }
        let mut campaign = self.campaign.lock().unwrap().clone();
        campaign.status = *self.server_status.lock().unwrap();
        Ok(campaign)
    }

    async fn campaign_status(&self, _id: &CampaignId) -> ApiResult<CampaignStatus> {
        self.calls.status.fetch_add(1, Ordering::SeqCst);
        if let Some(scripted) = self.statuses.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(*self.server_status.lock().unwrap())
    }

    async fn publish_campaign(&self, _id: &CampaignId) -> ApiResult<Value> {
        self.calls.publish.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.publish_error.lock().unwrap().clone() {
            return Err(Self::rejected(&message));
        }
        self.set_server_status(CampaignStatus::Sending);
        Ok(json!({ "published": true }))
    }
}

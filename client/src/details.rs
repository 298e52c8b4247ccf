//! State behind the campaign detail screen.
//!
//! The view owns the displayed record. Loads replace it; status lookups (manual,
//! polled, or after publishing) only merge the status into it. Whichever
//! response is applied last is what the view shows.

use std::sync::Arc;

use api::{ApiError, ApiResult, CampaignApi};
use shared::types::{Campaign, CampaignId, CampaignStatus};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    config::ClientConfig,
    poller::{PollHandle, StatusPoller, fetch_status},
    request::RequestSender,
    session::SessionStore,
};

/// States where there is nothing meaningful to show.
#[derive(Debug, Error)]
pub enum DetailsError {
    #[error("You must be logged in to view campaign details.")]
    NotAuthenticated,
    #[error("Invalid campaign id.")]
    InvalidId,
    #[error("{}", .0.user_message())]
    Load(#[source] ApiError),
}

pub struct CampaignDetails<A: CampaignApi + ?Sized + 'static> {
    api: Arc<A>,
    session: SessionStore,
    id: CampaignId,
    sender: RequestSender,
    poller: StatusPoller<A>,
    record: Arc<watch::Sender<Option<Campaign>>>,
    polling: Option<PollHandle>,
}

impl<A: CampaignApi + ?Sized + 'static> CampaignDetails<A> {
    /// Loads details, then status, then starts polling if the campaign is sending.
    pub async fn open(
        api: Arc<A>,
        session: SessionStore,
        id: CampaignId,
        config: &ClientConfig,
    ) -> Result<Self, DetailsError> {
        if !session.is_authenticated() {
            return Err(DetailsError::NotAuthenticated);
        }
        if id.is_empty() {
            return Err(DetailsError::InvalidId);
        }

        let sender = RequestSender::new(config.request_timeout());
        let poller = StatusPoller::new(Arc::clone(&api), sender, config.poll_interval());
        let (record, _) = watch::channel(None);
        let mut view = Self {
            api,
            session,
            id,
            sender,
            poller,
            record: Arc::new(record),
            polling: None,
        };

        view.load_details().await.map_err(DetailsError::Load)?;
        view.refresh_status().await;
        view.sync_polling();
        Ok(view)
    }

    pub fn id(&self) -> &CampaignId {
        &self.id
    }

    pub fn campaign(&self) -> Option<Campaign> {
        self.record.borrow().clone()
    }

    pub fn status(&self) -> Option<CampaignStatus> {
        self.record.borrow().as_ref().map(|campaign| campaign.status)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Campaign>> {
        self.record.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.polling.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn can_publish(&self) -> bool {
        self.session.is_authenticated() && self.status() == Some(CampaignStatus::Scheduled)
    }

    async fn load_details(&self) -> ApiResult<()> {
        let campaign = self
            .sender
            .send("Fetching campaign details failed", self.api.campaign_details(&self.id))
            .await?;
        self.record.send_replace(Some(campaign));
        Ok(())
    }

    /// Non-fatal: on failure the last known status stays.
    async fn refresh_status(&self) -> Option<CampaignStatus> {
        match fetch_status(self.api.as_ref(), &self.sender, &self.id).await {
            Ok(status) => {
                merge_status(&self.record, status);
                Some(status)
            }
            Err(err) => {
                warn!("Status of campaign {} unavailable: {err}", self.id);
                None
            }
        }
    }

    /// Manual refresh of details and status. Races any poll tick in flight.
    pub async fn refresh(&mut self) -> ApiResult<()> {
        let (details, _) = tokio::join!(self.load_details(), self.refresh_status());
        self.sync_polling();
        details
    }

    /// Publishes, then re-fetches details and status together before returning.
    ///
    /// A refused publish leaves the record as it was.
    pub async fn publish(&mut self) -> ApiResult<()> {
        self.sender
            .send("Publishing campaign failed", self.api.publish_campaign(&self.id))
            .await?;
        info!("Campaign {} published", self.id);
        let (details, _) = tokio::join!(self.load_details(), self.refresh_status());
        self.sync_polling();
        details
    }

    fn sync_polling(&mut self) {
        match self.status() {
            Some(status) if status.is_transient() => {
                if self.is_polling() {
                    return;
                }
                let record = Arc::clone(&self.record);
                self.polling = Some(self.poller.start(self.id.clone(), status, move |status| {
                    merge_status(&record, status);
                }));
            }
            _ => {
                if let Some(handle) = self.polling.take() {
                    handle.stop();
                }
            }
        }
    }

    /// Tears the view down; polling stops with it.
    pub fn close(mut self) {
        if let Some(handle) = self.polling.take() {
            handle.stop();
        }
    }
}

fn merge_status(record: &watch::Sender<Option<Campaign>>, status: CampaignStatus) {
    record.send_if_modified(|campaign| match campaign {
        Some(campaign) if campaign.status != status => {
            campaign.apply_status(status);
            true
        }
        _ => false,
    });
}

//! Polling a campaign's status while it is `sending`.

use std::{sync::Arc, time::Duration};

use api::{ApiResult, CampaignApi};
use shared::types::{CampaignId, CampaignStatus};
use tokio::{task::JoinHandle, time::{Instant, MissedTickBehavior}};
use tracing::{debug, warn};

use crate::request::RequestSender;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// One status lookup.
pub async fn fetch_status<A: CampaignApi + ?Sized>(
    api: &A,
    sender: &RequestSender,
    id: &CampaignId,
) -> ApiResult<CampaignStatus> {
    sender.send("Fetching campaign status failed", api.campaign_status(id)).await
}

pub struct StatusPoller<A: CampaignApi + ?Sized> {
    api: Arc<A>,
    sender: RequestSender,
    interval: Duration,
}

impl<A: CampaignApi + ?Sized + 'static> StatusPoller<A> {
    pub fn new(api: Arc<A>, sender: RequestSender, interval: Duration) -> Self {
        Self { api, sender, interval }
    }

    /// Fetches the status once per tick while it stays `sending`.
    ///
    /// Nothing is fetched when `current` is not transient. Every fetched status
    /// goes to `on_update`; the first non-transient one ends the task. Fetch
    /// errors are logged and the next tick tries again.
    pub fn start(
        &self,
        id: CampaignId,
        current: CampaignStatus,
        mut on_update: impl FnMut(CampaignStatus) + Send + 'static,
    ) -> PollHandle {
        let api = Arc::clone(&self.api);
        let sender = self.sender;
        let period = self.interval;
        let task = tokio::spawn(async move {
            if !current.is_transient() {
                return;
            }
            debug!("Polling status of campaign {id} every {period:?}");
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match fetch_status(api.as_ref(), &sender, &id).await {
                    Ok(status) => {
                        on_update(status);
                        if !status.is_transient() {
                            debug!("Campaign {id} settled as {status}, polling stopped");
                            break;
                        }
                    }
                    Err(err) => warn!("Status poll for campaign {id} failed: {err}"),
                }
            }
        });
        PollHandle { task }
    }
}

/// Running poll. Dropping it cancels the poll; no update is delivered afterwards.
#[must_use = "dropping the handle stops polling"]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops polling; same as dropping the handle.
    pub fn stop(self) {}

    /// Waits until polling ends on its own.
    pub async fn finished(&mut self) {
        let _ = (&mut self.task).await;
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

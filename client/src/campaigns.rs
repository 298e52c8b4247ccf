use api::{ApiResult, CampaignApi};
use shared::{
    types::{Campaign, NewCampaign},
    validation::{check_required, check_scheduled_date},
};
use tracing::info;

use crate::{
    error::{ActionError, FormError},
    guard::Route,
    request::RequestSender,
};

pub async fn list<A: CampaignApi + ?Sized>(api: &A, sender: &RequestSender) -> ApiResult<Vec<Campaign>> {
    sender.send("Fetching campaign list failed", api.list_campaigns()).await
}

pub fn validate_new_campaign(campaign: &NewCampaign) -> Result<(), FormError> {
    FormError::check([
        ("name", check_required(&campaign.name).map(|_| "Name is required".to_owned())),
        ("subject", check_required(&campaign.subject).map(|_| "Subject is required".to_owned())),
        ("body", check_required(&campaign.body).map(|_| "Body is required".to_owned())),
        ("scheduledTime", check_scheduled_date(&campaign.scheduled_time)),
    ])
}

/// Creates the campaign and returns where to go next: its detail page when the
/// server reported an id, the list otherwise.
pub async fn create<A: CampaignApi + ?Sized>(
    api: &A,
    sender: &RequestSender,
    campaign: &NewCampaign,
) -> Result<Route, ActionError> {
    let campaign = NewCampaign {
        name: campaign.name.trim().to_owned(),
        subject: campaign.subject.trim().to_owned(),
        body: campaign.body.trim().to_owned(),
        scheduled_time: campaign.scheduled_time.trim().to_owned(),
        status: campaign.status,
    };
    validate_new_campaign(&campaign)?;
    let created = sender.send("Campaign creation failed", api.create_campaign(&campaign)).await?;
    info!("Campaign {:?} created", campaign.name);
    Ok(match created.id() {
        Some(id) => Route::CampaignDetails { id },
        None => Route::CampaignList,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;
    use shared::types::CampaignStatus;

    use super::*;
    use crate::testing::{FakeApi, campaign};

    fn draft() -> NewCampaign {
        NewCampaign {
            name: " Spring launch ".to_owned(),
            subject: "Something new".to_owned(),
            body: "Hello".to_owned(),
            scheduled_time: "2025-03-01".to_owned(),
            status: CampaignStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn created_campaign_opens_its_detail_page() {
        let api = FakeApi::new(campaign(CampaignStatus::Scheduled));
        let route = create(&api, &RequestSender::default(), &draft()).await.unwrap();
        assert_eq!(route, Route::CampaignDetails { id: "new-1".into() });
    }

    #[tokio::test]
    async fn missing_id_falls_back_to_list() {
        let api = FakeApi::new(campaign(CampaignStatus::Scheduled));
        api.create_responds(json!({ "name": "Spring launch" }));
        let route = create(&api, &RequestSender::default(), &draft()).await.unwrap();
        assert_eq!(route, Route::CampaignList);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_before_sending() {
        let api = FakeApi::new(campaign(CampaignStatus::Scheduled));
        let mut draft = draft();
        draft.subject = "   ".to_owned();
        draft.scheduled_time = String::new();
        let err = create(&api, &RequestSender::default(), &draft).await.unwrap_err();
        let ActionError::Invalid(form) = err else { panic!("expected a form error") };
        assert_eq!(form.message_for("subject"), Some("Subject is required"));
        assert_eq!(form.message_for("scheduledTime"), Some("Scheduled date is required"));
        assert_eq!(api.calls.create.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn list_returns_campaigns() {
        let api = FakeApi::new(campaign(CampaignStatus::Sent));
        let campaigns = list(&api, &RequestSender::default()).await.unwrap();
        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].status, CampaignStatus::Sent);
    }
}

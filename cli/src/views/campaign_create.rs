use anyhow::Result;
use client::{Route, campaigns};
use shared::types::{CampaignStatus, NewCampaign};

use crate::app::App;

pub async fn create(
    app: &mut App,
    name: String,
    subject: String,
    body: String,
    scheduled_time: String,
    status: CampaignStatus,
) -> Result<()> {
    app.enter(Route::NewCampaign)?;
    let campaign = NewCampaign {
        name,
        subject,
        body,
        scheduled_time,
        status,
    };
    let next = campaigns::create(app.api.as_ref(), &app.sender, &campaign).await?;
    app.notice("Campaign created successfully");
    app.enter(next.clone())?;
    match next {
        Route::CampaignDetails { id } => println!("{id}"),
        _ => println!("Created; see `campaigns list`"),
    }
    Ok(())
}

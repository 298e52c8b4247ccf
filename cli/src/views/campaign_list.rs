use anyhow::{Result, bail};
use client::{Route, campaigns};
use shared::types::Campaign;
use tracing::warn;

use crate::app::App;

pub async fn list(app: &mut App, cached: bool) -> Result<()> {
    app.enter(Route::CampaignList)?;

    let list = if cached {
        match app.cache.load_campaign_list() {
            Some(list) => list,
            None => bail!("No cached campaigns"),
        }
    } else {
        match campaigns::list(app.api.as_ref(), &app.sender).await {
            Ok(list) => {
                app.cache.store_campaign_list(&list);
                list
            }
            Err(err) => {
                warn!("Listing campaigns failed: {err}");
                bail!("{}", err.user_message());
            }
        }
    };

    print_table(&list);
    Ok(())
}

fn print_table(campaigns: &[Campaign]) {
    if campaigns.is_empty() {
        println!("No campaigns yet. Create one with `campaigns create`.");
        return;
    }
    println!("{:<26}  {:<10}  {:<16}  NAME", "ID", "STATUS", "SCHEDULED");
    for campaign in campaigns {
        println!(
            "{:<26}  {:<10}  {:<16}  {}",
            campaign.id,
            campaign.status.label(),
            campaign.scheduled_display(),
            campaign.name,
        );
    }
}

use anyhow::{Result, anyhow, bail};
use api::ApiClient;
use client::{CampaignDetails, Route};
use shared::types::{Campaign, CampaignId};
use tokio::sync::mpsc;
use tracing::debug;

use crate::app::App;

pub async fn show(app: &mut App, id: String, publish: bool, watch: bool) -> Result<()> {
    let id = CampaignId::new(id.trim());
    app.enter(Route::CampaignDetails { id: id.clone() })?;

    let mut view = CampaignDetails::open(app.api.clone(), app.session.clone(), id, &app.config).await?;
    if let Some(campaign) = view.campaign() {
        app.cache.store_campaign(&campaign);
    }

    if publish {
        if !view.can_publish() {
            bail!("Only scheduled campaigns can be published");
        }
        view.publish().await.map_err(|err| anyhow!(err.user_message()))?;
        app.notice("Campaign published successfully");
    }

    print_campaign(view.campaign().as_ref());

    if watch && view.is_polling() {
        follow(app, &view).await;
    }
    view.close();
    Ok(())
}

/// Prints the copy saved the last time the campaign was shown.
pub fn show_cached(app: &mut App, id: String) -> Result<()> {
    let id = CampaignId::new(id.trim());
    if id.is_empty() {
        bail!("Invalid campaign id.");
    }
    app.enter(Route::CampaignDetails { id: id.clone() })?;
    match app.cache.load_campaign(&id) {
        Some(campaign) => {
            app.notice("Showing cached copy");
            print_campaign(Some(&campaign));
            Ok(())
        }
        None => bail!("Campaign {id} is not cached"),
    }
}

/// Prints status changes until the campaign settles, the session ends or the user hits Ctrl-C.
async fn follow(app: &mut App, view: &CampaignDetails<ApiClient>) {
    let mut updates = view.subscribe();
    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let subscription = app.session.subscribe_to_external_changes(move |token| {
        let _ = session_tx.send(token);
    });

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = updates.borrow_and_update().as_ref().map(|campaign| campaign.status);
                let Some(status) = status else { break };
                println!("Status: {}", status.label());
                if !status.is_transient() {
                    break;
                }
            }
            Some(token) = session_rx.recv() => {
                if token.is_none() {
                    let route = app.navigator.revalidate().cloned();
                    debug!("Session ended elsewhere, now at {route:?}");
                    app.notice("Logged out in another session; stopped following.");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Interrupted");
                break;
            }
        }
    }
    subscription.unsubscribe();
}

fn print_campaign(campaign: Option<&Campaign>) {
    let Some(campaign) = campaign else {
        println!("Campaign not found.");
        return;
    };
    println!("{}", campaign.name);
    println!("  Id:        {}", campaign.id);
    println!("  Status:    {}", campaign.status.label());
    println!("  Subject:   {}", campaign.subject);
    println!("  Scheduled: {}", campaign.scheduled_display());
    println!();
    println!("{}", campaign.body);
}

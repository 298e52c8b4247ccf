//! `campaigns`: terminal front end for the e-mail campaign service.

mod app;
mod views;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::ClientConfig;
use shared::types::CampaignStatus;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

/// Manage e-mail campaigns from the terminal
#[derive(Parser)]
#[command(name = "campaigns")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Base URL of the campaign API, e.g. http://localhost:3000/api/v1
    #[arg(long, global = true)]
    api_host: Option<String>,

    /// Config file (default: config.toml in the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "CAMPAIGNS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[arg(long)]
        phone_number: String,
    },

    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,

        /// Read from stdin when not given
        #[arg(long, env = "CAMPAIGNS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Report whether a session is stored
    Whoami,

    /// List campaigns
    List {
        /// Show the last fetched list without contacting the server
        #[arg(long)]
        cached: bool,
    },

    /// Create a campaign
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,

        /// Send date, YYYY-MM-DD
        #[arg(long)]
        scheduled: String,

        /// Initial status: scheduled, sending, sent or failed
        #[arg(long, default_value = "scheduled")]
        status: CampaignStatus,
    },

    /// Show one campaign
    Show {
        /// Campaign id
        id: String,

        /// Keep following the status while the campaign is sending
        #[arg(short, long, conflicts_with = "cached")]
        watch: bool,

        /// Show the last fetched copy without contacting the server
        #[arg(long)]
        cached: bool,
    },

    /// Publish a scheduled campaign
    Publish {
        /// Campaign id
        id: String,

        /// Keep following the status while the campaign is sending
        #[arg(short, long)]
        watch: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ClientConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(api_host) = cli.api_host {
        config.api_host = api_host;
    }
    let mut app = App::new(config)?;

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
            phone_number,
        } => {
            let password = views::login::password_or_prompt(password)?;
            views::login::register(&mut app, name, email, password, phone_number).await?;
        }
        Commands::Login { email, password } => {
            let password = views::login::password_or_prompt(password)?;
            views::login::login(&mut app, email, password).await?;
        }
        Commands::Logout => {
            views::login::logout(&mut app);
        }
        Commands::Whoami => {
            views::login::whoami(&app);
        }
        Commands::List { cached } => {
            views::campaign_list::list(&mut app, cached).await?;
        }
        Commands::Create {
            name,
            subject,
            body,
            scheduled,
            status,
        } => {
            views::campaign_create::create(&mut app, name, subject, body, scheduled, status).await?;
        }
        Commands::Show { id, cached: true, .. } => {
            views::campaign_details::show_cached(&mut app, id)?;
        }
        Commands::Show { id, watch, .. } => {
            views::campaign_details::show(&mut app, id, false, watch).await?;
        }
        Commands::Publish { id, watch } => {
            views::campaign_details::show(&mut app, id, true, watch).await?;
        }
    }

    Ok(())
}

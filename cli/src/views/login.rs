use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use client::{Route, auth};
use shared::types::{Credentials, Registration};

use crate::app::App;

pub fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("reading password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}

pub async fn login(app: &mut App, email: String, password: String) -> Result<()> {
    app.enter(Route::Login)?;
    let credentials = Credentials { email, password };
    auth::login(app.api.as_ref(), &app.session, &app.sender, &credentials).await?;
    app.notice("Login successful");
    app.enter(Route::CampaignList)
}

pub async fn register(
    app: &mut App,
    name: String,
    email: String,
    password: String,
    phone_number: String,
) -> Result<()> {
    app.enter(Route::Register)?;
    let registration = Registration {
        name,
        email,
        password,
        phone_number,
    };
    auth::register(app.api.as_ref(), &app.sender, &registration).await?;
    app.notice("Registration successful");
    app.enter(Route::Login)
}

pub fn logout(app: &mut App) {
    if auth::logout(&app.session) {
        app.cache.clear();
        app.notice("Logged out");
    } else {
        app.notice("Could not remove the stored session");
    }
}

pub fn whoami(app: &App) {
    if app.session.is_authenticated() {
        println!("Logged in");
    } else {
        println!("Not logged in");
    }
}

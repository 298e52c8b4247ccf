use api::AuthApi;
use serde_json::Value;
use shared::{
    types::{Credentials, Registration},
    validation::{check_email, check_password, check_required},
};
use tracing::{error, info};

use crate::{
    error::{ActionError, FormError},
    request::RequestSender,
    session::SessionStore,
};

pub fn validate_credentials(credentials: &Credentials) -> Result<(), FormError> {
    FormError::check([
        ("email", check_email(&credentials.email)),
        ("password", check_password(&credentials.password)),
    ])
}

pub fn validate_registration(registration: &Registration) -> Result<(), FormError> {
    FormError::check([
        ("name", check_required(&registration.name)),
        ("email", check_email(&registration.email)),
        ("password", check_password(&registration.password)),
        ("phoneNumber", check_required(&registration.phone_number)),
    ])
}

/// Logs in and stores the issued token.
pub async fn login<A: AuthApi + ?Sized>(
    api: &A,
    session: &SessionStore,
    sender: &RequestSender,
    credentials: &Credentials,
) -> Result<(), ActionError> {
    validate_credentials(credentials)?;
    let response = sender.send("Login failed", api.login(credentials)).await?;
    let issued = response.access_token;
    if !session.set_token(Some(issued.clone())) || session.read().as_ref() != Some(&issued) {
        error!("Access token for {} could not be stored", credentials.email);
        return Err(ActionError::SessionNotSaved);
    }
    info!("Logged in as {}", credentials.email);
    Ok(())
}

pub async fn register<A: AuthApi + ?Sized>(
    api: &A,
    sender: &RequestSender,
    registration: &Registration,
) -> Result<Value, ActionError> {
    validate_registration(registration)?;
    let account = sender.send("Registration failed", api.signup(registration)).await?;
    info!("Registered {}", registration.email);
    Ok(account)
}

pub fn logout(session: &SessionStore) -> bool {
    session.set_token(None)
}

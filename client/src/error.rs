use std::fmt::{self, Display};

use api::ApiError;
use thiserror::Error;

/// Field messages from a rejected form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormError {
    pub fields: Vec<(&'static str, String)>,
}

impl FormError {
    /// `Ok` when every check passed.
    pub fn check<const N: usize>(checks: [(&'static str, Option<String>); N]) -> Result<(), Self> {
        let fields: Vec<_> = checks
            .into_iter()
            .filter_map(|(field, message)| message.map(|message| (field, message)))
            .collect();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Self { fields })
        }
    }

    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }
}

impl Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.fields.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Invalid(#[from] FormError),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    /// The server issued a token but it could not be stored.
    #[error("Could not save the session")]
    SessionNotSaved,
}

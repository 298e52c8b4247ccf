pub mod auth;
pub mod cache;
pub mod campaigns;
pub mod config;
pub mod details;
pub mod error;
pub mod guard;
pub mod poller;
pub mod request;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, ConfigError};
pub use details::{CampaignDetails, DetailsError};
pub use error::{ActionError, FormError};
pub use guard::{Navigation, Navigator, Route, RouteGuard};
pub use poller::{PollHandle, StatusPoller};
pub use request::RequestSender;
pub use session::{ExternalSubscription, SessionStore};

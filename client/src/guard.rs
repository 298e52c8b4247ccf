use std::fmt::{self, Display};

use shared::types::CampaignId;
use tracing::debug;

use crate::session::SessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CampaignList,
    NewCampaign,
    CampaignDetails { id: CampaignId },
    Login,
    Register,
    NotFound { path: String },
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|segment| !segment.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::CampaignList,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["campaigns", "new"] | ["campaign", "new"] => Self::NewCampaign,
            ["campaign", id] => Self::CampaignDetails { id: CampaignId::from(*id) },
            _ => Self::NotFound { path: path.to_owned() },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::CampaignList => "/".to_owned(),
            Self::NewCampaign => "/campaigns/new".to_owned(),
            Self::CampaignDetails { id } => format!("/campaign/{id}"),
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::NotFound { path } => path.clone(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::CampaignList | Self::NewCampaign | Self::CampaignDetails { .. })
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    /// Navigate with replace: the refused route is kept out of history.
    Redirect { to: Route },
}

#[derive(Clone)]
pub struct RouteGuard {
    session: SessionStore,
}

impl RouteGuard {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn evaluate(&self, route: Route) -> Navigation {
        if route.is_protected() && !self.session.is_authenticated() {
            debug!("Refusing {route} without a session");
            Navigation::Redirect { to: Route::Login }
        } else {
            Navigation::Render(route)
        }
    }
}

/// History stack with every navigation passing through the guard.
pub struct Navigator {
    guard: RouteGuard,
    history: Vec<Route>,
}

impl Navigator {
    pub fn new(guard: RouteGuard) -> Self {
        Self { guard, history: vec![] }
    }

    pub fn navigate(&mut self, route: Route) -> &Route {
        self.apply(route);
        &self.history[self.history.len() - 1]
    }

    fn apply(&mut self, route: Route) {
        match self.guard.evaluate(route) {
            Navigation::Render(route) => self.history.push(route),
            Navigation::Redirect { to } => self.history.push(to),
        }
    }

    pub fn navigate_to(&mut self, path: &str) -> &Route {
        self.navigate(Route::parse(path))
    }

    /// Re-runs the guard on the current entry, e.g. after the session changed elsewhere.
    pub fn revalidate(&mut self) -> Option<&Route> {
        let current = self.history.pop()?;
        self.apply(current);
        self.history.last()
    }

    pub fn back(&mut self) -> Option<&Route> {
        if self.history.len() < 2 {
            return None;
        }
        self.history.pop();
        self.history.last()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared::types::AccessToken;

    use super::*;
    use crate::storage::Storage;

    fn session(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::with_watch_interval(Storage::at(dir.path()), Duration::from_millis(10))
    }

    #[test]
    fn routes_round_trip_through_paths() {
        assert_eq!(Route::parse("/"), Route::CampaignList);
        assert_eq!(Route::parse("/campaigns/new"), Route::NewCampaign);
        assert_eq!(Route::parse("/campaign/new"), Route::NewCampaign);
        assert_eq!(Route::parse("/campaign/abc?tab=1"), Route::CampaignDetails { id: "abc".into() });
        assert_eq!(Route::parse("/login/"), Route::Login);
        assert_eq!(Route::parse("/nope"), Route::NotFound { path: "/nope".to_owned() });
        assert_eq!(Route::CampaignDetails { id: "abc".into() }.path(), "/campaign/abc");
        assert!(!Route::Register.is_protected());
        assert!(Route::NewCampaign.is_protected());
    }

    #[test]
    fn missing_credential_redirects_to_login() {
        let dir = tempfile::tempdir().unwrap();
        let guard = RouteGuard::new(session(&dir));
        assert_eq!(
            guard.evaluate(Route::parse("/campaign/new")),
            Navigation::Redirect { to: Route::Login },
        );
        assert_eq!(guard.evaluate(Route::Register), Navigation::Render(Route::Register));
    }

    #[test]
    fn logout_makes_guard_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(&dir);
        let guard = RouteGuard::new(session.clone());
        session.set_token(Some(AccessToken::new("abc")));
        assert_eq!(guard.evaluate(Route::NewCampaign), Navigation::Render(Route::NewCampaign));

        session.set_token(None);
        assert_eq!(session.read(), None);
        assert_eq!(
            guard.evaluate(Route::NewCampaign),
            Navigation::Redirect { to: Route::Login },
        );
    }

    #[test]
    fn redirect_replaces_history_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut navigator = Navigator::new(RouteGuard::new(session(&dir)));
        assert_eq!(navigator.navigate_to("/register"), &Route::Register);
        assert_eq!(navigator.navigate_to("/campaigns/new"), &Route::Login);
        assert_eq!(navigator.back(), Some(&Route::Register));
        assert_eq!(navigator.back(), None);
    }

    #[tokio::test]
    async fn other_tab_logout_is_seen_by_guard_without_reload() {
        let dir = tempfile::tempdir().unwrap();
        let first = session(&dir);
        let second = session(&dir);
        second.set_token(Some(AccessToken::new("abc")));

        let mut navigator = Navigator::new(RouteGuard::new(first.clone()));
        assert_eq!(navigator.navigate_to("/"), &Route::CampaignList);

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _subscription = first.subscribe_to_external_changes(move |token| {
            let _ = tx.send(token);
        });
        second.set_token(None);

        let change = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
        assert_eq!(change, Some(None));

        assert_eq!(navigator.revalidate(), Some(&Route::Login));
        assert_eq!(navigator.back(), None);
    }
}

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use api::ApiClient;
use client::{
    ClientConfig, Navigator, RequestSender, Route, RouteGuard, SessionStore, cache::CacheStorage,
    storage::Storage,
};

/// Everything a command needs, built once per invocation.
pub struct App {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub api: Arc<ApiClient>,
    pub sender: RequestSender,
    pub cache: CacheStorage,
    pub navigator: Navigator,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let session = SessionStore::with_watch_interval(Storage::default(), config.session_watch_interval());
        let api = ApiClient::new(&config.api_host, config.request_timeout(), Arc::new(session.clone()))
            .context("building HTTP client")?;
        Ok(Self {
            sender: RequestSender::new(config.request_timeout()),
            navigator: Navigator::new(RouteGuard::new(session.clone())),
            api: Arc::new(api),
            cache: CacheStorage::default(),
            session,
            config,
        })
    }

    /// Navigates to `route`; fails when the guard sends us to the login page instead.
    pub fn enter(&mut self, route: Route) -> Result<()> {
        let wanted = route.clone();
        let landed = self.navigator.navigate(route);
        if *landed != wanted {
            bail!("{wanted} requires a session; run `campaigns login` first");
        }
        Ok(())
    }

    pub fn notice(&self, message: impl std::fmt::Display) {
        eprintln!("{message}");
    }
}

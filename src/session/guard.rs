use crate::api::MarketApi;
use crate::routes::Route;
use crate::session::store::TokenStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where a guard is in its single validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Request outstanding; show a loading indicator
    Validating,
    Valid,
    Invalid,
}

/// What the caller should do with the requested route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render(Route),
    /// Navigate to `to`; `next` is where to go after logging in
    Redirect { to: Route, next: Option<Route> },
}

/// Asks the backend whether the stored access token is still good.
///
/// A missing token, a rejected token and an unreachable backend all come
/// back as `false`; the difference only shows up in the logs.
pub async fn validate_session(api: &dyn MarketApi, store: &dyn TokenStore) -> bool {
    let token = match store.access_token() {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("No stored access token");
            return false;
        }
        Err(e) => {
            warn!("Could not read session: {}", e);
            return false;
        }
    };

    match api.validate_token(&token).await {
        Ok(()) => true,
        Err(e) => {
            info!("Session rejected: {}", e);
            false
        }
    }
}

/// Route protection. Runs exactly once; `run` consumes the guard.
pub struct SessionGuard<'a> {
    api: &'a dyn MarketApi,
    store: &'a dyn TokenStore,
    state: watch::Sender<GuardState>,
}

impl<'a> SessionGuard<'a> {
    pub fn new(api: &'a dyn MarketApi, store: &'a dyn TokenStore) -> Self {
        let (state, _) = watch::channel(GuardState::Validating);
        Self { api, store, state }
    }

    /// Follow the guard's state, e.g. to draw a loading indicator
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    pub async fn run(self, requested: Route) -> GuardOutcome {
        if !requested.requires_session() {
            self.state.send_replace(GuardState::Valid);
            return GuardOutcome::Render(requested);
        }

        let valid = validate_session(self.api, self.store).await;

        if valid {
            self.state.send_replace(GuardState::Valid);
            if requested.is_login() {
                let to = requested.landing_route();
                debug!("Already logged in, leaving {} for {}", requested, to);
                return GuardOutcome::Redirect { to, next: None };
            }
            return GuardOutcome::Render(requested);
        }

        self.state.send_replace(GuardState::Invalid);
        if let Err(e) = self.store.clear() {
            warn!("Could not clear session: {}", e);
        }

        if requested.is_login() {
            GuardOutcome::Render(requested)
        } else {
            GuardOutcome::Redirect {
                to: requested.login_route(),
                next: Some(requested),
            }
        }
    }
}

//! Login, admin login, logout and token refresh.

use crate::api::{Credentials, MarketApi};
use crate::error::{MarketError, Result, ValidationErrors};
use crate::models::TokenPair;
use crate::routes::Route;
use crate::session::TokenStore;
use crate::validate;
use tracing::info;

fn check_credentials(credentials: &Credentials) -> Result<()> {
    let mut errors = ValidationErrors::new();
    validate::require_email(&mut errors, "email", &credentials.email);
    validate::require(&mut errors, "password", &credentials.password);
    errors.into_result()
}

/// Log in and keep the returned tokens. Returns where to go next:
/// `next` if the guard sent us here, the home route otherwise.
pub async fn login(
    api: &dyn MarketApi,
    store: &dyn TokenStore,
    credentials: &Credentials,
    next: Option<Route>,
) -> Result<Route> {
    check_credentials(credentials)?;
    let pair = api.login(credentials).await?;
    store.save(&pair)?;
    info!("Logged in as {}", credentials.email);
    Ok(next.unwrap_or(Route::Home))
}

pub async fn admin_login(
    api: &dyn MarketApi,
    store: &dyn TokenStore,
    credentials: &Credentials,
    next: Option<Route>,
) -> Result<Route> {
    check_credentials(credentials)?;
    let pair = api.admin_login(credentials).await?;
    store.save(&pair)?;
    info!("Admin logged in as {}", credentials.email);
    Ok(next.unwrap_or(Route::AdminHome))
}

pub fn logout(store: &dyn TokenStore) -> Result<Route> {
    store.clear()?;
    info!("Logged out");
    Ok(Route::Login)
}

/// Swap the stored refresh token for a fresh access token
pub async fn refresh(api: &dyn MarketApi, store: &dyn TokenStore) -> Result<()> {
    let refresh = store.refresh_token()?.ok_or(MarketError::NotAuthenticated)?;
    let access = api.refresh_token(&refresh).await?;
    store.save(&TokenPair { access, refresh })?;
    info!("Access token refreshed");
    Ok(())
}

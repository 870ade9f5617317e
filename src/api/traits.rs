use crate::api::types::{Credentials, ListingUpdate, NewListing, NewTransaction};
use crate::error::Result;
use crate::models::{Listing, TokenPair, Transaction, TransactionStatus};
use async_trait::async_trait;

/// The backend's REST surface.
/// Views only talk to the backend through this, so tests can swap in a fake.
#[async_trait]
pub trait MarketApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<TokenPair>;

    async fn admin_login(&self, credentials: &Credentials) -> Result<TokenPair>;

    /// Ok when the backend accepts the access token
    async fn validate_token(&self, access: &str) -> Result<()>;

    /// Exchange a refresh token for a new access token
    async fn refresh_token(&self, refresh: &str) -> Result<String>;

    async fn list_listings(&self) -> Result<Vec<Listing>>;

    async fn get_listing(&self, id: i64) -> Result<Listing>;

    /// Listings owned by the authenticated seller
    async fn my_listings(&self, access: &str) -> Result<Vec<Listing>>;

    async fn create_listing(&self, access: &str, listing: &NewListing) -> Result<Listing>;

    async fn update_listing(&self, access: &str, id: i64, update: &ListingUpdate) -> Result<Listing>;

    async fn delete_listing(&self, access: &str, id: i64) -> Result<()>;

    async fn list_transactions(&self, access: &str) -> Result<Vec<Transaction>>;

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction>;

    async fn update_transaction(
        &self,
        access: &str,
        id: i64,
        status: TransactionStatus,
    ) -> Result<Transaction>;

    async fn delete_transaction(&self, access: &str, id: i64) -> Result<()>;

    /// Ask the backend to mail the buyer/renter a confirmation
    async fn send_confirmation_email(&self, transaction_id: i64) -> Result<()>;
}
